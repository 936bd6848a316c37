//! 페이지 렌더러.
//!
//! 브리핑 페이지는 클라이언트에서 그려지므로 헤드리스 Chromium으로 불러온 뒤
//! 완성된 마크업을 가져옵니다. 같은 브라우저 페이지가 HTML → PNG 래스터라이저로도 쓰입니다.
//!
//! 렌더러는 배치 한 번이 독점하며, 끝나면 반드시 `close()`를 호출합니다.

use async_trait::async_trait;
use briefing_core::BrowserConfig;
use briefing_notification::{HtmlRasterizer, NotificationError, NotificationResult};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::RenderError;

/// 렌더링된 마크업을 가져오는 렌더러.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// URL을 불러와 렌더링된 마크업을 반환합니다.
    async fn fetch(&self, url: &str) -> Result<String, RenderError>;

    /// 렌더러 자원을 해제합니다. 여러 번 호출해도 안전합니다.
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// 헤드리스 Chromium 렌더러.
pub struct ChromiumRenderer {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    ready_wait: Duration,
}

impl ChromiumRenderer {
    /// 브라우저를 실행하고 빈 페이지를 하나 엽니다.
    pub async fn launch(config: &BrowserConfig) -> Result<Self, RenderError> {
        let mut builder = chromiumoxide::BrowserConfig::builder()
            .no_sandbox()
            .viewport(None)
            .args(launch_args(config));
        if let Some(ref bin) = config.chrome_executable {
            builder = builder.chrome_executable(bin);
        }
        if !config.headless {
            builder = builder.with_head();
        }
        let launch_config = builder.build().map_err(RenderError::Launch)?;

        info!(
            headless = config.headless,
            executable = ?config.chrome_executable,
            "Launching Chromium"
        );
        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            debug!("Chromium event loop exited");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Launch(format!("페이지 생성 실패: {}", e)))?;

        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler_task),
            ready_wait: config.ready_wait(),
        })
    }

    fn page(&self) -> Result<&Page, RenderError> {
        self.page.as_ref().ok_or(RenderError::Closed)
    }
}

/// Chromium 실행 인자.
fn launch_args(config: &BrowserConfig) -> Vec<String> {
    vec![
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        format!("--lang={}", config.language),
        format!("--user-agent={}", config.user_agent),
        format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ),
    ]
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn fetch(&self, url: &str) -> Result<String, RenderError> {
        let page = self.page()?;
        let navigation_error = |e: CdpError| RenderError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };

        // body 요소가 생길 때까지 대기 (상한: ready_wait)
        let ready = async {
            page.goto(url)
                .await
                .map_err(navigation_error)?
                .wait_for_navigation()
                .await
                .map_err(navigation_error)?;
            page.find_element("body").await.map_err(navigation_error)?;
            Ok::<(), RenderError>(())
        };
        match tokio::time::timeout(self.ready_wait, ready).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(RenderError::ReadyTimeout {
                    url: url.to_string(),
                    secs: self.ready_wait.as_secs(),
                })
            }
        }

        let markup = page
            .content()
            .await
            .map_err(|e| RenderError::Content(e.to_string()))?;
        debug!(url, bytes = markup.len(), "Page rendered");
        Ok(markup)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.page = None;
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let result = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| RenderError::Content(format!("브라우저 종료 실패: {}", e)));
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "Chromium process did not exit cleanly");
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        info!("Chromium closed");
        result
    }
}

#[async_trait]
impl HtmlRasterizer for ChromiumRenderer {
    async fn rasterize(&self, html: &str) -> NotificationResult<Vec<u8>> {
        let page = self
            .page()
            .map_err(|e| NotificationError::RenderFailed(e.to_string()))?;

        page.set_content(html)
            .await
            .map_err(|e| NotificationError::RenderFailed(e.to_string()))?;
        let png = page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| NotificationError::RenderFailed(e.to_string()))?;

        debug!(bytes = png.len(), "HTML rasterized");
        Ok(png)
    }
}

impl Drop for ChromiumRenderer {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_args_carry_locale_and_agent() {
        let config = BrowserConfig::default();
        let args = launch_args(&config);
        assert!(args.contains(&"--lang=ko-KR".to_string()));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
        assert!(args.contains(&"--window-size=900,1200".to_string()));
    }

    #[tokio::test]
    #[ignore = "requires a local Chromium installation"]
    async fn test_chromium_renders_markup() {
        let mut renderer = ChromiumRenderer::launch(&BrowserConfig::default())
            .await
            .unwrap();
        let png = renderer
            .rasterize("<html><body><h1>테스트</h1></body></html>")
            .await
            .unwrap();
        assert!(!png.is_empty());
        renderer.close().await.unwrap();
        assert!(matches!(
            renderer.fetch("about:blank").await,
            Err(RenderError::Closed)
        ));
    }
}
