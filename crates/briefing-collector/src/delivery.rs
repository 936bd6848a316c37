//! 브리핑 전송 파이프라인.
//!
//! 배치 결과를 채팅으로 보냅니다. 이미지 모드는 카드 이미지와 링크 메시지를 보내고,
//! 이미지 단계가 하나라도 실패하면 텍스트 메시지로 대신합니다. 차트 분석은 결과와
//! 무관하게 티커마다 덧붙입니다.
//!
//! 전송 실패는 로그만 남기며 배치 결과를 바꾸지 않습니다.

use briefing_core::{DeliveryConfig, DeliveryMode, FormattedResult};
use briefing_data::{analyze, PriceSeriesProvider};
use briefing_notification::{
    briefing_caption, briefing_message, chart_analysis_message, chart_caption, links_message,
    render_chart, render_text_as_image, ChatTransport, HtmlRasterizer, NotificationResult,
    ParseMode,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 전송 결과 집계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    pub charts: usize,
}

/// 브리핑 전송기.
pub struct BriefingDelivery {
    transport: Arc<dyn ChatTransport>,
    rasterizer: Option<Arc<dyn HtmlRasterizer>>,
    series: Option<Arc<dyn PriceSeriesProvider>>,
    config: DeliveryConfig,
}

impl BriefingDelivery {
    pub fn new(transport: Arc<dyn ChatTransport>, config: DeliveryConfig) -> Self {
        Self {
            transport,
            rasterizer: None,
            series: None,
            config,
        }
    }

    /// 이미지 카드와 차트에 쓸 래스터라이저.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn HtmlRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// 차트 분석용 시계열 제공자.
    pub fn with_series_provider(mut self, provider: Arc<dyn PriceSeriesProvider>) -> Self {
        self.series = Some(provider);
        self
    }

    /// 결과 목록을 순서대로 전송합니다.
    pub async fn deliver_all(&self, results: &[FormattedResult], date: NaiveDate) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if !self.transport.is_enabled() {
            info!(transport = self.transport.name(), "Delivery disabled, skipping");
            return report;
        }

        for result in results {
            match self.deliver_result(result, date).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(ticker = %result.ticker, error = %e, "Failed to deliver briefing");
                    report.failed += 1;
                }
            }

            if self.config.include_chart && self.deliver_chart(&result.ticker).await {
                report.charts += 1;
            }
        }

        info!(
            delivered = report.delivered,
            failed = report.failed,
            charts = report.charts,
            "Delivery finished"
        );
        report
    }

    /// 결과 하나를 전송합니다.
    pub async fn deliver_result(
        &self,
        result: &FormattedResult,
        date: NaiveDate,
    ) -> NotificationResult<()> {
        if let (DeliveryMode::Image, Some(rasterizer)) = (self.config.mode, &self.rasterizer) {
            match self.send_as_image(rasterizer.as_ref(), result, date).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(ticker = %result.ticker, error = %e, "Image delivery failed, falling back to text");
                }
            }
        }

        let message = briefing_message(&result.ticker, result.body(), date);
        self.transport.send_text(&message, ParseMode::Html).await
    }

    async fn send_as_image(
        &self,
        rasterizer: &dyn HtmlRasterizer,
        result: &FormattedResult,
        date: NaiveDate,
    ) -> NotificationResult<()> {
        let image = render_text_as_image(rasterizer, &result.ticker, result.body(), date).await?;
        self.transport
            .send_image(image.png, &briefing_caption(&result.ticker))
            .await?;

        if let Some(links) = links_message(&result.ticker, &image.links) {
            self.transport.send_text(&links, ParseMode::Html).await?;
        }
        debug!(ticker = %result.ticker, links = image.links.len(), "Briefing image delivered");
        Ok(())
    }

    /// 차트 분석 메시지와 차트 이미지를 보냅니다. 보냈으면 `true`.
    pub async fn deliver_chart(&self, ticker: &str) -> bool {
        let Some(ref provider) = self.series else {
            return false;
        };

        let series = match provider.get_series(ticker, &self.config.chart_period).await {
            Ok(series) => series,
            Err(e) => {
                warn!(ticker, error = %e, "Price series unavailable, skipping chart");
                return false;
            }
        };
        let analysis = match analyze(&series) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(ticker, error = %e, "Chart analysis failed");
                return false;
            }
        };

        if let Err(e) = self
            .transport
            .send_text(&chart_analysis_message(&analysis), ParseMode::Html)
            .await
        {
            warn!(ticker, error = %e, "Failed to send chart analysis");
            return false;
        }

        if let Some(ref rasterizer) = self.rasterizer {
            let sent = match render_chart(rasterizer.as_ref(), &series).await {
                Ok(png) => self.transport.send_image(png, &chart_caption(ticker)).await,
                Err(e) => Err(e),
            };
            if let Err(e) = sent {
                warn!(ticker, error = %e, "Failed to send chart image");
            }
        }
        true
    }
}
