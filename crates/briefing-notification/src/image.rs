//! 브리핑 이미지 카드.
//!
//! 결과 텍스트를 스타일이 적용된 HTML 카드로 만들고 래스터라이저로 PNG를 얻습니다.
//! 이미지 안의 링크는 누를 수 없으므로 카드에서 빼고 별도 목록으로 돌려줍니다.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::format::escape_html;
use crate::types::{NotificationError, NotificationResult};

/// HTML 문서를 PNG로 변환하는 래스터라이저.
#[async_trait]
pub trait HtmlRasterizer: Send + Sync {
    async fn rasterize(&self, html: &str) -> NotificationResult<Vec<u8>>;
}

/// 렌더링된 카드 이미지와 카드에서 뺀 링크.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub png: Vec<u8>,
    pub links: Vec<String>,
}

/// 텍스트에서 URL을 빼고, 뺀 URL 목록을 순서대로(중복 제거) 반환합니다.
pub fn extract_links(text: &str) -> (String, Vec<String>) {
    let mut links: Vec<String> = Vec::new();
    let mut lines = Vec::new();

    for line in text.lines() {
        let mut kept = Vec::new();
        for word in line.split(' ') {
            if word.starts_with("http://") || word.starts_with("https://") {
                let url = word.trim_end_matches([')', ',', '.']);
                if !links.iter().any(|l| l == url) {
                    links.push(url.to_string());
                }
            } else {
                kept.push(word);
            }
        }
        let kept = kept.join(" ");
        // 링크만 있던 줄은 지웁니다
        if kept.trim().is_empty() && !line.trim().is_empty() {
            continue;
        }
        lines.push(kept.trim_end().to_string());
    }

    (lines.join("\n"), links)
}

/// 카드 HTML 문서.
pub fn briefing_card_html(ticker: &str, body: &str, date: NaiveDate) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<style>
  body {{ margin: 0; background: #f4f6fa; font-family: "Noto Sans KR", "Malgun Gothic", sans-serif; }}
  .card {{ width: 820px; margin: 24px; padding: 28px 32px; background: #ffffff;
           border-radius: 14px; box-shadow: 0 2px 10px rgba(0, 0, 0, 0.08); }}
  .title {{ font-size: 26px; font-weight: 700; color: #1a2b4c; }}
  .date {{ font-size: 15px; color: #7a869a; margin-top: 4px; }}
  .body {{ margin-top: 20px; font-size: 17px; line-height: 1.7; color: #222;
           white-space: pre-wrap; word-break: keep-all; }}
</style>
</head>
<body>
<div class="card">
  <div class="title">📊 {ticker} 데일리 브리핑</div>
  <div class="date">{date}</div>
  <div class="body">{body}</div>
</div>
</body>
</html>"#,
        ticker = escape_html(ticker),
        date = date.format("%Y년 %m월 %d일"),
        body = escape_html(body.trim()),
    )
}

/// 결과 본문을 이미지 카드로 렌더링합니다.
pub async fn render_text_as_image(
    rasterizer: &dyn HtmlRasterizer,
    ticker: &str,
    body: &str,
    date: NaiveDate,
) -> NotificationResult<RenderedImage> {
    let (card_text, links) = extract_links(body);
    let html = briefing_card_html(ticker, &card_text, date);
    let png = rasterizer.rasterize(&html).await?;
    if png.is_empty() {
        return Err(NotificationError::RenderFailed(format!(
            "{} 카드 이미지가 비어 있습니다",
            ticker
        )));
    }

    debug!(ticker, bytes = png.len(), links = links.len(), "Briefing card rendered");
    Ok(RenderedImage { png, links })
}

/// 카드에서 뺀 링크 메시지 (`🔗 관련 링크`).
pub fn links_message(ticker: &str, links: &[String]) -> Option<String> {
    if links.is_empty() {
        return None;
    }
    let lines: Vec<String> = links
        .iter()
        .enumerate()
        .map(|(i, link)| format!("{}. {}", i + 1, escape_html(link)))
        .collect();
    Some(format!(
        "🔗 <b>{} 관련 링크</b>\n\n{}",
        escape_html(ticker),
        lines.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRasterizer(Vec<u8>);

    #[async_trait]
    impl HtmlRasterizer for FixedRasterizer {
        async fn rasterize(&self, html: &str) -> NotificationResult<Vec<u8>> {
            assert!(!html.contains("https://"));
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_extract_links() {
        let text = "1. 제목 - 연합뉴스\n   https://invest.zum.com/news/1\n본문 https://a.b/c, 끝";
        let (card, links) = extract_links(text);
        assert_eq!(card, "1. 제목 - 연합뉴스\n본문 끝");
        assert_eq!(links, vec!["https://invest.zum.com/news/1", "https://a.b/c"]);
    }

    #[test]
    fn test_card_html_escapes_body() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 28).unwrap();
        let html = briefing_card_html("SPY", "S&P <500>", date);
        assert!(html.contains("S&amp;P &lt;500&gt;"));
        assert!(html.contains("2025년 03월 28일"));
    }

    #[test]
    fn test_links_message() {
        assert!(links_message("SPY", &[]).is_none());
        let message = links_message("SPY", &["https://x.y/1".to_string()]).unwrap();
        assert!(message.contains("1. https://x.y/1"));
    }

    #[tokio::test]
    async fn test_render_text_as_image() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 28).unwrap();
        let rasterizer = FixedRasterizer(vec![0x89, b'P', b'N', b'G']);
        let image = render_text_as_image(&rasterizer, "SPY", "본문\n   https://x.y/1", date)
            .await
            .unwrap();
        assert_eq!(image.png.len(), 4);
        assert_eq!(image.links, vec!["https://x.y/1"]);

        let empty = FixedRasterizer(Vec::new());
        assert!(render_text_as_image(&empty, "SPY", "본문", date).await.is_err());
    }
}
