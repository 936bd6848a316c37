//! # Briefing Notification
//!
//! 데일리 브리핑 전송 서비스.
//!
//! 지원 채널:
//! - Telegram (Bot API 직접 호출)
//!
//! 전송 형태:
//! - 텍스트 메시지 (HTML, 거부 시 일반 텍스트 재전송)
//! - 브리핑 이미지 카드 + 링크 메시지
//! - 1년 주가 차트 이미지 + 차트 분석 메시지

pub mod chart;
pub mod format;
pub mod image;
pub mod telegram;
pub mod types;

pub use chart::{chart_html, chart_svg, render_chart};
pub use format::*;
pub use image::{
    briefing_card_html, extract_links, links_message, render_text_as_image, HtmlRasterizer,
    RenderedImage,
};
pub use telegram::*;
pub use types::*;
