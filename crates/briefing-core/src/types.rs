//! 브리핑 도메인 타입.
//!
//! 배치 한 번의 수명 주기 동안 생성되고 소비되는 값 타입을 정의합니다:
//! - `BriefingRequest`: 티커 단위 요청 (배치 시작 시 생성, 사용 후 폐기)
//! - `RawPage`: 렌더러가 반환한 원시 마크업 (추출 직후 폐기)
//! - `BriefingRecord`: 추출기 결과 (조립기가 정확히 한 번 소비)
//! - `FormattedResult`: 배치 경계를 넘는 유일한 산출물

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 결과 없음 표시 문구.
pub const NOT_FOUND_MARKER: &str = "브리핑 없음";

/// 오류 결과 접두어.
pub const ERROR_PREFIX: &str = "오류 발생 - ";

/// 증권 종류. 소스 URL 경로 세그먼트를 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecurityKind {
    /// 상장지수펀드
    #[default]
    Etf,
    /// 개별 주식
    Stock,
}

impl SecurityKind {
    /// URL 경로 세그먼트.
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Etf => "etf",
            Self::Stock => "stock",
        }
    }
}

impl fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Etf => write!(f, "ETF"),
            Self::Stock => write!(f, "STOCK"),
        }
    }
}

/// 티커 단위 브리핑 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefingRequest {
    pub ticker: String,
    pub kind: SecurityKind,
}

impl BriefingRequest {
    pub fn new(ticker: impl Into<String>, kind: SecurityKind) -> Self {
        Self {
            ticker: ticker.into(),
            kind,
        }
    }

    /// URL과 파일명에 쓰는 대문자 심볼. 결과 텍스트에는 `ticker`를 그대로 씁니다.
    pub fn symbol(&self) -> String {
        self.ticker.trim().to_uppercase()
    }

    /// 소스 페이지 URL (`{origin}/{etf|stock}/{SYMBOL}/`).
    pub fn source_url(&self, base_origin: &str) -> String {
        format!(
            "{}/{}/{}/",
            base_origin.trim_end_matches('/'),
            self.kind.path_segment(),
            self.symbol()
        )
    }
}

/// 렌더링된 원시 페이지.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// 렌더링된 마크업
    pub markup: String,
    /// 가져온 URL
    pub url: String,
}

impl RawPage {
    pub fn new(markup: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            url: url.into(),
        }
    }
}

/// 관련 종목 언급.
///
/// 이름, 가격, 등락이 모두 비어있지 않을 때만 생성됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// 표시 이름 (심볼이 있으면 `"이름 (SYM)"`)
    pub name: String,
    /// 심볼
    pub symbol: Option<String>,
    /// 가격 (통화 단위 제외)
    pub price: String,
    /// 등락 (하락은 부호 없음, 상승은 `+` 접두)
    pub change: String,
    /// 기준일 표기
    pub as_of: Option<String>,
}

/// 관련 뉴스.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    /// 언론사 등 출처 표기
    pub source: String,
    /// 절대 URL
    pub url: Option<String>,
}

/// 티커별 최종 상태.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BriefingStatus {
    Found,
    NotFound,
    Error(String),
    TimedOut,
}

impl BriefingStatus {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }
}

/// 정규화된 브리핑 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingRecord {
    pub ticker: String,
    /// 본문 (비어있을 수 있음)
    pub narrative: String,
    pub mentions: Vec<Mention>,
    pub news: Vec<NewsItem>,
    pub status: BriefingStatus,
}

impl BriefingRecord {
    /// 내용 없는 레코드.
    pub fn not_found(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            narrative: String::new(),
            mentions: Vec::new(),
            news: Vec::new(),
            status: BriefingStatus::NotFound,
        }
    }

    /// 조립할 내용이 하나라도 있는지 확인합니다.
    pub fn has_content(&self) -> bool {
        !self.narrative.trim().is_empty() || !self.mentions.is_empty() || !self.news.is_empty()
    }
}

/// 티커별 최종 텍스트 결과 (`"<ticker>:\n<body>"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedResult {
    pub ticker: String,
    pub status: BriefingStatus,
    text: String,
}

impl FormattedResult {
    fn compose(ticker: &str, status: BriefingStatus, body: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            status,
            text: format!("{}:\n{}", ticker, body),
        }
    }

    /// 조립된 본문 결과.
    pub fn found(ticker: &str, body: &str) -> Self {
        Self::compose(ticker, BriefingStatus::Found, body)
    }

    /// 브리핑 없음 결과.
    pub fn not_found(ticker: &str) -> Self {
        Self::compose(ticker, BriefingStatus::NotFound, NOT_FOUND_MARKER)
    }

    /// 오류 결과.
    pub fn error(ticker: &str, description: &str) -> Self {
        Self::compose(
            ticker,
            BriefingStatus::Error(description.to_string()),
            &format!("{}{}", ERROR_PREFIX, description),
        )
    }

    /// 시간 초과 결과 (수동 확인 안내 문구).
    pub fn timed_out(ticker: &str, message: &str) -> Self {
        Self::compose(ticker, BriefingStatus::TimedOut, message)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// `"<ticker>:\n"` 이후의 본문.
    pub fn body(&self) -> &str {
        self.text
            .split_once('\n')
            .map(|(_, body)| body)
            .unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for FormattedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 과거 종가 시계열과 이동평균.
///
/// 이동평균은 윈도우가 채워지기 전까지 `None`입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub ma50: Vec<Option<f64>>,
    pub ma200: Vec<Option<f64>>,
    pub ma200_plus10: Vec<Option<f64>>,
}

/// 시계열 마지막 시점 요약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartAnalysis {
    pub ticker: String,
    pub current_price: Decimal,
    pub ma50: Option<Decimal>,
    pub ma200: Option<Decimal>,
    pub ma200_plus10: Option<Decimal>,
    pub is_above_ma200: bool,
    pub is_above_ma200_plus10: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_url_by_kind() {
        let etf = BriefingRequest::new("SPY", SecurityKind::Etf);
        assert_eq!(
            etf.source_url("https://invest.zum.com"),
            "https://invest.zum.com/etf/SPY/"
        );

        let stock = BriefingRequest::new("BLK", SecurityKind::Stock);
        assert_eq!(
            stock.source_url("https://invest.zum.com/"),
            "https://invest.zum.com/stock/BLK/"
        );
    }

    #[test]
    fn test_formatted_result_shapes() {
        let found = FormattedResult::found("QQQ", "본문");
        assert_eq!(found.as_str(), "QQQ:\n본문");
        assert_eq!(found.body(), "본문");
        assert!(found.status.is_found());

        let missing = FormattedResult::not_found("VTI");
        assert_eq!(missing.as_str(), "VTI:\n브리핑 없음");
        assert_eq!(missing.status, BriefingStatus::NotFound);

        let failed = FormattedResult::error("VOO", "navigation failed");
        assert_eq!(failed.as_str(), "VOO:\n오류 발생 - navigation failed");
        assert_eq!(
            failed.status,
            BriefingStatus::Error("navigation failed".to_string())
        );
    }

    #[test]
    fn test_record_content_detection() {
        let mut record = BriefingRecord::not_found("IGV");
        assert!(!record.has_content());

        record.narrative = "   ".to_string();
        assert!(!record.has_content());

        record.news.push(NewsItem {
            title: "제목".to_string(),
            source: "연합뉴스".to_string(),
            url: None,
        });
        assert!(record.has_content());
    }
}
