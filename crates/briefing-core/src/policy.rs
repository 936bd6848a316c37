//! 티커 정책 테이블.
//!
//! 특정 티커에 묶인 예외 처리(URL 종류, 타임아웃, 수동 확인 문구, 합성 본문)와
//! 페이지 마크업에 맞춘 리터럴(셀렉터, 연결어, 언론사 표기)을 한 곳에 모읍니다.
//! 티커 예외를 추가하는 일은 코드 변경이 아니라 데이터 변경입니다.
//!
//! 여기의 리터럴은 특정 시점의 페이지 마크업에서 관찰된 값이며,
//! 페이지가 바뀌면 교체되는 것을 전제로 합니다.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::types::{BriefingRequest, SecurityKind};

/// 소스 사이트 기본 origin.
pub const DEFAULT_BASE_ORIGIN: &str = "https://invest.zum.com";

/// 티커별 예외 항목.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerOverride {
    /// 티커별 작업 타임아웃 (초)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// 시간 초과 시 사용할 고정 문구 (URL 포함)
    #[serde(default)]
    pub manual_check_message: Option<String>,
    /// 빈 본문 대체용 레버리지 ETF 설명
    #[serde(default)]
    pub synthesized_narrative: Option<SynthesizedNarrative>,
}

/// 레버리지 ETF 합성 본문 설정.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedNarrative {
    /// 기초 자산 이름
    pub underlying_name: String,
    /// 기초 자산 심볼
    pub underlying_symbol: String,
    /// 일일 추종 배수
    pub leverage: u32,
}

/// 본문 정리에 쓰이는 리터럴 테이블.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPolicy {
    /// "데일리 브리핑" 헤더 문구
    pub header_phrase: String,
    /// 날짜 토큰 앞에 붙는 오염 문자
    pub contamination_char: char,
    /// 날짜 접두 뒤에 오는 경계 문구 (`YYYY년 MM월 DD일 <marker>`)
    pub date_prefix_marker: String,
    /// 본문 뒤에 섞여 들어오는 언론사 표기
    pub source_labels: Vec<String>,
    /// 종목 언급임을 확인하는 조사 ("주식이")
    pub stock_particle: String,
    /// 항목 문장이 종목 언급인지 가르는 문구 (앞뒤 공백 포함)
    pub stock_gate: String,
    /// 하락 연결어
    pub fell_connector: String,
    /// 상승 연결어
    pub rose_connector: String,
    /// 통화 단위 토큰
    pub currency_token: String,
    /// 관련 종목 섹션 헤더
    pub mentions_header: String,
    /// 관련 뉴스 섹션 헤더
    pub news_header: String,
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self {
            header_phrase: "데일리 브리핑".to_string(),
            contamination_char: 'C',
            date_prefix_marker: "종가 기준".to_string(),
            source_labels: [
                "연합뉴스",
                "로이터",
                "블룸버그",
                "한국경제",
                "매일경제",
                "이데일리",
                "머니투데이",
                "인베스팅닷컴",
                "Reuters",
                "Bloomberg",
                "CNBC",
                "Benzinga",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            stock_particle: "주식이".to_string(),
            stock_gate: " 주식이 ".to_string(),
            fell_connector: "하락하여".to_string(),
            rose_connector: "상승하여".to_string(),
            currency_token: "달러에".to_string(),
            mentions_header: "주요 구성종목".to_string(),
            news_header: "관련 뉴스".to_string(),
        }
    }
}

/// 페이지 마크업 셀렉터.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupSelectors {
    /// 헤더 요소 (본문 카드 탐색 시작점)
    pub heading: String,
    /// 본문 컨테이너 클래스 (대체 경로)
    pub briefing_inner: String,
    /// 종목 항목 블록
    pub item_block: String,
    /// 항목의 브리핑 문장
    pub item_briefing: String,
    /// 항목의 보조 정보
    pub item_info: String,
    /// 항목의 심볼 표기
    pub item_symbol: String,
    /// 항목의 뉴스 블록
    pub news: String,
    /// 뉴스 제목
    pub news_title: String,
    /// 뉴스 출처
    pub news_source: String,
    /// 가격 표시 요소 (합성 본문용)
    pub price: String,
    /// 등락 표시 요소 (합성 본문용)
    pub change: String,
}

impl Default for MarkupSelectors {
    fn default() -> Self {
        Self {
            heading: "h3".to_string(),
            briefing_inner: "div.styles_briefingInner__8_73I".to_string(),
            item_block: "div.styles_container__oDEu1".to_string(),
            item_briefing: "div.styles_briefing__t15bx".to_string(),
            item_info: "div.styles_stockInfo__ttpG6".to_string(),
            item_symbol: "[class*='styles_symbol']".to_string(),
            news: "div.styles_article__0oE8K".to_string(),
            news_title: "div.styles_title__ummjn".to_string(),
            news_source: "span.styles_info__OeSIl".to_string(),
            price: "[class*='styles_price']".to_string(),
            change: "[class*='styles_change']".to_string(),
        }
    }
}

/// 티커 정책 전체.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefingPolicy {
    /// 주식으로 취급할 티커 (그 외는 ETF)
    pub stock_tickers: Vec<String>,
    /// 티커별 예외
    pub overrides: HashMap<String, TickerOverride>,
    pub text: TextPolicy,
    pub selectors: MarkupSelectors,
}

impl Default for BriefingPolicy {
    fn default() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert(
            "BRKU".to_string(),
            TickerOverride {
                timeout_secs: Some(30),
                manual_check_message: Some(
                    "데일리 브리핑\n\nBRKU 페이지 응답이 지연되어 브리핑을 가져오지 못했습니다. \
                     수동으로 확인해주세요: https://invest.zum.com/etf/BRKU/"
                        .to_string(),
                ),
                synthesized_narrative: Some(SynthesizedNarrative {
                    underlying_name: "버크셔 해서웨이 B".to_string(),
                    underlying_symbol: "BRK.B".to_string(),
                    leverage: 2,
                }),
            },
        );
        overrides.insert(
            "SOXL".to_string(),
            TickerOverride {
                timeout_secs: Some(30),
                manual_check_message: Some(
                    "데일리 브리핑\n\nSOXL 페이지 로딩이 오래 걸려 브리핑을 가져오지 못했습니다. \
                     수동으로 확인해주세요: https://invest.zum.com/etf/SOXL/"
                        .to_string(),
                ),
                synthesized_narrative: None,
            },
        );

        Self {
            stock_tickers: ["BLK", "AAPL", "MSFT", "NVDA", "ORCL", "TSLA"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            overrides,
            text: TextPolicy::default(),
            selectors: MarkupSelectors::default(),
        }
    }
}

impl BriefingPolicy {
    /// 티커의 예외 항목 (대소문자 무시).
    pub fn override_for(&self, ticker: &str) -> Option<&TickerOverride> {
        self.overrides
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(ticker.trim()))
            .map(|(_, entry)| entry)
    }

    /// 허용 목록에 있으면 주식, 그 외는 ETF.
    pub fn security_kind(&self, ticker: &str) -> SecurityKind {
        if self
            .stock_tickers
            .iter()
            .any(|t| t.eq_ignore_ascii_case(ticker.trim()))
        {
            SecurityKind::Stock
        } else {
            SecurityKind::Etf
        }
    }

    /// 티커에 대한 요청 생성. 입력 티커 문자열은 바꾸지 않습니다.
    pub fn request(&self, ticker: &str) -> BriefingRequest {
        BriefingRequest::new(ticker, self.security_kind(ticker))
    }

    /// 티커별 타임아웃 (예외 티커만).
    pub fn ticker_timeout(&self, ticker: &str) -> Option<Duration> {
        self.override_for(ticker)
            .and_then(|o| o.timeout_secs)
            .map(Duration::from_secs)
    }

    /// 합성 본문 설정.
    pub fn synthesized_narrative(&self, ticker: &str) -> Option<&SynthesizedNarrative> {
        self.override_for(ticker)
            .and_then(|o| o.synthesized_narrative.as_ref())
    }

    /// 티커 전용 수동 확인 문구. 없으면 일반 템플릿.
    pub fn manual_check_message(&self, request: &BriefingRequest, base_origin: &str) -> String {
        self.override_for(&request.ticker)
            .and_then(|o| o.manual_check_message.clone())
            .unwrap_or_else(|| generic_manual_check_message(request, base_origin))
    }
}

/// 시간 초과 시 일반 수동 확인 문구.
pub fn generic_manual_check_message(request: &BriefingRequest, base_origin: &str) -> String {
    format!(
        "데일리 브리핑\n\n시간 초과로 인해 브리핑을 가져오지 못했습니다. 수동으로 확인해주세요: {}",
        request.source_url(base_origin)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_kind_lookup() {
        let policy = BriefingPolicy::default();
        assert_eq!(policy.security_kind("BLK"), SecurityKind::Stock);
        assert_eq!(policy.security_kind("blk"), SecurityKind::Stock);
        assert_eq!(policy.security_kind("SPY"), SecurityKind::Etf);
    }

    #[test]
    fn test_request_keeps_caller_ticker() {
        let policy = BriefingPolicy::default();
        let request = policy.request(" orcl ");
        assert_eq!(request.ticker, " orcl ");
        assert_eq!(request.symbol(), "ORCL");
        assert_eq!(request.kind, SecurityKind::Stock);
        assert_eq!(
            request.source_url(DEFAULT_BASE_ORIGIN),
            "https://invest.zum.com/stock/ORCL/"
        );
        assert_eq!(policy.ticker_timeout(" brku"), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_ticker_timeout_only_for_overrides() {
        let policy = BriefingPolicy::default();
        assert_eq!(policy.ticker_timeout("BRKU"), Some(Duration::from_secs(30)));
        assert_eq!(policy.ticker_timeout("brku"), Some(Duration::from_secs(30)));
        assert_eq!(policy.ticker_timeout("SPY"), None);
    }

    #[test]
    fn test_manual_check_message_custom_and_generic() {
        let policy = BriefingPolicy::default();

        let custom = policy.manual_check_message(&policy.request("SOXL"), DEFAULT_BASE_ORIGIN);
        assert!(custom.contains("https://invest.zum.com/etf/SOXL/"));
        assert!(custom.contains("SOXL 페이지 로딩"));

        let generic = policy.manual_check_message(&policy.request("BLK"), DEFAULT_BASE_ORIGIN);
        assert!(generic.contains("https://invest.zum.com/stock/BLK/"));
        assert!(generic.starts_with("데일리 브리핑\n\n시간 초과로"));
    }

    #[test]
    fn test_synthesized_narrative_entry() {
        let policy = BriefingPolicy::default();
        let entry = policy.synthesized_narrative("BRKU").unwrap();
        assert_eq!(entry.leverage, 2);
        assert_eq!(entry.underlying_symbol, "BRK.B");
        assert!(policy.synthesized_narrative("SOXL").is_none());
    }
}
