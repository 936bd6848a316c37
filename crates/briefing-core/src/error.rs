//! 브리핑 시스템 에러 타입.
//!
//! 실패는 가능한 가장 작은 범위에서 격리됩니다. 항목 하나의 파싱 실패는
//! 티커를 실패시키지 않고, 티커 하나의 실패는 배치를 실패시키지 않습니다.

use thiserror::Error;

/// 핵심 브리핑 에러.
#[derive(Debug, Error)]
pub enum BriefingError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 페이지 렌더링/전송 에러
    #[error("페이지 가져오기 실패: {0}")]
    Fetch(String),

    /// 티커별 시간 초과
    #[error("티커 시간 초과: {ticker} ({secs}초)")]
    TickerTimeout { ticker: String, secs: u64 },

    /// 배치 전체 시간 초과
    #[error("배치 시간 초과 ({0}초)")]
    BatchTimeout(u64),

    /// 파싱 에러 (항목 단위, 호출자에게 노출되지 않음)
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 브리핑 작업을 위한 Result 타입.
pub type BriefingResult<T> = Result<T, BriefingError>;

impl BriefingError {
    /// 시간 초과 계열 에러인지 확인합니다.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            BriefingError::TickerTimeout { .. } | BriefingError::BatchTimeout(_)
        )
    }
}

impl From<config::ConfigError> for BriefingError {
    fn from(err: config::ConfigError) -> Self {
        BriefingError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_timeout_kind() {
        let per_ticker = BriefingError::TickerTimeout {
            ticker: "BRKU".to_string(),
            secs: 30,
        };
        assert!(per_ticker.is_timeout());
        assert!(BriefingError::BatchTimeout(120).is_timeout());

        let fetch = BriefingError::Fetch("connection reset".to_string());
        assert!(!fetch.is_timeout());
    }

    #[test]
    fn test_error_display() {
        let err = BriefingError::TickerTimeout {
            ticker: "SOXL".to_string(),
            secs: 45,
        };
        assert_eq!(err.to_string(), "티커 시간 초과: SOXL (45초)");
    }
}
