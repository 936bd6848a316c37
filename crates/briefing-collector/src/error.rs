//! 에러 타입 정의.

use thiserror::Error;

/// 페이지 렌더러 에러.
#[derive(Debug, Error)]
pub enum RenderError {
    /// 브라우저 실행 실패
    #[error("브라우저 실행 실패: {0}")]
    Launch(String),

    /// 페이지 이동 실패
    #[error("페이지 이동 실패 ({url}): {reason}")]
    Navigation { url: String, reason: String },

    /// 준비 대기 시간 초과
    #[error("페이지 준비 시간 초과 ({url}, {secs}초)")]
    ReadyTimeout { url: String, secs: u64 },

    /// 마크업/스크린샷 획득 실패
    #[error("페이지 내용 획득 실패: {0}")]
    Content(String),

    /// 이미 닫힌 렌더러
    #[error("렌더러가 이미 닫혔습니다")]
    Closed,
}

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 렌더러 준비 실패
    #[error("Renderer setup failed: {0}")]
    Renderer(#[from] RenderError),

    /// 추출기 생성 실패
    #[error("Extractor setup failed: {0}")]
    Extractor(#[from] briefing_extract::ExtractError),

    /// 입출력 에러
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
