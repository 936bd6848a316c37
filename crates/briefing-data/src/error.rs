//! 시세 데이터 에러.

use thiserror::Error;

/// 시세 조회/분석 에러.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("연결 실패: {0}")]
    ConnectionError(String),

    #[error("API 오류 ({symbol}): {message}")]
    ApiError { symbol: String, message: String },

    #[error("파싱 오류: {0}")]
    ParseError(String),

    #[error("데이터 없음: {0}")]
    NotAvailable(String),
}

pub type SeriesResult<T> = Result<T, SeriesError>;
