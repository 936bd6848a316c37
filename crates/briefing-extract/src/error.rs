//! 추출 엔진 에러.

use thiserror::Error;

/// 추출기 구성 에러.
///
/// 페이지 파싱 중 항목 단위 실패는 에러로 올라오지 않고 건너뜁니다.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("잘못된 셀렉터 '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

pub type ExtractResult<T> = Result<T, ExtractError>;
