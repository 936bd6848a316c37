//! # Briefing Core
//!
//! 데일리 브리핑 수집기의 핵심 도메인 타입을 제공합니다:
//! - 요청/레코드/결과 타입
//! - 에러 분류
//! - 설정 로드 (파일 + 환경 변수)
//! - 티커 정책 테이블
//! - 로깅 초기화

pub mod config;
pub mod error;
pub mod logging;
pub mod policy;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use policy::*;
pub use types::*;
