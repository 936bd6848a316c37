//! # Briefing Extract
//!
//! 렌더링된 브리핑 페이지 마크업에서 본문, 관련 종목, 관련 뉴스를 추출합니다.
//!
//! ## 구성
//! - [`locator`]: 본문 영역 탐색 (주 경로 → 대체 경로)
//! - [`normalizer`]: 경계 절단, 문장 재분절, 빈 본문 대체, 후처리 보정
//! - [`mention`] / [`news`]: 항목 블록 단위 추출 (실패 항목은 건너뜀)
//! - [`assembler`]: 고정 순서의 최종 텍스트 조립
//!
//! ## 사용 예시
//! ```rust,ignore
//! let extractor = BriefingExtractor::new(policy, "https://invest.zum.com")?;
//! let result = extractor.extract_formatted(&page, "SPY", today);
//! println!("{}", result);
//! ```

pub mod assembler;
pub mod error;
pub mod extractor;
pub mod grammar;
pub mod locator;
pub mod mention;
pub mod news;
pub mod normalizer;
pub mod selectors;
pub mod text;

pub use assembler::{assemble_body, format_record};
pub use error::{ExtractError, ExtractResult};
pub use extractor::BriefingExtractor;
pub use grammar::{ConnectorGrammar, PriceFigures};
pub use locator::{BriefingLocator, LocateStrategy, LocatedBriefing};
pub use normalizer::NarrativeNormalizer;
