//! # Briefing Data
//!
//! 차트 분석용 일봉 종가 시계열을 조회하고 이동평균(50일, 200일, 200일 +10%)을
//! 계산합니다.

pub mod error;
pub mod indicators;
pub mod provider;

pub use error::{SeriesError, SeriesResult};
pub use indicators::{analyze, build_series, moving_average};
pub use provider::{PriceSeriesProvider, YahooSeriesProvider};
