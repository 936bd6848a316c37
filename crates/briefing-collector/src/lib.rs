//! Daily briefing batch collector.
//!
//! 이 crate는 데일리 브리핑 배치를 실행하는 바이너리를 제공합니다:
//! - 헤드리스 Chromium 페이지 렌더링 (HTML → PNG 래스터라이저 겸용)
//! - 티커 순차 처리, 티커별/배치 전체 시간 제한
//! - 원시 마크업 스냅샷
//! - 채팅 전송 (텍스트, 이미지 카드, 차트)
//! - 일일 스케줄러

pub mod delivery;
pub mod error;
pub mod orchestrator;
pub mod renderer;
pub mod scheduler;
pub mod snapshot;
pub mod stats;

pub use delivery::{BriefingDelivery, DeliveryReport};
pub use error::{CollectorError, RenderError, Result};
pub use orchestrator::{BatchOrchestrator, BatchOutcome, BatchState};
pub use renderer::{ChromiumRenderer, PageRenderer};
pub use scheduler::{run_daily, DailySchedule};
pub use snapshot::SnapshotWriter;
pub use stats::BatchStats;
