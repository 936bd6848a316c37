//! 일일 스케줄러.
//!
//! 시작하자마자 한 번 실행하고, 이후 매일 지정 시각(로컬 시간)에 실행합니다.
//! Ctrl-C를 받으면 대기 중에 종료합니다.

use briefing_core::ScheduleConfig;
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// 매일 같은 시각에 실행되는 스케줄.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    /// 잘못된 시각이면 `None`.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(|at| Self { at })
    }

    pub fn from_config(config: &ScheduleConfig) -> Option<Self> {
        Self::new(config.hour, config.minute)
    }

    /// `now` 이후(같은 시각 제외) 첫 실행 시각.
    pub fn next_run(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if today > now {
            today
        } else {
            today + ChronoDuration::days(1)
        }
    }

    /// `now`부터 다음 실행까지 남은 시간.
    pub fn until_next(&self, now: NaiveDateTime) -> Duration {
        (self.next_run(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl std::fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.at.format("%H:%M"))
    }
}

/// 데몬 루프: 즉시 한 번, 이후 매일 `schedule` 시각에 `job`을 실행합니다.
pub async fn run_daily<F, Fut>(schedule: DailySchedule, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    info!(at = %schedule, "=== 데몬 모드 시작 ===");
    job().await;

    loop {
        let now = Local::now().naive_local();
        let wait = schedule.until_next(now);
        info!(
            next_run = %schedule.next_run(now).format("%Y-%m-%d %H:%M"),
            wait_secs = wait.as_secs(),
            "다음 실행 대기"
        );

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                warn!("종료 신호 수신, 데몬 종료 중...");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                job().await;
            }
        }
    }
}
