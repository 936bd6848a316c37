//! 배치 오케스트레이터.
//!
//! 티커 목록을 한 번에 하나씩 처리하여 티커마다 정확히 하나의 결과를 만듭니다.
//!
//! # 상태
//!
//! `Pending → Running → {Completed, BatchTimedOut}`
//!
//! # 시간 제한
//!
//! - 티커별: 정책 테이블에 제한 시간이 있는 티커만. 만료되면 티커 전용 수동 확인 문구.
//! - 배치 전체: 만료되면 모든 티커(이미 끝난 티커 포함)가 일반 수동 확인 문구를 받고,
//!   채팅으로 별도의 시간 초과 알림을 보냅니다.
//!
//! 티커 사이에는 결과와 관계없이 고정 지연을 둡니다.

use briefing_core::{
    generic_manual_check_message, ticker_span, AppConfig, BriefingRequest, FormattedResult,
    RawPage,
};
use briefing_extract::BriefingExtractor;
use briefing_notification::{batch_timeout_notice, ChatTransport, ParseMode};
use chrono::{Local, NaiveDate};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn, Instrument};

use crate::error::Result;
use crate::renderer::PageRenderer;
use crate::snapshot::SnapshotWriter;
use crate::stats::BatchStats;

/// 배치 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Pending,
    Running,
    Completed,
    BatchTimedOut,
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchState::Pending => "pending",
            BatchState::Running => "running",
            BatchState::Completed => "completed",
            BatchState::BatchTimedOut => "batch_timed_out",
        };
        f.write_str(name)
    }
}

/// 배치 한 번의 결과.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// 입력 티커 순서와 같은 순서의 결과
    pub results: Vec<FormattedResult>,
    pub state: BatchState,
    pub stats: BatchStats,
}

impl BatchOutcome {
    /// 렌더러 준비 실패: 모든 티커를 에러 결과로 채웁니다.
    pub fn setup_failed(tickers: &[String], reason: &str) -> Self {
        let started = Instant::now();
        let results: Vec<FormattedResult> = tickers
            .iter()
            .map(|t| FormattedResult::error(t, reason))
            .collect();
        let stats = BatchStats::from_results(&results, started.elapsed());
        Self {
            results,
            state: BatchState::Completed,
            stats,
        }
    }
}

/// 배치 오케스트레이터.
pub struct BatchOrchestrator {
    extractor: BriefingExtractor,
    request_delay: Duration,
    aggregate_timeout: Duration,
    snapshots: Option<SnapshotWriter>,
    notifier: Option<Arc<dyn ChatTransport>>,
    run_date: Option<NaiveDate>,
}

impl BatchOrchestrator {
    /// 기본 지연 2초, 배치 제한 120초로 생성합니다.
    pub fn new(extractor: BriefingExtractor) -> Self {
        Self {
            extractor,
            request_delay: Duration::from_secs(2),
            aggregate_timeout: Duration::from_secs(120),
            snapshots: None,
            notifier: None,
            run_date: None,
        }
    }

    /// 설정에서 생성합니다.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let extractor =
            BriefingExtractor::new(config.policy.clone(), config.source.base_origin.clone())?;
        let mut orchestrator = Self::new(extractor)
            .with_request_delay(config.batch.request_delay())
            .with_aggregate_timeout(config.batch.aggregate_timeout());
        if config.snapshot.enabled {
            orchestrator = orchestrator.with_snapshots(SnapshotWriter::new(&config.snapshot.dir));
        }
        Ok(orchestrator)
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_aggregate_timeout(mut self, timeout: Duration) -> Self {
        self.aggregate_timeout = timeout;
        self
    }

    pub fn with_snapshots(mut self, writer: SnapshotWriter) -> Self {
        self.snapshots = Some(writer);
        self
    }

    /// 배치 시간 초과 알림을 받을 채팅 전송기.
    pub fn with_notifier(mut self, notifier: Arc<dyn ChatTransport>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// 실행 날짜 고정 (기본값: 오늘, 로컬 시간).
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = Some(date);
        self
    }

    pub fn extractor(&self) -> &BriefingExtractor {
        &self.extractor
    }

    fn run_date(&self) -> NaiveDate {
        self.run_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// 배치를 실행합니다. 렌더러는 이 호출이 독점하고, 끝나면 닫습니다.
    pub async fn run<R: PageRenderer>(&self, mut renderer: R, tickers: &[String]) -> BatchOutcome {
        let started = Instant::now();
        let policy = self.extractor.policy();
        let requests: Vec<BriefingRequest> = tickers.iter().map(|t| policy.request(t)).collect();

        let mut state = BatchState::Pending;
        info!(%state, tickers = requests.len(), "Batch created");
        state = BatchState::Running;
        info!(
            %state,
            delay_secs = self.request_delay.as_secs(),
            timeout_secs = self.aggregate_timeout.as_secs(),
            "Batch started"
        );

        let processed =
            tokio::time::timeout(self.aggregate_timeout, self.process_all(&renderer, &requests))
                .await;

        let results = match processed {
            Ok(results) => {
                state = BatchState::Completed;
                results
            }
            Err(_) => {
                state = BatchState::BatchTimedOut;
                warn!(
                    timeout_secs = self.aggregate_timeout.as_secs(),
                    "Batch timed out, replacing all results with manual check messages"
                );
                self.notify_batch_timeout(&requests).await;
                self.timeout_results(&requests)
            }
        };

        if let Err(e) = renderer.close().await {
            warn!(error = %e, "Failed to close renderer");
        }

        let stats = BatchStats::from_results(&results, started.elapsed());
        info!(%state, "Batch finished");
        BatchOutcome {
            results,
            state,
            stats,
        }
    }

    /// 티커를 순서대로 처리합니다.
    async fn process_all<R: PageRenderer>(
        &self,
        renderer: &R,
        requests: &[BriefingRequest],
    ) -> Vec<FormattedResult> {
        let mut results = Vec::with_capacity(requests.len());

        for (idx, request) in requests.iter().enumerate() {
            let result = self
                .process_ticker(renderer, request)
                .instrument(ticker_span!("ticker", request.ticker))
                .await;
            info!(
                ticker = %request.ticker,
                status = ?result.status,
                progress = format!("{}/{}", idx + 1, requests.len()),
                "Ticker processed"
            );
            results.push(result);

            if idx + 1 < requests.len() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        results
    }

    /// 티커 하나를 처리합니다. 제한 시간이 있는 티커는 타이머와 경쟁합니다.
    async fn process_ticker<R: PageRenderer>(
        &self,
        renderer: &R,
        request: &BriefingRequest,
    ) -> FormattedResult {
        let policy = self.extractor.policy();
        let work = self.fetch_and_extract(renderer, request);

        match policy.ticker_timeout(&request.ticker) {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        ticker = %request.ticker,
                        timeout_secs = limit.as_secs(),
                        "Ticker timed out"
                    );
                    FormattedResult::timed_out(
                        &request.ticker,
                        &policy.manual_check_message(request, self.extractor.base_origin()),
                    )
                }
            },
            None => work.await,
        }
    }

    async fn fetch_and_extract<R: PageRenderer>(
        &self,
        renderer: &R,
        request: &BriefingRequest,
    ) -> FormattedResult {
        let url = request.source_url(self.extractor.base_origin());
        let run_date = self.run_date();

        match renderer.fetch(&url).await {
            Ok(markup) => {
                let page = RawPage::new(markup, url);
                if let Some(ref snapshots) = self.snapshots {
                    snapshots.write(&request.symbol(), &page.markup, run_date).await;
                }
                self.extractor
                    .extract_formatted(&page, &request.ticker, run_date)
            }
            Err(e) => {
                error!(ticker = %request.ticker, url = %url, error = %e, "Failed to fetch page");
                FormattedResult::error(&request.ticker, &e.to_string())
            }
        }
    }

    fn timeout_results(&self, requests: &[BriefingRequest]) -> Vec<FormattedResult> {
        requests
            .iter()
            .map(|request| {
                FormattedResult::timed_out(
                    &request.ticker,
                    &generic_manual_check_message(request, self.extractor.base_origin()),
                )
            })
            .collect()
    }

    async fn notify_batch_timeout(&self, requests: &[BriefingRequest]) {
        let Some(ref notifier) = self.notifier else {
            return;
        };
        let tickers: Vec<String> = requests.iter().map(|r| r.ticker.clone()).collect();
        let notice = batch_timeout_notice(self.aggregate_timeout.as_secs(), &tickers);
        if let Err(e) = notifier.send_text(&notice, ParseMode::Html).await {
            error!(error = %e, "Failed to send batch timeout notice");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_failed_covers_every_ticker() {
        let tickers = vec!["spy".to_string(), "QQQ".to_string()];
        let outcome = BatchOutcome::setup_failed(&tickers, "브라우저 실행 실패");
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results[0].as_str().starts_with("spy:\n오류 발생 - "));
        assert_eq!(outcome.stats.errors, 2);
    }

    #[test]
    fn test_batch_state_display() {
        assert_eq!(BatchState::BatchTimedOut.to_string(), "batch_timed_out");
    }
}
