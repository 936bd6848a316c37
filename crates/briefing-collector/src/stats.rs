//! 배치 통계 구조체.

use briefing_core::{BriefingStatus, FormattedResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 배치 실행 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// 총 티커 수
    pub total: usize,
    /// 브리핑 추출 성공
    pub found: usize,
    /// 브리핑 없음
    pub not_found: usize,
    /// 에러 (페이지 가져오기 실패 등)
    pub errors: usize,
    /// 시간 초과 (티커별 또는 배치 전체)
    pub timed_out: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl BatchStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 결과 목록에서 통계를 만듭니다.
    pub fn from_results(results: &[FormattedResult], elapsed: Duration) -> Self {
        let mut stats = Self::new();
        for result in results {
            stats.record(&result.status);
        }
        stats.elapsed = elapsed;
        stats
    }

    /// 결과 하나를 집계합니다.
    pub fn record(&mut self, status: &BriefingStatus) {
        self.total += 1;
        match status {
            BriefingStatus::Found => self.found += 1,
            BriefingStatus::NotFound => self.not_found += 1,
            BriefingStatus::Error(_) => self.errors += 1,
            BriefingStatus::TimedOut => self.timed_out += 1,
        }
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.found as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            found = self.found,
            not_found = self.not_found,
            errors = self.errors,
            timed_out = self.timed_out,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "배치 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_results() {
        let results = vec![
            FormattedResult::found("SPY", "본문"),
            FormattedResult::not_found("QQQ"),
            FormattedResult::error("VTI", "net::ERR"),
            FormattedResult::timed_out("BRKU", "수동 확인"),
        ];
        let stats = BatchStats::from_results(&results, Duration::from_secs(3));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.found, 1);
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.timed_out, 1);
        assert!((stats.success_rate() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_success_rate() {
        assert_eq!(BatchStats::new().success_rate(), 0.0);
    }
}
