//! 원시 마크업 스냅샷.
//!
//! 가져온 페이지를 `<dir>/<TICKER>_<YYYYMMDD>.html`로 저장합니다. 오프라인 점검용이며
//! 배치는 스냅샷을 다시 읽지 않습니다. 저장 실패는 로그만 남깁니다.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 스냅샷 저장기.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 티커와 날짜의 스냅샷 경로.
    pub fn path_for(&self, ticker: &str, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.html", ticker, date.format("%Y%m%d")))
    }

    /// 마크업을 저장합니다. 실패해도 에러를 돌려주지 않습니다.
    pub async fn write(&self, ticker: &str, markup: &str, date: NaiveDate) -> Option<PathBuf> {
        let path = self.path_for(ticker, date);
        let result = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, markup).await
        }
        .await;

        match result {
            Ok(()) => {
                debug!(ticker, path = %path.display(), "Snapshot saved");
                Some(path)
            }
            Err(e) => {
                warn!(ticker, path = %path.display(), error = %e, "Failed to save snapshot");
                None
            }
        }
    }
}
