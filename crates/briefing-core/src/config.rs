//! 설정 관리.
//!
//! 기본값 → TOML 파일(선택) → `BRIEFING__` 접두 환경 변수 순으로 병합합니다.
//! 티커 정책 테이블도 설정의 일부이므로 파일에서 예외 티커를 추가할 수 있습니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::policy::{BriefingPolicy, DEFAULT_BASE_ORIGIN};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 수집 대상 티커
    pub tickers: Vec<String>,
    /// 소스 사이트 설정
    pub source: SourceConfig,
    /// 일일 실행 시각
    pub schedule: ScheduleConfig,
    /// 배치 실행 설정
    pub batch: BatchConfig,
    /// 헤드리스 브라우저 설정
    pub browser: BrowserConfig,
    /// 원시 마크업 스냅샷 설정
    pub snapshot: SnapshotConfig,
    /// 텔레그램 설정
    pub telegram: TelegramSettings,
    /// 전송 방식 설정
    pub delivery: DeliveryConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 티커 정책 테이블
    pub policy: BriefingPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: ["IYY", "SPY", "QQQ", "VTI", "VOO", "IGV", "SOXL", "BRKU"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            source: SourceConfig::default(),
            schedule: ScheduleConfig::default(),
            batch: BatchConfig::default(),
            browser: BrowserConfig::default(),
            snapshot: SnapshotConfig::default(),
            telegram: TelegramSettings::default(),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::default(),
            policy: BriefingPolicy::default(),
        }
    }
}

/// 소스 사이트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 상대 링크 해석 및 페이지 URL 구성에 쓰이는 origin
    pub base_origin: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_origin: DEFAULT_BASE_ORIGIN.to_string(),
        }
    }
}

/// 일일 실행 시각 (로컬 시간).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { hour: 9, minute: 0 }
    }
}

/// 배치 실행 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 티커 간 요청 딜레이 (초)
    pub request_delay_secs: u64,
    /// 배치 전체 시간 예산 (초)
    pub aggregate_timeout_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: 2,
            aggregate_timeout_secs: 120,
        }
    }
}

impl BatchConfig {
    /// 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    /// 배치 시간 예산을 Duration으로 반환
    pub fn aggregate_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregate_timeout_secs)
    }
}

/// 헤드리스 브라우저 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// 페이지 준비 대기 시간 (초)
    pub ready_wait_secs: u64,
    pub user_agent: String,
    /// 브라우저 언어
    pub language: String,
    /// Chrome 실행 파일 경로 (미지정 시 자동 탐색)
    pub chrome_executable: Option<String>,
    /// 스크린샷 창 크기
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            ready_wait_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36"
                .to_string(),
            language: "ko-KR".to_string(),
            chrome_executable: None,
            window_width: 900,
            window_height: 1200,
        }
    }
}

impl BrowserConfig {
    pub fn ready_wait(&self) -> Duration {
        Duration::from_secs(self.ready_wait_secs)
    }
}

/// 원시 마크업 스냅샷 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub enabled: bool,
    pub dir: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "html_outputs".to_string(),
        }
    }
}

/// 텔레그램 설정.
///
/// `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID` 환경 변수도 인식합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub enabled: bool,
    /// 봇 토큰 (직렬화하지 않음)
    #[serde(skip_serializing)]
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: None,
            chat_id: None,
        }
    }
}

/// 전송 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// HTML 텍스트 메시지
    Text,
    /// 이미지 카드 + 링크 메시지
    #[default]
    Image,
}

/// 전송 방식 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub mode: DeliveryMode,
    /// 차트 분석 동봉 여부
    pub include_chart: bool,
    /// 차트 기간 (Yahoo range 표기)
    pub chart_period: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::Image,
            include_chart: true,
            chart_period: "1y".to_string(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            // 기본값으로 시작
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("BRIEFING")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("tickers")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_telegram_env();
        config.normalize_tickers();
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    fn apply_telegram_env(&mut self) {
        if self.telegram.bot_token.is_none() {
            self.telegram.bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok();
        }
        if self.telegram.chat_id.is_none() {
            self.telegram.chat_id = std::env::var("TELEGRAM_CHAT_ID").ok();
        }
    }

    fn normalize_tickers(&mut self) {
        self.tickers = self
            .tickers
            .iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
    }
}
