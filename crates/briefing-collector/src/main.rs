//! 데일리 브리핑 수집기 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정된 티커 전체를 한 번 수집하고 전송
//! briefing run
//!
//! # 특정 티커만, 전송 없이
//! briefing run --tickers SPY,QQQ --no-deliver
//!
//! # 저장된 스냅샷을 오프라인으로 추출
//! briefing extract --file html_outputs/SPY_20250328.html --ticker SPY
//!
//! # 매일 09:00 실행 (RUN_MODE=single 이면 한 번만 실행)
//! briefing daemon
//! ```

use anyhow::{anyhow, Context};
use briefing_collector::{
    run_daily, BatchOrchestrator, BatchOutcome, BriefingDelivery, ChromiumRenderer,
    DailySchedule, PageRenderer,
};
use briefing_core::{init_logging, AppConfig, FormattedResult, LogConfig, RawPage};
use briefing_data::YahooSeriesProvider;
use briefing_extract::BriefingExtractor;
use briefing_notification::{ChatTransport, ParseMode, TelegramSender};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "briefing")]
#[command(about = "ETF 데일리 브리핑 수집기", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 설정 파일 경로
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// 로그 레벨 (trace, debug, info, warn, error). 미지정 시 설정 파일 값
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 채팅 전송 없이 결과만 출력
    #[arg(long, global = true)]
    no_deliver: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 배치를 한 번 실행
    Run {
        /// 대상 티커 (쉼표로 구분, 예: "SPY,QQQ"). 미지정 시 설정 파일 목록
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,
    },

    /// 데몬 모드: 즉시 한 번, 이후 매일 지정 시각에 실행
    Daemon,

    /// 저장된 스냅샷에서 브리핑 추출
    Extract {
        /// 스냅샷 HTML 파일
        #[arg(long)]
        file: PathBuf,

        /// 티커
        #[arg(long)]
        ticker: String,

        /// 기준 날짜 (YYYY-MM-DD, 기본값: 오늘)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// 텔레그램 봇 연결 확인 및 테스트 메시지 전송
    CheckTelegram,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config.display()))?;

    // 로깅 초기화
    let mut log_config = LogConfig::from_settings(&config.logging);
    if let Some(level) = cli.log_level.clone() {
        log_config.level = level;
    }
    init_logging(log_config).map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Daily Briefing Collector 시작");

    let deliver = !cli.no_deliver;
    let command = cli.command.unwrap_or_else(|| {
        if std::env::var("RUN_MODE").is_ok_and(|mode| mode.eq_ignore_ascii_case("single")) {
            Commands::Run {
                tickers: Vec::new(),
            }
        } else {
            Commands::Daemon
        }
    });

    match command {
        Commands::Run { tickers } => {
            let tickers = if tickers.is_empty() {
                config.tickers.clone()
            } else {
                tickers
            };
            run_batch(&config, &tickers, deliver).await?;
        }
        Commands::Daemon => {
            let schedule = DailySchedule::from_config(&config.schedule).ok_or_else(|| {
                anyhow!(
                    "잘못된 실행 시각: {:02}:{:02}",
                    config.schedule.hour,
                    config.schedule.minute
                )
            })?;
            let config = &config;
            run_daily(schedule, move || async move {
                if let Err(e) = run_batch(config, &config.tickers, deliver).await {
                    error!("배치 실행 실패: {:#}", e);
                }
            })
            .await;
        }
        Commands::Extract { file, ticker, date } => {
            let markup = std::fs::read_to_string(&file)
                .with_context(|| format!("스냅샷 읽기 실패: {}", file.display()))?;
            let extractor =
                BriefingExtractor::new(config.policy.clone(), config.source.base_origin.clone())?;
            let page = RawPage::new(markup, file.display().to_string());
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let result = extractor.extract_formatted(&page, &ticker, date);
            print_results(std::slice::from_ref(&result), date);
        }
        Commands::CheckTelegram => {
            check_telegram(&config).await?;
        }
    }

    info!("Daily Briefing Collector 종료");
    Ok(())
}

/// 배치 한 번: 수집 → 출력 → 전송.
async fn run_batch(
    config: &AppConfig,
    tickers: &[String],
    deliver: bool,
) -> anyhow::Result<BatchOutcome> {
    let today = Local::now().date_naive();
    let sender = if deliver {
        TelegramSender::from_settings(&config.telegram).map(Arc::new)
    } else {
        None
    };
    if deliver && sender.is_none() {
        warn!("텔레그램 설정이 없어 결과를 출력만 합니다");
    }

    let mut orchestrator = BatchOrchestrator::from_config(config)?.with_run_date(today);
    if let Some(ref sender) = sender {
        orchestrator = orchestrator.with_notifier(sender.clone());
    }

    info!(tickers = tickers.len(), "=== 데일리 브리핑 배치 시작 ===");
    let outcome = match ChromiumRenderer::launch(&config.browser).await {
        Ok(renderer) => orchestrator.run(renderer, tickers).await,
        Err(e) => {
            error!(error = %e, "Renderer setup failed");
            BatchOutcome::setup_failed(tickers, &e.to_string())
        }
    };
    outcome.stats.log_summary("데일리 브리핑");

    print_results(&outcome.results, today);

    if let Some(sender) = sender {
        deliver_results(config, sender, &outcome.results, today).await;
    }

    Ok(outcome)
}

/// 결과를 채팅으로 보냅니다. 실패는 로그만 남깁니다.
async fn deliver_results(
    config: &AppConfig,
    sender: Arc<TelegramSender>,
    results: &[FormattedResult],
    date: NaiveDate,
) {
    let mut delivery = BriefingDelivery::new(sender, config.delivery.clone());

    // 이미지 카드/차트용 래스터라이저는 배치 렌더러와 별도로 띄웁니다
    let rasterizer = match ChromiumRenderer::launch(&config.browser).await {
        Ok(renderer) => Some(Arc::new(renderer)),
        Err(e) => {
            warn!(error = %e, "Rasterizer unavailable, delivering text only");
            None
        }
    };
    if let Some(ref rasterizer) = rasterizer {
        delivery = delivery.with_rasterizer(rasterizer.clone());
    }

    if config.delivery.include_chart {
        match YahooSeriesProvider::new() {
            Ok(provider) => delivery = delivery.with_series_provider(Arc::new(provider)),
            Err(e) => warn!(error = %e, "Price series provider unavailable"),
        }
    }

    delivery.deliver_all(results, date).await;
    drop(delivery);

    if let Some(rasterizer) = rasterizer {
        if let Ok(mut renderer) = Arc::try_unwrap(rasterizer) {
            if let Err(e) = renderer.close().await {
                warn!(error = %e, "Failed to close rasterizer");
            }
        }
    }
}

/// 결과를 표준 출력으로 내보냅니다.
fn print_results(results: &[FormattedResult], date: NaiveDate) {
    let rule = "=".repeat(50);
    println!("\n{}", rule);
    println!("ETF DAILY BRIEFINGS - {}", date.format("%Y-%m-%d"));
    println!("{}\n", rule);

    for result in results {
        println!("{}", result);
        println!("{}", "-".repeat(50));
    }
}

/// 봇 상태 확인과 테스트 메시지 전송.
async fn check_telegram(config: &AppConfig) -> anyhow::Result<()> {
    let sender = TelegramSender::from_settings(&config.telegram).ok_or_else(|| {
        anyhow!("텔레그램 설정이 없습니다 (TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID)")
    })?;

    let identity = sender.get_me().await?;
    println!(
        "봇 연결 성공: {} (@{})",
        identity.first_name,
        identity.username.as_deref().unwrap_or("Unknown")
    );

    sender
        .send_text("ETF 데일리 브리핑 봇 테스트 메시지", ParseMode::Plain)
        .await?;
    sender
        .send_text(
            "📊 <b>ETF 데일리 브리핑</b>\n\nHTML 형식 테스트 메시지입니다.",
            ParseMode::Html,
        )
        .await?;
    println!("테스트 메시지 전송 완료");
    Ok(())
}
