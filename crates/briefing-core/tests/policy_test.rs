//! 티커 정책 테이블 통합 테스트
//!
//! 수동 확인 문구가 항상 소스 URL을 포함하는지, 설정 파일로 예외 티커를
//! 추가할 수 있는지 검증합니다.

use briefing_core::{
    generic_manual_check_message, AppConfig, BriefingPolicy, SecurityKind, DEFAULT_BASE_ORIGIN,
};
use proptest::prelude::*;
use std::io::Write;
use std::time::Duration;

proptest! {
    #[test]
    fn manual_check_message_contains_source_url(ticker in "[A-Z]{1,5}") {
        let policy = BriefingPolicy::default();
        let request = policy.request(&ticker);
        let message = policy.manual_check_message(&request, DEFAULT_BASE_ORIGIN);
        let segment = match request.kind {
            SecurityKind::Etf => "etf",
            SecurityKind::Stock => "stock",
        };
        let expected = format!("{}/{}/{}/", DEFAULT_BASE_ORIGIN, segment, ticker);
        prop_assert!(message.contains(&expected), "{} not in {}", expected, message);
    }

    #[test]
    fn generic_message_is_parameterized_per_ticker(ticker in "[A-Z]{1,5}") {
        let policy = BriefingPolicy::default();
        let request = policy.request(&ticker);
        let message = generic_manual_check_message(&request, DEFAULT_BASE_ORIGIN);
        prop_assert!(message.ends_with(&request.source_url(DEFAULT_BASE_ORIGIN)));
    }
}

#[test]
fn test_override_added_from_config_file() {
    let dir = std::env::temp_dir().join(format!("briefing-policy-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("briefing.toml");

    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        r#"
tickers = ["tqqq", "spy"]

[batch]
request_delay_secs = 5

[policy.overrides.TQQQ]
timeout_secs = 15
manual_check_message = "TQQQ 수동 확인: https://invest.zum.com/etf/TQQQ/"
"#
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.tickers, vec!["TQQQ".to_string(), "SPY".to_string()]);
    assert_eq!(config.batch.request_delay(), Duration::from_secs(5));
    assert_eq!(
        config.policy.ticker_timeout("TQQQ"),
        Some(Duration::from_secs(15))
    );
    // 기본 예외 항목은 유지됩니다
    assert_eq!(
        config.policy.ticker_timeout("BRKU"),
        Some(Duration::from_secs(30))
    );

    std::fs::remove_dir_all(&dir).ok();
}
