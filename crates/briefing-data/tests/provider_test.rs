//! Yahoo Finance 제공자 테스트 (네트워크 필요)

use briefing_data::{analyze, PriceSeriesProvider, SeriesError, YahooSeriesProvider};

#[tokio::test]
#[ignore = "requires network access to Yahoo Finance"]
async fn test_yahoo_one_year_series() {
    let provider = YahooSeriesProvider::new().unwrap();
    let series = provider.get_series("SPY", "1y").await.unwrap();

    assert!(series.closes.len() > 200);
    assert_eq!(series.closes.len(), series.dates.len());
    assert!(series.dates.windows(2).all(|w| w[0] < w[1]));

    let analysis = analyze(&series).unwrap();
    assert!(analysis.ma200.is_some());
}

#[tokio::test]
#[ignore = "requires network access to Yahoo Finance"]
async fn test_yahoo_unknown_symbol() {
    let provider = YahooSeriesProvider::new().unwrap();
    let result = provider.get_series("NOSUCHTICKER123", "1y").await;
    assert!(matches!(
        result,
        Err(SeriesError::ApiError { .. } | SeriesError::NotAvailable(_) | SeriesError::ParseError(_))
    ));
}
