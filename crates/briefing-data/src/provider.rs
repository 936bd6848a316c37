//! 종가 시계열 제공자.

use async_trait::async_trait;
use briefing_core::PriceSeries;
use chrono::{DateTime, NaiveDate};
use tracing::{debug, info};
use yahoo_finance_api as yahoo;

use crate::error::{SeriesError, SeriesResult};
use crate::indicators::build_series;

/// 종가 시계열 제공자 trait.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// 기간(`"1y"`, `"6mo"` 등)의 일봉 종가와 이동평균을 조회합니다.
    async fn get_series(&self, ticker: &str, period: &str) -> SeriesResult<PriceSeries>;
}

/// Yahoo Finance 기반 제공자.
pub struct YahooSeriesProvider {
    connector: yahoo::YahooConnector,
}

impl YahooSeriesProvider {
    pub fn new() -> SeriesResult<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| SeriesError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector })
    }
}

#[async_trait]
impl PriceSeriesProvider for YahooSeriesProvider {
    async fn get_series(&self, ticker: &str, period: &str) -> SeriesResult<PriceSeries> {
        let symbol = ticker.trim().to_uppercase();
        info!(ticker, period, "Fetching price series");

        let response = self
            .connector
            .get_quote_range(&symbol, "1d", period)
            .await
            .map_err(|e| SeriesError::ApiError {
                symbol: symbol.clone(),
                message: e.to_string(),
            })?;

        let quotes = response
            .quotes()
            .map_err(|e| SeriesError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        let mut points: Vec<(NaiveDate, f64)> = quotes
            .iter()
            .filter(|q| q.close.is_finite() && q.close > 0.0)
            .filter_map(|q| {
                DateTime::from_timestamp(q.timestamp as i64, 0).map(|dt| (dt.date_naive(), q.close))
            })
            .collect();

        if points.is_empty() {
            return Err(SeriesError::NotAvailable(format!("심볼 {} 데이터 없음", ticker)));
        }

        points.sort_by_key(|(date, _)| *date);
        debug!(ticker, count = points.len(), "Quotes received");

        let (dates, closes) = points.into_iter().unzip();
        Ok(build_series(ticker, dates, closes))
    }
}
