//! 이동평균 계산.

use briefing_core::{ChartAnalysis, PriceSeries};
use rust_decimal::Decimal;

use crate::error::{SeriesError, SeriesResult};

/// 단기 이동평균 기간.
pub const SHORT_WINDOW: usize = 50;
/// 장기 이동평균 기간.
pub const LONG_WINDOW: usize = 200;
/// 장기 이동평균 상단 밴드 배수.
pub const UPPER_BAND_RATIO: f64 = 1.1;

/// 단순 이동평균. 윈도우가 채워지기 전 구간은 `None`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            result.push(Some(sum / window as f64));
        } else {
            result.push(None);
        }
    }
    result
}

/// 종가 시계열에서 이동평균이 포함된 [`PriceSeries`]를 만듭니다.
pub fn build_series(
    ticker: &str,
    dates: Vec<chrono::NaiveDate>,
    closes: Vec<f64>,
) -> PriceSeries {
    let ma50 = moving_average(&closes, SHORT_WINDOW);
    let ma200 = moving_average(&closes, LONG_WINDOW);
    let ma200_plus10 = ma200
        .iter()
        .map(|v| v.map(|ma| ma * UPPER_BAND_RATIO))
        .collect();

    PriceSeries {
        ticker: ticker.to_string(),
        dates,
        closes,
        ma50,
        ma200,
        ma200_plus10,
    }
}

/// 마지막 시점 기준 차트 요약.
///
/// 이동평균이 없으면 해당 비교는 `false`입니다.
pub fn analyze(series: &PriceSeries) -> SeriesResult<ChartAnalysis> {
    let current = *series
        .closes
        .last()
        .ok_or_else(|| SeriesError::NotAvailable(format!("심볼 {} 종가 없음", series.ticker)))?;

    let last = |values: &[Option<f64>]| values.last().copied().flatten();
    let ma50 = last(&series.ma50);
    let ma200 = last(&series.ma200);
    let ma200_plus10 = last(&series.ma200_plus10);

    Ok(ChartAnalysis {
        ticker: series.ticker.clone(),
        current_price: to_decimal(current)?,
        ma50: ma50.and_then(|v| to_decimal(v).ok()),
        ma200: ma200.and_then(|v| to_decimal(v).ok()),
        ma200_plus10: ma200_plus10.and_then(|v| to_decimal(v).ok()),
        is_above_ma200: ma200.is_some_and(|ma| current > ma),
        is_above_ma200_plus10: ma200_plus10.is_some_and(|ma| current > ma),
    })
}

fn to_decimal(value: f64) -> SeriesResult<Decimal> {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| SeriesError::ParseError(format!("가격 변환 실패: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn series(closes: Vec<f64>) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..closes.len())
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        build_series("SPY", dates, closes)
    }

    #[test]
    fn test_moving_average_window() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(ma, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
        assert_eq!(moving_average(&[1.0], 0), vec![None]);
    }

    #[test]
    fn test_analyze_above_long_average() {
        let mut closes = vec![100.0; 199];
        closes.push(150.0);
        let analysis = analyze(&series(closes)).unwrap();

        assert_eq!(analysis.current_price, dec!(150));
        assert_eq!(analysis.ma200, Some(dec!(100.25)));
        assert!(analysis.is_above_ma200);
        assert!(analysis.is_above_ma200_plus10);
        assert_eq!(analysis.ma50, Some(dec!(101)));
    }

    #[test]
    fn test_analyze_short_series() {
        let analysis = analyze(&series(vec![10.0; 30])).unwrap();
        assert!(analysis.ma50.is_none());
        assert!(analysis.ma200.is_none());
        assert!(!analysis.is_above_ma200);
        assert!(!analysis.is_above_ma200_plus10);
    }

    #[test]
    fn test_analyze_empty_series() {
        assert!(matches!(
            analyze(&series(Vec::new())),
            Err(SeriesError::NotAvailable(_))
        ));
    }
}
