//! 주가 차트 (SVG).
//!
//! 종가, 50일/200일 이동평균을 선으로 그린 SVG를 HTML에 담아 래스터라이저로 PNG를 얻습니다.

use briefing_core::PriceSeries;
use chrono::Datelike;

use crate::format::escape_html;
use crate::image::HtmlRasterizer;
use crate::types::{NotificationError, NotificationResult};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;

const PRICE_COLOR: &str = "#00BFFF";
const MA50_COLOR: &str = "#FFD700";
const MA200_COLOR: &str = "#FF4500";

/// 시계열을 SVG 문서로 그립니다. 종가가 두 개 미만이면 `None`.
pub fn chart_svg(series: &PriceSeries) -> Option<String> {
    let n = series.closes.len();
    if n < 2 {
        return None;
    }

    let values = series
        .closes
        .iter()
        .copied()
        .chain(series.ma50.iter().flatten().copied())
        .chain(series.ma200.iter().flatten().copied())
        .filter(|v| v.is_finite());
    let (min, max) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if max > min { max - min } else { 1.0 };
    let (min, max) = (min - span * 0.05, max + span * 0.05);

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let x = |i: usize| MARGIN_LEFT + plot_w * i as f64 / (n - 1) as f64;
    let y = |v: f64| MARGIN_TOP + plot_h * (1.0 - (v - min) / (max - min));

    let mut svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<rect width="100%" height="100%" fill="#111111"/>
<text x="{cx}" y="36" fill="#ffffff" font-size="22" text-anchor="middle">{title} 주가 차트 (1년)</text>
"##,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        title = escape_html(&series.ticker),
    );

    // 가로 눈금선과 가격 라벨
    for step in 0..=4 {
        let value = min + (max - min) * step as f64 / 4.0;
        let gy = y(value);
        svg.push_str(&format!(
            r##"<line x1="{x1}" y1="{gy:.1}" x2="{x2}" y2="{gy:.1}" stroke="#444444" stroke-width="1"/>
<text x="{tx}" y="{ty:.1}" fill="#cccccc" font-size="13" text-anchor="end">{value:.2}</text>
"##,
            x1 = MARGIN_LEFT,
            x2 = WIDTH - MARGIN_RIGHT,
            tx = MARGIN_LEFT - 8.0,
            ty = gy + 4.0,
        ));
    }

    // 월 경계 라벨
    let mut last_month = None;
    for (i, date) in series.dates.iter().enumerate().take(n) {
        let month = (date.year(), date.month());
        if last_month != Some(month) {
            if last_month.is_some() {
                svg.push_str(&format!(
                    r##"<text x="{:.1}" y="{:.1}" fill="#cccccc" font-size="12" text-anchor="middle">{}</text>
"##,
                    x(i),
                    HEIGHT - MARGIN_BOTTOM + 22.0,
                    date.format("%Y-%m")
                ));
            }
            last_month = Some(month);
        }
    }

    let price: Vec<Option<f64>> = series.closes.iter().map(|v| Some(*v)).collect();
    svg.push_str(&polyline(&price, PRICE_COLOR, 2.0, &x, &y));
    svg.push_str(&polyline(&series.ma50, MA50_COLOR, 1.5, &x, &y));
    svg.push_str(&polyline(&series.ma200, MA200_COLOR, 1.5, &x, &y));

    // 범례
    for (idx, (label, color)) in [
        ("가격", PRICE_COLOR),
        ("50일 이동평균", MA50_COLOR),
        ("200일 이동평균", MA200_COLOR),
    ]
    .iter()
    .enumerate()
    {
        let ly = MARGIN_TOP + 10.0 + idx as f64 * 22.0;
        svg.push_str(&format!(
            r##"<line x1="{x1}" y1="{ly}" x2="{x2}" y2="{ly}" stroke="{color}" stroke-width="3"/>
<text x="{tx}" y="{ty}" fill="#ffffff" font-size="13">{label}</text>
"##,
            x1 = MARGIN_LEFT + 12.0,
            x2 = MARGIN_LEFT + 40.0,
            tx = MARGIN_LEFT + 48.0,
            ty = ly + 4.0,
        ));
    }

    svg.push_str("</svg>");
    Some(svg)
}

/// 값이 있는 구간마다 하나의 polyline을 만듭니다.
fn polyline(
    values: &[Option<f64>],
    color: &str,
    width: f64,
    x: &dyn Fn(usize) -> f64,
    y: &dyn Fn(f64) -> f64,
) -> String {
    let mut out = String::new();
    let mut points: Vec<String> = Vec::new();
    let mut flush = |points: &mut Vec<String>| {
        if points.len() > 1 {
            out.push_str(&format!(
                r#"<polyline fill="none" stroke="{}" stroke-width="{}" points="{}"/>
"#,
                color,
                width,
                points.join(" ")
            ));
        }
        points.clear();
    };

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => points.push(format!("{:.1},{:.1}", x(i), y(*v))),
            _ => flush(&mut points),
        }
    }
    flush(&mut points);
    out
}

/// 차트 HTML 문서.
pub fn chart_html(series: &PriceSeries) -> Option<String> {
    chart_svg(series).map(|svg| {
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
             <style>body {{ margin: 0; background: #111111; }}</style></head>\
             <body>{}</body></html>",
            svg
        )
    })
}

/// 차트 PNG를 렌더링합니다.
pub async fn render_chart(
    rasterizer: &dyn HtmlRasterizer,
    series: &PriceSeries,
) -> NotificationResult<Vec<u8>> {
    let html = chart_html(series).ok_or_else(|| {
        NotificationError::RenderFailed(format!("{} 차트 데이터 부족", series.ticker))
    })?;
    rasterizer.rasterize(&html).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: Vec<f64>) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let n = closes.len();
        PriceSeries {
            ticker: "SPY".to_string(),
            dates: (0..n)
                .map(|i| start + chrono::Duration::days(i as i64 * 7))
                .collect(),
            ma50: vec![None; n],
            ma200: vec![None; n],
            ma200_plus10: vec![None; n],
            closes,
        }
    }

    #[test]
    fn test_chart_svg_draws_price_line() {
        let svg = chart_svg(&series(vec![10.0, 11.0, 12.5, 11.8, 13.0, 12.0])).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(PRICE_COLOR));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains("SPY 주가 차트"));
        assert!(svg.contains("2024-02"));
    }

    #[test]
    fn test_chart_svg_needs_two_points() {
        assert!(chart_svg(&series(vec![10.0])).is_none());
        assert!(chart_html(&series(Vec::new())).is_none());
    }

    #[test]
    fn test_polyline_splits_on_gaps() {
        let x = |i: usize| i as f64;
        let y = |v: f64| v;
        let line = polyline(
            &[Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)],
            "#fff",
            1.0,
            &x,
            &y,
        );
        assert_eq!(line.matches("<polyline").count(), 2);
    }
}
