//! 메시지 포맷.

use briefing_core::ChartAnalysis;
use chrono::NaiveDate;

/// 한 메시지의 최대 글자 수 (Bot API 한도 4096자보다 여유 있게).
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// 두 번째 조각부터 붙는 접두어.
pub const CONTINUATION_PREFIX: &str = "(계속) ";

/// 브리핑 메시지: 제목 + 이스케이프된 본문.
pub fn briefing_message(ticker: &str, body: &str, date: NaiveDate) -> String {
    format!(
        "{}\n\n{}",
        briefing_title(ticker, date),
        escape_html(body.trim())
    )
}

/// `📊 <b>{ticker} 데일리 브리핑</b> (YYYY년 MM월 DD일)`
pub fn briefing_title(ticker: &str, date: NaiveDate) -> String {
    format!(
        "📊 <b>{} 데일리 브리핑</b> ({})",
        escape_html(ticker),
        date.format("%Y년 %m월 %d일")
    )
}

/// 차트 분석 메시지.
pub fn chart_analysis_message(analysis: &ChartAnalysis) -> String {
    let mut message = format!(
        "📈 <b>{} 차트 분석</b>\n\n현재 가격: <b>${:.2}</b>\n",
        escape_html(&analysis.ticker),
        analysis.current_price
    );

    if let Some(ma200) = analysis.ma200 {
        message.push_str(&format!("200일 이동평균: <b>${:.2}</b>\n", ma200));
        if analysis.is_above_ma200 {
            message.push_str("✅ 현재 가격이 200일 이동평균선 <b>위</b>에 있습니다.\n");
        } else {
            message.push_str("⚠️ 현재 가격이 200일 이동평균선 <b>아래</b>에 있습니다.\n");
        }
    }

    if let Some(band) = analysis.ma200_plus10 {
        message.push_str(&format!("200일 이동평균 +10%: <b>${:.2}</b>\n", band));
        if analysis.is_above_ma200_plus10 {
            message.push_str("🔥 현재 가격이 200일 이동평균 +10% <b>위</b>에 있습니다.\n");
        } else {
            message.push_str("📉 현재 가격이 200일 이동평균 +10% <b>아래</b>에 있습니다.\n");
        }
    }

    message
}

/// 배치 시간 초과 알림.
pub fn batch_timeout_notice(timeout_secs: u64, tickers: &[String]) -> String {
    format!(
        "⏰ <b>데일리 브리핑 시간 초과</b>\n\n\
         배치 실행이 {}초 안에 끝나지 않았습니다.\n\
         대상: {}\n\
         각 티커 페이지를 수동으로 확인해주세요.",
        timeout_secs,
        escape_html(&tickers.join(", "))
    )
}

/// 차트 이미지 캡션.
pub fn chart_caption(ticker: &str) -> String {
    format!("{} 1년 주가 차트", ticker)
}

/// 브리핑 이미지 캡션.
pub fn briefing_caption(ticker: &str) -> String {
    format!("{} 데일리 브리핑", ticker)
}

/// HTML 특수문자 이스케이프.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// 태그를 지우고 엔티티를 되돌립니다 (일반 텍스트 재전송용).
pub fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// 글자 수 기준으로 메시지를 나눕니다.
///
/// 경계가 엔티티(`&amp;`)나 태그(`<b>`) 중간이면 그 시작 앞에서 자릅니다.
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= limit || limit == 0 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let mut end = (start + limit).min(chars.len());
        if end < chars.len() {
            if let Some(open) = open_markup_start(&chars[start..end]) {
                end = start + open;
            }
        }

        let chunk: String = chars[start..end].iter().collect();
        if chunks.is_empty() {
            chunks.push(chunk);
        } else {
            chunks.push(format!("{}{}", CONTINUATION_PREFIX, chunk));
        }
        start = end;
    }
    chunks
}

/// 구간 끝에 닫히지 않은 엔티티나 태그가 있으면 그 시작 위치 (0 제외).
fn open_markup_start(window: &[char]) -> Option<usize> {
    let idx = window
        .iter()
        .rposition(|c| matches!(c, '&' | '<' | ';' | '>'))?;
    match window[idx] {
        '&' | '<' if idx > 0 => Some(idx),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_briefing_message_title_and_escape() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 28).unwrap();
        let message = briefing_message("SPY", "S&P 500 <지수>", date);
        assert!(message.starts_with("📊 <b>SPY 데일리 브리핑</b> (2025년 03월 28일)\n\n"));
        assert!(message.ends_with("S&amp;P 500 &lt;지수&gt;"));
    }

    #[test]
    fn test_chart_analysis_message() {
        let analysis = ChartAnalysis {
            ticker: "QQQ".to_string(),
            current_price: dec!(480.5),
            ma50: Some(dec!(470)),
            ma200: Some(dec!(450)),
            ma200_plus10: Some(dec!(495)),
            is_above_ma200: true,
            is_above_ma200_plus10: false,
        };
        let message = chart_analysis_message(&analysis);
        assert!(message.contains("현재 가격: <b>$480.50</b>"));
        assert!(message.contains("200일 이동평균: <b>$450.00</b>"));
        assert!(message.contains("✅"));
        assert!(message.contains("📉"));
    }

    #[test]
    fn test_chart_analysis_without_averages() {
        let analysis = ChartAnalysis {
            ticker: "NEW".to_string(),
            current_price: dec!(10),
            ma50: None,
            ma200: None,
            ma200_plus10: None,
            is_above_ma200: false,
            is_above_ma200_plus10: false,
        };
        let message = chart_analysis_message(&analysis);
        assert!(!message.contains("200일"));
    }

    #[test]
    fn test_strip_tags_restores_entities() {
        assert_eq!(strip_tags("<b>S&amp;P</b> &lt;1&gt;"), "S&P <1>");
    }

    #[test]
    fn test_chunk_message() {
        assert_eq!(chunk_message("짧음", 10), vec!["짧음"]);

        let text = "가".repeat(25);
        let chunks = chunk_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 10);
        assert!(chunks[1].starts_with(CONTINUATION_PREFIX));
        assert_eq!(chunks[2], format!("{}{}", CONTINUATION_PREFIX, "가".repeat(5)));
    }

    #[test]
    fn test_chunk_boundary_keeps_entities_and_tags_whole() {
        let text = format!("{}&amp;tail", "a".repeat(3998));
        let chunks = chunk_message(&text, MAX_MESSAGE_CHARS);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(3998));
        assert_eq!(chunks[1], format!("{}&amp;tail", CONTINUATION_PREFIX));

        let chunks = chunk_message("abcdefg<b>굵게</b>", 9);
        assert_eq!(chunks[0], "abcdefg");
        assert!(chunks[1].starts_with(&format!("{}<b>", CONTINUATION_PREFIX)));
        assert_eq!(strip_tags(&chunks.concat()), format!("abcdefg{}굵게", CONTINUATION_PREFIX));

        // 닫힌 엔티티 뒤의 경계는 그대로
        let chunks = chunk_message("x&lt;yyyyyyy", 6);
        assert_eq!(chunks[0], "x&lt;y");
    }

    #[test]
    fn test_batch_timeout_notice() {
        let notice = batch_timeout_notice(120, &["SPY".to_string(), "QQQ".to_string()]);
        assert!(notice.contains("120초"));
        assert!(notice.contains("SPY, QQQ"));
    }
}
