//! 텍스트 정리 유틸리티.
//!
//! 렌더링된 마크업의 텍스트 노드는 공백 없이 이어 붙여지는 경우가 많아
//! 날짜 토큰 앞에 오염 문자가 붙거나 헤더와 본문이 붙어 나옵니다.

use scraper::ElementRef;

/// 요소의 모든 하위 텍스트 노드를 각각 trim한 뒤 구분자 없이 이어 붙입니다.
pub fn stripped_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// 요소의 모든 하위 텍스트를 그대로 이어 붙이고 양끝만 trim합니다.
pub fn full_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// 요소 자신의 직계 텍스트 노드만 이어 붙입니다.
pub fn own_text(element: &ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect()
}

/// 정확히 4자리 숫자로 된 연도 토큰(1900~2099)이 있는지 확인합니다.
pub fn contains_year(text: &str) -> bool {
    digit_runs(text).any(|(start, end)| is_year(&text[start..end]))
}

/// `YYYY년` 형태의 날짜 토큰 시작 위치(바이트)를 모두 반환합니다.
pub fn year_token_positions(text: &str) -> Vec<usize> {
    digit_runs(text)
        .filter(|&(start, end)| is_year(&text[start..end]) && text[end..].starts_with('년'))
        .map(|(start, _)| start)
        .collect()
}

/// 날짜 토큰 바로 앞에 붙은 오염 문자를 제거합니다.
pub fn strip_contamination(text: &str, marker: char) -> String {
    let positions = year_token_positions(text);
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        let next = idx + ch.len_utf8();
        if ch == marker && positions.contains(&next) {
            continue;
        }
        out.push(ch);
    }
    out
}

/// 폭 없는 문자를 지우고 NBSP를 공백으로 바꾸며, 오염 문자를 제거합니다.
pub fn strip_stray_chars(text: &str, marker: char) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{feff}'))
        .map(|c| if c == '\u{a0}' { ' ' } else { c })
        .collect();
    strip_contamination(&cleaned, marker)
}

fn is_year(run: &str) -> bool {
    run.len() == 4
        && run
            .parse::<u32>()
            .map(|y| (1900..=2099).contains(&y))
            .unwrap_or(false)
}

/// ASCII 숫자 연속 구간의 (시작, 끝) 바이트 위치.
fn digit_runs(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let bytes = text.as_bytes();
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < bytes.len() && !bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        Some((start, i))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_contains_year() {
        assert!(contains_year("2025년 03월 28일"));
        assert!(contains_year("기준일 2024"));
        assert!(!contains_year("12345"));
        assert!(!contains_year("123"));
        assert!(!contains_year("3.5%"));
    }

    #[test]
    fn test_year_token_positions() {
        let text = "본문C2025년 03월";
        let positions = year_token_positions(text);
        assert_eq!(positions.len(), 1);
        assert!(text[positions[0]..].starts_with("2025년"));
        assert!(year_token_positions("2025 년").is_empty());
    }

    #[test]
    fn test_strip_contamination() {
        assert_eq!(
            strip_contamination("C2025년 03월 28일", 'C'),
            "2025년 03월 28일"
        );
        assert_eq!(strip_contamination("CNBC 2025년", 'C'), "CNBC 2025년");
    }

    #[test]
    fn test_strip_stray_chars() {
        assert_eq!(strip_stray_chars("a\u{200b}b\u{a0}c", 'C'), "ab c");
    }

    #[test]
    fn test_stripped_and_own_text() {
        let html = Html::parse_fragment("<div> 앞 <span> 안쪽 </span> 뒤 </div>");
        let selector = Selector::parse("div").unwrap();
        let div = html.select(&selector).next().unwrap();

        assert_eq!(stripped_text(&div), "앞안쪽뒤");
        assert_eq!(full_text(&div), "앞  안쪽  뒤");
        assert_eq!(own_text(&div), " 앞  뒤 ");
    }
}
