//! 본문 정규화.
//!
//! 대체 경로로 얻은 본문은 텍스트 노드가 공백 없이 붙어 있어 다음 순서로 정리합니다.
//!
//! 1. 경계 토큰(오염 문자 + 날짜 토큰, 또는 문장 끝 바로 뒤의 날짜 접두 문구)
//!    이전까지만 남깁니다.
//! 2. 폭 없는 문자, NBSP, 오염 문자를 정리합니다.
//! 3. `". "` 기준으로 문장을 나누고 마침표를 되살려 줄 단위로 만듭니다.
//!
//! 이후 경로와 무관하게 빈 본문(헤더 문구만 남은 경우)을 대체하고,
//! 후처리 보정을 적용합니다.

use briefing_core::{BriefingPolicy, SynthesizedNarrative};
use tracing::debug;

use crate::grammar::PriceFigures;
use crate::locator::LocatedBriefing;
use crate::text::{strip_stray_chars, year_token_positions};

/// 본문 정규화기.
pub struct NarrativeNormalizer<'a> {
    policy: &'a BriefingPolicy,
}

impl<'a> NarrativeNormalizer<'a> {
    pub fn new(policy: &'a BriefingPolicy) -> Self {
        Self { policy }
    }

    /// 탐색 결과를 정리된 본문으로 바꿉니다.
    ///
    /// `figures`는 합성 본문 대상 티커에서만 쓰입니다.
    pub fn normalize(
        &self,
        located: &LocatedBriefing,
        ticker: &str,
        figures: Option<&PriceFigures>,
    ) -> String {
        let marker = self.policy.text.contamination_char;

        let text = if located.strategy.is_primary() {
            if located.paragraphs.is_empty() {
                strip_stray_chars(located.raw_text.trim(), marker)
            } else {
                located
                    .paragraphs
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("{}. {}", i + 1, strip_stray_chars(p, marker)))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        } else {
            let truncated = self.truncate_at_boundary(&located.raw_text);
            resegment(&strip_stray_chars(truncated, marker))
        };

        let text = if self.is_degenerate(&text) {
            debug!(ticker, "Degenerate narrative replaced");
            self.replacement(ticker, figures)
        } else {
            text
        };

        self.apply_fixups(&text, ticker)
    }

    /// 첫 경계 토큰 이전까지 자릅니다. 경계가 없으면 전체를 반환합니다.
    pub fn truncate_at_boundary<'t>(&self, text: &'t str) -> &'t str {
        let marker = self.policy.text.contamination_char;
        for pos in year_token_positions(text) {
            let head = &text[..pos];
            if head.ends_with(marker) {
                let cut = pos - marker.len_utf8();
                if cut > 0 {
                    return text[..cut].trim_end();
                }
            } else if head.ends_with('.')
                && starts_with_date_prefix(&text[pos..], &self.policy.text.date_prefix_marker)
            {
                return head.trim_end();
            }
        }
        text
    }

    /// 헤더 문구 한 줄만 남은 본문인지 확인합니다.
    pub fn is_degenerate(&self, text: &str) -> bool {
        let header = self.policy.text.header_phrase.as_str();
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        match lines.as_slice() {
            [only] => {
                let line = strip_numbering(only);
                line == header || line.strip_suffix('.') == Some(header)
            }
            _ => false,
        }
    }

    fn replacement(&self, ticker: &str, figures: Option<&PriceFigures>) -> String {
        match self.policy.synthesized_narrative(ticker) {
            Some(entry) => synthesize(ticker, entry, figures),
            None => format!("{} - {}", self.policy.text.header_phrase, ticker),
        }
    }

    /// 후처리 보정.
    pub fn apply_fixups(&self, text: &str, ticker: &str) -> String {
        let text = break_after_header(text, &self.policy.text.header_phrase);
        let text = separate_source_days(&text, &self.policy.text.source_labels);
        self.split_inline_news(&text, ticker)
    }

    /// 언론사 표기가 있으면 `"<TICKER>,"` 위치부터를 관련 뉴스 블록으로 분리합니다.
    fn split_inline_news(&self, text: &str, ticker: &str) -> String {
        let has_label = self
            .policy
            .text
            .source_labels
            .iter()
            .any(|label| text.contains(label.as_str()));
        if !has_label {
            return text.to_string();
        }

        let pattern = format!("{},", ticker);
        match text.match_indices(&pattern).find(|(i, _)| *i > 0) {
            Some((idx, _)) => format!(
                "{}\n\n{}:\n{}",
                text[..idx].trim_end(),
                self.policy.text.news_header,
                text[idx..].trim()
            ),
            None => text.to_string(),
        }
    }
}

/// `". "` 기준으로 문장을 나눠 한 줄에 하나씩 둡니다.
pub fn resegment(text: &str) -> String {
    text.split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.ends_with(['.', '!', '?']) {
                s.to_string()
            } else {
                format!("{}.", s)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 레버리지 ETF 설명 문장을 만듭니다.
fn synthesize(
    ticker: &str,
    entry: &SynthesizedNarrative,
    figures: Option<&PriceFigures>,
) -> String {
    let mut lines = Vec::new();
    let figures = figures.cloned().unwrap_or_default();

    match (&figures.price, &figures.change) {
        (Some(price), Some(change)) => {
            let (amount, verb) = match change.strip_prefix('+') {
                Some(rose) => (rose, "상승"),
                None => (change.as_str(), "하락"),
            };
            lines.push(format!(
                "{}는 전일 대비 {} {}한 {} 달러에 거래를 마쳤습니다.",
                ticker, amount, verb, price
            ));
        }
        (Some(price), None) => {
            lines.push(format!("{}의 현재 가격은 {} 달러입니다.", ticker, price));
        }
        _ => {}
    }

    lines.push(format!(
        "{}는 {}({})의 일일 수익률을 {}배로 추종하는 레버리지 ETF입니다.",
        ticker, entry.underlying_name, entry.underlying_symbol, entry.leverage
    ));
    lines.join("\n")
}

/// 헤더 문구 바로 뒤에 숫자가 붙어 있으면 줄바꿈을 넣습니다.
fn break_after_header(text: &str, header: &str) -> String {
    if header.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 4);
    let mut rest = text;
    while let Some(idx) = rest.find(header) {
        let end = idx + header.len();
        out.push_str(&rest[..end]);
        rest = &rest[end..];
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            out.push('\n');
        }
    }
    out.push_str(rest);
    out
}

/// 언론사 표기 바로 뒤에 붙은 날짜(1~31)를 띄웁니다.
fn separate_source_days(text: &str, labels: &[String]) -> String {
    let mut text = text.to_string();
    for label in labels {
        if !text.contains(label.as_str()) {
            continue;
        }
        for day in (1..=31).rev() {
            let glued = format!("{}{}", label, day);
            if text.contains(&glued) {
                text = text.replace(&glued, &format!("{} {}", label, day));
            }
        }
    }
    text
}

/// `YYYY년 M월 D일 <marker>` 형태로 시작하는지 확인합니다.
fn starts_with_date_prefix(text: &str, marker: &str) -> bool {
    let mut rest = text;
    for (min, max, unit) in [(4, 4, '년'), (1, 2, '월'), (1, 2, '일')] {
        rest = rest.trim_start();
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits < min || digits > max {
            return false;
        }
        rest = &rest[digits..];
        match rest.strip_prefix(unit) {
            Some(r) => rest = r,
            None => return false,
        }
    }
    rest.trim_start().starts_with(marker)
}

/// 줄 앞의 `"N. "` 번호를 뗍니다.
fn strip_numbering(line: &str) -> &str {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return rest.trim();
        }
    }
    line
}
