//! 관련 종목 언급 추출.
//!
//! 항목 블록의 브리핑 문장은 `"2025년 03월 28일 <종목명>, 2.35% 하락하여
//! 123.45 달러에 ... <종목명> 주식이 ..."` 꼴입니다. 쉼표 앞 텍스트에서 날짜
//! 세 단어를 건너뛴 나머지가 종목명이고, 첫 쉼표 뒤 조각을 연결어 문법으로 해석합니다.

use briefing_core::{Mention, TextPolicy};
use chrono::NaiveDate;
use scraper::ElementRef;
use tracing::debug;

use crate::grammar::{ConnectorGrammar, PriceFigures};
use crate::selectors::CompiledSelectors;
use crate::text::{full_text, strip_contamination, stripped_text};

/// 종목명 앞의 날짜 단어 수.
const NAME_SKIP_TOKENS: usize = 3;

/// 관련 종목 추출기.
pub struct MentionExtractor<'a> {
    selectors: &'a CompiledSelectors,
    policy: &'a TextPolicy,
}

impl<'a> MentionExtractor<'a> {
    pub fn new(selectors: &'a CompiledSelectors, policy: &'a TextPolicy) -> Self {
        Self { selectors, policy }
    }

    /// 모든 항목 블록에서 언급을 추출합니다. 조건을 만족하지 못한 블록은 건너뜁니다.
    pub fn extract(&self, blocks: &[ElementRef<'_>], run_date: NaiveDate) -> Vec<Mention> {
        let as_of = run_date.format("%Y년 %m월 %d일").to_string();
        blocks
            .iter()
            .enumerate()
            .filter_map(|(idx, block)| {
                let mention = self.extract_one(block, &as_of);
                if mention.is_none() {
                    debug!(block = idx, "Item block skipped for mentions");
                }
                mention
            })
            .collect()
    }

    fn extract_one(&self, block: &ElementRef<'_>, as_of: &str) -> Option<Mention> {
        let briefing = block.select(&self.selectors.item_briefing).next()?;
        let content = stripped_text(&briefing);

        if !content.contains(',') || !content.contains(self.policy.stock_gate.as_str()) {
            return None;
        }

        let mut parts = content.split(',');
        let head = parts.next().unwrap_or_default();
        let segment = parts.next().unwrap_or_default();

        let name = head
            .split_whitespace()
            .skip(NAME_SKIP_TOKENS)
            .collect::<Vec<_>>()
            .join(" ");
        let name = strip_contamination(&name, self.policy.contamination_char)
            .trim()
            .to_string();
        if name.is_empty() {
            return None;
        }

        let grammar = ConnectorGrammar::new(self.policy);
        let mut figures = grammar.parse(segment, false);
        if !figures.is_complete() {
            if let Some(info) = block.select(&self.selectors.item_info).next() {
                let retry = grammar.parse(&full_text(&info), true);
                figures = if retry.is_complete() {
                    retry
                } else {
                    figures.or(retry)
                };
            }
        }

        let PriceFigures {
            price: Some(price),
            change: Some(change),
        } = figures
        else {
            return None;
        };

        let symbol = block
            .select(&self.selectors.item_symbol)
            .next()
            .and_then(|el| bracketed_symbol(&full_text(&el)));

        Some(Mention {
            name,
            symbol,
            price,
            change,
            as_of: Some(strip_contamination(as_of, self.policy.contamination_char)),
        })
    }
}

/// `"(AAPL)"`, `"[BRK.B]"`, `"AAPL"` 형태에서 대문자 심볼을 꺼냅니다.
fn bracketed_symbol(text: &str) -> Option<String> {
    let inner = text
        .trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']'])
        .trim();
    let valid = !inner.is_empty()
        && inner.chars().any(|c| c.is_ascii_uppercase())
        && inner
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');
    valid.then(|| inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefing_core::MarkupSelectors;
    use scraper::Html;

    fn extract(html: &str) -> Vec<Mention> {
        let selectors = CompiledSelectors::new(&MarkupSelectors::default()).unwrap();
        let policy = TextPolicy::default();
        let document = Html::parse_document(html);
        let blocks: Vec<_> = document.select(&selectors.item_block).collect();
        MentionExtractor::new(&selectors, &policy)
            .extract(&blocks, NaiveDate::from_ymd_opt(2025, 3, 28).unwrap())
    }

    #[test]
    fn test_mention_from_briefing_sentence() {
        let mentions = extract(
            r#"<div class="styles_container__oDEu1">
                 <div class="styles_briefing__t15bx">2025년 03월 28일 오라클, 2.35% 하락하여 123.45 달러에 마감했습니다. 거래량이 많은 오라클 주식이 주목받았습니다</div>
                 <span class="styles_symbol__x1">(ORCL)</span>
               </div>"#,
        );
        assert_eq!(mentions.len(), 1);
        let mention = &mentions[0];
        assert_eq!(mention.name, "오라클");
        assert_eq!(mention.symbol.as_deref(), Some("ORCL"));
        assert_eq!(mention.change, "2.35%");
        assert_eq!(mention.price, "123.45");
        assert_eq!(mention.as_of.as_deref(), Some("2025년 03월 28일"));
    }

    #[test]
    fn test_secondary_attempt_on_info() {
        let mentions = extract(
            r#"<div class="styles_container__oDEu1">
                 <div class="styles_briefing__t15bx">오늘 주목할 종목 애플, 애플 주식이 변동했습니다</div>
                 <div class="styles_stockInfo__ttpG6">애플 주식이 1.5% 상승하여 210.00 달러에 마감</div>
               </div>"#,
        );
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].change, "+1.5%");
        assert_eq!(mentions[0].price, "210.00");
        assert!(mentions[0].symbol.is_none());
    }

    #[test]
    fn test_blocks_without_gate_are_skipped() {
        let mentions = extract(
            r#"<div class="styles_container__oDEu1">
                 <div class="styles_briefing__t15bx">쉼표 없는 문장 주식이 1% 하락하여 1 달러에</div>
               </div>
               <div class="styles_container__oDEu1">
                 <div class="styles_briefing__t15bx">가 나 다 라, 조사 없는 문장 1% 하락하여 1 달러에</div>
               </div>
               <div class="styles_container__oDEu1">
                 <div class="styles_briefing__t15bx">가 나 다 라, 라 주식이 1% 하락하여 가격 없음</div>
               </div>
               <div class="styles_container__oDEu1">
                 <div class="styles_briefing__t15bx">2025년 03월 28일 오라클, 2.35% 하락하여 123.45 달러에 마감했습니다. 오라클 주식이다</div>
               </div>"#,
        );
        assert!(mentions.is_empty());
    }

    #[test]
    fn test_bracketed_symbol() {
        assert_eq!(bracketed_symbol("(AAPL)").as_deref(), Some("AAPL"));
        assert_eq!(bracketed_symbol("[BRK.B]").as_deref(), Some("BRK.B"));
        assert!(bracketed_symbol("애플").is_none());
        assert!(bracketed_symbol("()").is_none());
    }
}
