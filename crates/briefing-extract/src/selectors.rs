//! 정책 테이블의 셀렉터 문자열을 미리 파싱해 둡니다.

use briefing_core::MarkupSelectors;
use scraper::Selector;

use crate::error::{ExtractError, ExtractResult};

/// 파싱된 셀렉터 묶음.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub heading: Selector,
    pub div: Selector,
    pub paragraph: Selector,
    pub anchor: Selector,
    pub briefing_inner: Selector,
    pub item_block: Selector,
    pub item_briefing: Selector,
    pub item_info: Selector,
    pub item_symbol: Selector,
    pub news: Selector,
    pub news_title: Selector,
    pub news_source: Selector,
    pub price: Selector,
    pub change: Selector,
}

impl CompiledSelectors {
    pub fn new(selectors: &MarkupSelectors) -> ExtractResult<Self> {
        Ok(Self {
            heading: parse(&selectors.heading)?,
            div: parse("div")?,
            paragraph: parse("p")?,
            anchor: parse("a[href]")?,
            briefing_inner: parse(&selectors.briefing_inner)?,
            item_block: parse(&selectors.item_block)?,
            item_briefing: parse(&selectors.item_briefing)?,
            item_info: parse(&selectors.item_info)?,
            item_symbol: parse(&selectors.item_symbol)?,
            news: parse(&selectors.news)?,
            news_title: parse(&selectors.news_title)?,
            news_source: parse(&selectors.news_source)?,
            price: parse(&selectors.price)?,
            change: parse(&selectors.change)?,
        })
    }
}

fn parse(selector: &str) -> ExtractResult<Selector> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
