//! 브리핑 추출기.
//!
//! 렌더링된 마크업 한 장을 받아 [`BriefingRecord`]와 최종 텍스트를 만듭니다.
//! 동기 함수이며 네트워크나 브라우저에 의존하지 않습니다.

use briefing_core::{BriefingPolicy, BriefingRecord, BriefingStatus, FormattedResult, RawPage};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use crate::assembler::format_record;
use crate::error::ExtractResult;
use crate::grammar::{ConnectorGrammar, PriceFigures};
use crate::locator::{BriefingLocator, LocatedBriefing};
use crate::mention::MentionExtractor;
use crate::news::NewsExtractor;
use crate::normalizer::NarrativeNormalizer;
use crate::selectors::CompiledSelectors;
use crate::text::full_text;

/// 브리핑 추출기.
#[derive(Debug, Clone)]
pub struct BriefingExtractor {
    policy: BriefingPolicy,
    selectors: CompiledSelectors,
    base_origin: String,
}

impl BriefingExtractor {
    /// 정책 테이블의 셀렉터를 미리 파싱합니다.
    pub fn new(policy: BriefingPolicy, base_origin: impl Into<String>) -> ExtractResult<Self> {
        let selectors = CompiledSelectors::new(&policy.selectors)?;
        Ok(Self {
            policy,
            selectors,
            base_origin: base_origin.into(),
        })
    }

    pub fn policy(&self) -> &BriefingPolicy {
        &self.policy
    }

    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    /// 마크업에서 레코드를 추출합니다.
    ///
    /// 관련 종목과 뉴스는 대체 경로이거나 본문 영역을 찾지 못했을 때만 수집합니다.
    /// 본문 영역을 찾지 못해도 관련 종목이나 뉴스가 있으면 `Found`입니다.
    pub fn extract(&self, page: &RawPage, ticker: &str, run_date: NaiveDate) -> BriefingRecord {
        let document = Html::parse_document(&page.markup);

        let located = BriefingLocator::new(&self.selectors, &self.policy.text.header_phrase)
            .locate(&document);
        if located.is_none() {
            warn!(ticker, url = %page.url, "Briefing section not found");
        }

        // 헤더 카드 경로는 번호 붙은 문단만 씁니다
        let (mentions, news) = match located.as_ref() {
            Some(l) if l.strategy.is_primary() => (Vec::new(), Vec::new()),
            _ => {
                let blocks: Vec<ElementRef<'_>> =
                    document.select(&self.selectors.item_block).collect();
                (
                    MentionExtractor::new(&self.selectors, &self.policy.text)
                        .extract(&blocks, run_date),
                    NewsExtractor::new(&self.selectors, &self.base_origin).extract(&blocks),
                )
            }
        };

        let narrative = located
            .as_ref()
            .map(|l| {
                let figures = self.synthesis_figures(&document, l, ticker);
                NarrativeNormalizer::new(&self.policy).normalize(l, ticker, figures.as_ref())
            })
            .unwrap_or_default();

        let mut record = BriefingRecord {
            ticker: ticker.to_string(),
            narrative,
            mentions,
            news,
            status: BriefingStatus::NotFound,
        };
        if record.has_content() {
            record.status = BriefingStatus::Found;
            info!(
                ticker,
                mentions = record.mentions.len(),
                news = record.news.len(),
                "Briefing extracted"
            );
        } else {
            warn!(ticker, "No briefing content found");
        }
        record
    }

    /// 레코드를 최종 텍스트로 조립합니다.
    pub fn format(&self, record: &BriefingRecord) -> FormattedResult {
        format_record(record, &self.policy.text)
    }

    /// 추출과 조립을 한 번에 수행합니다.
    pub fn extract_formatted(
        &self,
        page: &RawPage,
        ticker: &str,
        run_date: NaiveDate,
    ) -> FormattedResult {
        self.format(&self.extract(page, ticker, run_date))
    }

    /// 합성 본문 대상 티커의 가격/등락률.
    ///
    /// 본문 텍스트에서 연결어 문법으로 먼저 찾고, 부족하면 가격/등락 표시 요소로 채웁니다.
    fn synthesis_figures(
        &self,
        document: &Html,
        located: &LocatedBriefing,
        ticker: &str,
    ) -> Option<PriceFigures> {
        self.policy.synthesized_narrative(ticker)?;

        let figures =
            ConnectorGrammar::new(&self.policy.text).parse(&located.raw_text, true);
        if figures.is_complete() {
            return Some(figures);
        }

        let price = document
            .select(&self.selectors.price)
            .next()
            .map(|el| full_text(&el));
        let change = document
            .select(&self.selectors.change)
            .next()
            .map(|el| full_text(&el));
        let figures = figures.or(PriceFigures::from_display(price.as_deref(), change.as_deref()));
        debug!(ticker, ?figures, "Synthesis figures collected");
        Some(figures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefing_core::DEFAULT_BASE_ORIGIN;

    fn extractor() -> BriefingExtractor {
        BriefingExtractor::new(BriefingPolicy::default(), DEFAULT_BASE_ORIGIN).unwrap()
    }

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 28).unwrap()
    }

    #[test]
    fn test_empty_page_not_found() {
        let page = RawPage::new("<html><body><nav>메뉴</nav></body></html>", "u");
        let result = extractor().extract_formatted(&page, "SPY", run_date());
        assert_eq!(result.as_str(), "SPY:\n브리핑 없음");
    }

    #[test]
    fn test_synthesized_figures_from_price_elements() {
        let page = RawPage::new(
            r#"<div class="styles_briefingInner__8_73I">데일리 브리핑</div>
               <span class="styles_price__a1">45.10</span>
               <span class="styles_change__b2">-1.20%</span>"#,
            "u",
        );
        let record = extractor().extract(&page, "BRKU", run_date());
        assert_eq!(record.status, BriefingStatus::Found);
        assert!(record.narrative.contains("1.20% 하락한 45.10 달러"));
        assert!(record.narrative.contains("2배로 추종하는 레버리지 ETF"));
    }
}
