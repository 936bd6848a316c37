//! 본문 영역 탐색.
//!
//! 여러 탐색 전략을 정해진 순서대로 시도하고, 처음 성공한 전략의 결과를 씁니다.
//!
//! 1. [`LocateStrategy::HeaderCard`]: 헤더 문구가 들어 있는 제목 요소에서
//!    바깥 카드 컨테이너를 찾아 문단 단위로 읽습니다 (주 경로).
//! 2. [`LocateStrategy::InnerClass`]: 알려진 본문 컨테이너 클래스를 찾습니다.
//! 3. [`LocateStrategy::TextHeuristic`]: 직계 텍스트에 연도 토큰이나 `%`가 있는
//!    첫 `div`를 찾습니다.
//!
//! 2, 3번은 대체 경로이며 텍스트 노드를 공백 없이 이어 붙인 결과를 반환합니다.

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::selectors::CompiledSelectors;
use crate::text::{contains_year, full_text, own_text, stripped_text};

/// 탐색 전략.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    HeaderCard,
    InnerClass,
    TextHeuristic,
}

impl LocateStrategy {
    /// 시도 순서.
    pub const ORDER: [LocateStrategy; 3] = [
        LocateStrategy::HeaderCard,
        LocateStrategy::InnerClass,
        LocateStrategy::TextHeuristic,
    ];

    /// 주 경로 여부. 대체 경로 결과만 재분절 대상입니다.
    pub fn is_primary(&self) -> bool {
        matches!(self, LocateStrategy::HeaderCard)
    }
}

impl std::fmt::Display for LocateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HeaderCard => write!(f, "header-card"),
            Self::InnerClass => write!(f, "inner-class"),
            Self::TextHeuristic => write!(f, "text-heuristic"),
        }
    }
}

/// 탐색 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedBriefing {
    pub strategy: LocateStrategy,
    /// 영역의 원시 텍스트
    pub raw_text: String,
    /// 주 경로에서 찾은 직계 문단 (비어 있을 수 있음)
    pub paragraphs: Vec<String>,
}

/// 본문 영역 탐색기.
pub struct BriefingLocator<'a> {
    selectors: &'a CompiledSelectors,
    header_phrase: &'a str,
}

impl<'a> BriefingLocator<'a> {
    pub fn new(selectors: &'a CompiledSelectors, header_phrase: &'a str) -> Self {
        Self {
            selectors,
            header_phrase,
        }
    }

    /// 전략을 순서대로 시도합니다. 모두 실패하면 `None`.
    pub fn locate(&self, document: &Html) -> Option<LocatedBriefing> {
        for strategy in LocateStrategy::ORDER {
            if let Some(found) = self.try_strategy(strategy, document) {
                debug!(%strategy, "Briefing section located");
                return Some(found);
            }
        }
        None
    }

    /// 단일 전략 시도.
    pub fn try_strategy(
        &self,
        strategy: LocateStrategy,
        document: &Html,
    ) -> Option<LocatedBriefing> {
        match strategy {
            LocateStrategy::HeaderCard => self.header_card(document),
            LocateStrategy::InnerClass => document
                .select(&self.selectors.briefing_inner)
                .next()
                .map(|el| fallback(strategy, &el)),
            LocateStrategy::TextHeuristic => document
                .select(&self.selectors.div)
                .find(|el| {
                    let own = own_text(el);
                    contains_year(&own) || own.contains('%')
                })
                .map(|el| fallback(strategy, &el)),
        }
    }

    fn header_card(&self, document: &Html) -> Option<LocatedBriefing> {
        let heading = document
            .select(&self.selectors.heading)
            .find(|h| full_text(h).contains(self.header_phrase))?;

        // 제목을 감싼 div의 바깥 div가 카드 컨테이너
        let mut divs = heading
            .ancestors()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "div");
        let inner = divs.next()?;
        let card = divs.next().unwrap_or(inner);

        let paragraphs = card
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "p")
            .map(|p| stripped_text(&p))
            .filter(|t| !t.is_empty())
            .collect();

        Some(LocatedBriefing {
            strategy: LocateStrategy::HeaderCard,
            raw_text: full_text(&card),
            paragraphs,
        })
    }
}

fn fallback(strategy: LocateStrategy, element: &ElementRef<'_>) -> LocatedBriefing {
    LocatedBriefing {
        strategy,
        raw_text: stripped_text(element),
        paragraphs: Vec::new(),
    }
}
