//! 관련 뉴스 추출.

use briefing_core::NewsItem;
use scraper::ElementRef;
use tracing::debug;

use crate::selectors::CompiledSelectors;
use crate::text::stripped_text;

/// 관련 뉴스 추출기.
pub struct NewsExtractor<'a> {
    selectors: &'a CompiledSelectors,
    base_origin: &'a str,
}

impl<'a> NewsExtractor<'a> {
    pub fn new(selectors: &'a CompiledSelectors, base_origin: &'a str) -> Self {
        Self {
            selectors,
            base_origin,
        }
    }

    /// 제목과 출처가 모두 있는 뉴스만 반환합니다.
    pub fn extract(&self, blocks: &[ElementRef<'_>]) -> Vec<NewsItem> {
        blocks
            .iter()
            .filter_map(|block| self.extract_one(block))
            .collect()
    }

    fn extract_one(&self, block: &ElementRef<'_>) -> Option<NewsItem> {
        let article = block.select(&self.selectors.news).next()?;

        let title = article
            .select(&self.selectors.news_title)
            .next()
            .map(|el| stripped_text(&el))
            .filter(|t| !t.is_empty());
        let source = article
            .select(&self.selectors.news_source)
            .next()
            .map(|el| stripped_text(&el))
            .filter(|t| !t.is_empty());

        let (Some(title), Some(source)) = (title, source) else {
            debug!("News block without title or source skipped");
            return None;
        };

        let url = self
            .link_for(block, &article)
            .map(|href| resolve_link(href, self.base_origin));

        Some(NewsItem { title, source, url })
    }

    /// 기사 요소를 감싸는 링크(항목 블록까지), 없으면 내부 링크의 href.
    fn link_for<'b>(&self, block: &ElementRef<'b>, article: &ElementRef<'b>) -> Option<&'b str> {
        let enclosing = std::iter::once(*article)
            .chain(
                article
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .take_while(|el| el.id() != block.id()),
            )
            .chain(std::iter::once(*block))
            .find(|el| el.value().name() == "a" && el.value().attr("href").is_some());

        enclosing
            .or_else(|| article.select(&self.selectors.anchor).next())
            .and_then(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
    }
}

/// 상대 링크를 절대 URL로 바꿉니다.
pub fn resolve_link(href: &str, base_origin: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        let origin = base_origin.trim_end_matches('/');
        if href.starts_with('/') {
            format!("{}{}", origin, href)
        } else {
            format!("{}/{}", origin, href)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefing_core::MarkupSelectors;
    use scraper::Html;

    fn extract(html: &str) -> Vec<NewsItem> {
        let selectors = CompiledSelectors::new(&MarkupSelectors::default()).unwrap();
        let document = Html::parse_document(html);
        let blocks: Vec<_> = document.select(&selectors.item_block).collect();
        NewsExtractor::new(&selectors, "https://invest.zum.com").extract(&blocks)
    }

    #[test]
    fn test_enclosing_anchor_resolved() {
        let news = extract(
            r#"<div class="styles_container__oDEu1"><a href="/news/123">
                 <div class="styles_article__0oE8K">
                   <div class="styles_title__ummjn">반도체 업황 개선</div>
                   <span class="styles_info__OeSIl">연합뉴스</span>
                 </div></a></div>"#,
        );
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].title, "반도체 업황 개선");
        assert_eq!(news[0].source, "연합뉴스");
        assert_eq!(
            news[0].url.as_deref(),
            Some("https://invest.zum.com/news/123")
        );
    }

    #[test]
    fn test_nested_anchor_and_missing_link() {
        let news = extract(
            r#"<div class="styles_container__oDEu1">
                 <div class="styles_article__0oE8K">
                   <div class="styles_title__ummjn"><a href="https://example.com/a">제목</a></div>
                   <span class="styles_info__OeSIl">로이터</span>
                 </div></div>
               <div class="styles_container__oDEu1">
                 <div class="styles_article__0oE8K">
                   <div class="styles_title__ummjn">링크 없는 제목</div>
                   <span class="styles_info__OeSIl">블룸버그</span>
                 </div></div>
               <div class="styles_container__oDEu1">
                 <div class="styles_article__0oE8K">
                   <div class="styles_title__ummjn">출처 없는 제목</div>
                 </div></div>"#,
        );
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].url.as_deref(), Some("https://example.com/a"));
        assert!(news[1].url.is_none());
    }

    #[test]
    fn test_resolve_link() {
        let origin = "https://invest.zum.com/";
        assert_eq!(resolve_link("/a/b", origin), "https://invest.zum.com/a/b");
        assert_eq!(resolve_link("a/b", origin), "https://invest.zum.com/a/b");
        assert_eq!(resolve_link("//cdn.x/y", origin), "https://cdn.x/y");
        assert_eq!(resolve_link("https://x.y/z", origin), "https://x.y/z");
        assert_eq!(resolve_link("http://x.y/z", origin), "http://x.y/z");
        assert_eq!(
            resolve_link("httpdocs/a", origin),
            "https://invest.zum.com/httpdocs/a"
        );
    }
}
