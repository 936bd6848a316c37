//! 결과 본문 조립.

use briefing_core::{BriefingRecord, FormattedResult, Mention, NewsItem, TextPolicy};

/// 본문, 관련 종목, 관련 뉴스를 하나의 텍스트로 조립합니다.
///
/// 세 부분이 모두 비어 있으면 `None`.
pub fn assemble_body(
    narrative: &str,
    mentions: &[Mention],
    news: &[NewsItem],
    policy: &TextPolicy,
) -> Option<String> {
    let mut body = narrative.trim().to_string();

    if !mentions.is_empty() {
        body.push_str(&format!("\n\n{}:", policy.mentions_header));
        for (idx, mention) in mentions.iter().enumerate() {
            body.push_str(&format!("\n{}. {}", idx + 1, mention_line(mention)));
            if let Some(as_of) = &mention.as_of {
                body.push_str(&format!("\n   ({} 기준)", as_of));
            }
        }
    }

    if !news.is_empty() {
        body.push_str(&format!("\n\n{}:", policy.news_header));
        for (idx, item) in news.iter().enumerate() {
            body.push_str(&format!("\n{}. {} - {}", idx + 1, item.title, item.source));
            if let Some(url) = &item.url {
                body.push_str(&format!("\n   {}", url));
            }
        }
    }

    let body = body.trim_start().to_string();
    (!body.is_empty()).then_some(body)
}

/// `"<이름> (<심볼>) ($<가격>, <등락률>)"`.
fn mention_line(mention: &Mention) -> String {
    let name = match &mention.symbol {
        Some(symbol) => format!("{} ({})", mention.name, symbol),
        None => mention.name.clone(),
    };
    format!("{} (${}, {})", name, mention.price, mention.change)
}

/// 레코드를 티커별 최종 결과로 바꿉니다.
pub fn format_record(record: &BriefingRecord, policy: &TextPolicy) -> FormattedResult {
    match assemble_body(&record.narrative, &record.mentions, &record.news, policy) {
        Some(body) => FormattedResult::found(&record.ticker, &body),
        None => FormattedResult::not_found(&record.ticker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefing_core::BriefingStatus;

    fn mention() -> Mention {
        Mention {
            name: "오라클".to_string(),
            symbol: Some("ORCL".to_string()),
            price: "123.45".to_string(),
            change: "2.35%".to_string(),
            as_of: None,
        }
    }

    #[test]
    fn test_assemble_all_sections() {
        let policy = TextPolicy::default();
        let news = vec![NewsItem {
            title: "제목".to_string(),
            source: "연합뉴스".to_string(),
            url: Some("https://invest.zum.com/news/1".to_string()),
        }];
        let body = assemble_body("본문입니다.", &[mention()], &news, &policy).unwrap();
        assert_eq!(
            body,
            "본문입니다.\n\n주요 구성종목:\n1. 오라클 (ORCL) ($123.45, 2.35%)\
             \n\n관련 뉴스:\n1. 제목 - 연합뉴스\n   https://invest.zum.com/news/1"
        );
    }

    #[test]
    fn test_assemble_without_narrative() {
        let policy = TextPolicy::default();
        let body = assemble_body("  ", &[mention()], &[], &policy).unwrap();
        assert!(body.starts_with("주요 구성종목:"));
    }

    #[test]
    fn test_empty_record_is_not_found() {
        let policy = TextPolicy::default();
        let record = BriefingRecord::not_found("SPY");
        let result = format_record(&record, &policy);
        assert_eq!(result.as_str(), "SPY:\n브리핑 없음");
        assert_eq!(result.status, BriefingStatus::NotFound);
    }
}
