//! 등락 연결어 문법.
//!
//! `<등락률> 하락하여 <가격> 달러에 ...` / `<등락률> 상승하여 <가격> 달러에 ...`
//! 형태의 문장 조각에서 등락률과 가격을 꺼냅니다. 하락은 부호 없이,
//! 상승은 `+`를 붙여 표기합니다.

use briefing_core::TextPolicy;

/// 문장 조각에서 꺼낸 가격/등락률.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceFigures {
    pub price: Option<String>,
    pub change: Option<String>,
}

impl PriceFigures {
    pub fn is_complete(&self) -> bool {
        self.price.is_some() && self.change.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.change.is_none()
    }

    /// 비어 있는 필드만 `other`로 채웁니다.
    pub fn or(self, other: PriceFigures) -> PriceFigures {
        PriceFigures {
            price: self.price.or(other.price),
            change: self.change.or(other.change),
        }
    }

    /// 등락 표시 요소의 원문(`-1.20%`, `+0.5%`)을 문법 표기로 바꿉니다.
    ///
    /// 부호가 없으면 상승으로 봅니다.
    pub fn from_display(price: Option<&str>, change: Option<&str>) -> PriceFigures {
        let price = price
            .map(|p| p.trim().trim_end_matches('$').trim_start_matches('$').trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let change = change
            .map(|c| c.split_whitespace().collect::<String>())
            .filter(|c| !c.is_empty())
            .map(|c| match c.strip_prefix('-') {
                Some(fell) => fell.to_string(),
                None if c.starts_with('+') => c,
                None => format!("+{}", c),
            });
        PriceFigures { price, change }
    }
}

/// 연결어 문법 파서.
pub struct ConnectorGrammar<'a> {
    policy: &'a TextPolicy,
}

impl<'a> ConnectorGrammar<'a> {
    pub fn new(policy: &'a TextPolicy) -> Self {
        Self { policy }
    }

    /// 조각을 해석합니다.
    ///
    /// `strip_particle`이 참이면 등락률 앞쪽의 "주식이"까지를 버립니다.
    pub fn parse(&self, segment: &str, strip_particle: bool) -> PriceFigures {
        let (left, right, sign) =
            if let Some((l, r)) = segment.split_once(self.policy.fell_connector.as_str()) {
                (l, r, "")
            } else if let Some((l, r)) = segment.split_once(self.policy.rose_connector.as_str()) {
                (l, r, "+")
            } else {
                return PriceFigures::default();
            };

        let mut left = left;
        if strip_particle {
            if let Some(idx) = left.rfind(self.policy.stock_particle.as_str()) {
                left = &left[idx + self.policy.stock_particle.len()..];
            }
        }

        let change: String = left.split_whitespace().collect();
        let change = (!change.is_empty()).then(|| format!("{}{}", sign, change));

        let price = right
            .split_once(self.policy.currency_token.as_str())
            .map(|(p, _)| p.trim().to_string())
            .filter(|p| !p.is_empty());

        PriceFigures { price, change }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(segment: &str, strip: bool) -> PriceFigures {
        let policy = TextPolicy::default();
        ConnectorGrammar::new(&policy).parse(segment, strip)
    }

    #[test]
    fn test_fell_is_unsigned() {
        let figures = parse(" 2.35% 하락하여 123.45 달러에 마감했습니다.", false);
        assert_eq!(figures.change.as_deref(), Some("2.35%"));
        assert_eq!(figures.price.as_deref(), Some("123.45"));
    }

    #[test]
    fn test_rose_is_plus_prefixed() {
        let figures = parse(" 1.1% 상승하여 98.10 달러에 거래를 마쳤습니다.", false);
        assert_eq!(figures.change.as_deref(), Some("+1.1%"));
        assert_eq!(figures.price.as_deref(), Some("98.10"));
    }

    #[test]
    fn test_missing_currency_token() {
        let figures = parse(" 1.1% 상승하여 98.10에 마감", false);
        assert_eq!(figures.change.as_deref(), Some("+1.1%"));
        assert!(figures.price.is_none());
        assert!(!figures.is_complete());
    }

    #[test]
    fn test_no_connector() {
        assert!(parse("보합으로 마감했습니다.", false).is_empty());
    }

    #[test]
    fn test_strip_particle() {
        let figures = parse("오라클 주식이 3.2% 하락하여 150.00 달러에 마감", true);
        assert_eq!(figures.change.as_deref(), Some("3.2%"));
        assert_eq!(figures.price.as_deref(), Some("150.00"));
    }

    #[test]
    fn test_from_display() {
        let figures = PriceFigures::from_display(Some(" 45.10 "), Some("-1.20%"));
        assert_eq!(figures.price.as_deref(), Some("45.10"));
        assert_eq!(figures.change.as_deref(), Some("1.20%"));

        let figures = PriceFigures::from_display(None, Some("0.5%"));
        assert_eq!(figures.change.as_deref(), Some("+0.5%"));
    }
}
