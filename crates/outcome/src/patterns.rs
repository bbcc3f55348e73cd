//! Deterministic price-mention scan used as the extraction fallback.
//!
//! Conversations re-quote prices as the haggling goes back and forth, so
//! the LAST mention in transcript order wins, regardless of which
//! pattern matched it.

use once_cell::sync::Lazy;
use regex::Regex;

pub struct PricePattern {
    pub regex: Regex,
    pub description: &'static str,
}

/// Ordered table of price phrasings. Group 1 of every pattern captures
/// the numeric amount.
pub static PRICE_PATTERNS: Lazy<Vec<PricePattern>> = Lazy::new(|| {
    vec![
        PricePattern {
            regex: Regex::new(r"\$\s*(\d+(?:\.\d{1,2})?)").expect("currency pattern"),
            description: "currency-prefixed amount",
        },
        PricePattern {
            regex: Regex::new(r"(?i)\b(\d+(?:\.\d{1,2})?)\s*(?:dollars|bucks)\b")
                .expect("spoken-dollars pattern"),
            description: "spoken dollar amount",
        },
        PricePattern {
            regex: Regex::new(r"(?i)\bagreed?\s+(?:on|at|to|for)\s+\$?(\d+(?:\.\d{1,2})?)")
                .expect("agreement pattern"),
            description: "agreement phrasing",
        },
        PricePattern {
            regex: Regex::new(
                r"(?i)\b\$?(\d+(?:\.\d{1,2})?)\s+for\s+the\s+(?:job|work|whole\s+thing)\b",
            )
            .expect("quote pattern"),
            description: "quote phrasing",
        },
    ]
});

/// Scan `text` with every pattern and return the amount of the mention
/// that appears last, or `None` when nothing matches.
pub fn last_price_mention(text: &str) -> Option<f64> {
    let mut best: Option<(usize, f64)> = None;
    for pattern in PRICE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(group) = caps.get(1) else { continue };
            let Ok(value) = group.as_str().parse::<f64>() else {
                continue;
            };
            if best.map_or(true, |(start, _)| group.start() >= start) {
                best = Some((group.start(), value));
            }
        }
    }
    best.map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_quote_is_found() {
        let text = "technician: I can do it for $150\ncaller: deal";
        assert_eq!(last_price_mention(text), Some(150.0));
    }

    #[test]
    fn last_mention_wins_across_requotes() {
        let text = "technician: it'll be $200\ncaller: too high\ntechnician: fine, $175, final offer";
        assert_eq!(last_price_mention(text), Some(175.0));
    }

    #[test]
    fn last_mention_wins_across_different_patterns() {
        let text = "caller: your ad said $300\ntechnician: we agreed on 250";
        assert_eq!(last_price_mention(text), Some(250.0));
    }

    #[test]
    fn spoken_dollars_match() {
        assert_eq!(last_price_mention("call it 90 bucks"), Some(90.0));
        assert_eq!(last_price_mention("that's 120 dollars even"), Some(120.0));
    }

    #[test]
    fn cents_are_parsed() {
        assert_eq!(last_price_mention("invoice comes to $149.99"), Some(149.99));
    }

    #[test]
    fn no_mention_yields_none() {
        assert_eq!(last_price_mention(""), None);
        assert_eq!(last_price_mention("caller: thanks, goodbye"), None);
    }
}
