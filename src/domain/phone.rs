//! Phone number shape matching.
//!
//! Used to categorise literal values supplied by callers; detection itself
//! is done by the model.

use super::{DetectionCategory, PatternMatcher};
use once_cell::sync::Lazy;
use regex::Regex;

/// North American phone number matcher.
///
/// Accepts the usual NANP renderings:
/// - (555) 234-5678
/// - 555-234-5678
/// - 555.234.5678
/// - +1 555 234 5678
#[derive(Debug, Clone)]
pub struct PhoneNumberMatcher;

impl PhoneNumberMatcher {
    pub fn new() -> Self {
        Self
    }

    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"(?:\+?\s*1[-.\s]?)?\(?\s*([2-9]\d{2})\s*\)?[-.\s]?\s*(\d{3})[-.\s]?\s*(\d{4})\b",
            )
            .expect("Valid phone number regex")
        });
        &PATTERN
    }

    /// Area code and exchange must both start with 2-9.
    pub fn validate(area: &str, exchange: &str, subscriber: &str) -> bool {
        area.len() == 3
            && exchange.len() == 3
            && subscriber.len() == 4
            && area
                .chars()
                .next()
                .is_some_and(|c| ('2'..='9').contains(&c))
            && exchange
                .chars()
                .next()
                .is_some_and(|c| ('2'..='9').contains(&c))
    }
}

impl Default for PhoneNumberMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMatcher for PhoneNumberMatcher {
    fn category(&self) -> DetectionCategory {
        DetectionCategory::Phones
    }

    fn pattern(&self) -> &Regex {
        Self::regex()
    }

    fn matches(&self, value: &str) -> bool {
        let value = value.trim();
        self.pattern().captures(value).is_some_and(|caps| {
            let whole = caps.get(0).is_some_and(|m| m.start() == 0 && m.end() == value.len());
            let (Some(area), Some(exchange), Some(subscriber)) = (caps.get(1), caps.get(2), caps.get(3))
            else {
                return false;
            };
            whole && Self::validate(area.as_str(), exchange.as_str(), subscriber.as_str())
        })
    }
}
