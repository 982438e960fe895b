//! Email address shape matching.

use super::{DetectionCategory, PatternMatcher};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Default)]
pub struct EmailMatcher;

impl EmailMatcher {
    pub fn new() -> Self {
        Self
    }

    fn regex() -> &'static Regex {
        static PATTERN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
                .expect("Valid email regex")
        });
        &PATTERN
    }
}

impl PatternMatcher for EmailMatcher {
    fn category(&self) -> DetectionCategory {
        DetectionCategory::Emails
    }

    fn pattern(&self) -> &Regex {
        Self::regex()
    }
}
