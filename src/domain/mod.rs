//! Domain types and the deterministic parts of the pipeline.
//!
//! Everything here is pure: categories, the values passed between stages,
//! masking, deduplication and the shape matchers used to categorise
//! caller-supplied literals.

pub mod category;
pub mod email;
pub mod item;
pub mod mask;
pub mod phone;
pub mod processor;

pub use category::DetectionCategory;
pub use email::EmailMatcher;
pub use item::{fold_key, PageText, RawDetection, SensitiveItem};
pub use mask::mask;
pub use phone::PhoneNumberMatcher;
pub use processor::deduplicate;

use regex::Regex;

/// Recognises values of one category by their shape.
pub trait PatternMatcher: Send + Sync {
    /// Category assigned to matching values.
    fn category(&self) -> DetectionCategory;

    fn pattern(&self) -> &Regex;

    /// Whether the whole (trimmed) value has this shape.
    fn matches(&self, value: &str) -> bool {
        self.pattern().is_match(value.trim())
    }
}

/// Picks a category for a literal supplied by a caller.
///
/// Falls back to [`DetectionCategory::OtherPii`] when no matcher applies.
pub fn infer_category(value: &str) -> DetectionCategory {
    let matchers: [&dyn PatternMatcher; 2] = [&EmailMatcher, &PhoneNumberMatcher];
    matchers
        .iter()
        .find(|m| m.matches(value))
        .map(|m| m.category())
        .unwrap_or(DetectionCategory::OtherPii)
}
