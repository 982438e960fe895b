//! Values flowing between the pipeline stages.

use serde::Serialize;

use super::category::DetectionCategory;
use super::mask::mask;

/// Plain text of one page, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Zero-based page index.
    pub page_index: usize,
    pub content: String,
}

impl PageText {
    pub fn new(page_index: usize, content: impl Into<String>) -> Self {
        Self {
            page_index,
            content: content.into(),
        }
    }

    /// One-based page number as shown to users.
    pub fn page_number(&self) -> usize {
        self.page_index + 1
    }
}

/// One finding reported by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDetection {
    pub category: DetectionCategory,
    pub value: String,
    /// Zero-based page index the value is attributed to.
    pub page: usize,
}

/// A deduplicated value to redact.
///
/// `masked` is always derived from `value`; construct through
/// [`SensitiveItem::new`] to keep the two in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensitiveItem {
    #[serde(skip)]
    value: String,
    category: DetectionCategory,
    masked: String,
}

impl SensitiveItem {
    /// Builds an item from a raw value; surrounding whitespace is trimmed.
    pub fn new(value: &str, category: DetectionCategory) -> Self {
        let value = value.trim().to_string();
        let masked = mask(&value);
        Self {
            value,
            category,
            masked,
        }
    }

    /// Canonical (unmasked) value. Never log this.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn category(&self) -> DetectionCategory {
        self.category
    }

    pub fn masked(&self) -> &str {
        &self.masked
    }

    /// Key used for case-insensitive comparison.
    pub fn key(&self) -> String {
        fold_key(&self.value)
    }
}

/// Case-folded, trimmed comparison key.
pub fn fold_key(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_trims_and_masks() {
        let item = SensitiveItem::new("  John Doe\n", DetectionCategory::Names);
        assert_eq!(item.value(), "John Doe");
        assert_eq!(item.masked(), "Jo***oe");
        assert_eq!(item.key(), "john doe");
    }

    #[test]
    fn test_item_serialization_omits_value() {
        let item = SensitiveItem::new("john@email.com", DetectionCategory::Emails);
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("john@email.com"));
        assert!(json.contains("jo***n@em***l.com"));
    }

    #[test]
    fn test_page_number() {
        assert_eq!(PageText::new(0, "x").page_number(), 1);
    }
}
