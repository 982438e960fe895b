//! Caller adjustments applied to the detected set in custom mode.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::domain::{fold_key, infer_category, SensitiveItem};

/// Values to drop from, and literals to add to, the working set.
///
/// Comparison is case-insensitive after trimming. An exclude entry wins
/// over an include entry for the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub exclude: Vec<String>,
    pub include: Vec<String>,
}

/// How many items the overrides removed and added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideSummary {
    pub excluded: usize,
    pub included: usize,
}

impl Overrides {
    pub fn new(exclude: Vec<String>, include: Vec<String>) -> Self {
        Self { exclude, include }
    }

    pub fn is_empty(&self) -> bool {
        self.exclude.is_empty() && self.include.is_empty()
    }

    /// Produces the adjusted set. Detected items keep their order;
    /// included literals follow in the order given.
    pub fn apply(&self, items: Vec<SensitiveItem>) -> (Vec<SensitiveItem>, OverrideSummary) {
        let excluded: HashSet<String> = self
            .exclude
            .iter()
            .map(|v| fold_key(v))
            .filter(|k| !k.is_empty())
            .collect();

        let before = items.len();
        let mut kept: Vec<SensitiveItem> = items
            .into_iter()
            .filter(|item| !excluded.contains(&item.key()))
            .collect();
        let mut summary = OverrideSummary {
            excluded: before - kept.len(),
            included: 0,
        };

        let mut present: HashSet<String> = kept.iter().map(SensitiveItem::key).collect();
        for literal in &self.include {
            let key = fold_key(literal);
            if key.is_empty() || excluded.contains(&key) || !present.insert(key) {
                continue;
            }
            let item = SensitiveItem::new(literal, infer_category(literal));
            debug!(masked = item.masked(), category = %item.category(), "included literal");
            kept.push(item);
            summary.included += 1;
        }

        (kept, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DetectionCategory;

    fn detected() -> Vec<SensitiveItem> {
        vec![
            SensitiveItem::new("John Doe", DetectionCategory::Names),
            SensitiveItem::new("john@email.com", DetectionCategory::Emails),
        ]
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_exclude_is_case_insensitive() {
        let overrides = Overrides::new(strings(&["  JOHN DOE "]), vec![]);
        let (items, summary) = overrides.apply(detected());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value(), "john@email.com");
        assert_eq!(summary.excluded, 1);
    }

    #[test]
    fn test_exclude_beats_include() {
        let overrides = Overrides::new(strings(&["John Doe"]), strings(&["john doe"]));
        let (items, summary) = overrides.apply(detected());
        assert!(items.iter().all(|i| i.value() != "John Doe"));
        assert_eq!(summary.included, 0);
    }

    #[test]
    fn test_include_adds_synthetic_items() {
        let overrides = Overrides::new(vec![], strings(&["Project X", "(555) 234-5678"]));
        let (items, summary) = overrides.apply(detected());
        assert_eq!(summary, OverrideSummary { excluded: 0, included: 2 });
        assert_eq!(items[2].value(), "Project X");
        assert_eq!(items[2].category(), DetectionCategory::OtherPii);
        assert_eq!(items[3].category(), DetectionCategory::Phones);
    }

    #[test]
    fn test_include_of_detected_value_is_not_duplicated() {
        let overrides = Overrides::new(vec![], strings(&["JOHN@EMAIL.COM", "", "   "]));
        let (items, summary) = overrides.apply(detected());
        assert_eq!(items.len(), 2);
        assert_eq!(summary.included, 0);
    }
}
