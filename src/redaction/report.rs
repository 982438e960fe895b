//! Reports returned to callers. Only masked values appear here.

use serde::Serialize;
use std::collections::BTreeMap;

use super::search::count_occurrences;
use super::RedactionMark;
use crate::domain::{DetectionCategory, PageText, SensitiveItem};

/// One reported item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedItem {
    pub category: DetectionCategory,
    pub masked: String,
    pub count: usize,
}

impl MaskedItem {
    /// Zero matches means the value was detected but never found verbatim.
    pub fn is_gap(&self) -> bool {
        self.count == 0
    }
}

/// Outcome of a redaction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactionReport {
    /// Marks per one-based page number; every page is listed.
    pub per_page_counts: BTreeMap<usize, usize>,
    pub total_marks: usize,
    pub masked_items: Vec<MaskedItem>,
}

impl RedactionReport {
    /// Tallies `marks` for a document of `page_count` pages.
    ///
    /// `items` must be in first-occurrence order; the report orders them by
    /// category, keeping that order within a category.
    pub fn build(page_count: usize, items: &[SensitiveItem], marks: &[RedactionMark]) -> Self {
        let mut per_page_counts: BTreeMap<usize, usize> =
            (1..=page_count).map(|page| (page, 0)).collect();
        for mark in marks {
            *per_page_counts.entry(mark.page + 1).or_insert(0) += 1;
        }

        let masked_items = masked_items(items, |item| {
            marks.iter().filter(|m| m.item.value() == item.value()).count()
        });

        Self {
            per_page_counts,
            total_marks: marks.len(),
            masked_items,
        }
    }

    /// Items with no match in the document.
    pub fn gaps(&self) -> impl Iterator<Item = &MaskedItem> {
        self.masked_items.iter().filter(|item| item.is_gap())
    }
}

/// Outcome of an analyze run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub pages_analyzed: usize,
    pub total_items: usize,
    pub category_counts: BTreeMap<DetectionCategory, usize>,
    pub masked_items: Vec<MaskedItem>,
}

impl AnalysisReport {
    /// Counts are exact occurrences in the extracted text.
    pub fn build(pages: &[PageText], items: &[SensitiveItem]) -> Self {
        let mut category_counts = BTreeMap::new();
        for item in items {
            *category_counts.entry(item.category()).or_insert(0) += 1;
        }

        let masked_items = masked_items(items, |item| {
            pages
                .iter()
                .map(|page| count_occurrences(&page.content, item.value()))
                .sum()
        });

        Self {
            pages_analyzed: pages.len(),
            total_items: items.len(),
            category_counts,
            masked_items,
        }
    }
}

fn masked_items<F>(items: &[SensitiveItem], count: F) -> Vec<MaskedItem>
where
    F: Fn(&SensitiveItem) -> usize,
{
    let mut out: Vec<MaskedItem> = items
        .iter()
        .map(|item| MaskedItem {
            category: item.category(),
            masked: item.masked().to_string(),
            count: count(item),
        })
        .collect();
    // Stable: first occurrence order survives within a category.
    out.sort_by_key(|item| item.category);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Rect;

    fn mark(page: usize, item: &SensitiveItem) -> RedactionMark {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        RedactionMark {
            page,
            bounding_box: rect,
            fragments: vec![rect],
            item: item.clone(),
        }
    }

    #[test]
    fn test_report_counts_per_page_and_item() {
        let phone = SensitiveItem::new("555-123-4567", DetectionCategory::Phones);
        let name = SensitiveItem::new("John Doe", DetectionCategory::Names);
        let marks = vec![mark(0, &phone), mark(0, &name), mark(2, &name)];

        let report = RedactionReport::build(3, &[phone, name], &marks);

        assert_eq!(report.total_marks, 3);
        assert_eq!(
            report.per_page_counts,
            BTreeMap::from([(1, 2), (2, 0), (3, 1)])
        );
        // Names sort before phones.
        assert_eq!(report.masked_items[0].masked, "Jo***oe");
        assert_eq!(report.masked_items[0].count, 2);
        assert_eq!(report.masked_items[1].category, DetectionCategory::Phones);
        assert_eq!(report.gaps().count(), 0);
    }

    #[test]
    fn test_unmatched_item_is_a_gap() {
        let item = SensitiveItem::new("Jane Roe", DetectionCategory::Names);
        let report = RedactionReport::build(1, std::slice::from_ref(&item), &[]);
        assert_eq!(report.total_marks, 0);
        let gaps: Vec<_> = report.gaps().collect();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].masked, "Ja***oe");
    }

    #[test]
    fn test_report_serializes_masked_only() {
        let item = SensitiveItem::new("john@email.com", DetectionCategory::Emails);
        let report = RedactionReport::build(1, std::slice::from_ref(&item), &[mark(0, &item)]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["totalMarks"], 1);
        assert_eq!(json["perPageCounts"]["1"], 1);
        assert_eq!(json["maskedItems"][0]["category"], "emails");
        assert_eq!(json["maskedItems"][0]["masked"], "jo***n@em***l.com");
        assert!(!json.to_string().contains("john@email.com"));
    }

    #[test]
    fn test_analysis_counts_occurrences() {
        let pages = vec![
            PageText::new(0, "John Doe called. John Doe left."),
            PageText::new(1, "Signed, John Doe"),
        ];
        let items = vec![
            SensitiveItem::new("John Doe", DetectionCategory::Names),
            SensitiveItem::new("Nowhere St", DetectionCategory::Addresses),
        ];
        let report = AnalysisReport::build(&pages, &items);

        assert_eq!(report.pages_analyzed, 2);
        assert_eq!(report.total_items, 2);
        assert_eq!(report.category_counts[&DetectionCategory::Names], 1);
        assert_eq!(report.masked_items[0].count, 3);
        assert!(report.masked_items[1].is_gap());
    }
}
