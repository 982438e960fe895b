//! Exact-text matching of sensitive items against page layouts.
//!
//! Matching is case-sensitive and literal. Pages are searched in parallel;
//! the resulting marks are in page order, then item order, then position.

use rayon::prelude::*;

use super::RedactionMark;
use crate::document::{PageLayout, Rect};
use crate::domain::SensitiveItem;

/// Values shorter than this are never searched.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Finds every occurrence of every item on every page.
pub fn find_marks(layouts: &[PageLayout], items: &[SensitiveItem]) -> Vec<RedactionMark> {
    layouts
        .par_iter()
        .map(|layout| marks_on_page(layout, items))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Marks for one page. Overlapping matches of different items are kept
/// independently.
pub fn marks_on_page(layout: &PageLayout, items: &[SensitiveItem]) -> Vec<RedactionMark> {
    let mut marks = Vec::new();
    for item in items {
        let needle = item.value();
        if needle.chars().count() < MIN_SEARCH_CHARS {
            continue;
        }
        for (start, matched) in layout.text().match_indices(needle) {
            let fragments = layout.fragments(start, start + matched.len());
            let Some(bounding_box) = fragments.iter().copied().reduce(|a, b| a.union(&b)) else {
                continue;
            };
            marks.push(RedactionMark {
                page: layout.page_index(),
                bounding_box,
                fragments,
                item: item.clone(),
            });
        }
    }
    marks
}

/// Exact occurrences of a value in plain text, without geometry.
pub fn count_occurrences(text: &str, value: &str) -> usize {
    if value.chars().count() < MIN_SEARCH_CHARS {
        return 0;
    }
    text.matches(value).count()
}

impl RedactionMark {
    /// Rectangles to paint: one per line fragment.
    pub fn areas(&self) -> &[Rect] {
        &self.fragments
    }
}
