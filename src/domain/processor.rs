//! Turns raw detections into the canonical set of sensitive items.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::item::{fold_key, RawDetection, SensitiveItem};

/// Deduplicates raw detections.
///
/// Detections are visited by page, then by category in enumerated order,
/// then in reported order. The first occurrence of a value (compared
/// case-insensitively after trimming) fixes its casing and category. A
/// later report under another category is logged and ignored.
pub fn deduplicate(detections: &[RawDetection]) -> Vec<SensitiveItem> {
    let mut ordered: Vec<(usize, &RawDetection)> = detections.iter().enumerate().collect();
    // Stable on the original index keeps reported order within a bucket.
    ordered.sort_by_key(|(idx, d)| (d.page, d.category, *idx));

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut items: Vec<SensitiveItem> = Vec::new();

    for (_, detection) in ordered {
        let key = fold_key(&detection.value);
        if key.is_empty() {
            continue;
        }
        match seen.get(&key) {
            Some(&existing) => {
                let item = &items[existing];
                if item.category() != detection.category {
                    warn!(
                        masked = item.masked(),
                        kept = %item.category(),
                        ignored = %detection.category,
                        "value reported under two categories; keeping first"
                    );
                }
            }
            None => {
                let item = SensitiveItem::new(&detection.value, detection.category);
                seen.insert(key, items.len());
                items.push(item);
            }
        }
    }

    debug!(
        raw = detections.len(),
        unique = items.len(),
        "deduplicated detections"
    );
    items
}
