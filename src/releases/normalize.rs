use crate::constants::DATE_FORMAT;
use crate::types::{DateRange, NormalizedItem, RawCatalogItem, ReleaseItem};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

/// Counts collected while assembling a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub fetched: usize,
    pub unresolved: usize,
    pub out_of_range: usize,
    pub duplicates: usize,
}

/// Resolve the effective release date and title of a raw item.
///
/// The effective date is the earliest parseable one among `release_date`
/// and `primary_release_date`. Items without a date or a title are dropped.
pub fn normalize(raw: RawCatalogItem) -> Option<NormalizedItem> {
    let normalized_release_date = [raw.release_date.as_deref(), raw.primary_release_date.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
        .min()?;

    let title = raw
        .title
        .as_deref()
        .or(raw.original_title.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())?
        .to_string();

    Some(NormalizedItem {
        raw,
        title,
        normalized_release_date,
    })
}

/// Keep one item per id, preferring the earliest release date. On equal
/// dates the first one seen wins.
pub fn dedupe_earliest(items: Vec<NormalizedItem>) -> Vec<NormalizedItem> {
    let mut index: HashMap<u64, usize> = HashMap::with_capacity(items.len());
    let mut kept: Vec<NormalizedItem> = Vec::with_capacity(items.len());

    for item in items {
        match index.get(&item.raw.id) {
            Some(&slot) => {
                if item.normalized_release_date < kept[slot].normalized_release_date {
                    kept[slot] = item;
                }
            }
            None => {
                index.insert(item.raw.id, kept.len());
                kept.push(item);
            }
        }
    }
    kept
}

/// Turn everything fetched into the final ordered, unique result set.
pub fn assemble(raw: Vec<RawCatalogItem>, range: &DateRange) -> (Vec<ReleaseItem>, AssemblyStats) {
    let mut stats = AssemblyStats {
        fetched: raw.len(),
        ..Default::default()
    };

    let normalized: Vec<NormalizedItem> = raw.into_iter().filter_map(normalize).collect();
    stats.unresolved = stats.fetched - normalized.len();

    let in_range: Vec<NormalizedItem> = normalized
        .into_iter()
        .filter(|item| range.contains(item.normalized_release_date))
        .collect();
    stats.out_of_range = stats.fetched - stats.unresolved - in_range.len();

    let mut unique = dedupe_earliest(in_range);
    stats.duplicates = stats.fetched - stats.unresolved - stats.out_of_range - unique.len();

    unique.sort_by(|a, b| {
        a.normalized_release_date
            .cmp(&b.normalized_release_date)
            .then(a.raw.id.cmp(&b.raw.id))
    });

    debug!(?stats, "assembled release set");
    (unique.into_iter().map(ReleaseItem::from).collect(), stats)
}
