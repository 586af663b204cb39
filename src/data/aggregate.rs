use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::model::Record;

/// Number of journals shown when the caller does not choose.
pub const DEFAULT_TOP_JOURNALS: usize = 10;

/// A label and how many records carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// One slice of the source distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceShare {
    pub source: String,
    pub count: usize,
    /// Share of all records with a known source, `0.0..=100.0`.
    pub percent: f64,
}

/// Papers per publication year, ascending by year.
pub fn count_by_year<'a>(records: impl IntoIterator<Item = &'a Record>) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.publication_year).or_insert(0) += 1;
    }
    counts
}

/// The `k` most frequent journals, descending by count.
/// Ties keep the order in which the journals first appear.
pub fn top_journals<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    k: usize,
) -> Vec<LabelCount> {
    let mut counts = first_seen_counts(records.into_iter().map(|r| r.journal.as_str()));
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(k);
    counts
}

/// Lower-cased title tokens split on non-alphanumeric boundaries.
/// No stopwords are removed here.
pub fn title_word_frequency<'a>(
    records: impl IntoIterator<Item = &'a Record>,
) -> BTreeMap<String, usize> {
    let mut freq = BTreeMap::new();
    for r in records {
        let lower = r.title.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            *freq.entry(token.to_string()).or_insert(0) += 1;
        }
    }
    freq
}

/// Papers per source.  Records without a source are not counted.
pub fn count_by_source<'a>(
    records: impl IntoIterator<Item = &'a Record>,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for source in records.into_iter().filter_map(|r| r.source.as_deref()) {
        *counts.entry(source.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Source distribution as percentages, largest slice first.
pub fn source_shares<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<SourceShare> {
    let mut counts = first_seen_counts(records.into_iter().filter_map(|r| r.source.as_deref()));
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .into_iter()
        .map(|c| SourceShare {
            percent: if total == 0 {
                0.0
            } else {
                c.count as f64 * 100.0 / total as f64
            },
            source: c.label,
            count: c.count,
        })
        .collect()
}

/// Uniform sample of `n` records without replacement, in source order.
///
/// Returns every record when fewer than `n` exist. A fixed `seed` makes
/// the draw reproducible; `None` seeds from the OS.
pub fn sample<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    n: usize,
    seed: Option<u64>,
) -> Vec<&'a Record> {
    let pool: Vec<&Record> = records.into_iter().collect();
    if n >= pool.len() {
        return pool;
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut picked = rand::seq::index::sample(&mut rng, pool.len(), n).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| pool[i]).collect()
}

/// Count occurrences, keeping labels in first-encountered order.
fn first_seen_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<LabelCount> = Vec::new();
    for label in labels {
        match slots.get(label) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slots.insert(label, counts.len());
                counts.push(LabelCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts
}
