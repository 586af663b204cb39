use chrono::NaiveDate;
use serde::Serialize;

/// Replacement text for a missing abstract or journal.
pub const NOT_AVAILABLE: &str = "Not Available";

// ---------------------------------------------------------------------------
// RawRecord – one row exactly as it was read
// ---------------------------------------------------------------------------

/// A paper entry straight from the source file, nulls preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// 0-based data-row index in the source file (the record identity).
    pub row: usize,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub journal: Option<String>,
    /// Unparsed publication date, in whatever format the file used.
    pub publish_time: Option<String>,
    pub source: Option<String>,
}

// ---------------------------------------------------------------------------
// Record – one cleaned paper
// ---------------------------------------------------------------------------

/// A paper that survived cleaning.
///
/// `abstract_text` and `journal` are never empty holes: a missing value is
/// replaced by [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub row: usize,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub journal: String,
    pub publish_time: NaiveDate,
    /// Left as `None` when missing; such papers are skipped by source counts.
    pub source: Option<String>,
    pub publication_year: i32,
    pub abstract_word_count: usize,
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// What the cleaner kept and threw away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    pub loaded: usize,
    pub dropped_missing_title: usize,
    pub dropped_bad_date: usize,
    pub retained: usize,
}

/// The cleaned records with pre-computed year bounds.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Cleaned records in source order.
    pub records: Vec<Record>,
    pub stats: CleaningStats,
    /// Smallest and largest `publication_year`, `None` when empty.
    pub year_bounds: Option<(i32, i32)>,
}

impl Dataset {
    /// Build the year index from the cleaned records.
    pub fn from_records(records: Vec<Record>, stats: CleaningStats) -> Self {
        let year_bounds = records.iter().fold(None, |acc, r| match acc {
            None => Some((r.publication_year, r.publication_year)),
            Some((lo, hi)) => Some((lo.min(r.publication_year), hi.max(r.publication_year))),
        });
        Dataset {
            records,
            stats,
            year_bounds,
        }
    }

    /// Number of cleaned records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A cleaned record with the derived fields filled in consistently.
    pub fn record(
        row: usize,
        title: &str,
        journal: &str,
        date: (i32, u32, u32),
        source: &str,
    ) -> Record {
        let publish_time = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        Record {
            row,
            title: title.to_string(),
            abstract_text: NOT_AVAILABLE.to_string(),
            journal: journal.to_string(),
            publish_time,
            source: Some(source.to_string()),
            publication_year: date.0,
            abstract_word_count: 2,
        }
    }
}
