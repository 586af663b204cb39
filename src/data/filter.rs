use serde::Serialize;

use super::model::Record;

/// First year shown when no range is chosen.
pub const DEFAULT_START_YEAR: i32 = 2020;

// ---------------------------------------------------------------------------
// Filter predicate: inclusive publication-year window
// ---------------------------------------------------------------------------

/// Inclusive `[lo, hi]` range of publication years.
/// A range with `lo > hi` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub lo: i32,
    pub hi: i32,
}

impl YearRange {
    pub fn new(lo: i32, hi: i32) -> Self {
        YearRange { lo, hi }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.lo <= year && year <= self.hi
    }

    /// The initial selection: [`DEFAULT_START_YEAR`] up to the newest year,
    /// pulled inside the observed `(min, max)` bounds.
    pub fn default_for(bounds: (i32, i32)) -> Self {
        let (min, max) = bounds;
        YearRange {
            lo: DEFAULT_START_YEAR.clamp(min, max),
            hi: max,
        }
    }
}

/// Return indices of records published within `range`, in source order.
pub fn filtered_indices(records: &[Record], range: YearRange) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| range.contains(r.publication_year))
        .map(|(i, _)| i)
        .collect()
}

/// Records with `lo <= publication_year <= hi`, preserving relative order.
pub fn filter_by_year(records: &[Record], lo: i32, hi: i32) -> Vec<&Record> {
    let range = YearRange::new(lo, hi);
    records
        .iter()
        .filter(|r| range.contains(r.publication_year))
        .collect()
}
