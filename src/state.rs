use std::sync::Arc;

use log::debug;

use crate::data::filter::{DEFAULT_START_YEAR, YearRange, filtered_indices};
use crate::data::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Explorer state
// ---------------------------------------------------------------------------

/// The current selection over a loaded dataset, independent of rendering.
pub struct ExplorerState {
    /// Cleaned dataset, shared with the cache.
    pub dataset: Arc<Dataset>,

    /// Selected publication years.
    pub year_range: YearRange,

    /// Indices of records inside `year_range` (cached).
    pub visible_indices: Vec<usize>,
}

impl ExplorerState {
    /// Start with the default year selection.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let year_range = dataset
            .year_bounds
            .map(YearRange::default_for)
            .unwrap_or(YearRange::new(DEFAULT_START_YEAR, DEFAULT_START_YEAR));
        let visible_indices = filtered_indices(&dataset.records, year_range);
        Self {
            dataset,
            year_range,
            visible_indices,
        }
    }

    /// Swap in a (re)loaded dataset, keeping the selection where possible.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        if Arc::ptr_eq(&self.dataset, &dataset) {
            return;
        }
        self.dataset = dataset;
        self.set_year_range(self.year_range);
    }

    /// Select a new year range.  It is kept as given, so a range that does
    /// not overlap the data selects nothing.
    pub fn set_year_range(&mut self, range: YearRange) {
        self.year_range = range;
        self.refilter();
    }

    /// Recompute `visible_indices` after a selection change.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset.records, self.year_range);
        debug!(
            "{} of {} records in {}-{}",
            self.visible_indices.len(),
            self.dataset.len(),
            self.year_range.lo,
            self.year_range.hi
        );
    }

    /// Records inside the current selection, in source order.
    pub fn visible_records(&self) -> Vec<&Record> {
        self.visible_indices
            .iter()
            .map(|&i| &self.dataset.records[i])
            .collect()
    }
}
