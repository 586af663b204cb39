use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use serde::Serialize;

use crate::config::OutputFormat;
use crate::data::aggregate::{
    LabelCount, SourceShare, count_by_year, sample, source_shares, title_word_frequency,
    top_journals,
};
use crate::data::filter::YearRange;
use crate::data::model::{CleaningStats, Record};
use crate::state::ExplorerState;

pub const DEFAULT_TOP_WORDS: usize = 50;
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

const BAR_WIDTH: usize = 40;
const CELL_WIDTH: usize = 48;

/// Common English words left out of the word-cloud weights.
const STOPWORDS: &[&str] = &[
    "about", "after", "against", "all", "also", "among", "an", "and", "any", "are", "as", "at",
    "be", "been", "before", "between", "both", "but", "by", "can", "could", "did", "do", "does",
    "during", "each", "for", "from", "had", "has", "have", "how", "if", "in", "into", "is", "it",
    "its", "may", "more", "most", "no", "not", "of", "on", "or", "other", "our", "over", "should",
    "so", "some", "such", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "to", "under", "up", "using", "via", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "why", "will", "with", "within", "without",
    "would", "you", "your",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub top_journals: usize,
    pub top_words: usize,
    pub sample_size: usize,
    pub seed: Option<u64>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_journals: crate::data::aggregate::DEFAULT_TOP_JOURNALS,
            top_words: DEFAULT_TOP_WORDS,
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// A title word and its relative size in a word cloud (largest = 1.0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordWeight {
    pub word: String,
    pub count: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleRow {
    pub title: String,
    pub journal: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub publication_year: i32,
}

impl From<&Record> for SampleRow {
    fn from(r: &Record) -> Self {
        SampleRow {
            title: r.title.clone(),
            journal: r.journal.clone(),
            abstract_text: r.abstract_text.clone(),
            publication_year: r.publication_year,
        }
    }
}

/// Everything a charting front end needs for one year selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub year_range: YearRange,
    pub matching_records: usize,
    pub cleaning: CleaningStats,
    pub publications_by_year: Vec<YearCount>,
    pub top_journals: Vec<LabelCount>,
    pub title_words: Vec<WordWeight>,
    pub sources: Vec<SourceShare>,
    pub sample: Vec<SampleRow>,
}

impl Dashboard {
    pub fn build(state: &ExplorerState, options: &DashboardOptions) -> Self {
        let visible = state.visible_records();
        let records = || visible.iter().copied();

        Dashboard {
            year_range: state.year_range,
            matching_records: visible.len(),
            cleaning: state.dataset.stats,
            publications_by_year: count_by_year(records())
                .into_iter()
                .map(|(year, count)| YearCount { year, count })
                .collect(),
            top_journals: top_journals(records(), options.top_journals),
            title_words: word_cloud_weights(&title_word_frequency(records()), options.top_words),
            sources: source_shares(records()),
            sample: sample(records(), options.sample_size, options.seed)
                .into_iter()
                .map(SampleRow::from)
                .collect(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => self.render_text(),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn render_text(&self) -> Result<String> {
        let mut out = String::new();
        let stats = &self.cleaning;
        writeln!(
            out,
            "Papers {}-{}: {} of {} cleaned records",
            self.year_range.lo, self.year_range.hi, self.matching_records, stats.retained
        )?;
        writeln!(
            out,
            "({} loaded, {} without title, {} with unparseable dates)",
            stats.loaded, stats.dropped_missing_title, stats.dropped_bad_date
        )?;

        writeln!(out, "\nPublications over time")?;
        let max = self.publications_by_year.iter().map(|y| y.count).max().unwrap_or(0);
        for y in &self.publications_by_year {
            writeln!(out, "  {}  {:>7}  {}", y.year, y.count, bar(y.count, max))?;
        }
        none_if_empty(&mut out, self.publications_by_year.is_empty())?;

        writeln!(out, "\nTop publishing journals")?;
        for (rank, j) in self.top_journals.iter().enumerate() {
            writeln!(out, "  {:>2}. {:>7}  {}", rank + 1, j.count, j.label)?;
        }
        none_if_empty(&mut out, self.top_journals.is_empty())?;

        writeln!(out, "\nTitle words")?;
        for w in &self.title_words {
            writeln!(out, "  {:<24} {:>7}  {:.2}", w.word, w.count, w.weight)?;
        }
        none_if_empty(&mut out, self.title_words.is_empty())?;

        writeln!(out, "\nPapers by source")?;
        for s in &self.sources {
            writeln!(out, "  {:>5.1}%  {:>7}  {}", s.percent, s.count, s.source)?;
        }
        none_if_empty(&mut out, self.sources.is_empty())?;

        writeln!(out, "\nSample data")?;
        if self.sample.is_empty() {
            none_if_empty(&mut out, true)?;
        } else {
            writeln!(out, "{}", sample_table(&self.sample)?)?;
        }
        Ok(out)
    }
}

/// Rank title words for a word cloud: drop stopwords and single
/// characters, keep the `n` most frequent, scale against the largest.
pub fn word_cloud_weights(freq: &BTreeMap<String, usize>, n: usize) -> Vec<WordWeight> {
    let mut words: Vec<(&str, usize)> = freq
        .iter()
        .filter(|(w, _)| w.chars().count() > 1 && !STOPWORDS.contains(&w.as_str()))
        .map(|(w, &count)| (w.as_str(), count))
        .collect();
    words.sort_by(|a, b| b.1.cmp(&a.1));
    words.truncate(n);

    let max = words.first().map_or(0, |w| w.1);
    words
        .into_iter()
        .map(|(word, count)| WordWeight {
            word: word.to_string(),
            count,
            weight: if max == 0 { 0.0 } else { count as f64 / max as f64 },
        })
        .collect()
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat((count * BAR_WIDTH).div_ceil(max))
}

fn none_if_empty(out: &mut String, empty: bool) -> std::fmt::Result {
    if empty {
        writeln!(out, "  (none)")?;
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Render sample rows as a boxed table.
fn sample_table(rows: &[SampleRow]) -> Result<String> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("journal", DataType::Utf8, false),
        Field::new("abstract", DataType::Utf8, false),
        Field::new("publication_year", DataType::Int32, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| truncate(&r.title, CELL_WIDTH)),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| truncate(&r.journal, CELL_WIDTH / 2)),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| truncate(&r.abstract_text, CELL_WIDTH)),
        )),
        Arc::new(Int32Array::from_iter_values(
            rows.iter().map(|r| r.publication_year),
        )),
    ];
    let batch = RecordBatch::try_new(schema, columns)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}
