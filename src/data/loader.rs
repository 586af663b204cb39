use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::util::display::array_value_to_string;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use super::model::RawRecord;

pub const TITLE: &str = "title";
pub const ABSTRACT: &str = "abstract";
pub const JOURNAL: &str = "journal";
pub const PUBLISH_TIME: &str = "publish_time";

/// Accepted names for the source column, in order of preference.
/// CORD-19 exports call it `source_x`.
pub const SOURCE_ALIASES: [&str; 2] = ["source", "source_x"];

/// CSV cells that mean "no value", as written by common dataframe
/// exporters.  Matched exactly, without trimming.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Fatal failure while reading a metadata file.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed Parquet: {0}")]
    Parquet(#[from] ParquetError),
    #[error("cannot decode Parquet column: {0}")]
    Arrow(#[from] ArrowError),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("record {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load raw paper records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, empty cells are null
/// * `.json`    – `[{ "title": ..., "abstract": ..., ... }, ...]`
/// * `.parquet` – one column per field, any cell type rendered as text
///
/// Every format must carry `title`, `abstract`, `journal`, `publish_time`
/// and a source column (`source` or `source_x`).
pub fn load_file(path: &Path) -> Result<Vec<RawRecord>, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedExtension(other.to_string())),
    };
    info!("loaded {} raw records from {}", records.len(), path.display());
    Ok(records)
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Positions of the required columns within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    title: usize,
    abstract_text: usize,
    journal: usize,
    publish_time: usize,
    source: usize,
}

impl ColumnIndex {
    fn resolve(position: impl Fn(&str) -> Option<usize>) -> Result<Self, DataLoadError> {
        let require = |name: &str| {
            position(name).ok_or_else(|| DataLoadError::MissingColumn(name.to_string()))
        };
        let source = SOURCE_ALIASES
            .iter()
            .find_map(|&name| position(name))
            .ok_or_else(|| DataLoadError::MissingColumn(SOURCE_ALIASES[0].to_string()))?;

        let index = ColumnIndex {
            title: require(TITLE)?,
            abstract_text: require(ABSTRACT)?,
            journal: require(JOURNAL)?,
            publish_time: require(PUBLISH_TIME)?,
            source,
        };
        debug!("resolved columns {index:?}");
        Ok(index)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Comma-separated with a header row.  Extra columns are ignored; a row
/// with the wrong number of fields is a fatal error.
fn load_csv(path: &Path) -> Result<Vec<RawRecord>, DataLoadError> {
    let mut reader = csv::Reader::from_reader(BufReader::new(open(path)?));
    let headers = reader.headers()?.clone();
    let cols = ColumnIndex::resolve(|name| headers.iter().position(|h| h.trim() == name))?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: usize| {
            record
                .get(idx)
                .filter(|s| !NA_TOKENS.contains(s))
                .map(str::to_string)
        };

        records.push(RawRecord {
            row,
            title: cell(cols.title),
            abstract_text: cell(cols.abstract_text),
            journal: cell(cols.journal),
            publish_time: cell(cols.publish_time),
            source: cell(cols.source),
        });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON as written by `df.to_json(orient='records')`.
/// Keys must be present on every object; `null` marks a missing value.
/// Numbers are kept as their text, so a datetime column exported as epoch
/// milliseconds reaches the cleaner as e.g. `"1583020800000"`.
fn load_json(path: &Path) -> Result<Vec<RawRecord>, DataLoadError> {
    let root: JsonValue = serde_json::from_reader(BufReader::new(open(path)?))?;
    let rows = root.as_array().ok_or_else(|| DataLoadError::InvalidRecord {
        row: 0,
        reason: "expected a top-level JSON array".to_string(),
    })?;

    rows.iter()
        .enumerate()
        .map(|(row, value)| {
            let obj = value.as_object().ok_or_else(|| DataLoadError::InvalidRecord {
                row,
                reason: "not a JSON object".to_string(),
            })?;
            let source_key = SOURCE_ALIASES
                .iter()
                .copied()
                .find(|key| obj.contains_key(*key))
                .ok_or_else(|| DataLoadError::MissingColumn(SOURCE_ALIASES[0].to_string()))?;

            Ok(RawRecord {
                row,
                title: json_field(obj, TITLE)?,
                abstract_text: json_field(obj, ABSTRACT)?,
                journal: json_field(obj, JOURNAL)?,
                publish_time: json_field(obj, PUBLISH_TIME)?,
                source: json_field(obj, source_key)?,
            })
        })
        .collect()
}

fn json_field(obj: &Map<String, JsonValue>, key: &str) -> Result<Option<String>, DataLoadError> {
    match obj.get(key) {
        None => Err(DataLoadError::MissingColumn(key.to_string())),
        Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Ok(Some(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both Pandas and Polars.  String columns
/// are read directly, anything else (e.g. a `Date32` publish_time) is
/// rendered with Arrow's display formatting.
fn load_parquet(path: &Path) -> Result<Vec<RawRecord>, DataLoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let cols = ColumnIndex::resolve(|name| builder.schema().index_of(name).ok())?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for i in 0..batch.num_rows() {
            let row = records.len();
            records.push(RawRecord {
                row,
                title: parquet_cell(batch.column(cols.title), i)?,
                abstract_text: parquet_cell(batch.column(cols.abstract_text), i)?,
                journal: parquet_cell(batch.column(cols.journal), i)?,
                publish_time: parquet_cell(batch.column(cols.publish_time), i)?,
                source: parquet_cell(batch.column(cols.source), i)?,
            });
        }
    }
    Ok(records)
}

fn parquet_cell(col: &ArrayRef, row: usize) -> Result<Option<String>, ArrowError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        _ => array_value_to_string(col.as_ref(), row)?,
    };
    Ok(Some(text))
}
