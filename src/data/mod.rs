/// Data layer: record types, loading, cleaning, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Vec<RawRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean   │  drop / fill / parse dates → Dataset
///   └──────────┘
///        │            (memoized per path + mtime by `cache`)
///        ▼
///   ┌──────────┐
///   │  filter  │  inclusive year range → filtered view
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  counts, word frequencies, sample
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;
