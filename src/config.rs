use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

use crate::data::aggregate::DEFAULT_TOP_JOURNALS;
use crate::data::filter::YearRange;
use crate::report::{DEFAULT_SAMPLE_SIZE, DEFAULT_TOP_WORDS, DashboardOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text report
    Text,
    /// Pretty-printed JSON for an external charting tool
    Json,
}

/// Explore research-paper metadata: papers per year, top journals,
/// title words and sources for a range of publication years.
#[derive(Parser, Debug)]
#[command(name = "paper-explorer", version)]
pub struct Cli {
    /// Metadata file (.csv, .json or .parquet)
    #[arg(default_value = "metadata.csv")]
    pub path: PathBuf,

    /// First publication year to include
    #[arg(long)]
    pub from: Option<i32>,

    /// Last publication year to include
    #[arg(long)]
    pub to: Option<i32>,

    /// Number of journals to list
    #[arg(long, default_value_t = DEFAULT_TOP_JOURNALS)]
    pub top_journals: usize,

    /// Number of title words to weight for a word cloud
    #[arg(long, default_value_t = DEFAULT_TOP_WORDS)]
    pub top_words: usize,

    /// Number of sample rows to show
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample: usize,

    /// Seed for the sample rows (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Keep reading year ranges from stdin and re-render
    #[arg(short, long)]
    pub interactive: bool,
}

impl Cli {
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            top_journals: self.top_journals,
            top_words: self.top_words,
            sample_size: self.sample,
            seed: self.seed,
        }
    }

    /// The range asked for on the command line, if any.  A missing end
    /// falls back to the matching observed bound.
    pub fn requested_range(&self, bounds: (i32, i32)) -> Option<YearRange> {
        if self.from.is_none() && self.to.is_none() {
            return None;
        }
        Some(YearRange::new(
            self.from.unwrap_or(bounds.0),
            self.to.unwrap_or(bounds.1),
        ))
    }
}

/// Parse an interactive range line such as `2019 2021`, `2019-2021` or
/// `2020` (a single year).
pub fn parse_year_range(line: &str) -> Result<YearRange> {
    let years = line
        .split(|c: char| c.is_whitespace() || c == '-' || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .with_context(|| format!("'{part}' is not a year"))
        })
        .collect::<Result<Vec<_>>>()?;

    match years.as_slice() {
        [year] => Ok(YearRange::new(*year, *year)),
        [lo, hi] => Ok(YearRange::new(*lo, *hi)),
        _ => bail!("expected 'LO HI', got '{line}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard() {
        let cli = Cli::parse_from(["paper-explorer"]);
        assert_eq!(cli.path, PathBuf::from("metadata.csv"));
        assert_eq!(cli.top_journals, 10);
        assert_eq!(cli.sample, 10);
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.requested_range((2000, 2022)), None);
    }

    #[test]
    fn open_ended_range_uses_bounds() {
        let cli = Cli::parse_from([
            "paper-explorer",
            "data.parquet",
            "--from",
            "2019",
            "--format",
            "json",
        ]);
        assert_eq!(cli.requested_range((2000, 2022)), Some(YearRange::new(2019, 2022)));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.path, PathBuf::from("data.parquet"));
    }

    #[test]
    fn parses_interactive_ranges() {
        assert_eq!(parse_year_range("2019 2021").unwrap(), YearRange::new(2019, 2021));
        assert_eq!(parse_year_range(" 2019-2021 ").unwrap(), YearRange::new(2019, 2021));
        assert_eq!(parse_year_range("2020").unwrap(), YearRange::new(2020, 2020));
        assert!(parse_year_range("soon").is_err());
        assert!(parse_year_range("2019 2020 2021").is_err());
        assert!(parse_year_range("").is_err());
    }
}
