use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::{debug, info};

use super::model::{CleaningStats, Dataset, NOT_AVAILABLE, RawRecord, Record};

/// Full timestamps; only the calendar date is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Day-precision dates.  `%B` also accepts abbreviated month names when parsing.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y %B %d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%m/%d/%Y",
    "%m/%d/%y",
];

/// Month-precision dates, resolved to the first day of the month.
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%Y %B", "%B %Y"];

/// Parse a publication date written in any of the common metadata styles.
///
/// Partial dates (`2020`, `2020-03`, `2020 Mar`) resolve to the first day
/// of the period. A run of nine or more digits is read as epoch
/// milliseconds, which is how JSON exports write datetimes. Results with a
/// year outside 1000..=9999 are rejected. Returns `None` for anything
/// unrecognised.
pub fn parse_publish_time(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return four_digit_year(dt.date_naive());
    }
    if let Some(date) = DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(text, fmt)
            .ok()
            .and_then(|dt| four_digit_year(dt.date()))
    }) {
        return Some(date);
    }
    if let Some(date) = DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(four_digit_year)
    }) {
        return Some(date);
    }
    if let Some(date) = MONTH_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(&format!("{text} 1"), &format!("{fmt} %d"))
            .ok()
            .and_then(four_digit_year)
    }) {
        return Some(date);
    }

    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return match digits.len() {
            4 => text
                .parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
                .and_then(four_digit_year),
            9.. => text
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.date_naive())
                .and_then(four_digit_year),
            _ => None,
        };
    }
    None
}

/// chrono's `%Y` happily reads `20` as year 20; a publication date never
/// has fewer than four year digits.
fn four_digit_year(date: NaiveDate) -> Option<NaiveDate> {
    (1000..=9999).contains(&date.year()).then_some(date)
}

/// Clean raw records into a [`Dataset`].
///
/// In order: drop records without a title (null or empty), fill a missing
/// abstract or journal with [`NOT_AVAILABLE`], parse `publish_time` and drop
/// the records where that fails, then derive the publication year and the
/// abstract word count. Dropped records are counted, never reported as
/// errors.
pub fn clean(raw: Vec<RawRecord>) -> Dataset {
    let mut stats = CleaningStats {
        loaded: raw.len(),
        ..CleaningStats::default()
    };
    let mut records = Vec::with_capacity(raw.len());

    for rec in raw {
        let row = rec.row;
        let Some(title) = rec.title.filter(|t| !t.is_empty()) else {
            debug!("row {row}: dropped, missing title");
            stats.dropped_missing_title += 1;
            continue;
        };

        let abstract_text = rec
            .abstract_text
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let journal = rec.journal.unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let Some(publish_time) = rec.publish_time.as_deref().and_then(parse_publish_time) else {
            debug!("row {row}: dropped, unparseable publish_time {:?}", rec.publish_time);
            stats.dropped_bad_date += 1;
            continue;
        };

        let abstract_word_count = abstract_text.split_whitespace().count();
        records.push(Record {
            row,
            title,
            abstract_text,
            journal,
            publish_time,
            source: rec.source,
            publication_year: publish_time.year(),
            abstract_word_count,
        });
    }

    stats.retained = records.len();
    info!(
        "cleaned {} records: kept {}, dropped {} without title and {} with bad dates",
        stats.loaded, stats.retained, stats.dropped_missing_title, stats.dropped_bad_date
    );
    Dataset::from_records(records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(row: usize, title: Option<&str>, publish_time: Option<&str>) -> RawRecord {
        RawRecord {
            row,
            title: title.map(str::to_string),
            abstract_text: None,
            journal: None,
            publish_time: publish_time.map(str::to_string),
            source: Some("PMC".to_string()),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn parses_common_date_styles() {
        assert_eq!(parse_publish_time("2020-03-05"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time(" 2020-03-05 "), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("2020/03/05"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("2020-03-05T10:20:30Z"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("2020-03-05T23:00:00+02:00"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("2020-03-05 10:20:30"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("2020 Mar 5"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("Mar 5, 2020"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("March 5, 2020"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("5 March 2020"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("03/05/2020"), ymd(2020, 3, 5));
    }

    #[test]
    fn partial_dates_resolve_to_period_start() {
        assert_eq!(parse_publish_time("2020"), ymd(2020, 1, 1));
        assert_eq!(parse_publish_time("2020-03"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("2020 Mar"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("March 2020"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("Mar 2020"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("2020/03"), ymd(2020, 3, 1));
    }

    #[test]
    fn short_years_never_become_first_century_dates() {
        assert_eq!(parse_publish_time("03/05/20"), ymd(2020, 3, 5));
        assert_eq!(parse_publish_time("20-03-05"), None);
        assert_eq!(parse_publish_time("Mar 5 20"), None);
        assert_eq!(parse_publish_time("0020"), None);
    }

    #[test]
    fn epoch_milliseconds_are_dates() {
        assert_eq!(parse_publish_time("1583020800000"), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("1583020800000 "), ymd(2020, 3, 1));
        assert_eq!(parse_publish_time("20200305"), None);
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_publish_time("not a date"), None);
        assert_eq!(parse_publish_time(""), None);
        assert_eq!(parse_publish_time("2020-13-40"), None);
        assert_eq!(parse_publish_time("20"), None);
    }

    #[test]
    fn drops_missing_titles_and_bad_dates() {
        let ds = clean(vec![
            raw(0, Some("Kept"), Some("2020-01-02")),
            raw(1, None, Some("2020-01-02")),
            raw(2, Some(""), Some("2020-01-02")),
            raw(3, Some("Bad date"), Some("not a date")),
            raw(4, Some("No date"), None),
            raw(5, Some("Also kept"), Some("2019")),
        ]);

        let rows: Vec<usize> = ds.records.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 5]);
        assert_eq!(
            ds.stats,
            CleaningStats {
                loaded: 6,
                dropped_missing_title: 2,
                dropped_bad_date: 2,
                retained: 2,
            }
        );
        assert_eq!(ds.year_bounds, Some((2019, 2020)));
    }

    #[test]
    fn whitespace_title_is_not_missing() {
        let ds = clean(vec![raw(0, Some("  "), Some("2020"))]);
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn fills_sentinels_and_derives_columns() {
        let mut with_abstract = raw(1, Some("B"), Some("2021-07-09"));
        with_abstract.abstract_text = Some("  viral load\tin\nchildren ".to_string());
        with_abstract.journal = Some("Cell".to_string());

        let ds = clean(vec![raw(0, Some("A"), Some("2020-03-05")), with_abstract]);

        let first = &ds.records[0];
        assert_eq!(first.abstract_text, NOT_AVAILABLE);
        assert_eq!(first.journal, NOT_AVAILABLE);
        assert_eq!(first.abstract_word_count, 2);
        assert_eq!(first.publication_year, 2020);

        let second = &ds.records[1];
        assert_eq!(second.journal, "Cell");
        assert_eq!(second.abstract_word_count, 4);
        assert_eq!(second.publication_year, 2021);
    }

    #[test]
    fn null_journals_reach_the_charts_as_not_available() {
        use crate::data::aggregate::{count_by_source, top_journals};

        let mut cell = raw(2, Some("C"), Some("2020-05-01"));
        cell.journal = Some("Cell".to_string());
        let mut unsourced = raw(3, Some("D"), Some("2021"));
        unsourced.source = None;

        let ds = clean(vec![
            raw(0, Some("A"), Some("2020-03-05")),
            raw(1, Some("B"), Some("Mar 2020")),
            cell,
            unsourced,
        ]);
        assert_eq!(ds.len(), 4);

        let journals = top_journals(&ds.records, 10);
        assert_eq!(journals[0].label, NOT_AVAILABLE);
        assert_eq!(journals[0].count, 3);
        assert_eq!(journals[1].label, "Cell");

        let sources = count_by_source(&ds.records);
        assert_eq!(sources.get("PMC"), Some(&3));
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn output_is_an_ordered_subset_of_input() {
        let input: Vec<RawRecord> = (0..20)
            .map(|i| {
                let title = (i % 3 != 0).then_some("T");
                let date = if i % 4 == 0 { "nope" } else { "2020-06-01" };
                raw(i, title, Some(date))
            })
            .collect();

        let ds = clean(input.clone());
        let mut last = None;
        for rec in &ds.records {
            let source = &input[rec.row];
            assert_eq!(source.title.as_deref(), Some(rec.title.as_str()));
            assert!(last.map_or(true, |prev| prev < rec.row));
            let words = rec.abstract_text.split_whitespace().count();
            assert_eq!(rec.abstract_word_count, words);
            last = Some(rec.row);
        }
    }
}
