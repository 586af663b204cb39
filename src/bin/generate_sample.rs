use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const ROWS: usize = 600;

const TOPICS: &[&str] = &[
    "COVID-19", "SARS-CoV-2", "coronavirus", "influenza", "MERS", "viral pneumonia",
];
const SUBJECTS: &[&str] = &[
    "transmission", "vaccine efficacy", "mortality", "ICU admissions", "mask wearing",
    "antibody response", "school closures", "genome sequencing", "mental health",
];
const SETTINGS: &[&str] = &[
    "in hospital patients", "among children", "in Wuhan", "in Europe", "in care homes",
    "a systematic review", "a cohort study",
];
const ABSTRACT_WORDS: &[&str] = &[
    "we", "report", "patients", "infection", "results", "analysis", "cases", "virus",
    "clinical", "data", "study", "risk", "outcomes", "models", "cohort", "significant",
];
const JOURNALS: &[&str] = &[
    "The Lancet", "BMJ", "Nature", "Science", "PLoS One", "Cell", "JAMA",
    "Journal of Virology", "Emerging Infectious Diseases", "Vaccine",
];
const SOURCES: &[&str] = &["PMC", "Medline", "WHO", "Elsevier", "MedRxiv", "ArXiv"];
const MONTHS: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Publication years, weighted towards the pandemic.
const YEARS: &[(i32, u32)] = &[
    (2015, 3), (2016, 3), (2017, 4), (2018, 4), (2019, 6), (2020, 40), (2021, 30), (2022, 10),
];

struct Row {
    cord_uid: String,
    title: Option<String>,
    abstract_text: Option<String>,
    journal: Option<String>,
    publish_time: Option<String>,
    source: Option<String>,
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn year(rng: &mut StdRng) -> i32 {
    YEARS
        .choose_weighted(rng, |&(_, weight)| weight)
        .map(|&(year, _)| year)
        .unwrap_or(2020)
}

/// A publish_time in one of the styles found in real metadata dumps,
/// occasionally missing or unparseable.
fn publish_time(rng: &mut StdRng) -> Option<String> {
    let year = year(rng);
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    match rng.gen_range(0..100) {
        0..=2 => None,
        3..=5 => Some("unknown".to_string()),
        6..=20 => Some(year.to_string()),
        21..=30 => Some(format!("{year} {} {day}", MONTHS[month - 1])),
        31..=35 => Some(format!("{year}-{month:02}-{day:02}T00:00:00Z")),
        _ => Some(format!("{year}-{month:02}-{day:02}")),
    }
}

fn generate_row(i: usize, rng: &mut StdRng) -> Row {
    let title = match rng.gen_range(0..100) {
        0..=2 => None,
        _ => Some(format!(
            "{} {} {}",
            pick(rng, SUBJECTS),
            pick(rng, SETTINGS),
            pick(rng, TOPICS)
        )),
    };
    let abstract_text = (rng.gen_range(0..100) >= 15).then(|| {
        let len = rng.gen_range(20..120);
        (0..len)
            .map(|_| pick(rng, ABSTRACT_WORDS))
            .collect::<Vec<_>>()
            .join(" ")
    });
    let journal = (rng.gen_range(0..100) >= 10).then(|| pick(rng, JOURNALS).to_string());
    let source = (rng.gen_range(0..100) >= 2).then(|| pick(rng, SOURCES).to_string());

    Row {
        cord_uid: format!("ug{i:06}"),
        title,
        abstract_text,
        journal,
        publish_time: publish_time(rng),
        source,
    }
}

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let rows: Vec<Row> = (0..ROWS).map(|i| generate_row(i, &mut rng)).collect();

    // CSV, with the CORD-19 column names
    let csv_path = "sample_metadata.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record(["cord_uid", "title", "abstract", "journal", "publish_time", "source_x"])
        .expect("Failed to write CSV header");
    for row in &rows {
        writer
            .write_record([
                row.cord_uid.as_str(),
                row.title.as_deref().unwrap_or(""),
                row.abstract_text.as_deref().unwrap_or(""),
                row.journal.as_deref().unwrap_or(""),
                row.publish_time.as_deref().unwrap_or(""),
                row.source.as_deref().unwrap_or(""),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Parquet, same rows with real nulls
    let column = |f: fn(&Row) -> Option<&str>| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let schema = Arc::new(Schema::new(vec![
        Field::new("cord_uid", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, true),
        Field::new("abstract", DataType::Utf8, true),
        Field::new("journal", DataType::Utf8, true),
        Field::new("publish_time", DataType::Utf8, true),
        Field::new("source_x", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            column(|r| Some(r.cord_uid.as_str())),
            column(|r| r.title.as_deref()),
            column(|r| r.abstract_text.as_deref()),
            column(|r| r.journal.as_deref()),
            column(|r| r.publish_time.as_deref()),
            column(|r| r.source.as_deref()),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_metadata.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {ROWS} paper records to {csv_path} and {parquet_path}");
}
