use std::collections::HashSet;

use thiserror::Error;

use crate::table::{Row, Table, TableError, Value};

/// Field contents treated as a missing value, in addition to the empty field.
pub const MISSING_VALUE_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("no columns to parse from file")]
    NoColumns,
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("encoded output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("failed to flush csv writer: {0}")]
    Flush(String),
}

pub fn parse_table(bytes: &[u8]) -> Result<Table, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(CsvError::NoColumns);
    }
    let columns = normalize_headers(headers.iter());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(infer_value).collect::<Row>());
    }

    Ok(Table::new(columns, rows)?)
}

pub fn serialize_table(table: &Table) -> Result<String, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|error| CsvError::Flush(error.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn infer_value(field: &str) -> Value {
    if field.is_empty() || MISSING_VALUE_MARKERS.contains(&field) {
        return Value::Null;
    }
    match field.parse::<f64>() {
        // Only the listed markers mean missing; other NaN spellings stay text.
        Ok(number) if number.is_nan() => Value::text(field),
        Ok(number) => Value::number(number),
        Err(_) => Value::text(field),
    }
}

fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut columns = Vec::new();

    for (index, name) in raw.enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {index}")
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while taken.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }

        taken.insert(candidate.clone());
        columns.push(candidate);
    }

    columns
}
