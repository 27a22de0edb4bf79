use crate::FileFormat;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

/// One row of a relation, keyed by column name.
pub type Record = Map<String, Value>;

/// Rows produced by a fetch, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Relation {
    rows: Vec<Record>,
}

impl Relation {
    pub fn from_rows(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    pub fn extend(&mut self, other: Relation) {
        self.rows.extend(other.rows);
    }

    /// Render as JSON lines, one row per line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl FromIterator<Record> for Relation {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}

#[derive(Debug, Error)]
pub enum RelationParseError {
    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("line {line}: expected a JSON object")]
    NotAnObject { line: usize },
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse an object body into rows. CSV values are kept as strings; typing
/// them is left to the downstream schema.
pub fn parse_records(format: FileFormat, bytes: &[u8]) -> Result<Vec<Record>, RelationParseError> {
    match format {
        FileFormat::Json => parse_json_lines(bytes),
        FileFormat::Csv => parse_csv(bytes),
    }
}

fn parse_json_lines(bytes: &[u8]) -> Result<Vec<Record>, RelationParseError> {
    let text = std::str::from_utf8(bytes)?;
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: Value =
            serde_json::from_str(trimmed).map_err(|source| RelationParseError::Json {
                line: line_no,
                source,
            })?;
        match value {
            Value::Object(record) => records.push(record),
            _ => return Err(RelationParseError::NotAnObject { line: line_no }),
        }
    }
    Ok(records)
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<Record>, RelationParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.to_string(), Value::String(value.to_string())))
            .collect();
        records.push(record);
    }
    Ok(records)
}
