//! Reader module for the asset indexer pipeline.
//!
//! Loads a CSV file into a [`Table`]. Column types are inferred per column:
//! a column whose values all parse as integers becomes integer, one whose
//! values all parse as finite floats becomes float, anything else stays text.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use asset_indexer_shared::{CellValue, Row, Table};

/// Prefix given to columns whose header cell is empty.
pub const UNNAMED_COLUMN_PREFIX: &str = "Unnamed";

/// Cell contents read as a missing value.
pub const MISSING_VALUE_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

/// Read the CSV file at `path`.
///
/// # Returns
///
/// * `Ok(Table)` - One row per data record
/// * `Err(PipelineError::SourceNotFound)` - If the file does not exist
/// * `Err(PipelineError::ReadError)` - If the file is not valid CSV
#[instrument(skip(path), fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<Table, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::SourceNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let table = read_table_from_reader(file)?;

    info!(
        records = table.len(),
        columns = table.columns().len(),
        "Loaded records from CSV"
    );
    Ok(table)
}

/// Read CSV data from any reader. The first record is the header.
pub fn read_table_from_reader<R: Read>(reader: R) -> Result<Table, PipelineError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = column_names(&headers);
    debug!(?columns, "CSV headers");

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for (position, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| {
            PipelineError::read(format!("record {}: {}", position + 1, e))
        })?;

        let cells = (0..columns.len())
            .map(|i| record.get(i).and_then(missing_as_none))
            .collect();
        raw_rows.push(cells);
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|col| infer_kind(raw_rows.iter().filter_map(|row| row[col].as_deref())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .enumerate()
        .map(|(position, cells)| {
            let cells = cells
                .into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| typed_cell(cell, *kind))
                .collect();
            Row::new(position, cells)
        })
        .collect();

    Ok(Table::new(columns, rows))
}

/// Name every header cell. Empty names become `Unnamed: <index>`, repeats get
/// a `.N` suffix.
fn column_names(headers: &StringRecord) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());

    for (index, header) in headers.iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("{}: {}", UNNAMED_COLUMN_PREFIX, index)
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }

        used.insert(name.clone());
        columns.push(name);
    }

    columns
}

fn missing_as_none(cell: &str) -> Option<String> {
    if MISSING_VALUE_TOKENS.contains(&cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn parse_float(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}

fn infer_kind<'a>(values: impl Iterator<Item = &'a str> + Clone) -> ColumnKind {
    let mut values = values.peekable();
    if values.peek().is_none() {
        return ColumnKind::Text;
    }
    if values.clone().all(|v| parse_integer(v).is_some()) {
        ColumnKind::Integer
    } else if values.all(|v| parse_float(v).is_some()) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

fn typed_cell(cell: Option<String>, kind: ColumnKind) -> CellValue {
    let Some(value) = cell else {
        return CellValue::Null;
    };

    match kind {
        ColumnKind::Integer => parse_integer(&value).map_or(CellValue::Null, CellValue::Integer),
        ColumnKind::Float => parse_float(&value).map_or(CellValue::Null, CellValue::Float),
        ColumnKind::Text => CellValue::Text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read(csv: &str) -> Table {
        read_table_from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_reads_rows_with_positions() {
        let table = read("hostname,country\nweb01,IN\ndb01,US\n");

        assert_eq!(table.columns(), &["hostname".to_string(), "country".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].position, 0);
        assert_eq!(table.rows()[1].position, 1);
        assert_eq!(table.cell(&table.rows()[1], "country"), Some(&CellValue::from("US")));
    }

    #[test]
    fn test_missing_tokens_become_null() {
        let table = read("hostname,country,image_purpose\nweb01,,NA\nweb02,N/A,web\n");

        let first = &table.rows()[0];
        assert!(table.cell(first, "country").unwrap().is_null());
        assert!(table.cell(first, "image_purpose").unwrap().is_null());
        let second = &table.rows()[1];
        assert!(table.cell(second, "country").unwrap().is_null());
    }

    #[test]
    fn test_spreadsheet_error_tokens_become_null() {
        let table = read(
            "hostname,performance_score\n\
             web01,#NA\n\
             web02,-1.#IND\n\
             web03,1.#QNAN\n\
             web04,#N/A N/A\n\
             web05,-nan\n\
             web06,42.5\n",
        );

        let rows = table.rows();
        for row in &rows[..5] {
            assert!(table.cell(row, "performance_score").unwrap().is_null());
        }
        assert_eq!(table.cell(&rows[5], "performance_score"), Some(&CellValue::Float(42.5)));
    }

    #[test]
    fn test_whitespace_is_not_missing() {
        let table = read("hostname,country\n   ,IN\n");
        assert_eq!(
            table.cell(&table.rows()[0], "hostname"),
            Some(&CellValue::from("   "))
        );
    }

    #[test]
    fn test_column_type_inference() {
        let table = read(
            "hostname,performance_score,os_system_id,cores\n\
             web01,87.5,00123,4\n\
             web02,90,abc,\n\
             web03,,00456,8\n",
        );

        let rows = table.rows();
        assert_eq!(table.cell(&rows[0], "performance_score"), Some(&CellValue::Float(87.5)));
        assert_eq!(table.cell(&rows[1], "performance_score"), Some(&CellValue::Float(90.0)));
        assert!(table.cell(&rows[2], "performance_score").unwrap().is_null());

        // Mixed column keeps its text, including leading zeros
        assert_eq!(table.cell(&rows[0], "os_system_id"), Some(&CellValue::from("00123")));

        assert_eq!(table.cell(&rows[0], "cores"), Some(&CellValue::Integer(4)));
        assert!(table.cell(&rows[1], "cores").unwrap().is_null());
    }

    #[test]
    fn test_unnamed_and_repeated_headers() {
        let table = read(",hostname,country,country\n0,web01,IN,US\n");

        assert_eq!(
            table.columns(),
            &[
                "Unnamed: 0".to_string(),
                "hostname".to_string(),
                "country".to_string(),
                "country.1".to_string(),
            ]
        );
    }

    #[test]
    fn test_ragged_records() {
        let table = read("hostname,country,image_purpose\nweb01\nweb02,IN,web,extra\n");

        assert_eq!(table.len(), 2);
        assert!(table.cell(&table.rows()[0], "country").unwrap().is_null());
        assert_eq!(table.rows()[1].cells.len(), 3);
    }

    #[test]
    fn test_header_only_file() {
        let table = read("hostname,country\n");
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn test_read_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");

        let result = read_table(&path);
        assert!(matches!(result, Err(PipelineError::SourceNotFound(p)) if p == path));
    }

    #[test]
    fn test_read_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hostname,country").unwrap();
        writeln!(file, "web01,IN").unwrap();
        file.flush().unwrap();

        let table = read_table(file.path()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let bytes: &[u8] = b"hostname\nweb\xff01\n";
        let result = read_table_from_reader(bytes);
        assert!(matches!(result, Err(PipelineError::ReadError(_))));
    }
}
