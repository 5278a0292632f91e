//! Sanitizer module for the asset indexer pipeline.
//!
//! Turns the loaded table into one where every row has a usable, unique key:
//!
//! 1. Rows with a null or blank key are dropped
//! 2. Bookkeeping columns (`Unnamed: N`) are dropped
//! 3. Every row whose key occurs more than once is renamed `<key>_dup_<position>`
//! 4. The installation date is reformatted from `DD-MM-YYYY` to `YYYY-MM-DD`

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::reader::UNNAMED_COLUMN_PREFIX;
use asset_indexer_shared::{CellValue, Table};

/// Format the date column is expected in.
pub const DATE_INPUT_FORMAT: &str = "%d-%m-%Y";

/// Format the date column is rewritten to.
pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// What the sanitizer changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizeReport {
    /// Rows before sanitizing.
    pub initial_rows: usize,
    /// Rows dropped for a null or blank key.
    pub blank_keys_dropped: usize,
    /// Names of dropped bookkeeping columns.
    pub dropped_columns: Vec<String>,
    /// Rows whose key was suffixed because it was not unique.
    pub duplicate_keys_renamed: usize,
    /// Renamed keys that match a hostname already in the input.
    pub suffix_collisions: usize,
    /// Dates successfully reformatted.
    pub dates_normalized: usize,
    /// Dates replaced with null because they were missing or unparsable.
    pub dates_cleared: usize,
    /// Rows after sanitizing.
    pub final_rows: usize,
}

/// Cleans a table before documents are built from it.
#[derive(Debug, Clone)]
pub struct RowSanitizer {
    key_column: String,
    date_column: Option<String>,
}

impl RowSanitizer {
    /// Create a sanitizer for the given key and date columns.
    pub fn new(key_column: impl Into<String>, date_column: Option<String>) -> Self {
        Self {
            key_column: key_column.into(),
            date_column,
        }
    }

    /// Create a sanitizer from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.key_column.clone(), config.date_column.clone())
    }

    /// Sanitize `table`. Rows are only ever dropped, never added.
    ///
    /// # Returns
    ///
    /// * `Ok((Table, SanitizeReport))` - The cleaned table and what changed
    /// * `Err(PipelineError::MissingColumn)` - If the key column is absent
    #[instrument(skip(self, table), fields(rows = table.len()))]
    pub fn sanitize(&self, mut table: Table) -> Result<(Table, SanitizeReport), PipelineError> {
        let mut report = SanitizeReport {
            initial_rows: table.len(),
            ..Default::default()
        };

        let key_idx = table
            .column_index(&self.key_column)
            .ok_or_else(|| PipelineError::missing_column(&self.key_column))?;

        table.retain_rows(|row| has_usable_key(&row.cells[key_idx]));
        report.blank_keys_dropped = report.initial_rows - table.len();

        report.dropped_columns = table.drop_columns(|name| name.starts_with(UNNAMED_COLUMN_PREFIX));
        if !report.dropped_columns.is_empty() {
            debug!(columns = ?report.dropped_columns, "Dropped bookkeeping columns");
        }

        (report.duplicate_keys_renamed, report.suffix_collisions) =
            self.rename_duplicate_keys(&mut table)?;
        if report.duplicate_keys_renamed > 0 {
            warn!(
                count = report.duplicate_keys_renamed,
                "Found duplicate hostnames, adding unique suffixes"
            );
        }

        if let Some(date_idx) = self
            .date_column
            .as_deref()
            .and_then(|name| table.column_index(name))
        {
            for row in table.rows_mut() {
                let cell = &mut row.cells[date_idx];
                let normalized = normalize_date(cell);
                if normalized.is_null() {
                    if !cell.is_null() {
                        debug!(position = row.position, value = ?cell, "Unparsable date cleared");
                    }
                    report.dates_cleared += 1;
                } else {
                    report.dates_normalized += 1;
                }
                *cell = normalized;
            }
        }

        report.final_rows = table.len();
        info!(
            initial = report.initial_rows,
            cleaned = report.final_rows,
            dates_normalized = report.dates_normalized,
            dates_cleared = report.dates_cleared,
            "Data cleaned"
        );

        Ok((table, report))
    }

    /// Suffix every key that occurs more than once with the row's position.
    /// The first occurrence is renamed too.
    ///
    /// Returns the number of renamed rows and how many of the new keys were
    /// already present in the input.
    fn rename_duplicate_keys(&self, table: &mut Table) -> Result<(usize, usize), PipelineError> {
        // Column set can change when bookkeeping columns are dropped
        let key_idx = table
            .column_index(&self.key_column)
            .ok_or_else(|| PipelineError::missing_column(&self.key_column))?;

        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for row in table.rows() {
            if let Some(key) = row.cells[key_idx].render() {
                *occurrences.entry(key).or_default() += 1;
            }
        }

        let mut renamed = 0;
        let mut collisions = 0;
        for row in table.rows_mut() {
            let Some(key) = row.cells[key_idx].render() else {
                continue;
            };
            if occurrences.get(&key).copied().unwrap_or(0) > 1 {
                let new_key = format!("{}_dup_{}", key, row.position);
                if occurrences.contains_key(&new_key) {
                    warn!(
                        position = row.position,
                        key = %new_key,
                        "Renamed hostname collides with an existing hostname"
                    );
                    collisions += 1;
                }
                row.cells[key_idx] = CellValue::Text(new_key);
                renamed += 1;
            }
        }

        Ok((renamed, collisions))
    }
}

fn has_usable_key(cell: &CellValue) -> bool {
    cell.render().is_some_and(|key| !key.trim().is_empty())
}

/// Reformat a `DD-MM-YYYY` date as `YYYY-MM-DD`.
///
/// Anything that does not parse, and null or blank input, becomes `Null`.
pub fn normalize_date(value: &CellValue) -> CellValue {
    let Some(text) = value.render() else {
        return CellValue::Null;
    };

    let text = text.trim();
    if text.is_empty() {
        return CellValue::Null;
    }

    // chrono's %Y also takes short or signed years
    if !has_four_digit_year(text) {
        return CellValue::Null;
    }

    match NaiveDate::parse_from_str(text, DATE_INPUT_FORMAT) {
        Ok(date) => CellValue::Text(date.format(DATE_OUTPUT_FORMAT).to_string()),
        Err(_) => CellValue::Null,
    }
}

fn has_four_digit_year(text: &str) -> bool {
    text.rsplit_once('-')
        .is_some_and(|(_, year)| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()))
}
