//! Normalization, validation and the fallback guarantee
//!
//! Every collection of event records reaches the caller through
//! [`normalize`]. Whatever goes wrong, the result satisfies [`validate`]:
//! a malformed or empty input is replaced by [`create_fallback`].

use crate::error::TableError;
use crate::table::{Cell, StandardTable};
use docket_domain::{
    EventRecord, DEFAULT_NO_CITATION, DEFAULT_NO_DATE, DEFAULT_NO_PARTICULARS,
    DEFAULT_NO_REFERENCE, FIVE_COLUMN_HEADERS,
};
use tracing::{error, info, warn};

/// Prefix of the particulars cell in a fallback table
pub const FALLBACK_PREFIX: &str = "Processing failed: ";

/// Citation of the fallback row
pub const FALLBACK_TABLE_CITATION: &str = "No citation available (processing failed)";

/// A record plus optional diagnostic cells appended after the fixed columns
#[derive(Debug, Clone, PartialEq)]
pub struct TableInput {
    /// The event
    pub record: EventRecord,
    /// `(source key, value)` pairs such as `("parse_seconds", 0.4)`
    pub diagnostics: Vec<(String, Cell)>,
}

impl From<EventRecord> for TableInput {
    fn from(record: EventRecord) -> Self {
        Self {
            record,
            diagnostics: Vec::new(),
        }
    }
}

/// Display name of a diagnostic column: `parse_seconds` becomes `Parse_Seconds`
pub fn diagnostic_column_name(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("_")
}

/// Normalize records into a standard table
pub fn normalize(records: &[EventRecord]) -> StandardTable {
    normalize_rows(records.iter().cloned().map(TableInput::from).collect())
}

/// Normalize records with diagnostic cells into a standard table.
///
/// Fills sentinels for blank fields, orders rows by their source number
/// (stable, so duplicates keep input order), renumbers `1..=n` and appends
/// diagnostic columns in first-seen order. Returns a fallback table when
/// there are no rows or the result fails validation.
pub fn normalize_rows(mut rows: Vec<TableInput>) -> StandardTable {
    if rows.is_empty() {
        warn!("No records provided; substituting fallback table");
        return create_fallback("No events extracted");
    }

    rows.sort_by_key(|row| row.record.number);

    let mut diagnostic_keys: Vec<String> = Vec::new();
    for (key, _) in rows.iter().flat_map(|r| r.diagnostics.iter()) {
        if !diagnostic_keys.contains(key) {
            diagnostic_keys.push(key.clone());
        }
    }

    let mut columns: Vec<String> = FIVE_COLUMN_HEADERS.iter().map(|h| h.to_string()).collect();
    columns.extend(diagnostic_keys.iter().map(|k| diagnostic_column_name(k)));

    let table_rows = rows
        .into_iter()
        .enumerate()
        .map(|(idx, input)| {
            let record = input.record;
            let mut row = vec![
                Cell::Int(idx as i64 + 1),
                Cell::Text(or_sentinel(record.date, DEFAULT_NO_DATE)),
                Cell::Text(or_sentinel(record.event_particulars, DEFAULT_NO_PARTICULARS)),
                Cell::Text(or_sentinel(record.citation, DEFAULT_NO_CITATION)),
                Cell::Text(or_sentinel(record.document_reference, DEFAULT_NO_REFERENCE)),
            ];
            for key in &diagnostic_keys {
                let cell = input
                    .diagnostics
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, c)| c.clone())
                    .unwrap_or(Cell::Empty);
                row.push(cell);
            }
            row
        })
        .collect();

    let table = StandardTable {
        columns,
        rows: table_rows,
    };
    match check(&table) {
        Ok(()) => {
            info!("Normalized {} records to standard format", table.len());
            table
        }
        Err(e) => {
            error!("Table validation failed after normalization: {}", e);
            create_fallback("Table validation failed")
        }
    }
}

fn or_sentinel(value: String, sentinel: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        sentinel.to_string()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Whether the table satisfies the five-column contract
pub fn validate(table: &StandardTable) -> bool {
    match check(table) {
        Ok(()) => true,
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

/// Check the five-column contract, naming the first violated rule
pub fn check(table: &StandardTable) -> Result<(), TableError> {
    if table.columns.len() < FIVE_COLUMN_HEADERS.len() {
        return Err(TableError::Invalid(format!(
            "expected at least {} columns, got {}",
            FIVE_COLUMN_HEADERS.len(),
            table.columns.len()
        )));
    }
    if table.columns[..5] != FIVE_COLUMN_HEADERS {
        return Err(TableError::Invalid(format!(
            "leading columns must be {:?}, got {:?}",
            FIVE_COLUMN_HEADERS,
            &table.columns[..5]
        )));
    }
    if table.rows.is_empty() {
        return Err(TableError::Invalid("table has no rows".to_string()));
    }
    for (idx, row) in table.rows.iter().enumerate() {
        if row.len() != table.columns.len() {
            return Err(TableError::Invalid(format!(
                "row {} has {} cells, expected {}",
                idx + 1,
                row.len(),
                table.columns.len()
            )));
        }
        if row[0].as_int() != Some(idx as i64 + 1) {
            return Err(TableError::Invalid(format!(
                "No column is not contiguous at row {}: {:?}",
                idx + 1,
                row[0]
            )));
        }
        if row[2].is_blank() {
            return Err(TableError::Invalid(format!(
                "Event Particulars is empty at row {}",
                idx + 1
            )));
        }
    }
    for (col, name) in FIVE_COLUMN_HEADERS.iter().enumerate() {
        if table.rows.iter().all(|row| row[col].is_blank()) {
            return Err(TableError::Invalid(format!("column {} has no data", name)));
        }
    }
    Ok(())
}

/// Single-row table embedding the failure reason in `Event Particulars`
pub fn create_fallback(reason: &str) -> StandardTable {
    let reason = match reason.trim() {
        "" => "Unknown error",
        r => r,
    };
    info!("Created fallback table: {}", reason);
    StandardTable {
        columns: FIVE_COLUMN_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows: vec![vec![
            Cell::Int(1),
            Cell::from(DEFAULT_NO_DATE),
            Cell::Text(format!("{}{}", FALLBACK_PREFIX, reason)),
            Cell::from(FALLBACK_TABLE_CITATION),
            Cell::from(DEFAULT_NO_REFERENCE),
        ]],
    }
}

/// The table itself if valid, otherwise a fallback naming the violation
pub fn ensure_valid(table: StandardTable, context: &str) -> StandardTable {
    match check(&table) {
        Ok(()) => table,
        Err(e) => {
            error!("{}: {}", context, e);
            create_fallback(context)
        }
    }
}
