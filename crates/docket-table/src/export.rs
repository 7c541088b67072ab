//! Serialization of standard tables
//!
//! [`export`] never fails: an invalid table is swapped for a fallback before
//! writing, and a writer error produces a fallback table in the requested
//! format. CSV is the last resort when even that cannot be written.

use crate::error::TableError;
use crate::formatter::{check, create_fallback, ensure_valid};
use crate::table::{Cell, StandardTable};
use rust_xlsxwriter::{Format, Workbook};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error};

/// Name of the worksheet holding the table
pub const SHEET_NAME: &str = "Legal Events";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// UTF-8 CSV with a header row
    Csv,
    /// JSON array of objects keyed by column name
    Json,
    /// Spreadsheet workbook, table on the first sheet
    Xlsx,
}

impl ExportFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// MIME type for downloads
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" | "spreadsheet" => Ok(ExportFormat::Xlsx),
            other => Err(TableError::UnknownFormat(other.to_string())),
        }
    }
}

/// Serialize a table, substituting a fallback when it is invalid
pub fn export(table: &StandardTable, format: ExportFormat) -> Vec<u8> {
    let owned;
    let table = if check(table).is_ok() {
        table
    } else {
        owned = ensure_valid(table.clone(), "Invalid format for export");
        &owned
    };

    match write(table, format) {
        Ok(bytes) => {
            debug!("Exported {} rows as {} ({} bytes)", table.len(), format, bytes.len());
            bytes
        }
        Err(e) => {
            error!("Export as {} failed: {}", format, e);
            let fallback = create_fallback(&format!("Export error: {}", e));
            write(&fallback, format).unwrap_or_else(|e| {
                error!("Fallback export as {} failed: {}", format, e);
                fallback_csv(&format!("Export error: {}", e))
            })
        }
    }
}

fn write(table: &StandardTable, format: ExportFormat) -> Result<Vec<u8>, TableError> {
    match format {
        ExportFormat::Csv => to_csv(table),
        ExportFormat::Json => to_json(table),
        ExportFormat::Xlsx => to_xlsx(table),
    }
}

/// Serialize by format name; an unknown name yields a fallback CSV
pub fn export_as(table: &StandardTable, format: &str) -> Vec<u8> {
    match format.parse::<ExportFormat>() {
        Ok(format) => export(table, format),
        Err(e) => {
            error!("{}", e);
            fallback_csv(&format!("Export error: {}", e))
        }
    }
}

fn fallback_csv(reason: &str) -> Vec<u8> {
    let table = create_fallback(reason);
    // The fallback table only holds short text and integers
    to_csv(&table).unwrap_or_else(|_| {
        let row: Vec<String> = table.rows[0].iter().map(|c| c.to_string()).collect();
        format!("{}\n{}\n", table.columns.join(","), row.join(",")).into_bytes()
    })
}

/// CSV bytes with a header row
pub fn to_csv(table: &StandardTable) -> Result<Vec<u8>, TableError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    Ok(writer.into_inner()?)
}

struct JsonRow<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

struct JsonTable<'a>(&'a StandardTable);

impl Serialize for JsonTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.rows.len()))?;
        for cells in &self.0.rows {
            seq.serialize_element(&JsonRow {
                columns: &self.0.columns,
                cells,
            })?;
        }
        seq.end()
    }
}

/// Pretty JSON array, keys in column order
pub fn to_json(table: &StandardTable) -> Result<Vec<u8>, TableError> {
    Ok(serde_json::to_vec_pretty(&JsonTable(table))?)
}

/// Spreadsheet workbook bytes
pub fn to_xlsx(table: &StandardTable) -> Result<Vec<u8>, TableError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string_with_format(0, column_number(col)?, name.as_str(), &header)?;
    }
    for (idx, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(idx + 1)
            .map_err(|_| TableError::Invalid(format!("row {} exceeds sheet limits", idx + 1)))?;
        for (col, cell) in row.iter().enumerate() {
            let col = column_number(col)?;
            match cell {
                Cell::Int(n) => {
                    sheet.write_number(row_num, col, *n as f64)?;
                }
                Cell::Float(x) => {
                    sheet.write_number(row_num, col, *x)?;
                }
                Cell::Text(s) => {
                    sheet.write_string(row_num, col, s.as_str())?;
                }
                Cell::Empty => {}
            }
        }
    }
    sheet.set_column_width(2, 80)?;
    Ok(workbook.save_to_buffer()?)
}

fn column_number(col: usize) -> Result<u16, TableError> {
    u16::try_from(col)
        .map_err(|_| TableError::Invalid(format!("column {} exceeds sheet limits", col)))
}
