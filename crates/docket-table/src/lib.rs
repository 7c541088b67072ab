//! Docket Table Formatter
//!
//! The single path through which event records reach callers. Guarantees a
//! table whose first five columns are always
//! `No, Date, Event Particulars, Citation, Document Reference`, with `No`
//! running `1..=n` and `Event Particulars` never empty, even when everything
//! upstream failed.
//!
//! # Examples
//!
//! ```
//! use docket_domain::EventRecord;
//! use docket_table::{export, normalize, summarize, validate, ExportFormat};
//!
//! let table = normalize(&[EventRecord::new(4, "2024-03-01", "Hearing held", "", "order.pdf")]);
//! assert!(validate(&table));
//! assert_eq!(summarize(&table).total_events, 1);
//!
//! let csv = export(&table, ExportFormat::Csv);
//! assert!(csv.starts_with(b"No,Date,Event Particulars,Citation,Document Reference"));
//! ```

#![warn(missing_docs)]

mod error;
mod export;
mod formatter;
mod summary;
mod table;

pub use error::TableError;
pub use export::{export, export_as, to_csv, to_json, to_xlsx, ExportFormat, SHEET_NAME};
pub use formatter::{
    check, create_fallback, diagnostic_column_name, ensure_valid, normalize, normalize_rows,
    validate, TableInput, FALLBACK_PREFIX, FALLBACK_TABLE_CITATION,
};
pub use summary::{summarize, TableSummary};
pub use table::{Cell, StandardTable};
