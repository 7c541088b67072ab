//! Summary statistics for downstream display

use crate::formatter::check;
use crate::table::{Cell, StandardTable};
use docket_domain::{DEFAULT_NO_CITATION, FIVE_COLUMN_HEADERS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Headline numbers of a legal events table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    /// Rows in the table
    pub total_events: usize,
    /// Distinct document references
    pub unique_documents: usize,
    /// Rows with a real citation
    pub events_with_citation: usize,
    /// Mean character length of the particulars, one decimal
    pub avg_particulars_length: f64,
}

/// Summarize a table; an invalid table summarizes to zeros
pub fn summarize(table: &StandardTable) -> TableSummary {
    if check(table).is_err() {
        return TableSummary::default();
    }

    let total_events = table.len();
    let unique_documents = table
        .column(FIVE_COLUMN_HEADERS[4])
        .map(Cell::to_string)
        .collect::<HashSet<_>>()
        .len();
    let events_with_citation = table
        .column(FIVE_COLUMN_HEADERS[3])
        .filter(|c| !c.is_blank() && !c.to_string().starts_with(DEFAULT_NO_CITATION))
        .count();
    let total_length: usize = table
        .column(FIVE_COLUMN_HEADERS[2])
        .map(|c| c.to_string().chars().count())
        .sum();
    let avg = total_length as f64 / total_events as f64;

    TableSummary {
        total_events,
        unique_documents,
        events_with_citation,
        avg_particulars_length: (avg * 10.0).round() / 10.0,
    }
}
