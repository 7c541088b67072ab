//! The standard legal events table

use serde::{Serialize, Serializer};
use std::fmt;

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Integer, used by the `No` column
    Int(i64),
    /// Floating point, used by timing columns
    Float(f64),
    /// Text
    Text(String),
    /// No value
    Empty,
}

impl Cell {
    /// Text content, if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer cell
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// True for [`Cell::Empty`] and blank text
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Float(x)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Int(n) => serializer.serialize_i64(*n),
            Cell::Float(x) => serializer.serialize_f64(*x),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Empty => serializer.serialize_none(),
        }
    }
}

/// Five fixed leading columns plus optional diagnostic columns.
///
/// Fields are public so malformed tables can be represented; build valid
/// ones through [`crate::normalize`] or [`crate::create_fallback`] and check
/// arbitrary ones with [`crate::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct StandardTable {
    /// Column names, in order
    pub columns: Vec<String>,
    /// Rows, each as long as `columns`
    pub rows: Vec<Vec<Cell>>,
}

impl StandardTable {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Cell> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Columns after the fixed five
    pub fn diagnostic_columns(&self) -> &[String] {
        self.columns.get(5..).unwrap_or(&[])
    }

    /// True when this is a single fallback row
    pub fn is_fallback(&self) -> bool {
        self.rows.len() == 1
            && self
                .column(docket_domain::FIVE_COLUMN_HEADERS[2])
                .next()
                .and_then(Cell::as_text)
                .is_some_and(|p| p.starts_with(crate::formatter::FALLBACK_PREFIX))
    }
}
