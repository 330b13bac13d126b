pub mod source;

pub use source::{CsvSource, MemorySource, RecordSource, SourceError};

use std::sync::Arc;

/// Column holding the registration timestamp (`MM/DD/YY HH:MM`).
pub const REGDATE: &str = "regdate";

/// One roster row. Cells are addressed by their normalized header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeRecord {
    /// 1-based data-row number (the header row is not counted)
    row: u64,
    headers: Arc<Vec<String>>,
    values: Vec<String>,
}

impl AttendeeRecord {
    pub fn new(row: u64, headers: Arc<Vec<String>>, values: Vec<String>) -> Self {
        Self {
            row,
            headers,
            values,
        }
    }

    pub fn row(&self) -> u64 {
        self.row
    }

    /// Value of the first column, whatever its header.
    pub fn id(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    /// Look up a cell by symbolic field name. Missing columns and short rows
    /// both yield `None`.
    pub fn get(&self, field: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == field)?;
        self.values.get(idx).map(String::as_str)
    }

    pub fn regdate(&self) -> Option<&str> {
        self.get(REGDATE)
    }

    pub fn first_name(&self) -> Option<&str> {
        self.get("first_name")
    }

    pub fn zipcode(&self) -> Option<&str> {
        self.get("zipcode")
    }

    pub fn homephone(&self) -> Option<&str> {
        self.get("homephone")
    }
}

/// Turn a raw header cell into a symbolic field name: lower-case, drop
/// anything that is neither whitespace nor a word character, trim, then join
/// the remaining words with `_`. `"first_Name"` → `first_name`,
/// `"Zip - Code"` → `zip_code`.
pub fn normalize_header(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_whitespace() || c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("_")
}
