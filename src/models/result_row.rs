//! One scraped result record

use serde::{Deserialize, Serialize};

/// A single student's scraped result, one CSV row in the artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Full roll number (prefix + index)
    pub roll_number: String,
    /// Student name as printed by the portal
    pub name: String,
    /// Result text (e.g. "PASS", "FAIL")
    pub status: String,
    /// Semester grade point average, kept verbatim as portal text
    pub sgpa: String,
    /// Cumulative grade point average, kept verbatim as portal text
    pub cgpa: String,
}

impl ResultRow {
    /// CSV header matching [`csv_record`](Self::csv_record)'s column order
    pub const CSV_HEADER: &'static str = "roll_number,name,status,sgpa,cgpa";

    /// Render this row as one CSV record (no trailing newline).
    pub fn csv_record(&self) -> String {
        [
            self.roll_number.as_str(),
            self.name.as_str(),
            self.status.as_str(),
            self.sgpa.as_str(),
            self.cgpa.as_str(),
        ]
        .iter()
        .map(|field| escape_csv(field))
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
