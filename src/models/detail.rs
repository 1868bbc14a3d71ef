//! Case record scraped from a press-release table.

use serde::Serialize;

/// Number of fixed-position columns in the case table.
pub const DETAIL_COLUMNS: usize = 8;

/// One row of the case table, verbatim apart from whitespace trimming.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Detail {
    pub no: String,
    pub old_no: String,
    pub fixed_date: String,
    pub age: String,
    pub gender: String,
    /// Free-text prefecture, used as the grouping category
    pub prefecture: String,
    pub effective: String,
    pub status: String,
}

impl Detail {
    /// Build a record from the cells in column order.
    pub fn from_cells(cells: [String; DETAIL_COLUMNS]) -> Self {
        let [no, old_no, fixed_date, age, gender, prefecture, effective, status] = cells;
        Self {
            no,
            old_no,
            fixed_date,
            age,
            gender,
            prefecture,
            effective,
            status,
        }
    }

    /// Category this record is counted under.
    pub fn category(&self) -> &str {
        &self.prefecture
    }
}
