// Row store abstraction over a spreadsheet.
// A `Workbook` holds named worksheets; a `Worksheet` is a grid of text cells
// addressed with 1-based rows and columns, as in A1 notation. Row 1 is the
// header row used by `Worksheet::records`.
// Two backends implement these traits: `sheets` talks to the Google Sheets
// REST API, `local` keeps the grid in memory and optionally in a JSON file.

use std::collections::HashMap;

use thiserror::Error;

pub mod local;
pub mod sheets;

/// One data row keyed by the sheet's header cells.
pub type Record = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("spreadsheet API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("a sheet named '{0}' already exists")]
    DuplicateSheet(String),
    #[error("no sheet named '{0}'")]
    SheetNotFound(String),
    #[error("row {0} is out of range")]
    RowOutOfRange(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// Position of a cell, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

pub trait Worksheet {
    fn title(&self) -> &str;

    /// Every non-empty row of the sheet, header included.
    fn values(&self) -> Result<Vec<Vec<String>>, StoreError>;

    fn append_row(&self, row: &[String]) -> Result<(), StoreError>;

    fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError>;

    /// Overwrite the first `values.len()` cells of `row`. Backends that can
    /// write a range at once should override this.
    fn update_row(&self, row: usize, values: &[String]) -> Result<(), StoreError> {
        for (i, value) in values.iter().enumerate() {
            self.update_cell(row, i + 1, value)?;
        }
        Ok(())
    }

    /// Delete a row; rows below shift up by one.
    fn delete_row(&self, row: usize) -> Result<(), StoreError>;

    /// First cell whose text equals `value`, scanning row by row.
    fn find(&self, value: &str) -> Result<Option<Cell>, StoreError> {
        let values = self.values()?;
        for (r, row) in values.iter().enumerate() {
            if let Some(c) = row.iter().position(|v| v == value) {
                return Ok(Some(Cell { row: r + 1, col: c + 1 }));
            }
        }
        Ok(None)
    }

    /// First data row (below the header) whose cell in `col` equals `value`.
    /// Column 0 never matches.
    fn find_in_column(&self, value: &str, col: usize) -> Result<Option<Cell>, StoreError> {
        let values = self.values()?;
        Ok(row_in_column(&values, value, col).map(|row| Cell { row, col }))
    }

    fn cell(&self, row: usize, col: usize) -> Result<Option<String>, StoreError> {
        let values = self.values()?;
        Ok(values
            .get(row.wrapping_sub(1))
            .and_then(|r| r.get(col.wrapping_sub(1)))
            .cloned())
    }

    fn row_values(&self, row: usize) -> Result<Vec<String>, StoreError> {
        let mut values = self.values()?;
        if row == 0 || row > values.len() {
            return Ok(Vec::new());
        }
        Ok(values.swap_remove(row - 1))
    }

    /// Data rows as header-keyed records. Short rows are padded with "".
    fn records(&self) -> Result<Vec<Record>, StoreError> {
        let values = self.values()?;
        let mut rows = values.into_iter();
        let headers = match rows.next() {
            Some(h) => h,
            None => return Ok(Vec::new()),
        };
        Ok(rows
            .map(|row| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect())
    }
}

pub trait Workbook {
    type Sheet: Worksheet;

    fn worksheet(&self, title: &str) -> Result<Self::Sheet, StoreError>;

    fn add_worksheet(&self, title: &str, rows: usize, cols: usize)
        -> Result<Self::Sheet, StoreError>;
}

/// 1-based number of the first data row of `values` whose cell in `col`
/// equals `value`. The header row is skipped.
pub fn row_in_column(values: &[Vec<String>], value: &str, col: usize) -> Option<usize> {
    let idx = col.checked_sub(1)?;
    values
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| row.get(idx).map(String::as_str) == Some(value))
        .map(|(r, _)| r + 1)
}

/// Column letters for a 1-based column index (1 -> A, 27 -> AA).
pub fn column_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// A1 reference of a cell inside a named sheet, e.g. `'my books'!B3`.
pub fn a1_cell(sheet: &str, row: usize, col: usize) -> String {
    format!("{}!{}{}", quote_sheet(sheet), column_letters(col), row)
}

/// A1 range covering the first `cols` cells of a row, e.g. `'alice'!A3:D3`.
pub fn a1_row(sheet: &str, row: usize, cols: usize) -> String {
    format!("{}!A{}:{}{}", quote_sheet(sheet), row, column_letters(cols.max(1)), row)
}

/// Quote a sheet title for A1 notation, doubling embedded quotes.
pub fn quote_sheet(sheet: &str) -> String {
    format!("'{}'", sheet.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_roll_over_after_z() {
        assert_eq!(column_letters(1), "A");
        assert_eq!(column_letters(4), "D");
        assert_eq!(column_letters(26), "Z");
        assert_eq!(column_letters(27), "AA");
        assert_eq!(column_letters(52), "AZ");
        assert_eq!(column_letters(703), "AAA");
    }

    #[test]
    fn sheet_titles_are_quoted() {
        assert_eq!(a1_cell("alice", 1, 2), "'alice'!B1");
        assert_eq!(a1_cell("o'brien", 3, 4), "'o''brien'!D3");
        assert_eq!(a1_row("alice", 3, 4), "'alice'!A3:D3");
    }

    #[test]
    fn column_zero_matches_nothing() {
        let values = vec![
            vec!["Title".to_string(), "Author".to_string()],
            vec!["Dune".to_string(), "Frank Herbert".to_string()],
        ];
        assert_eq!(row_in_column(&values, "Dune", 0), None);
        assert_eq!(row_in_column(&values, "Dune", 1), Some(2));
        assert_eq!(row_in_column(&values, "Title", 1), None);
        assert_eq!(row_in_column(&values, "Dune", 3), None);
    }
}
