// Book record and its mapping onto spreadsheet rows.

use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Column headers of a user's sheet, in storage order.
pub const HEADERS: [&str; 4] = ["Title", "Author", "Year Published", "Genre"];

/// One catalog entry. `year` is kept as text: it is optional and the
/// sheet stores whatever the user typed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub year: String,
    pub genre: String,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Book {
            title: title.into(),
            author: author.into(),
            year: year.into(),
            genre: genre.into(),
        }
    }

    /// Cells in column order (see `HEADERS`).
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.author.clone(),
            self.year.clone(),
            self.genre.clone(),
        ]
    }

    /// Build a book from raw row cells. Missing trailing cells are empty.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        Book {
            title: cell(0),
            author: cell(1),
            year: cell(2),
            genre: cell(3),
        }
    }

    /// Build a book from a header-keyed record.
    pub fn from_record(record: &Record) -> Self {
        let field = |name: &str| record.get(name).cloned().unwrap_or_default();
        Book {
            title: field(HEADERS[0]),
            author: field(HEADERS[1]),
            year: field(HEADERS[2]),
            genre: field(HEADERS[3]),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Year => &self.year,
            Field::Genre => &self.genre,
        }
    }
}

/// Editable fields of a book, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Author,
    Year,
    Genre,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Title, Field::Author, Field::Year, Field::Genre];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Author => "Author",
            Field::Year => "Year",
            Field::Genre => "Genre",
        }
    }

    /// 1-based spreadsheet column.
    pub fn column(self) -> usize {
        match self {
            Field::Title => 1,
            Field::Author => 2,
            Field::Year => 3,
            Field::Genre => 4,
        }
    }
}
