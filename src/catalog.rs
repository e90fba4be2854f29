// Book operations over one user's worksheet.
// Books are identified by title only: `Catalog::find` returns the first row
// whose Title cell matches exactly, so with duplicate titles the topmost row
// wins for remove and update.

use log::info;
use thiserror::Error;

use crate::book::{Book, Field, HEADERS};
use crate::store::{row_in_column, StoreError, Worksheet};
use crate::validate::{validate_text, validate_year, ValidationError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("The book '{0}' is not in the database.")]
    NotFound(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Replacement values for an update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
}

impl BookUpdate {
    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Author => &mut self.author,
            Field::Year => &mut self.year,
            Field::Genre => &mut self.genre,
        };
        *slot = Some(value);
    }

    fn apply(&self, book: &Book) -> Book {
        Book {
            title: self.title.clone().unwrap_or_else(|| book.title.clone()),
            author: self.author.clone().unwrap_or_else(|| book.author.clone()),
            year: self.year.clone().unwrap_or_else(|| book.year.clone()),
            genre: self.genre.clone().unwrap_or_else(|| book.genre.clone()),
        }
    }
}

/// Searchable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    Genre,
}

impl From<SearchField> for Field {
    fn from(f: SearchField) -> Field {
        match f {
            SearchField::Title => Field::Title,
            SearchField::Author => Field::Author,
            SearchField::Genre => Field::Genre,
        }
    }
}

/// Validate one field the way manual entry requires.
pub fn validate_field(field: Field, value: &str) -> Result<(), ValidationError> {
    match field {
        Field::Year => validate_year(value),
        other => validate_text(other.label(), value),
    }
}

/// Validate every field of a manually entered book.
pub fn validate_book(book: &Book) -> Result<(), ValidationError> {
    for field in Field::ALL {
        validate_field(field, book.field(field))?;
    }
    Ok(())
}

pub struct Catalog<S: Worksheet> {
    sheet: S,
}

impl<S: Worksheet> Catalog<S> {
    pub fn new(sheet: S) -> Self {
        Catalog { sheet }
    }

    pub fn sheet(&self) -> &S {
        &self.sheet
    }

    /// Write the header row of a freshly created sheet.
    pub fn write_headers(&self) -> Result<(), CatalogError> {
        let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        self.sheet.update_row(1, &headers)?;
        Ok(())
    }

    /// Validate and append a book.
    pub fn add(&self, book: &Book) -> Result<(), CatalogError> {
        validate_book(book)?;
        self.add_unchecked(book)
    }

    /// Append without validation; used for books fetched from the ISBN
    /// lookup whose text may contain punctuation.
    pub fn add_unchecked(&self, book: &Book) -> Result<(), CatalogError> {
        self.sheet.append_row(&book.to_row())?;
        info!("added '{}' to '{}'", book.title, self.sheet.title());
        Ok(())
    }

    /// Row number and contents of the first book titled `title`.
    pub fn find(&self, title: &str) -> Result<Option<(usize, Book)>, CatalogError> {
        let values = self.sheet.values()?;
        Ok(row_in_column(&values, title, Field::Title.column())
            .map(|row| (row, Book::from_row(&values[row - 1]))))
    }

    pub fn remove(&self, title: &str) -> Result<Book, CatalogError> {
        let (row, book) = self
            .find(title)?
            .ok_or_else(|| CatalogError::NotFound(title.to_string()))?;
        self.sheet.delete_row(row)?;
        info!("removed '{}' (row {}) from '{}'", title, row, self.sheet.title());
        Ok(book)
    }

    /// Overwrite all four cells of the first book titled `title`, keeping
    /// stored values for fields the update leaves unset.
    pub fn update(&self, title: &str, update: &BookUpdate) -> Result<Book, CatalogError> {
        let (row, current) = self
            .find(title)?
            .ok_or_else(|| CatalogError::NotFound(title.to_string()))?;
        for (field, value) in [
            (Field::Title, &update.title),
            (Field::Author, &update.author),
            (Field::Year, &update.year),
            (Field::Genre, &update.genre),
        ] {
            if let Some(value) = value {
                validate_field(field, value)?;
            }
        }
        let updated = update.apply(&current);
        self.sheet.update_row(row, &updated.to_row())?;
        info!("updated '{}' (row {}) in '{}'", title, row, self.sheet.title());
        Ok(updated)
    }

    pub fn all(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.sheet.records()?.iter().map(Book::from_record).collect())
    }

    /// Books whose `field` contains `query`, ignoring case. An empty query
    /// matches nothing.
    pub fn search(&self, field: SearchField, query: &str) -> Result<Vec<Book>, CatalogError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let field = Field::from(field);
        Ok(self
            .all()?
            .into_iter()
            .filter(|b| b.field(field).to_lowercase().contains(&needle))
            .collect())
    }
}
