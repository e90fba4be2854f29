// ISBN lookup against the Google Books volumes API. The first volume of
// the result is turned into a `Book`; missing authors, date or categories
// become "Unknown".

use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::book::Book;

pub const DEFAULT_BOOKS_URL: &str = "https://www.googleapis.com/books/v1";
const UNKNOWN: &str = "Unknown";

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Book not found")]
    BookNotFound,
    #[error("Invalid ISBN. Please try again.")]
    InvalidIsbn,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Deserialize, Debug)]
struct Volumes {
    items: Option<Vec<Volume>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    authors: Option<Vec<String>>,
    published_date: Option<String>,
    categories: Option<Vec<String>>,
}

impl VolumeInfo {
    fn into_book(self) -> Option<Book> {
        let title = self.title?;
        let join = |v: Option<Vec<String>>| match v {
            Some(list) if !list.is_empty() => list.join(", "),
            _ => UNKNOWN.to_string(),
        };
        let year = self
            .published_date
            .map(|d| d.chars().take(4).collect())
            .unwrap_or_else(|| UNKNOWN.to_string());
        Some(Book {
            title,
            author: join(self.authors),
            year,
            genre: join(self.categories),
        })
    }
}

#[derive(Clone)]
pub struct BooksClient {
    client: Client,
    base_url: String,
}

impl BooksClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(BooksClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn lookup(&self, isbn: &str) -> Result<Book, LookupError> {
        let url = format!("{}/volumes", self.base_url);
        let query = format!("isbn:{}", isbn.trim());
        debug!("looking up {}", query);
        let res = self.client.get(&url).query(&[("q", query.as_str())]).send()?;
        if !res.status().is_success() {
            warn!("books API returned {} for {}", res.status(), query);
            return Err(LookupError::BookNotFound);
        }
        let volumes: Volumes = res.json().map_err(|_| LookupError::InvalidIsbn)?;
        volumes
            .items
            .and_then(|items| items.into_iter().next())
            .and_then(|v| v.volume_info.into_book())
            .ok_or(LookupError::InvalidIsbn)
    }
}
