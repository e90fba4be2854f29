// Runtime configuration: command-line overrides first, then environment
// variables, then defaults.

use std::path::PathBuf;

use thiserror::Error;

use crate::lookup::DEFAULT_BOOKS_URL;
use crate::paging::DEFAULT_PAGE_SIZE;
use crate::store::sheets::DEFAULT_API_URL;

pub const DEFAULT_USERS_SHEET: &str = "users";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BOOKWORM_ACCESS_TOKEN must be set to use spreadsheet '{0}'")]
    MissingToken(String),
    #[error("invalid page size '{0}'")]
    InvalidPageSize(String),
    #[error("no data directory found; set BOOKWORM_LOCAL_FILE")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Google Sheets spreadsheet addressed by id.
    Sheets {
        api_url: String,
        spreadsheet_id: String,
        access_token: String,
    },
    /// JSON file on disk.
    Local { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub books_url: String,
    pub users_sheet: String,
    pub page_size: usize,
}

/// Settings given on the command line. They take precedence over the
/// environment and are applied before anything is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub local: Option<PathBuf>,
    pub spreadsheet_id: Option<String>,
    pub page_size: Option<String>,
}

impl Config {
    /// Build the configuration from `overrides` and the `BOOKWORM_*`
    /// environment variables. A local file override wins; otherwise a
    /// spreadsheet id selects the Sheets backend, and without one books are
    /// kept in a local file.
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        overrides: &Overrides,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let spreadsheet_id = overrides
            .spreadsheet_id
            .clone()
            .or_else(|| get("BOOKWORM_SPREADSHEET_ID"));
        let backend = match (&overrides.local, spreadsheet_id) {
            (Some(path), _) => Backend::Local { path: path.clone() },
            (None, Some(id)) => Backend::Sheets {
                api_url: get("BOOKWORM_SHEETS_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
                access_token: get("BOOKWORM_ACCESS_TOKEN")
                    .ok_or_else(|| ConfigError::MissingToken(id.clone()))?,
                spreadsheet_id: id,
            },
            (None, None) => Backend::Local {
                path: match get("BOOKWORM_LOCAL_FILE") {
                    Some(p) => PathBuf::from(p),
                    None => default_local_file()?,
                },
            },
        };

        let page_size = match overrides.page_size.clone().or_else(|| get("BOOKWORM_PAGE_SIZE")) {
            Some(raw) => parse_page_size(&raw)?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Config {
            backend,
            books_url: get("BOOKWORM_BOOKS_URL").unwrap_or_else(|| DEFAULT_BOOKS_URL.into()),
            users_sheet: get("BOOKWORM_USERS_SHEET").unwrap_or_else(|| DEFAULT_USERS_SHEET.into()),
            page_size,
        })
    }
}

pub fn parse_page_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidPageSize(raw.to_string())),
    }
}

fn default_local_file() -> Result<PathBuf, ConfigError> {
    let dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    Ok(dir.join("bookworm").join("library.json"))
}
