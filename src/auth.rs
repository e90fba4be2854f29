// User accounts stored in the workbook itself.
// The users sheet holds one `username | password hash` row per account
// (argon2, PHC string format). Every account owns a sheet named after the
// username; logging in yields a `Session` wrapping that sheet.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::store::{row_in_column, StoreError, Workbook, Worksheet};
use crate::validate::{validate_password, validate_username, ValidationError};

pub const USERS_HEADERS: [&str; 2] = ["Username", "Password"];
pub const USER_SHEET_ROWS: usize = 100;
pub const USER_SHEET_COLS: usize = 20;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("a sheet with the name '{0}' already exists")]
    UserExists(String),
    #[error("username not found")]
    UnknownUser,
    #[error("incorrect password")]
    IncorrectPassword,
    #[error("unable to access the sheet of '{0}'")]
    SheetUnavailable(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The logged-in user and their catalog.
pub struct Session<S: Worksheet> {
    pub username: String,
    pub catalog: Catalog<S>,
}

pub struct Accounts<'a, W: Workbook> {
    workbook: &'a W,
    users: W::Sheet,
}

impl<'a, W: Workbook> Accounts<'a, W> {
    /// Open the users sheet, creating it with its header row when missing.
    pub fn open(workbook: &'a W, users_sheet: &str) -> Result<Self, AuthError> {
        let users = match workbook.worksheet(users_sheet) {
            Ok(sheet) => sheet,
            Err(StoreError::SheetNotFound(_)) => {
                info!("creating users sheet '{}'", users_sheet);
                let sheet = workbook.add_worksheet(users_sheet, USER_SHEET_ROWS, 2)?;
                let header: Vec<String> = USERS_HEADERS.iter().map(|h| h.to_string()).collect();
                sheet.append_row(&header)?;
                sheet
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Accounts { workbook, users })
    }

    /// Register a user: validate, create their sheet with book headers,
    /// then record the password hash.
    pub fn create_user(&self, username: &str, password: &str, confirm: &str) -> Result<(), AuthError> {
        validate_username(username)?;
        validate_password(password, confirm)?;
        let hash = hash_password(password)?;

        let sheet = match self.workbook.add_worksheet(username, USER_SHEET_ROWS, USER_SHEET_COLS) {
            Ok(sheet) => sheet,
            Err(StoreError::DuplicateSheet(name)) => return Err(AuthError::UserExists(name)),
            Err(e) => return Err(e.into()),
        };
        Catalog::new(sheet).write_headers()?;
        self.users.append_row(&[username.to_string(), hash])?;
        info!("created user '{}'", username);
        Ok(())
    }

    /// Check credentials and open the user's sheet.
    pub fn login(&self, username: &str, password: &str) -> Result<Session<W::Sheet>, AuthError> {
        let values = self.users.values()?;
        let row = row_in_column(&values, username, 1).ok_or(AuthError::UnknownUser)?;
        let stored = values[row - 1].get(1).map(String::as_str).unwrap_or_default();
        if !verify_password(stored, password) {
            warn!("failed login for '{}'", username);
            return Err(AuthError::IncorrectPassword);
        }
        let sheet = self
            .workbook
            .worksheet(username)
            .map_err(|_| AuthError::SheetUnavailable(username.to_string()))?;
        info!("'{}' logged in", username);
        Ok(Session {
            username: username.to_string(),
            catalog: Catalog::new(sheet),
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// False for a wrong password and for anything that is not a PHC hash.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Book, HEADERS};
    use crate::store::local::LocalWorkbook;

    #[test]
    fn hashes_verify_only_their_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "wrong horse"));
        assert!(!verify_password("not a hash", "correct horse"));
    }

    #[test]
    fn open_creates_users_sheet_once() {
        let book = LocalWorkbook::in_memory();
        Accounts::open(&book, "users").unwrap();
        Accounts::open(&book, "users").unwrap();
        let values = book.worksheet("users").unwrap().values().unwrap();
        assert_eq!(values, vec![vec!["Username".to_string(), "Password".to_string()]]);
    }

    #[test]
    fn create_then_login() {
        let book = LocalWorkbook::in_memory();
        let accounts = Accounts::open(&book, "users").unwrap();
        accounts.create_user("alice", "wonderland", "wonderland").unwrap();

        let user_sheet = book.worksheet("alice").unwrap().values().unwrap();
        assert_eq!(user_sheet[0], HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>());

        let session = accounts.login("alice", "wonderland").unwrap();
        assert_eq!(session.username, "alice");
        session.catalog.add(&Book::new("Alice", "Lewis Carroll", "1865", "Fantasy")).unwrap();
        assert_eq!(book.worksheet("alice").unwrap().values().unwrap().len(), 2);
    }

    #[test]
    fn login_failures() {
        let book = LocalWorkbook::in_memory();
        let accounts = Accounts::open(&book, "users").unwrap();
        accounts.create_user("alice", "wonderland", "wonderland").unwrap();

        assert!(matches!(accounts.login("alice", "looking glass"), Err(AuthError::IncorrectPassword)));
        assert!(matches!(accounts.login("bobby", "wonderland"), Err(AuthError::UnknownUser)));
        assert!(matches!(accounts.login("Username", "Password"), Err(AuthError::UnknownUser)));
    }

    #[test]
    fn create_user_rejects_bad_input_and_duplicates() {
        let book = LocalWorkbook::in_memory();
        let accounts = Accounts::open(&book, "users").unwrap();

        assert!(matches!(
            accounts.create_user("bob", "password1", "password1"),
            Err(AuthError::Invalid(ValidationError::UsernameTooShort))
        ));
        assert!(matches!(
            accounts.create_user("bobby", "pass", "pass"),
            Err(AuthError::Invalid(ValidationError::PasswordTooShort))
        ));
        assert!(matches!(
            accounts.create_user("bobby", "password1", "password2"),
            Err(AuthError::Invalid(ValidationError::PasswordMismatch))
        ));

        accounts.create_user("bobby", "password1", "password1").unwrap();
        assert!(matches!(
            accounts.create_user("bobby", "password2", "password2"),
            Err(AuthError::UserExists(name)) if name == "bobby"
        ));
        assert!(matches!(
            accounts.create_user("users", "password2", "password2"),
            Err(AuthError::UserExists(_))
        ));
    }

    #[test]
    fn missing_user_sheet_is_unavailable() {
        let book = LocalWorkbook::in_memory();
        let accounts = Accounts::open(&book, "users").unwrap();
        let hash = hash_password("password1").unwrap();
        book.worksheet("users")
            .unwrap()
            .append_row(&["ghost".to_string(), hash])
            .unwrap();

        assert!(matches!(
            accounts.login("ghost", "password1"),
            Err(AuthError::SheetUnavailable(name)) if name == "ghost"
        ));
    }
}
