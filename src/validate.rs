// Input validation for book fields and account credentials.
//
// Each validator returns the message shown to the user on failure, so the
// UI can print the error as-is and ask again.

use thiserror::Error;

pub const MIN_TEXT_LEN: usize = 2;
pub const MIN_USERNAME_LEN: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {field}. Minimum 2 alphanumeric characters.")]
    Text { field: String },
    #[error("Invalid year. Please enter digits only.")]
    Year,
    #[error("Username must have at least 4 characters.")]
    UsernameTooShort,
    #[error("Password must have at least 8 characters.")]
    PasswordTooShort,
    #[error("Passwords do not match.")]
    PasswordMismatch,
}

/// Title, author and genre: letters, digits and spaces, with at least two
/// letters or digits.
pub fn validate_text(field: &str, value: &str) -> Result<(), ValidationError> {
    let mut alnum = 0usize;
    for c in value.chars() {
        if c == ' ' {
            continue;
        }
        if !c.is_alphanumeric() {
            return Err(ValidationError::Text { field: field.to_string() });
        }
        alnum += 1;
    }
    if alnum < MIN_TEXT_LEN {
        return Err(ValidationError::Text { field: field.to_string() });
    }
    Ok(())
}

/// Year is optional; when present it must be digits only.
pub fn validate_year(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::Year)
    }
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(())
}

pub fn validate_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_needs_two_alphanumeric_characters() {
        assert!(validate_text("Title", "").is_err());
        assert!(validate_text("Title", "a").is_err());
        assert!(validate_text("Title", "a ").is_err());
        assert!(validate_text("Title", "   ").is_err());
        assert!(validate_text("Title", "It").is_ok());
        assert!(validate_text("Title", "The Hobbit").is_ok());
        assert!(validate_text("Title", "Catch 22").is_ok());
    }

    #[test]
    fn text_rejects_punctuation() {
        let err = validate_text("Author", "J.R.R. Tolkien").unwrap_err();
        assert_eq!(err.to_string(), "Invalid Author. Minimum 2 alphanumeric characters.");
        assert!(validate_text("Title", "Dune!").is_err());
    }

    #[test]
    fn text_accepts_non_ascii_letters() {
        assert!(validate_text("Author", "Gabriel García Márquez").is_ok());
    }

    #[test]
    fn year_is_empty_or_digits() {
        assert!(validate_year("").is_ok());
        assert!(validate_year("1984").is_ok());
        assert!(validate_year("19x4").is_err());
        assert!(validate_year("-200").is_err());
        assert!(validate_year(" 1999").is_err());
    }

    #[test]
    fn credentials() {
        assert_eq!(validate_username("bob"), Err(ValidationError::UsernameTooShort));
        assert!(validate_username("bobby").is_ok());
        assert_eq!(validate_password("short", "short"), Err(ValidationError::PasswordTooShort));
        assert_eq!(
            validate_password("long enough", "long enuff"),
            Err(ValidationError::PasswordMismatch)
        );
        assert!(validate_password("long enough", "long enough").is_ok());
    }
}
