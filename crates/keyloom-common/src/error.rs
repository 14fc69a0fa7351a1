//! Error definitions for Keyloom

use thiserror::Error;

/// Represents errors that can occur during Keyloom operations.
///
/// # Example
/// ```rust
/// use keyloom_common::KeyloomError;
///
/// fn example() -> keyloom_common::Result<()> {
///     Err(KeyloomError::Parse("Unexpected token".into()))
/// }
///
/// match example() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error occurred: {e}"),
/// }
/// ```
#[derive(Error, Debug, Clone)]
pub enum KeyloomError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Channel error: {0}")]
    Channel(String),
}

pub type Result<T> = std::result::Result<T, KeyloomError>;

/// Convert std::io::Error to KeyloomError
///
/// Shortcut as it's a common error we need
/// to convert from.
impl From<std::io::Error> for KeyloomError {
    fn from(err: std::io::Error) -> Self {
        KeyloomError::Io(err.to_string())
    }
}
