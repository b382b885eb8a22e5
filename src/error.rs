//! Application-wide error types.
//!
//! Component-level failures ([`OracleError`](crate::oracle::OracleError),
//! [`ParseError`](crate::parse::ParseError)) live in their own modules and
//! convert into [`AppError`] at the engine boundary via `#[from]`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Oracle(#[from] crate::oracle::OracleError),

    #[error(transparent)]
    Parse(#[from] crate::parse::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
