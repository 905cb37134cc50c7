pub mod postgres;

pub use postgres::{PgDriver, PgHandle};

use crate::tls::TlsConfig;
use std::{error, fmt, future::Future};

/// Error raised while acquiring a connection
#[derive(Debug)]
pub enum DriverError {
    Sqlx(sqlx::Error),
    Message(String),
}

impl DriverError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // the server's own text, without sqlx's "error returned from database" prefix
            Self::Sqlx(sqlx::Error::Database(db_err)) => f.write_str(db_err.message()),
            Self::Sqlx(err) => err.fmt(f),
            Self::Message(message) => f.write_str(message),
        }
    }
}

impl error::Error for DriverError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Sqlx(err) => Some(err),
            Self::Message(_) => None,
        }
    }
}

impl From<sqlx::Error> for DriverError {
    fn from(err: sqlx::Error) -> Self {
        Self::Sqlx(err)
    }
}

/// Something that can open database connections
pub trait Driver {
    type Handle: Handle;

    /// Open a connection to `url` authenticating as `username`, using `tls`
    /// for transport security.
    ///
    /// `Ok(None)` means the driver produced no handle.
    fn connect(
        &self,
        url: &str,
        username: &str,
        password: &str,
        tls: &TlsConfig,
    ) -> impl Future<Output = Result<Option<Self::Handle>, DriverError>>;
}

/// An acquired connection
pub trait Handle {
    fn is_open(&mut self) -> impl Future<Output = bool>;

    /// Release the connection
    fn close(self) -> impl Future<Output = Result<(), DriverError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_message_display() {
        let err = DriverError::new("auth failed");
        assert_eq!(err.to_string(), "auth failed");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_sqlx_display() {
        let err = DriverError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.to_string(), sqlx::Error::PoolTimedOut.to_string());
        assert!(err.source().is_some());
    }
}
