use sqlx::{
    ConnectOptions, Connection,
    postgres::{PgConnectOptions, PgConnection},
};
use tracing::debug;

use super::{Driver, DriverError, Handle};
use crate::tls::TlsConfig;

/// `PostgreSQL` driver backed by a single sqlx connection per attempt
#[derive(Debug, Clone, Copy, Default)]
pub struct PgDriver;

impl PgDriver {
    fn options(
        url: &str,
        username: &str,
        password: &str,
        tls: &TlsConfig,
    ) -> Result<PgConnectOptions, sqlx::Error> {
        let options = url
            .parse::<PgConnectOptions>()?
            .username(username)
            .password(password);

        Ok(tls.apply(options))
    }
}

impl Driver for PgDriver {
    type Handle = PgHandle;

    async fn connect(
        &self,
        url: &str,
        username: &str,
        password: &str,
        tls: &TlsConfig,
    ) -> Result<Option<PgHandle>, DriverError> {
        let options = Self::options(url, username, password, tls)?;

        debug!(url, tls = %tls.mode, "opening connection");
        let conn = options.connect().await?;

        Ok(Some(PgHandle { conn }))
    }
}

/// An open `PostgreSQL` connection
#[derive(Debug)]
pub struct PgHandle {
    conn: PgConnection,
}

impl Handle for PgHandle {
    async fn is_open(&mut self) -> bool {
        match self.conn.ping().await {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "ping failed");
                false
            }
        }
    }

    async fn close(self) -> Result<(), DriverError> {
        self.conn.close().await?;
        Ok(())
    }
}
