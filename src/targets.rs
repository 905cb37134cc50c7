use crate::tls::{TlsConfig, TlsMode};
use anyhow::{Context, Result, anyhow, bail};
use dsn::DSN;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;

/// (database, username, password), checked in this order
const DEFAULT_CREDENTIALS: [(&str, &str, &str); 3] = [
    ("orders_db", "orders_user", "orders_pass"),
    ("payments_db", "payments_user", "payments_pass"),
    ("inventory_db", "inventory_user", "inventory_pass"),
];

/// Characters escaped in the database path segment and in query values
const URL_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Name prefix of the socket file inside a `PostgreSQL` socket directory
const SOCKET_PREFIX: &str = ".s.PGSQL.";

/// One database to connect to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Unix socket directory, replaces `host` for connecting
    pub socket: Option<PathBuf>,
    pub tls: TlsConfig,
}

impl ConnectionTarget {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            username: username.into(),
            password: password.into(),
            socket: None,
            tls: TlsConfig::default(),
        }
    }

    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Build a target from a DSN.
    ///
    /// Host and port fall back to `host`/`port` when the DSN has no address,
    /// TLS settings from the DSN query (`sslmode`, `sslrootcert`, `sslcert`,
    /// `sslkey` and their `ssl-*` spellings) take precedence over `tls`.
    ///
    /// # Errors
    ///
    /// Returns an error if the DSN is not for `PostgreSQL`, names no database
    /// or carries an invalid `sslmode`
    pub fn from_dsn(dsn: &DSN, host: &str, port: u16, tls: &TlsConfig) -> Result<Self> {
        if !matches!(dsn.driver.as_str(), "postgres" | "postgresql") {
            bail!("unsupported driver: {}", dsn.driver);
        }

        let Some(database) = dsn.database.as_deref().filter(|db| !db.is_empty()) else {
            bail!("DSN has no database name");
        };

        let mut target = Self::new(
            host,
            dsn.port.unwrap_or(port),
            database,
            dsn.username.clone().unwrap_or_default(),
            dsn.password.clone().unwrap_or_default(),
        )
        .with_tls(tls_from_dsn(dsn, tls)?);

        if let Some(socket) = &dsn.socket {
            let (dir, socket_port) = split_socket_path(Path::new(socket));
            target.host = dir.display().to_string();
            target.port = socket_port.unwrap_or(target.port);
            target.socket = Some(dir);
        } else if let Some(dsn_host) = &dsn.host {
            dsn_host.clone_into(&mut target.host);
        }

        Ok(target)
    }

    /// `postgres://<host>:<port>/<database>`, credentials are passed to the
    /// driver separately. Socket targets add `?host=<directory>`.
    #[must_use]
    pub fn connection_string(&self) -> String {
        let database = utf8_percent_encode(&self.database, URL_COMPONENT);

        let Some(socket) = &self.socket else {
            return if self.host.contains(':') {
                format!("postgres://[{}]:{}/{database}", self.host, self.port)
            } else {
                format!("postgres://{}:{}/{database}", self.host, self.port)
            };
        };

        let dir = socket.to_string_lossy();
        format!(
            "postgres://{DEFAULT_HOST}:{}/{database}?host={}",
            self.port,
            utf8_percent_encode(&dir, URL_COMPONENT)
        )
    }
}

/// TLS settings from the DSN query, each falling back to `fallback`
fn tls_from_dsn(dsn: &DSN, fallback: &TlsConfig) -> Result<TlsConfig> {
    let mode = dsn
        .params
        .get("sslmode")
        .or_else(|| dsn.params.get("ssl-mode"))
        .map(|m| m.parse::<TlsMode>().map_err(|e| anyhow!(e)))
        .transpose()
        .context("Invalid sslmode in DSN")?
        .unwrap_or(fallback.mode);

    let ca = dsn
        .params
        .get("sslrootcert")
        .or_else(|| dsn.params.get("sslca"))
        .or_else(|| dsn.params.get("ssl-ca"))
        .map(PathBuf::from)
        .or_else(|| fallback.ca.clone());

    let cert = dsn
        .params
        .get("sslcert")
        .or_else(|| dsn.params.get("ssl-cert"))
        .map(PathBuf::from)
        .or_else(|| fallback.cert.clone());

    let key = dsn
        .params
        .get("sslkey")
        .or_else(|| dsn.params.get("ssl-key"))
        .map(PathBuf::from)
        .or_else(|| fallback.key.clone());

    Ok(TlsConfig {
        mode,
        ca,
        cert,
        key,
    })
}

/// Split `/run/postgresql/.s.PGSQL.5433` into the directory and port, a
/// plain directory is returned as is
fn split_socket_path(path: &Path) -> (PathBuf, Option<u16>) {
    let port = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix(SOCKET_PREFIX))
        .and_then(|port| port.parse::<u16>().ok());

    match (port, path.parent()) {
        (Some(port), Some(dir)) => (dir.to_path_buf(), Some(port)),
        _ => (path.to_path_buf(), None),
    }
}

/// The built-in target list, all sharing `host`, `port` and `tls`
#[must_use]
pub fn defaults(host: &str, port: u16, tls: &TlsConfig) -> Vec<ConnectionTarget> {
    DEFAULT_CREDENTIALS
        .iter()
        .map(|(database, username, password)| {
            ConnectionTarget::new(host, port, *database, *username, *password).with_tls(tls.clone())
        })
        .collect()
}
