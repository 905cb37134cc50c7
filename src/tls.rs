use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::{fmt, path::PathBuf, str::FromStr};

/// TLS configuration for one connection target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    pub mode: TlsMode,
    pub ca: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
}

/// TLS/SSL mode for database connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// No TLS encryption
    #[default]
    Disable,
    /// TLS required, but no certificate verification
    Require,
    /// Verify server certificate against CA
    VerifyCA,
    /// Verify certificate and hostname
    VerifyFull,
}

impl FromStr for TlsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCA),
            "verify-full" => Ok(Self::VerifyFull),
            _ => Err(format!("Invalid TLS mode: {s}")),
        }
    }
}

impl fmt::Display for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            Self::Disable => "disable",
            Self::Require => "require",
            Self::VerifyCA => "verify-ca",
            Self::VerifyFull => "verify-full",
        };
        f.write_str(mode)
    }
}

impl TlsMode {
    /// Check if TLS is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disable)
    }
}

impl TlsConfig {
    /// Apply the TLS settings to `PostgreSQL` connect options
    #[must_use]
    pub fn apply(&self, options: PgConnectOptions) -> PgConnectOptions {
        let mut options = match self.mode {
            TlsMode::Disable => options.ssl_mode(PgSslMode::Disable),
            TlsMode::Require => options.ssl_mode(PgSslMode::Require),
            TlsMode::VerifyCA => options.ssl_mode(PgSslMode::VerifyCa),
            TlsMode::VerifyFull => options.ssl_mode(PgSslMode::VerifyFull),
        };

        // the CA only matters when the server certificate gets verified
        if matches!(self.mode, TlsMode::VerifyCA | TlsMode::VerifyFull)
            && let Some(ca_path) = &self.ca
        {
            options = options.ssl_root_cert(ca_path);
        }

        if let (Some(cert_path), Some(key_path)) = (&self.cert, &self.key) {
            options = options.ssl_client_cert(cert_path).ssl_client_key(key_path);
        }

        options
    }
}
