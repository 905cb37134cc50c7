use crate::{
    driver::{Driver, Handle},
    report::{OutputFormat, Report},
    targets::ConnectionTarget,
};
use chrono::Utc;
use std::{fmt, io::Write};
use tracing::{debug, info, warn};

/// Result of a single connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The driver returned no handle, or one that is not open
    NullOrClosed,
    /// The driver failed to connect, with its error message
    Failed(String),
}

impl Outcome {
    pub const NULL_OR_CLOSED: &'static str = "Connection is null or closed";

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "✓ SUCCESS"),
            Self::NullOrClosed => write!(f, "✗ FAILED - {}", Self::NULL_OR_CLOSED),
            Self::Failed(message) => write!(f, "✗ FAILED - {message}"),
        }
    }
}

/// Runs connection checks one target at a time
#[derive(Debug)]
pub struct Checker<D> {
    driver: D,
    format: OutputFormat,
}

impl<D: Driver> Checker<D> {
    #[must_use]
    pub const fn new(driver: D, format: OutputFormat) -> Self {
        Self { driver, format }
    }

    /// Check every target in order, writing results to `out`
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `out` fails, connection failures
    /// are reported as [`Outcome`]s
    pub async fn check_all<W: Write>(
        &self,
        targets: &[ConnectionTarget],
        out: &mut W,
    ) -> std::io::Result<Vec<Outcome>> {
        if self.format == OutputFormat::Text {
            writeln!(out, "Testing PostgreSQL connections...")?;
            writeln!(out)?;
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            outcomes.push(self.check_one(target, out).await?);
        }

        Ok(outcomes)
    }

    /// Check a single target
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails
    pub async fn check_one<W: Write>(
        &self,
        target: &ConnectionTarget,
        out: &mut W,
    ) -> std::io::Result<Outcome> {
        if self.format == OutputFormat::Text {
            write!(out, "Testing connection to {}... ", target.database)?;
            out.flush()?;
        }

        let start = Utc::now();
        let outcome = self.attempt(target).await;
        let runtime_ms = Utc::now().signed_duration_since(start).num_milliseconds();

        match &outcome {
            Outcome::Success => info!(database = %target.database, runtime_ms, "connected"),
            Outcome::NullOrClosed => {
                info!(database = %target.database, runtime_ms, "connection is null or closed");
            }
            Outcome::Failed(message) => {
                info!(database = %target.database, runtime_ms, error = %message, "connection failed");
            }
        }

        match self.format {
            OutputFormat::Text => writeln!(out, "{outcome}")?,
            OutputFormat::Json => {
                let report = Report::new(target, &outcome, start.to_rfc3339(), runtime_ms);
                let serialized = serde_json::to_string(&report)?;
                writeln!(out, "{serialized}")?;
            }
        }

        Ok(outcome)
    }

    /// Acquire, inspect and release a connection
    async fn attempt(&self, target: &ConnectionTarget) -> Outcome {
        let url = target.connection_string();
        debug!(
            database = %target.database,
            host = %target.host,
            port = target.port,
            username = %target.username,
            "testing connection"
        );

        let handle = match self
            .driver
            .connect(&url, &target.username, &target.password, &target.tls)
            .await
        {
            Ok(handle) => handle,
            Err(err) => return Outcome::Failed(err.to_string()),
        };

        let Some(mut handle) = handle else {
            return Outcome::NullOrClosed;
        };

        if !handle.is_open().await {
            // dropped without a second close
            return Outcome::NullOrClosed;
        }

        if let Err(err) = handle.close().await {
            warn!(database = %target.database, error = %err, "failed to close connection");
        }

        Outcome::Success
    }
}
