use crate::{
    cli::actions::Action,
    report::OutputFormat,
    targets::{self, ConnectionTarget, DEFAULT_HOST, DEFAULT_PORT},
    tls::{TlsConfig, TlsMode},
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use std::path::PathBuf;

/// Extract TLS configuration from the `--tls-*` flags
fn extract_tls_config(matches: &ArgMatches) -> Result<TlsConfig> {
    let mode = matches
        .get_one::<String>("tls-mode")
        .map(|m| m.parse::<TlsMode>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    let path = |name: &str| matches.get_one::<String>(name).map(PathBuf::from);

    Ok(TlsConfig {
        mode,
        ca: path("tls-ca"),
        cert: path("tls-cert"),
        key: path("tls-key"),
    })
}

/// Build the target list, the built-in one unless `--target` was given.
///
/// `tls` comes from the `--tls-*` flags, DSN query parameters override it per
/// target.
fn extract_targets(matches: &ArgMatches, tls: &TlsConfig) -> Result<Vec<ConnectionTarget>> {
    let host = matches
        .get_one::<String>("host")
        .map_or(DEFAULT_HOST, String::as_str);
    let port = matches
        .get_one::<u16>("port")
        .copied()
        .unwrap_or(DEFAULT_PORT);

    let Some(dsns) = matches.get_many::<String>("target") else {
        return Ok(targets::defaults(host, port, tls));
    };

    dsns.map(|dsn_str| {
        let dsn = dsn::parse(dsn_str).with_context(|| format!("Failed to parse DSN: {dsn_str}"))?;
        ConnectionTarget::from_dsn(&dsn, host, port, tls)
            .with_context(|| format!("Invalid target: {dsn_str}"))
    })
    .collect()
}

/// Extract the verbosity level from the `-v` flag count
#[must_use]
pub fn extract_verbosity(matches: &ArgMatches) -> u8 {
    matches.get_count("verbose")
}

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if a target DSN is invalid or a flag has an unexpected value
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let tls = extract_tls_config(matches)?;
    let targets = extract_targets(matches, &tls)?;

    let format = matches
        .get_one::<String>("format")
        .map(|f| f.parse::<OutputFormat>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    Ok(Action::Check { targets, format })
}
