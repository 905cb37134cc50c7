use crate::{checker::Outcome, targets::ConnectionTarget};
use serde::Serialize;
use std::str::FromStr;

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Banner plus one human readable line per target
    #[default]
    Text,
    /// One JSON object per target
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    NullOrClosed,
    Failed,
}

/// JSON record for a single check
#[derive(Serialize, Debug)]
pub struct Report<'a> {
    pub time: String,
    pub database: &'a str,
    pub host: &'a str,
    pub port: u16,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub runtime_ms: i64,
}

impl<'a> Report<'a> {
    #[must_use]
    pub fn new(
        target: &'a ConnectionTarget,
        outcome: &Outcome,
        time: String,
        runtime_ms: i64,
    ) -> Self {
        let (status, error) = match outcome {
            Outcome::Success => (Status::Success, None),
            Outcome::NullOrClosed => (
                Status::NullOrClosed,
                Some(Outcome::NULL_OR_CLOSED.to_string()),
            ),
            Outcome::Failed(message) => (Status::Failed, Some(message.clone())),
        };

        Self {
            time,
            database: &target.database,
            host: &target.host,
            port: target.port,
            status,
            error,
            runtime_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::{Value, json};

    fn target() -> ConnectionTarget {
        ConnectionTarget::new("localhost", 5432, "orders_db", "orders_user", "orders_pass")
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_success_report_omits_error() {
        let target = target();
        let report = Report::new(
            &target,
            &Outcome::Success,
            "2026-01-01T00:00:00Z".into(),
            4,
        );
        let value: Value = serde_json::to_value(&report).unwrap();

        assert_eq!(
            value,
            json!({
                "time": "2026-01-01T00:00:00Z",
                "database": "orders_db",
                "host": "localhost",
                "port": 5432,
                "status": "success",
                "runtime_ms": 4,
            })
        );
    }

    #[test]
    fn test_failed_report_carries_message() {
        let target = target();
        let outcome = Outcome::Failed("auth failed".into());
        let report = Report::new(&target, &outcome, String::new(), 0);
        let value: Value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "auth failed");
    }

    #[test]
    fn test_null_or_closed_report() {
        let target = target();
        let report = Report::new(&target, &Outcome::NullOrClosed, String::new(), 0);
        let value: Value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["status"], "null_or_closed");
        assert_eq!(value["error"], "Connection is null or closed");
    }

    #[test]
    fn test_report_never_contains_password() {
        let target = target();
        let report = Report::new(&target, &Outcome::Success, String::new(), 0);
        let serialized = serde_json::to_string(&report).unwrap();
        assert!(!serialized.contains("orders_pass"));
    }
}
