use super::Action;
use crate::{checker::Checker, driver::PgDriver};
use anyhow::Context;
use std::io;
use tracing::info;

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action) -> anyhow::Result<()> {
    match action {
        Action::Check { targets, format } => {
            let checker = Checker::new(PgDriver, format);
            let outcomes = checker
                .check_all(&targets, &mut io::stdout())
                .await
                .context("Failed to write results")?;

            // failures are reported in the output, never through the exit code
            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            info!(total = outcomes.len(), failed, "connectivity check finished");

            Ok(())
        }
    }
}
