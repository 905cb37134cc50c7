mod run;

use crate::{report::OutputFormat, targets::ConnectionTarget};

/// Action enum representing each possible command
#[derive(Debug)]
pub enum Action {
    Check {
        targets: Vec<ConnectionTarget>,
        format: OutputFormat,
    },
}

impl Action {
    /// Execute the action
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails to execute
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
