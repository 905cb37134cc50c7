pub mod checker;
pub mod cli;
pub mod driver;
pub mod report;
pub mod targets;
pub mod tls;
