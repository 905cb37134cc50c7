#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use dbcheck::{
    driver::{Driver, DriverError, Handle},
    targets::ConnectionTarget,
    tls::TlsConfig,
};
use std::{
    collections::HashMap,
    env,
    sync::{Arc, Mutex},
};

pub const POSTGRES_HOST: &str = "localhost";
pub const POSTGRES_PORT: u16 = 5432;
pub const POSTGRES_USER: &str = "postgres";
pub const POSTGRES_PASSWORD: &str = "secret";
pub const POSTGRES_DATABASE: &str = "testdb";

pub fn skip_if_no_postgres() -> bool {
    env::var("SKIP_POSTGRES_TESTS").is_ok()
}

/// What the stub driver does for a given database
#[derive(Debug, Clone)]
pub enum Behavior {
    Open,
    /// Opens, but the graceful close reports an error
    OpenCloseFails(String),
    Closed,
    Missing,
    Fail(String),
}

/// Driver double keyed by database name, recording connects and closes
#[derive(Debug, Clone, Default)]
pub struct StubDriver {
    behaviors: HashMap<String, Behavior>,
    connects: Arc<Mutex<Vec<(String, String, String)>>>,
    closes: Arc<Mutex<Vec<String>>>,
}

impl StubDriver {
    pub fn with(mut self, database: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(database.to_string(), behavior);
        self
    }

    /// (url, username, password) per connect call, in call order
    pub fn connects(&self) -> Vec<(String, String, String)> {
        self.connects.lock().unwrap().clone()
    }

    /// Databases whose handle was closed, in close order
    pub fn closes(&self) -> Vec<String> {
        self.closes.lock().unwrap().clone()
    }
}

impl Driver for StubDriver {
    type Handle = StubHandle;

    async fn connect(
        &self,
        url: &str,
        username: &str,
        password: &str,
        _tls: &TlsConfig,
    ) -> Result<Option<StubHandle>, DriverError> {
        self.connects.lock().unwrap().push((
            url.to_string(),
            username.to_string(),
            password.to_string(),
        ));

        let path = url.split('?').next().unwrap_or_default();
        let database = path.rsplit('/').next().unwrap_or_default().to_string();
        let behavior = self
            .behaviors
            .get(&database)
            .cloned()
            .unwrap_or_else(|| Behavior::Fail(format!("database \"{database}\" does not exist")));

        let handle = |open, close_error| StubHandle {
            database: database.clone(),
            open,
            close_error,
            closes: Arc::clone(&self.closes),
        };

        match behavior {
            Behavior::Open => Ok(Some(handle(true, None))),
            Behavior::OpenCloseFails(message) => Ok(Some(handle(true, Some(message)))),
            Behavior::Closed => Ok(Some(handle(false, None))),
            Behavior::Missing => Ok(None),
            Behavior::Fail(message) => Err(DriverError::new(message)),
        }
    }
}

#[derive(Debug)]
pub struct StubHandle {
    database: String,
    open: bool,
    close_error: Option<String>,
    closes: Arc<Mutex<Vec<String>>>,
}

impl Handle for StubHandle {
    async fn is_open(&mut self) -> bool {
        self.open
    }

    async fn close(self) -> Result<(), DriverError> {
        self.closes.lock().unwrap().push(self.database);
        match self.close_error {
            Some(message) => Err(DriverError::new(message)),
            None => Ok(()),
        }
    }
}

/// orders_db opens, payments_db fails authentication, inventory_db is closed
pub fn scenario_driver() -> StubDriver {
    StubDriver::default()
        .with("orders_db", Behavior::Open)
        .with("payments_db", Behavior::Fail("auth failed".to_string()))
        .with("inventory_db", Behavior::Closed)
}

pub fn target(database: &str) -> ConnectionTarget {
    ConnectionTarget::new("localhost", 5432, database, "user", "pass")
}

pub fn output_string(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("output should be UTF-8")
}
