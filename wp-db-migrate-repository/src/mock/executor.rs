use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use wp_db_migrate_shared::{Row, Statement};

use crate::errors::ExecutorError;
use crate::interfaces::SqlExecutor;

/// A canned reaction to statements whose SQL contains `needle`.
struct Expectation {
    needle: String,
    response: Response,
}

enum Response {
    Rows(Vec<Row>),
    Affected(u64),
    Fail(String),
}

/// Mock SQL executor that answers from pre-registered responses.
///
/// Responses are matched by substring against the statement SQL; the first
/// registered match wins. Unmatched queries return no rows and unmatched
/// statements report zero affected rows.
#[derive(Default)]
pub struct MockExecutor {
    expectations: Mutex<Vec<Expectation>>,
    queries: Mutex<Vec<Statement>>,
    executed: Mutex<Vec<Statement>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn expect(&self, needle: &str, response: Response) {
        lock(&self.expectations).push(Expectation {
            needle: needle.to_string(),
            response,
        });
    }

    /// Queries containing `needle` return `rows`.
    pub fn on_query(&self, needle: &str, rows: Vec<Row>) {
        self.expect(needle, Response::Rows(rows));
    }

    /// Statements containing `needle` report `rows_affected`.
    pub fn on_execute(&self, needle: &str, rows_affected: u64) {
        self.expect(needle, Response::Affected(rows_affected));
    }

    /// Queries or statements containing `needle` fail with `message`.
    pub fn fail_on(&self, needle: &str, message: &str) {
        self.expect(needle, Response::Fail(message.to_string()));
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<Statement> {
        lock(&self.queries).clone()
    }

    /// Every mutating statement received, in order, including failed ones.
    pub fn executed(&self) -> Vec<Statement> {
        lock(&self.executed).clone()
    }

    /// SQL text of every mutating statement received.
    pub fn executed_sql(&self) -> Vec<String> {
        lock(&self.executed)
            .iter()
            .map(|statement| statement.sql().to_string())
            .collect()
    }

    fn respond(&self, statement: &Statement) -> Option<Result<Response, ExecutorError>> {
        lock(&self.expectations)
            .iter()
            .find(|expectation| statement.sql().contains(&expectation.needle))
            .map(|expectation| match &expectation.response {
                Response::Fail(message) => Err(ExecutorError::driver(message.clone())),
                Response::Rows(rows) => Ok(Response::Rows(rows.clone())),
                Response::Affected(count) => Ok(Response::Affected(*count)),
            })
    }
}

#[async_trait]
impl SqlExecutor for MockExecutor {
    async fn query(&self, statement: &Statement) -> Result<Vec<Row>, ExecutorError> {
        lock(&self.queries).push(statement.clone());

        match self.respond(statement) {
            Some(Ok(Response::Rows(rows))) => Ok(rows),
            Some(Err(error)) => Err(error),
            _ => Ok(Vec::new()),
        }
    }

    async fn execute(&self, statement: &Statement) -> Result<u64, ExecutorError> {
        lock(&self.executed).push(statement.clone());

        match self.respond(statement) {
            Some(Ok(Response::Affected(count))) => Ok(count),
            Some(Err(error)) => Err(error),
            _ => Ok(0),
        }
    }
}
