//! MySQL module - connection setup and the `sqlx`-backed executor.
mod executor;

pub use executor::MySqlExecutor;
