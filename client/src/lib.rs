//! Stockroom Client - async synchronization of remote catalog collections.
//!
//! This crate connects the IO-free `stockroom-engine` to a REST catalog API:
//! a [`Gateway`] performs the remote calls and a [`SyncSession`] drives the
//! engine around them, so a rendering layer only sees snapshots, a loading
//! flag, the last error, and the `request_more`/`propose_*` entry points.

pub mod config;
pub mod error;
pub mod gateway;
pub mod session;

pub use config::{Config, ConfigError};
pub use error::{ClientError, Result};
pub use gateway::{Gateway, HttpGateway, Resource};
pub use session::SyncSession;
