//! # fireboltctl-core
//!
//! Client library for the Firebolt control plane and engine data endpoints.
//!
//! A [`Client`] authenticates once when it is constructed and then reuses a
//! single bearer-token session for every call it makes:
//!
//! - **Engine directory & lifecycle**: resolve an engine name to its id,
//!   describe it, and issue start/stop/restart commands.
//! - **Status polling**: wait until an engine reports a desired status, with a
//!   fixed attempt budget and a fixed interval between observations.
//! - **Query execution**: post opaque query text to an engine endpoint and get
//!   back either the raw response or the decoded result set.
//!
//! Failures are classified into four kinds (see [`ErrorKind`]) so that callers
//! such as the `fireboltctl` binary can map them onto stable exit codes.
//!
//! ```rust,no_run
//! use fireboltctl_core::{Client, ClientSettings, Credentials, EngineStatus};
//!
//! # async fn run() -> fireboltctl_core::Result<()> {
//! let credentials = Credentials::resolve(None, None, None);
//! let client = Client::connect(ClientSettings::new(credentials)).await?;
//!
//! let engine_id = client.get_engine_id("analytics").await?;
//! client.start_engine(&engine_id).await?;
//! let engine = client
//!     .wait_engine_status(&engine_id, &EngineStatus::Running)
//!     .await?;
//!
//! let endpoint = engine.endpoint.as_deref().unwrap_or_default();
//! let rows = client.query(endpoint, "sales", "SELECT 1").await?;
//! println!("{} columns", rows.meta.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod poller;
pub mod query;
pub mod transport;

pub use auth::{Credentials, Token};
pub use client::{Client, ClientSettings, DEFAULT_API_URL, FIREBOLTCTL_USER_AGENT};
pub use config::{Config, ConfigError, Profile};
pub use engine::{Engine, EngineAction, EngineKey, EngineStatus};
pub use error::{ErrorKind, FireboltError, RequestError, Result, UnknownError};
pub use poller::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL, PollPolicy, ProgressCallback, ProgressEvent,
    Sleeper, TokioSleeper,
};
pub use query::{ColumnMeta, QueryResult};
