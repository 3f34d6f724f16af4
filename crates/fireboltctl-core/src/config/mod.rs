//! Configuration file support for fireboltctl
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! An optional TOML file holds named profiles with connection defaults
//! (email, password, API origin, database, engine). Values support
//! `${VAR}` and `${VAR:-default}` environment expansion.
//!
//! Explicit arguments and the `FIREBOLT_*` environment variables always take
//! precedence over anything read from here.

pub mod config;
pub mod error;

pub use config::{Config, Profile};
pub use error::{ConfigError, Result};
