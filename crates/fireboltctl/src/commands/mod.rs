//! Command implementations

pub mod engine;
pub mod query;
