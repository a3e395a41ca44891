//! # sweepdb common library
//!
//! Shared code for the sweepdb workspace:
//! - Common error type
//! - Configuration loading (TOML bootstrap + environment overrides)
//! - Catalog database initialization and schema synchronization
//! - UUID helpers for measurement identity

pub mod config;
pub mod db;
pub mod error;
pub mod uuid_utils;

pub use error::{Error, Result};
