//! Shared types for the realis-explorer crates.
//!
//! Contains:
//! - Transaction records for each pipeline stage
//! - Market segment and sale type labels
//! - JSON configuration and the common error type

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
