//! Parsing and validation of `seu.toml` campaign configuration files.
//!
//! This crate reads an optional campaign file and produces a strongly-typed
//! [`CampaignConfig`] describing the reference design, the run, and the
//! outputs. Every section and field has a default, so an empty file is a
//! valid campaign.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, validate_config};
pub use types::*;
