//! Core types: errors, configuration, logging

pub mod config;
pub mod error;
pub mod logging;

pub use config::AtlasConfig;
pub use error::{Error, Result};
