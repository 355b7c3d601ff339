//! Prelude module for convenient error handling imports.

pub use crate::{RTResult, common::ErrorSeverity, config::ConfigError, rt::RTError};
