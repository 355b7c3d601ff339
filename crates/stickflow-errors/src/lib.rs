//! Error types shared by the stickflow crates.
//!
//! Two families live here:
//!
//! - [`rt`]: fixed-size error codes returned from the tick path
//! - [`config`]: errors raised while loading configuration and building rule chains
//!
//! # RT Safety
//!
//! [`RTError`] is `Copy` and `#[repr(u8)]`. Returning one from the tick path
//! never allocates. [`ConfigError`] carries strings and is only produced
//! outside the tick loop.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod config;
pub mod prelude;
pub mod rt;

pub use common::ErrorSeverity;
pub use config::ConfigError;
pub use rt::RTError;

/// A specialized `Result` type for tick-path operations.
pub type RTResult<T = ()> = std::result::Result<T, RTError>;
