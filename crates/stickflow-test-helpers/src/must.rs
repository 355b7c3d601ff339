//! Unwrap helpers for test code.
//!
//! Workspace lints deny `unwrap()` and `expect()` everywhere, tests included.
//! These panic with the failing value and report the caller's location.

use std::fmt::Debug;
use std::str::FromStr;

/// Unwrap a `Result`, panicking with the error on failure.
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap an `Option`, panicking with `msg` on `None`.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}

/// Parse `s`, panicking with the input and error on failure.
#[track_caller]
pub fn must_parse<T: FromStr>(s: &str) -> T
where
    T::Err: Debug,
{
    match s.parse() {
        Ok(v) => v,
        Err(e) => panic!("must_parse: failed to parse {s:?}: {e:?}"),
    }
}

/// Like [`must`] with extra context in the panic message.
#[track_caller]
pub fn must_with<T, E: Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must_with: {context}: {e:?}"),
    }
}
