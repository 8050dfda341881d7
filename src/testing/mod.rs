//! Test doubles and canned data shared by unit and integration tests.
//!
//! Compiled into the library (not behind `cfg(test)`) so the `tests/`
//! directory can reach it as well.

pub mod fixtures;
pub mod mocks;

pub use mocks::{MockFailure, MockTextGenerator};
