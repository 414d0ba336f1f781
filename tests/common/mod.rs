//! Shared helpers for the integration tests.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

pub mod mocks;
pub mod test_helpers;
