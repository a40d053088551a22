//! Test utilities for the Kraken client
//!
//! This module provides mocks and canned API responses for testing.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
