//! Common utilities for integration tests

#![allow(dead_code)]

pub mod cli;

// Re-export commonly used items
pub use fixtures::TestDir;
