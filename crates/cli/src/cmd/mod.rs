//! CLI command implementations

pub mod csv;
pub mod inspect;
pub mod json;
