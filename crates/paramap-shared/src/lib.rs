//! Shared utilities and common logic for paramap

pub mod config;
pub mod observability;

pub use config::*;
pub use observability::*;
