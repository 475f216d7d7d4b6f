//! Shared utilities: the error taxonomy and logging setup

pub mod error;
pub mod logging;
