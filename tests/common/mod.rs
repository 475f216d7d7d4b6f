//! Shared test infrastructure

pub mod assertions;
pub mod fixtures;

pub use fixtures::{CatalogMock, test_config};
