//! Integration tests for catalog-fetch-rs
//!
//! Each suite wires real components together against a mock upstream.

pub mod config_tests;
pub mod fetch_layer_tests;
pub mod monitoring_tests;
pub mod warming_tests;
