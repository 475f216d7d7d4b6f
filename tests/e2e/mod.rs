//! End-to-end tests against the public catalog
//!
//! These tests make real network calls.
//! Run with: cargo test -- --ignored
//!
//! Optional environment variables:
//! - CATALOG_BASE_URL: catalog API to target (defaults to the public one)

pub mod catalog;
