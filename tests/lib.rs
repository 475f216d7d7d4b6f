//! Test suite for catalog-fetch-rs
//!
//! ## Test Categories
//!
//! ### 1. Common Utilities (`common/`)
//! Config factories, a mock catalog server and float assertions.
//!
//! ### 2. Integration Tests (`integration/`)
//! Components wired together against a `wiremock` upstream:
//! - Fetch path through cache, coalescer and monitor
//! - Warming strategies and scheduling
//! - Configuration files and environment overrides
//!
//! ### 3. End-to-End Tests (`e2e/`)
//! Calls against the public catalog. Ignored by default:
//! `cargo test -- --ignored`

pub mod common;
pub mod e2e;
pub mod integration;
