//! Error handling for the fetch layer
//!
//! One error enum covers the whole taxonomy: transport failures the
//! upstream client retries, HTTP classifications, retry exhaustion,
//! coalescer ceilings and warming outcomes.

mod conversions;
mod helpers;
#[cfg(test)]
mod tests;
mod types;

pub use types::{FetchError, Result, SharedError};
