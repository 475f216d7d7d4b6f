//! Configuration validation
//!
//! Each configuration section implements [`Validate`]; `Config::validate`
//! runs them all and prefixes failures with the section name.

mod validators;


/// A configuration section that can check its own invariants
pub trait Validate {
    /// Human-readable description of the first violated invariant
    fn validate(&self) -> Result<(), String>;
}
