//! Shared utilities.
//!
//! Hashing for virtual root fingerprints and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
