//! Integration test crate for Playcast.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the queue and render crates to verify the decode→display
//! hand-off works end to end.

#[cfg(test)]
mod streaming;
