//! Utility modules for Backbenchers.
//!
//! - [`datetime`] - Timestamp parsing and human-readable date formatting

pub mod datetime;
