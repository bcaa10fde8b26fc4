//! Core data models for normalized search results.

mod paper;

pub use paper::{Field, Paper};
