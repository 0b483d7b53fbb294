//! Common utilities for the Tartan cascade engine.
//!
//! This crate provides shared infrastructure used by the engine crates:
//! - **Warning System** - de-duplicated, coloured diagnostics for values the
//!   cascade had to drop or could not interpret

pub mod warning;
