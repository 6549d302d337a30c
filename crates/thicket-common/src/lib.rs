//! Common utilities for the Thicket selector engine.
//!
//! This crate provides shared infrastructure used by the selector crate:
//! - **Warning System** - colored, deduplicated diagnostics on stderr

pub mod warning;
