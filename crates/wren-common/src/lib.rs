//! Common utilities for the wren XML parser.
//!
//! This crate provides shared infrastructure used by the parsing and tree crates:
//! - **Warning System** - colored, deduplicated terminal output for recovered input problems
//! - **Debug Channels** - per-category trace output switched on through `WREN_DEBUG`

pub mod debug;
pub mod warning;
