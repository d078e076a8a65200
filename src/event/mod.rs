//! Event table boundary.
//!
//! One record per line: `time_in_ms, from_type, from_id, to_type, to_id, message`.
//! The table must be sorted ascending by `time_in_ms` before compilation.

/// Event records and recognized message directives.
pub mod model;
/// Line-based event table parser.
pub mod parse;
