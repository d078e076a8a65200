//! The timeline compiler.
//!
//! One compilation pass consumes an ordered event stream front to back and
//! emits an ordered [`schedule::Schedule`] of scene commands. All pass state
//! (identity registry, episode classifier, time map, placement RNG) is owned
//! by the pass; nothing is process-global, so independent compilations can
//! run side by side.

/// The single-pass event stream compiler.
pub mod compiler;
/// Episode threshold table and bucket assignment.
pub mod episode;
/// Stable schedule content fingerprint.
pub mod fingerprint;
/// Entity/relation identity keys and the created-state registry.
pub mod registry;
/// Scene commands, keyframe expansion, and the compiled schedule.
pub mod schedule;
/// Event-time to frame mapping.
pub mod timemap;
