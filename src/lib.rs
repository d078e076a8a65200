//! Kinegraph compiles time-ordered domain event logs into timed 3D animation
//! schedules.
//!
//! The compiler consumes a sorted stream of relational events (orders,
//! shipments, stock movements), deduplicates entities and relations into a
//! stable identity space, maps event time onto animation frames under a
//! configurable playback speed, and emits an ordered sequence of scene
//! commands (create-point, create-path, set-color, highlight) together with
//! their explicit keyframe expansion. Rendering is left to an external
//! backend that consumes the serialized [`Schedule`].
//!
//! The public API is pass-oriented:
//!
//! - Parse an event table with [`parse_events`]
//! - Load and validate a [`Stage`]
//! - [`compile`] the stream into a [`Schedule`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod schema;

/// Timeline compiler internals (registry, time mapping, episodes, schedule).
pub mod compile;
/// Event table boundary (records + parser).
pub mod event;
/// Stage configuration boundary.
pub mod scene;

pub use crate::foundation::core::{Frame, Point3};
pub use crate::foundation::error::{KinegraphError, KinegraphResult};

pub use crate::compile::compiler::{CompileOpts, compile};
pub use crate::compile::episode::{EpisodeBucket, EpisodeRule};
pub use crate::compile::fingerprint::ScheduleFingerprint;
pub use crate::compile::registry::{EntityKey, RelationKey};
pub use crate::compile::schedule::{
    Channel, HIGHLIGHT_DECAY_FRAMES, KeyframeWrite, NEUTRAL_COLOR_VALUE, SceneCommand, Schedule,
    ScheduleStats, TargetRef,
};
pub use crate::event::model::{ColorDirective, EntityRef, Event};
pub use crate::event::parse::{parse_events, parse_events_path};
pub use crate::scene::stage::{Region, Stage};
