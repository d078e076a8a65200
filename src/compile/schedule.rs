use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::compile::episode::EpisodeBucket;
use crate::compile::fingerprint::{ScheduleFingerprint, fingerprint_commands};
use crate::compile::registry::{EntityKey, RelationKey};
use crate::event::model::ColorDirective;
use crate::foundation::core::{Frame, Point3};

/// Frames a highlight pulse takes to decay back to zero.
pub const HIGHLIGHT_DECAY_FRAMES: i64 = 5;

/// Resting value of the color ramp (the "yellow" midpoint).
pub const NEUTRAL_COLOR_VALUE: f64 = ColorDirective::Yellow.value();

/// One declarative command handed to the render backend.
///
/// Commands are emitted in event order and are the sole output contract of
/// the compiler. Each command also expands into the explicit keyframe writes
/// it implies, see [`SceneCommand::keyframes`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SceneCommand {
    /// Materialize a point for an entity first seen at `frame`.
    CreatePoint {
        /// Point identity.
        key: EntityKey,
        /// Placement chosen once at first sight.
        location: Point3,
        /// Frame the point becomes visible.
        frame: Frame,
    },
    /// Materialize a path between two existing points.
    CreatePath {
        /// Path identity (symmetric over its endpoints).
        key: RelationKey,
        /// Source endpoint.
        from: EntityKey,
        /// Target endpoint.
        to: EntityKey,
        /// Frame the path becomes visible.
        frame: Frame,
        /// Episode bucket assigned at creation.
        bucket: EpisodeBucket,
    },
    /// Keyframe the point's color ramp to `value` at `frame`.
    SetColor {
        /// Point identity.
        key: EntityKey,
        /// Target ramp value in `[0, 1]`.
        value: f64,
        /// Frame the value takes effect.
        frame: Frame,
    },
    /// Pulse the path's highlight channel at `frame`.
    HighlightPath {
        /// Path identity.
        key: RelationKey,
        /// Pulse peak frame.
        frame: Frame,
    },
}

/// Keyframed property channel of a scene object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// Object visibility (0 hidden, 1 visible).
    Visibility,
    /// Point color ramp value.
    ColorValue,
    /// Path highlight value.
    Highlight,
}

/// Scene object addressed by a keyframe write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    /// A point, by entity key.
    Point(EntityKey),
    /// A path, by relation key.
    Path(RelationKey),
}

/// One explicit keyframe write derived from a command.
///
/// Writes use constant interpolation: a value holds until the next write on
/// the same channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeWrite {
    /// Addressed scene object.
    pub target: TargetRef,
    /// Addressed property channel.
    pub channel: Channel,
    /// Frame of the write.
    pub frame: Frame,
    /// Written value.
    pub value: f64,
}

impl SceneCommand {
    /// The frame this command takes effect.
    pub fn frame(&self) -> Frame {
        match self {
            Self::CreatePoint { frame, .. }
            | Self::CreatePath { frame, .. }
            | Self::SetColor { frame, .. }
            | Self::HighlightPath { frame, .. } => *frame,
        }
    }

    /// Keyframe writes this command implies, in frame order.
    ///
    /// Appearances bracket visibility with an "off" write one frame early so
    /// they are instantaneous; highlight pulses are the mandatory 3-keyframe
    /// shape (0 at `F-1`, 1 at `F`, 0 at `F+5`). Paths created into a fresh
    /// bucket flash once at creation instead of receiving a preset color.
    pub fn keyframes(&self) -> SmallVec<[KeyframeWrite; 3]> {
        match self {
            Self::CreatePoint { key, frame, .. } => {
                visibility_keys(TargetRef::Point(key.clone()), *frame)
            }
            Self::CreatePath {
                key,
                frame,
                bucket,
                ..
            } => {
                let mut keys = visibility_keys(TargetRef::Path(key.clone()), *frame);
                if bucket.is_fresh() {
                    keys.extend(pulse_keys(TargetRef::Path(key.clone()), *frame));
                }
                keys
            }
            Self::SetColor { key, value, frame } => {
                let target = TargetRef::Point(key.clone());
                let mut keys = SmallVec::new();
                keys.push(KeyframeWrite {
                    target: target.clone(),
                    channel: Channel::ColorValue,
                    frame: frame.prev(),
                    value: NEUTRAL_COLOR_VALUE,
                });
                keys.push(KeyframeWrite {
                    target,
                    channel: Channel::ColorValue,
                    frame: *frame,
                    value: *value,
                });
                keys
            }
            Self::HighlightPath { key, frame } => {
                pulse_keys(TargetRef::Path(key.clone()), *frame).into_iter().collect()
            }
        }
    }
}

/// Visibility bracket: off at `frame - 1`, on at `frame`.
///
/// No writes when `frame <= 1`: objects present from the start are never
/// hidden.
fn visibility_keys(target: TargetRef, frame: Frame) -> SmallVec<[KeyframeWrite; 3]> {
    let mut out = SmallVec::new();
    if frame.0 > 1 {
        out.push(KeyframeWrite {
            target: target.clone(),
            channel: Channel::Visibility,
            frame: frame.prev(),
            value: 0.0,
        });
        out.push(KeyframeWrite {
            target,
            channel: Channel::Visibility,
            frame,
            value: 1.0,
        });
    }
    out
}

fn pulse_keys(target: TargetRef, frame: Frame) -> [KeyframeWrite; 3] {
    [
        KeyframeWrite {
            target: target.clone(),
            channel: Channel::Highlight,
            frame: frame.prev(),
            value: 0.0,
        },
        KeyframeWrite {
            target: target.clone(),
            channel: Channel::Highlight,
            frame,
            value: 1.0,
        },
        KeyframeWrite {
            target,
            channel: Channel::Highlight,
            frame: frame.offset(HIGHLIGHT_DECAY_FRAMES),
            value: 0.0,
        },
    ]
}

/// Counters from one compilation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Events consumed.
    pub events: u64,
    /// Points materialized.
    pub points_created: u64,
    /// Paths materialized.
    pub paths_created: u64,
    /// Frame the last event mapped to (the start offset when the stream was
    /// empty).
    pub last_frame: Frame,
}

/// Compiled animation schedule: the command sequence plus run statistics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Schedule {
    /// Commands in event order.
    pub commands: Vec<SceneCommand>,
    /// Counters from the compilation pass.
    pub stats: ScheduleStats,
}

impl Schedule {
    /// Expand every command into explicit keyframe writes, in command order.
    pub fn keyframes(&self) -> Vec<KeyframeWrite> {
        self.commands.iter().flat_map(|c| c.keyframes()).collect()
    }

    /// Stable 128-bit content fingerprint of the command sequence.
    pub fn fingerprint(&self) -> ScheduleFingerprint {
        fingerprint_commands(&self.commands)
    }
}
