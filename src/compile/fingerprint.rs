use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::compile::episode::EpisodeBucket;
use crate::compile::schedule::SceneCommand;
use crate::foundation::core::{Frame, Point3};

const XXH3_SEED: u64 = 0x4d1e_7a92_c3b8_50f6;

/// Stable 128-bit content fingerprint of a command sequence.
///
/// Identical schedules always produce identical fingerprints across runs and
/// platforms; any change to a command changes the fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl fmt::Display for ScheduleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

pub(crate) fn fingerprint_commands(commands: &[SceneCommand]) -> ScheduleFingerprint {
    let mut h = StableHasher::new();
    h.write_u32(commands.len() as u32);
    for cmd in commands {
        write_command(&mut h, cmd);
    }
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_i64(&mut self, v: i64) {
        self.write_u64(v as u64);
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> ScheduleFingerprint {
        let v = self.inner.digest128();
        ScheduleFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

fn write_frame(h: &mut StableHasher, f: Frame) {
    h.write_i64(f.0);
}

fn write_point3(h: &mut StableHasher, p: Point3) {
    h.write_f64(p.x);
    h.write_f64(p.y);
    h.write_f64(p.z);
}

fn write_bucket(h: &mut StableHasher, b: &EpisodeBucket) {
    match b {
        EpisodeBucket::Preset(label) => {
            h.write_u8(0);
            h.write_str(label);
        }
        EpisodeBucket::Fresh(serial) => {
            h.write_u8(1);
            h.write_u32(*serial);
        }
    }
}

fn write_command(h: &mut StableHasher, cmd: &SceneCommand) {
    match cmd {
        SceneCommand::CreatePoint {
            key,
            location,
            frame,
        } => {
            h.write_u8(0);
            h.write_str(key.as_str());
            write_point3(h, *location);
            write_frame(h, *frame);
        }
        SceneCommand::CreatePath {
            key,
            from,
            to,
            frame,
            bucket,
        } => {
            h.write_u8(1);
            h.write_str(key.as_str());
            h.write_str(from.as_str());
            h.write_str(to.as_str());
            write_frame(h, *frame);
            write_bucket(h, bucket);
        }
        SceneCommand::SetColor { key, value, frame } => {
            h.write_u8(2);
            h.write_str(key.as_str());
            h.write_f64(*value);
            write_frame(h, *frame);
        }
        SceneCommand::HighlightPath { key, frame } => {
            h.write_u8(3);
            h.write_str(key.as_str());
            write_frame(h, *frame);
        }
    }
}
