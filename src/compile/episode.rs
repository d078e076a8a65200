use serde::{Deserialize, Serialize};

use crate::foundation::core::Frame;

/// One row of the episode threshold table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRule {
    /// Largest creation frame (inclusive) that still falls into this bucket.
    pub until_frame: Frame,
    /// Bucket label handed to the renderer.
    pub label: String,
}

/// Highlight bucket assigned to a path at creation, immutable thereafter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeBucket {
    /// One of the configured, time-bounded episode buckets.
    Preset(String),
    /// Open-ended episode past every configured threshold. The serial is
    /// unique per relation within one compilation pass, so new episodes never
    /// collide visually with past ones.
    Fresh(u32),
}

impl EpisodeBucket {
    /// `true` for synthesized open-ended buckets.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// Assigns episode buckets from an ordered threshold table.
///
/// A linear scan over the sorted rules: the first rule whose `until_frame`
/// is at or past the creation frame wins. Beyond the last rule a fresh
/// bucket is synthesized.
#[derive(Debug)]
pub(crate) struct EpisodeClassifier {
    rules: Vec<EpisodeRule>,
    next_fresh: u32,
}

impl EpisodeClassifier {
    pub(crate) fn new(rules: Vec<EpisodeRule>) -> Self {
        Self {
            rules,
            next_fresh: 0,
        }
    }

    pub(crate) fn bucket_for(&mut self, frame: Frame) -> EpisodeBucket {
        for rule in &self.rules {
            if frame <= rule.until_frame {
                return EpisodeBucket::Preset(rule.label.clone());
            }
        }
        let serial = self.next_fresh;
        self.next_fresh += 1;
        EpisodeBucket::Fresh(serial)
    }
}
