use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::compile::episode::EpisodeRule;
use crate::foundation::core::{Frame, Point3};
use crate::foundation::error::{KinegraphError, KinegraphResult};
use crate::scene::model::StageDef;
use crate::schema::validate::validate_stage;

/// Placement region for one entity type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    /// Region center in stage space.
    pub center: Point3,
    /// Sphere radius points of this type are placed within.
    pub radius: f64,
}

/// Validated stage configuration consumed by the compiler.
///
/// This is the JSON-facing boundary object: parse it with [`Stage::from_path`]
/// or [`Stage::from_reader`]; both validate the definition before returning.
#[derive(Clone, Debug)]
pub struct Stage {
    fps: u32,
    playback_divisor: u32,
    start_frame: i64,
    seed: u64,
    regions: HashMap<String, Region>,
    episodes: Vec<EpisodeRule>,
}

impl Stage {
    /// Parse a stage configuration from a JSON reader.
    pub fn from_reader<R: Read>(r: R) -> KinegraphResult<Self> {
        let def: StageDef = serde_json::from_reader(r)
            .map_err(|e| KinegraphError::validation(format!("parse stage JSON: {e}")))?;
        Self::from_def(def)
    }

    /// Parse a stage configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> KinegraphResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            KinegraphError::validation(format!("open stage JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub(crate) fn from_def(def: StageDef) -> KinegraphResult<Self> {
        validate_stage(&def)
            .map_err(|e| KinegraphError::validation(format!("stage validation failed: {e}")))?;

        let regions = def
            .regions
            .into_iter()
            .map(|(name, r)| {
                (
                    name,
                    Region {
                        center: Point3::new(r.center.x, r.center.y, r.center.z),
                        radius: r.radius,
                    },
                )
            })
            .collect();

        let episodes = def
            .episodes
            .into_iter()
            .map(|r| EpisodeRule {
                until_frame: Frame(r.until_frame),
                label: r.label,
            })
            .collect();

        Ok(Self {
            fps: def.fps,
            playback_divisor: def.playback_divisor,
            start_frame: def.start_frame,
            seed: def.seed,
            regions,
            episodes,
        })
    }

    /// Animation frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Event-time milliseconds mapped onto one animation second, e.g. 250
    /// plays back at quarter speed.
    pub fn playback_divisor(&self) -> u32 {
        self.playback_divisor
    }

    /// Offset added to every mapped frame.
    pub fn start_frame(&self) -> i64 {
        self.start_frame
    }

    /// Default placement RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Placement region for `entity_type`, if configured.
    pub fn region(&self, entity_type: &str) -> Option<&Region> {
        self.regions.get(entity_type)
    }

    /// The ordered episode threshold table.
    pub fn episode_rules(&self) -> &[EpisodeRule] {
        &self.episodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const STAGE_JSON: &str = r#"{
        "fps": 30,
        "playback_divisor": 250,
        "start_frame": 0,
        "seed": 7,
        "regions": {
            "Order":   { "center": [3.0, -2.0, 0.0], "radius": 1.0 },
            "Product": { "center": { "x": 18.0, "y": 4.0, "z": 0.0 }, "radius": 0.5 }
        },
        "episodes": [
            { "until_frame": 248,  "label": "wave-1" },
            { "until_frame": 1762, "label": "wave-2" }
        ]
    }"#;

    #[test]
    fn parses_and_exposes_the_configuration() {
        let stage = Stage::from_reader(Cursor::new(STAGE_JSON)).unwrap();
        assert_eq!(stage.fps(), 30);
        assert_eq!(stage.playback_divisor(), 250);
        assert_eq!(stage.seed(), 7);
        assert_eq!(stage.region("Order").unwrap().radius, 1.0);
        assert_eq!(stage.region("Product").unwrap().center.x, 18.0);
        assert!(stage.region("ShoppingCart").is_none());
        assert_eq!(stage.episode_rules().len(), 2);
        assert_eq!(stage.episode_rules()[0].until_frame, Frame(248));
    }

    #[test]
    fn invalid_configuration_is_rejected_with_paths() {
        let bad = r#"{
            "fps": 30,
            "playback_divisor": 250,
            "regions": { "Order": { "center": [0, 0, 0], "radius": -1.0 } }
        }"#;
        let err = Stage::from_reader(Cursor::new(bad)).unwrap_err();
        assert!(err.to_string().contains("$.regions.Order.radius"), "{err}");
    }
}
