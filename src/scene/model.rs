use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON-facing stage definition.
///
/// This is the human-edited representation; it is validated and converted
/// into a runtime [`crate::scene::stage::Stage`] before compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StageDef {
    pub(crate) fps: u32,
    pub(crate) playback_divisor: u32,
    #[serde(default)]
    pub(crate) start_frame: i64,
    #[serde(default)]
    pub(crate) seed: u64,
    pub(crate) regions: BTreeMap<String, RegionDef>,
    #[serde(default)]
    pub(crate) episodes: Vec<EpisodeRuleDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct RegionDef {
    pub(crate) center: Point3Def,
    pub(crate) radius: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub(crate) struct Point3Def {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) z: f64,
}

impl<'de> Deserialize<'de> for Point3Def {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 3]),
            Obj { x: f64, y: f64, z: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y, z]) => Ok(Self { x, y, z }),
            Repr::Obj { x, y, z } => Ok(Self { x, y, z }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EpisodeRuleDef {
    pub(crate) until_frame: i64,
    pub(crate) label: String,
}
