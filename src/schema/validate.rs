use crate::scene::model::StageDef;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaError {
    pub(crate) path: Vec<SchemaPathElem>,
    pub(crate) message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Key(key) => {
                s.push('.');
                s.push_str(key);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaErrors {
    pub(crate) errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

pub(crate) fn validate_stage(def: &StageDef) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();

    if def.fps == 0 {
        errors.push(SchemaError::at(
            &[SchemaPathElem::Field("fps")],
            "fps must be > 0",
        ));
    }
    if def.playback_divisor == 0 {
        errors.push(SchemaError::at(
            &[SchemaPathElem::Field("playback_divisor")],
            "playback_divisor must be > 0",
        ));
    }
    if def.start_frame < 0 {
        errors.push(SchemaError::at(
            &[SchemaPathElem::Field("start_frame")],
            "start_frame must be >= 0",
        ));
    }

    for (name, region) in &def.regions {
        let base = [
            SchemaPathElem::Field("regions"),
            SchemaPathElem::Key(name.clone()),
        ];
        if !(region.radius.is_finite() && region.radius > 0.0) {
            let mut path = base.to_vec();
            path.push(SchemaPathElem::Field("radius"));
            errors.push(SchemaError::at(&path, "radius must be finite and > 0"));
        }
        let c = region.center;
        if !(c.x.is_finite() && c.y.is_finite() && c.z.is_finite()) {
            let mut path = base.to_vec();
            path.push(SchemaPathElem::Field("center"));
            errors.push(SchemaError::at(&path, "center components must be finite"));
        }
    }

    // Episode thresholds form an ordered table scanned front to back; equal or
    // descending thresholds would shadow later rows.
    let mut labels = HashSet::<&str>::new();
    let mut prev_until: Option<i64> = None;
    for (i, rule) in def.episodes.iter().enumerate() {
        let base = [SchemaPathElem::Field("episodes"), SchemaPathElem::Index(i)];
        if rule.until_frame < 0 {
            let mut path = base.to_vec();
            path.push(SchemaPathElem::Field("until_frame"));
            errors.push(SchemaError::at(&path, "until_frame must be >= 0"));
        }
        if let Some(prev) = prev_until
            && rule.until_frame <= prev
        {
            let mut path = base.to_vec();
            path.push(SchemaPathElem::Field("until_frame"));
            errors.push(SchemaError::at(
                &path,
                "until_frame must be strictly ascending",
            ));
        }
        prev_until = Some(rule.until_frame);

        if rule.label.is_empty() {
            let mut path = base.to_vec();
            path.push(SchemaPathElem::Field("label"));
            errors.push(SchemaError::at(&path, "label must not be empty"));
        } else if !labels.insert(rule.label.as_str()) {
            let mut path = base.to_vec();
            path.push(SchemaPathElem::Field("label"));
            errors.push(SchemaError::at(&path, "label must be unique"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::model::{EpisodeRuleDef, Point3Def, RegionDef, StageDef};
    use std::collections::BTreeMap;

    fn minimal_def() -> StageDef {
        let mut regions = BTreeMap::new();
        regions.insert(
            "Order".to_owned(),
            RegionDef {
                center: Point3Def {
                    x: 3.0,
                    y: -2.0,
                    z: 0.0,
                },
                radius: 1.0,
            },
        );
        StageDef {
            fps: 30,
            playback_divisor: 250,
            start_frame: 0,
            seed: 0,
            regions,
            episodes: vec![],
        }
    }

    #[test]
    fn minimal_def_validates() {
        assert!(validate_stage(&minimal_def()).is_ok());
    }

    #[test]
    fn zero_fps_and_divisor_are_rejected() {
        let mut def = minimal_def();
        def.fps = 0;
        def.playback_divisor = 0;
        let errs = validate_stage(&def).unwrap_err();
        assert_eq!(errs.errors.len(), 2);
        assert!(errs.to_string().contains("$.fps"));
        assert!(errs.to_string().contains("$.playback_divisor"));
    }

    #[test]
    fn region_errors_are_path_addressed() {
        let mut def = minimal_def();
        def.regions.get_mut("Order").unwrap().radius = 0.0;
        let errs = validate_stage(&def).unwrap_err();
        assert!(errs.to_string().contains("$.regions.Order.radius"));
    }

    #[test]
    fn episode_thresholds_must_ascend_and_labels_must_be_unique() {
        let mut def = minimal_def();
        def.episodes = vec![
            EpisodeRuleDef {
                until_frame: 500,
                label: "a".to_owned(),
            },
            EpisodeRuleDef {
                until_frame: 100,
                label: "a".to_owned(),
            },
        ];
        let errs = validate_stage(&def).unwrap_err();
        let msg = errs.to_string();
        assert!(msg.contains("$.episodes[1].until_frame"), "{msg}");
        assert!(msg.contains("$.episodes[1].label"), "{msg}");
    }
}
