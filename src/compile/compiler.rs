use tracing::{debug, warn};

use crate::compile::episode::EpisodeClassifier;
use crate::compile::registry::{EntityKey, RelationKey, SceneRegistry};
use crate::compile::schedule::{Schedule, SceneCommand, ScheduleStats};
use crate::compile::timemap::TimeMap;
use crate::event::model::{ColorDirective, EntityRef, Event};
use crate::foundation::core::{Frame, Point3};
use crate::foundation::error::{KinegraphError, KinegraphResult};
use crate::foundation::math::{Rng64, point_in_sphere};
use crate::scene::stage::Stage;

/// Frames of inactivity after which a gap diagnostic is logged. Operators use
/// the logged bounds to tune the episode threshold table.
const ACTIVITY_GAP_FRAMES: i64 = 100;

/// Options for one compilation pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileOpts {
    /// Placement RNG seed; `None` uses the seed configured in the stage.
    pub seed: Option<u64>,
}

/// Compile an ordered event stream into an animation schedule.
///
/// One pass, front to back. The stream must be sorted ascending by
/// `time_ms`; a backward jump is a caller precondition violation that is
/// logged and mapped as-is, so frames may go backward. An event referencing
/// an entity type with no configured region aborts the pass; nothing
/// downstream of the error is emitted.
#[tracing::instrument(skip(events, stage))]
pub fn compile<I>(events: I, stage: &Stage, opts: CompileOpts) -> KinegraphResult<Schedule>
where
    I: IntoIterator<Item = Event>,
{
    let mut pass = Pass {
        rng: Rng64::new(opts.seed.unwrap_or_else(|| stage.seed())),
        registry: SceneRegistry::default(),
        classifier: EpisodeClassifier::new(stage.episode_rules().to_vec()),
        stage,
        commands: Vec::new(),
        events: 0,
    };

    let mut time_map: Option<TimeMap> = None;
    let mut last_frame: Option<Frame> = None;

    for event in events {
        pass.events += 1;

        // The origin is fixed to the first event's timestamp for the whole pass.
        let map = *time_map.get_or_insert_with(|| {
            TimeMap::new(
                event.time_ms,
                stage.fps(),
                stage.playback_divisor(),
                stage.start_frame(),
            )
        });
        let frame = map.frame_for(event.time_ms);

        if let Some(prev) = last_frame {
            if frame < prev {
                warn!(
                    prev = prev.0,
                    frame = frame.0,
                    time_ms = event.time_ms,
                    "event time went backward; input is not sorted"
                );
            } else if prev.0 + ACTIVITY_GAP_FRAMES < frame.0 {
                debug!(from = prev.0, to = frame.0, "frame activity gap");
            }
        }
        last_frame = Some(frame);

        pass.consume(&event, frame)?;
    }

    let stats = ScheduleStats {
        events: pass.events,
        points_created: pass.registry.point_count() as u64,
        paths_created: pass.registry.path_count() as u64,
        last_frame: last_frame.unwrap_or(Frame(stage.start_frame())),
    };
    debug!(
        events = stats.events,
        points = stats.points_created,
        paths = stats.paths_created,
        last_frame = stats.last_frame.0,
        "compiled schedule"
    );

    Ok(Schedule {
        commands: pass.commands,
        stats,
    })
}

/// State exclusively owned by one compilation pass.
struct Pass<'a> {
    rng: Rng64,
    registry: SceneRegistry,
    classifier: EpisodeClassifier,
    stage: &'a Stage,
    commands: Vec<SceneCommand>,
    events: u64,
}

impl Pass<'_> {
    fn consume(&mut self, event: &Event, frame: Frame) -> KinegraphResult<()> {
        let from_key = EntityKey::for_entity(&event.from);
        self.ensure_point(&event.from, &from_key, frame)?;

        if let Some(to) = &event.to {
            let to_key = EntityKey::for_entity(to);
            self.ensure_point(to, &to_key, frame)?;

            // Self-relations are never materialized.
            if from_key != to_key {
                let rel = RelationKey::for_relation(&event.from, to);
                if self.registry.path_bucket(&rel).is_none() {
                    let bucket = self.classifier.bucket_for(frame);
                    self.registry.insert_path(rel.clone(), bucket.clone());
                    self.commands.push(SceneCommand::CreatePath {
                        key: rel,
                        from: from_key.clone(),
                        to: to_key,
                        frame,
                        bucket,
                    });
                }
            }
        }

        if let Some(directive) = ColorDirective::parse(&event.message) {
            self.commands.push(SceneCommand::SetColor {
                key: from_key,
                value: directive.value(),
                frame,
            });

            // A directive pulses the event's path only when one was materialized.
            if let Some(to) = &event.to {
                let rel = RelationKey::for_relation(&event.from, to);
                if self.registry.path_bucket(&rel).is_some() {
                    self.commands
                        .push(SceneCommand::HighlightPath { key: rel, frame });
                }
            }
        }

        Ok(())
    }

    /// Materialize the point for `entity` if this is its first sight and
    /// return its location.
    ///
    /// Placement is drawn once and memoized; later references never
    /// reposition or recreate geometry.
    fn ensure_point(
        &mut self,
        entity: &EntityRef,
        key: &EntityKey,
        frame: Frame,
    ) -> KinegraphResult<Point3> {
        if let Some(location) = self.registry.point_location(key) {
            return Ok(location);
        }

        let region = self.stage.region(&entity.entity_type).ok_or_else(|| {
            KinegraphError::config(format!(
                "no region configured for entity type '{}'",
                entity.entity_type
            ))
        })?;
        let location = point_in_sphere(&mut self.rng, region.center, region.radius);

        self.registry.insert_point(key.clone(), location);
        self.commands.push(SceneCommand::CreatePoint {
            key: key.clone(),
            location,
            frame,
        });
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::episode::EpisodeBucket;
    use crate::scene::model::{EpisodeRuleDef, Point3Def, RegionDef, StageDef};
    use std::collections::BTreeMap;

    fn test_stage(episodes: Vec<EpisodeRuleDef>) -> Stage {
        let mut regions = BTreeMap::new();
        for (name, center, radius) in [
            ("Order", (3.0, -2.0, 0.0), 1.0),
            ("Product", (18.0, 4.0, 0.0), 0.5),
            ("StockSkuItem", (21.5, -2.0, 0.0), 3.0),
        ] {
            regions.insert(
                name.to_owned(),
                RegionDef {
                    center: Point3Def {
                        x: center.0,
                        y: center.1,
                        z: center.2,
                    },
                    radius,
                },
            );
        }
        Stage::from_def(StageDef {
            fps: 30,
            playback_divisor: 250,
            start_frame: 0,
            seed: 0,
            regions,
            episodes,
        })
        .unwrap()
    }

    fn ev(time_ms: i64, from: (&str, &str), to: Option<(&str, &str)>, message: &str) -> Event {
        Event {
            time_ms,
            from: EntityRef::new(from.0, from.1),
            to: to.map(|(ty, id)| EntityRef::new(ty, id)),
            message: message.to_owned(),
        }
    }

    #[test]
    fn only_the_first_reference_creates_a_point() {
        let stage = test_stage(vec![]);
        let events = vec![
            ev(1000, ("Order", "1"), None, ""),
            ev(1100, ("Order", "1"), None, ""),
            ev(1200, ("Order", "1"), Some(("Product", "9")), ""),
        ];
        let schedule = compile(events, &stage, CompileOpts::default()).unwrap();

        let creates: Vec<_> = schedule
            .commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::CreatePoint { .. }))
            .collect();
        assert_eq!(creates.len(), 2);
        assert_eq!(schedule.stats.points_created, 2);
    }

    #[test]
    fn repeated_relations_create_one_path() {
        let stage = test_stage(vec![]);
        let events = vec![
            ev(1000, ("Order", "1"), Some(("Product", "9")), ""),
            ev(1100, ("Product", "9"), Some(("Order", "1")), ""),
        ];
        let schedule = compile(events, &stage, CompileOpts::default()).unwrap();
        let paths: Vec<_> = schedule
            .commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::CreatePath { .. }))
            .collect();
        assert_eq!(paths.len(), 1);
        assert_eq!(schedule.stats.paths_created, 1);
    }

    #[test]
    fn self_relations_are_never_materialized() {
        let stage = test_stage(vec![]);
        let events = vec![ev(1000, ("Order", "1"), Some(("Order", "1")), "")];
        let schedule = compile(events, &stage, CompileOpts::default()).unwrap();
        assert!(
            schedule
                .commands
                .iter()
                .all(|c| !matches!(c, SceneCommand::CreatePath { .. }))
        );
        assert_eq!(schedule.stats.points_created, 1);
    }

    #[test]
    fn color_directive_colors_the_source_and_pulses_an_existing_path() {
        let stage = test_stage(vec![EpisodeRuleDef {
            until_frame: 100,
            label: "wave-1".to_owned(),
        }]);
        let events = vec![
            ev(1000, ("Order", "1"), None, ""),
            ev(1000, ("Order", "1"), Some(("Product", "9")), ""),
            ev(1200, ("Order", "1"), Some(("Product", "9")), "color green"),
        ];
        let schedule = compile(events, &stage, CompileOpts::default()).unwrap();

        let kinds: Vec<&SceneCommand> = schedule.commands.iter().collect();
        assert_eq!(kinds.len(), 5);
        assert!(matches!(kinds[0], SceneCommand::CreatePoint { frame, .. } if frame.0 == 0));
        assert!(matches!(kinds[1], SceneCommand::CreatePoint { frame, .. } if frame.0 == 0));
        assert!(matches!(
            kinds[2],
            SceneCommand::CreatePath { frame, bucket, .. }
                if frame.0 == 0 && *bucket == EpisodeBucket::Preset("wave-1".to_owned())
        ));
        assert!(matches!(
            kinds[3],
            SceneCommand::SetColor { value, frame, .. } if *value == 1.0 && frame.0 == 24
        ));
        assert!(matches!(kinds[4], SceneCommand::HighlightPath { frame, .. } if frame.0 == 24));
    }

    #[test]
    fn directive_without_a_path_emits_no_highlight() {
        let stage = test_stage(vec![]);
        let events = vec![ev(1000, ("Order", "1"), None, "color red")];
        let schedule = compile(events, &stage, CompileOpts::default()).unwrap();
        assert!(matches!(
            schedule.commands.last(),
            Some(SceneCommand::SetColor { value, .. }) if *value == 0.0
        ));
        assert!(
            schedule
                .commands
                .iter()
                .all(|c| !matches!(c, SceneCommand::HighlightPath { .. }))
        );
    }

    #[test]
    fn unknown_entity_type_is_a_fatal_config_error() {
        let stage = test_stage(vec![]);
        let events = vec![
            ev(1000, ("Order", "1"), None, ""),
            ev(1100, ("Warehouse", "7"), None, ""),
        ];
        let err = compile(events, &stage, CompileOpts::default()).unwrap_err();
        assert!(matches!(err, KinegraphError::Config(_)));
        assert!(err.to_string().contains("Warehouse"), "{err}");
    }

    #[test]
    fn placements_stay_inside_the_configured_region() {
        let stage = test_stage(vec![]);
        let events: Vec<Event> = (0..64)
            .map(|i| ev(1000 + i, ("StockSkuItem", &i.to_string()), None, ""))
            .collect();
        let schedule = compile(events, &stage, CompileOpts::default()).unwrap();

        let region = stage.region("StockSkuItem").unwrap();
        for cmd in &schedule.commands {
            if let SceneCommand::CreatePoint { location, .. } = cmd {
                assert!(location.distance_sq(region.center) <= region.radius * region.radius);
            }
        }
    }

    #[test]
    fn same_seed_compiles_identically_and_seeds_differ() {
        let stage = test_stage(vec![]);
        let events = || {
            vec![
                ev(1000, ("Order", "1"), Some(("Product", "9")), ""),
                ev(1500, ("Order", "2"), Some(("Product", "9")), ""),
            ]
        };

        let a = compile(events(), &stage, CompileOpts { seed: Some(11) }).unwrap();
        let b = compile(events(), &stage, CompileOpts { seed: Some(11) }).unwrap();
        let c = compile(events(), &stage, CompileOpts { seed: Some(12) }).unwrap();

        assert_eq!(a.commands, b.commands);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn episode_buckets_follow_the_threshold_table() {
        let stage = test_stage(vec![
            EpisodeRuleDef {
                until_frame: 100,
                label: "A".to_owned(),
            },
            EpisodeRuleDef {
                until_frame: 500,
                label: "B".to_owned(),
            },
        ]);
        // Frames: 0, 300, 900 under fps=30 / divisor=250.
        let events = vec![
            ev(1000, ("Order", "1"), Some(("Product", "1")), ""),
            ev(3500, ("Order", "2"), Some(("Product", "2")), ""),
            ev(8500, ("Order", "3"), Some(("Product", "3")), ""),
        ];
        let schedule = compile(events, &stage, CompileOpts::default()).unwrap();

        let buckets: Vec<&EpisodeBucket> = schedule
            .commands
            .iter()
            .filter_map(|c| match c {
                SceneCommand::CreatePath { bucket, .. } => Some(bucket),
                _ => None,
            })
            .collect();
        assert_eq!(buckets.len(), 3);
        assert_eq!(*buckets[0], EpisodeBucket::Preset("A".to_owned()));
        assert_eq!(*buckets[1], EpisodeBucket::Preset("B".to_owned()));
        assert!(buckets[2].is_fresh());
    }

    #[test]
    fn empty_stream_compiles_to_an_empty_schedule() {
        let stage = test_stage(vec![]);
        let schedule = compile(Vec::new(), &stage, CompileOpts::default()).unwrap();
        assert!(schedule.commands.is_empty());
        assert_eq!(schedule.stats.events, 0);
        assert_eq!(schedule.stats.last_frame, Frame(0));
    }
}
