use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compile::episode::EpisodeBucket;
use crate::event::model::EntityRef;
use crate::foundation::core::Point3;

/// Canonical identity of one visual point.
///
/// Derived as `type + "_" + id`; every event referencing the same `(type,
/// id)` pair resolves to the same key and therefore the same point.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey(String);

impl EntityKey {
    /// Canonical key for an entity reference.
    pub fn for_entity(entity: &EntityRef) -> Self {
        Self(format!("{}_{}", entity.entity_type, entity.id))
    }

    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical identity of one visual path between two points.
///
/// Symmetric: both endpoint orders produce the same key. The endpoint whose
/// `type` string sorts lexicographically smaller comes first; equal types
/// keep the original order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationKey(String);

impl RelationKey {
    /// Canonical key for the unordered relation between `from` and `to`.
    pub fn for_relation(from: &EntityRef, to: &EntityRef) -> Self {
        if from.entity_type > to.entity_type {
            Self(format!(
                "{}_{}_{}_{}",
                to.entity_type, to.id, from.entity_type, from.id
            ))
        } else {
            Self(format!(
                "{}_{}_{}_{}",
                from.entity_type, from.id, to.entity_type, to.id
            ))
        }
    }

    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Created-state ledger owned by one compilation pass.
///
/// Key transitions are one-way and terminal: once a key is recorded here it
/// never produces another create command, only identity lookups. Point
/// placements are memoized so later references never reposition geometry;
/// path buckets are assigned at creation and immutable thereafter.
#[derive(Debug, Default)]
pub(crate) struct SceneRegistry {
    points: HashMap<EntityKey, Point3>,
    paths: HashMap<RelationKey, EpisodeBucket>,
}

impl SceneRegistry {
    pub(crate) fn point_location(&self, key: &EntityKey) -> Option<Point3> {
        self.points.get(key).copied()
    }

    pub(crate) fn insert_point(&mut self, key: EntityKey, location: Point3) {
        self.points.insert(key, location);
    }

    pub(crate) fn path_bucket(&self, key: &RelationKey) -> Option<&EpisodeBucket> {
        self.paths.get(key)
    }

    pub(crate) fn insert_path(&mut self, key: RelationKey, bucket: EpisodeBucket) {
        self.paths.insert(key, bucket);
    }

    pub(crate) fn point_count(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn path_count(&self) -> usize {
        self.paths.len()
    }
}
