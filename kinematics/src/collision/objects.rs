//! Registry of collidable objects.
//!
//! Objects carry their own [`CollisionVolume`]; the registry resolves them against
//! terrain and integrates gravity for dynamic ones. Object-vs-object contact is not
//! modelled: [`CollisionWorld::resolve_pair`] always reports no collision.

use std::collections::BTreeMap;

use super::{
    resolver::Resolver,
    settings::GROUND_NORMAL_MIN_Y,
    types::{CollisionResult, CollisionVolume, Vec3},
};
use crate::logging::Logger;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

/// Opaque handle to the renderable body owned by the scene layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Never displaced by gravity integration.
    Static,
    Dynamic,
}

#[derive(Clone, Copy, Debug)]
pub struct CollidableObject {
    pub id: ObjectId,
    pub body: BodyHandle,
    pub volume: CollisionVolume,
    pub kind: BodyKind,
    /// Vertical speed integrated by [`CollisionWorld::apply_gravity`] (m/s).
    pub vertical_velocity: f32,
}

impl CollidableObject {
    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }
}

#[derive(Debug)]
pub struct CollisionWorld {
    objects: BTreeMap<ObjectId, CollidableObject>,
    next_id: u64,
    logger: Logger,
}

impl CollisionWorld {
    pub fn new(logger: Logger) -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
            logger,
        }
    }

    /// Register a body and return its id.
    pub fn register(
        &mut self,
        body: BodyHandle,
        volume: CollisionVolume,
        kind: BodyKind,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(
            id,
            CollidableObject {
                id,
                body,
                volume,
                kind,
                vertical_velocity: 0.0,
            },
        );
        id
    }

    pub fn unregister(&mut self, id: ObjectId) -> Option<CollidableObject> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&CollidableObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CollidableObject> {
        self.objects.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollidableObject> {
        self.objects.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Resolve a registered object at its current position.
    ///
    /// Unknown ids are a benign miss at the origin.
    pub fn resolve_object<R: Resolver + ?Sized>(
        &self,
        id: ObjectId,
        resolver: &R,
    ) -> CollisionResult {
        match self.objects.get(&id) {
            Some(object) => resolver.resolve(&object.volume, object.volume.position),
            None => {
                self.logger
                    .debug(format_args!("collision query for unknown object {:?}", id));
                CollisionResult::none(Vec3::zeros())
            }
        }
    }

    /// Object-vs-object contact. Always a miss at `a`'s position.
    pub fn resolve_pair(&self, a: ObjectId, b: ObjectId) -> CollisionResult {
        match (self.objects.get(&a), self.objects.get(&b)) {
            (Some(first), Some(_)) => CollisionResult::none(first.volume.position),
            _ => {
                self.logger.debug(format_args!(
                    "pair query with unknown object {:?} / {:?}",
                    a, b
                ));
                CollisionResult::none(Vec3::zeros())
            }
        }
    }

    /// Integrate gravity for every dynamic object and resolve it against terrain.
    ///
    /// Returns how many objects ended the step in ground contact.
    pub fn apply_gravity<R: Resolver + ?Sized>(
        &mut self,
        dt: f32,
        gravity: f32,
        resolver: &R,
    ) -> usize {
        if dt <= 0.0 {
            return 0;
        }

        let mut supported = 0;
        for object in self.objects.values_mut() {
            if object.is_static() {
                continue;
            }

            object.vertical_velocity -= gravity * dt;
            let mut candidate = object.volume.position;
            candidate.y += object.vertical_velocity * dt;

            let res = resolver.resolve(&object.volume, candidate);
            if res.hit {
                object.volume.position = res.corrected;
                if res.normal.y > GROUND_NORMAL_MIN_Y {
                    object.vertical_velocity = object.vertical_velocity.max(0.0);
                    supported += 1;
                }
            } else {
                object.volume.position = candidate;
            }
        }
        supported
    }
}
