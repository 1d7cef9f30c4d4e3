//! Body → visual transform synchronization.
//!
//! The simulation owns every pose. Visual entities keep a copy that is
//! overwritten once per frame right after the step, never edited on their own.

use std::collections::HashMap;

use log::trace;

use crate::engine::{BodyHandle, SimulationEngine};
use crate::math::Iso;
use crate::render::MeshId;

/// A renderable mesh instance placed in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualEntity {
    pub mesh: MeshId,
    pub world: Iso,
}

/// Typed association table: at most one visual entity per body.
#[derive(Debug, Default)]
pub struct BodySyncTable {
    bindings: HashMap<BodyHandle, VisualEntity>,
}

impl BodySyncTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `entity` to `body`, replacing any previous binding.
    pub fn bind(&mut self, body: BodyHandle, entity: VisualEntity) -> Option<VisualEntity> {
        self.bindings.insert(body, entity)
    }

    /// Drop the binding of `body`. Only called when the body itself goes away.
    pub fn unbind(&mut self, body: BodyHandle) -> Option<VisualEntity> {
        self.bindings.remove(&body)
    }

    pub fn get(&self, body: BodyHandle) -> Option<&VisualEntity> {
        self.bindings.get(&body)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &VisualEntity> {
        self.bindings.values()
    }

    /// Copy the current global pose of every bound body onto its visual entity.
    ///
    /// Bodies the engine no longer knows are skipped. Returns the number of
    /// entities updated.
    pub fn sync_all<E: SimulationEngine + ?Sized>(&mut self, engine: &E) -> usize {
        let mut updated = 0;
        for (body, entity) in &mut self.bindings {
            if let Some(pose) = engine.global_pose(*body) {
                entity.world = pose;
                updated += 1;
            } else {
                trace!("no pose for bound body {body:?}, skipping");
            }
        }
        updated
    }
}
