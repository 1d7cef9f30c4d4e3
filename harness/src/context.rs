/*!
Scene-scoped simulation context.

`SimulationContext` owns the engine together with the two tables the harness
keeps next to it:

- `BodyRegistry`: every body the scene created, in creation order, with its tag
- `BodySyncTable`: the optional body → visual bindings

Creating and removing bodies goes through the context so the three never
disagree about which bodies exist.
*/

use log::debug;

use crate::engine::{BodyDesc, BodyHandle, SimulationEngine};
use crate::error::{HarnessError, Result};
use crate::render::MeshId;
use crate::sync::{BodySyncTable, VisualEntity};
use crate::widgets::{ShapeDescriptor, build_widgets};

/// One scene-created body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredBody {
    pub handle: BodyHandle,
    pub tag: Option<String>,
}

/// Non-owning list of the bodies a scene created.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    bodies: Vec<RegisteredBody>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handle: BodyHandle, tag: Option<String>) {
        self.bodies.push(RegisteredBody { handle, tag });
    }

    /// Forget `handle`. Returns `false` if it was not registered.
    pub fn remove(&mut self, handle: BodyHandle) -> bool {
        let before = self.bodies.len();
        self.bodies.retain(|b| b.handle != handle);
        self.bodies.len() != before
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.iter().any(|b| b.handle == handle)
    }

    pub fn tag(&self, handle: BodyHandle) -> Option<&str> {
        self.bodies
            .iter()
            .find(|b| b.handle == handle)
            .and_then(|b| b.tag.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredBody> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

pub struct SimulationContext<E> {
    engine: E,
    registry: BodyRegistry,
    visuals: BodySyncTable,
}

impl<E: SimulationEngine> SimulationContext<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            registry: BodyRegistry::new(),
            visuals: BodySyncTable::new(),
        }
    }

    pub fn spawn_static(&mut self, desc: &BodyDesc, tag: Option<&str>) -> BodyHandle {
        let handle = self.engine.create_static_body(desc);
        self.registry.register(handle, tag.map(str::to_string));
        debug!("spawned static body {handle:?} tag={tag:?}");
        handle
    }

    pub fn spawn_dynamic(&mut self, desc: &BodyDesc, density: f32, tag: Option<&str>) -> BodyHandle {
        let handle = self.engine.create_dynamic_body(desc, density);
        self.registry.register(handle, tag.map(str::to_string));
        debug!("spawned dynamic body {handle:?} tag={tag:?} density={density}");
        handle
    }

    /// Spawn a dynamic body and bind `mesh` to it, placed at the body's initial pose.
    pub fn spawn_dynamic_with_visual(
        &mut self,
        desc: &BodyDesc,
        density: f32,
        tag: Option<&str>,
        mesh: MeshId,
    ) -> BodyHandle {
        let handle = self.spawn_dynamic(desc, density, tag);
        self.visuals.bind(
            handle,
            VisualEntity {
                mesh,
                world: desc.pose,
            },
        );
        handle
    }

    /// Remove a scene body from the engine, the registry and the sync table.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<()> {
        if !self.registry.remove(handle) {
            return Err(HarnessError::UnknownBody(handle));
        }
        self.visuals.unbind(handle);
        if !self.engine.remove_body(handle) {
            debug!("body {handle:?} was already gone from the engine");
        }
        Ok(())
    }

    /// Pull the current pose of every bound body onto its visual.
    pub fn sync_all(&mut self) -> usize {
        self.visuals.sync_all(&self.engine)
    }

    pub fn widgets(&self) -> impl Iterator<Item = ShapeDescriptor> + '_ {
        build_widgets(&self.engine, &self.registry)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn visuals(&self) -> &BodySyncTable {
        &self.visuals
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}
