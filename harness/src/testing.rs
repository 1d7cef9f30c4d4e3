//! Deterministic in-memory engine for unit tests.
//!
//! Bodies integrate velocity with explicit Euler, controllers move exactly by
//! the requested displacement, and every failure mode the harness must
//! tolerate (slow results, failing geometry queries) can be scripted.

use crate::engine::{
    BodyDesc, BodyHandle, ControllerDesc, ControllerFilters, ControllerHandle,
    ControllerHitReport, MoveOutcome, ShapeGeometry, ShapeHandle, ShapeHit, ShapeKind,
    SimulationEngine, SimulationStep,
};
use crate::math::{Iso, Vec3};

pub(crate) struct StubShape {
    pub geometry: ShapeGeometry,
    pub local_pose: Iso,
    /// Kind is reported but the geometry query fails.
    pub geometry_fails: bool,
}

pub(crate) struct StubBody {
    pub pose: Iso,
    pub dynamic: bool,
    pub velocity: Vec3,
    pub shapes: Vec<StubShape>,
}

pub(crate) struct StubController {
    pub position: Vec3,
}

#[derive(Default)]
pub(crate) struct StubEngine {
    pub bodies: Vec<Option<StubBody>>,
    pub controllers: Vec<StubController>,
    pub gravity: Vec3,
    /// `fetch_results` answers `false` this many times after each `simulate`.
    pub not_ready_polls: u32,
    pending_polls: u32,
    pub simulate_calls: u32,
    pub fetch_calls: u32,
    /// Normal reported as a shape hit by the next controller move.
    pub scripted_normal: Option<Vec3>,
    pub moves: Vec<Vec3>,
}

impl StubEngine {
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Make every geometry query of `body` fail while still reporting the kind.
    pub fn fail_geometry(&mut self, body: BodyHandle) {
        if let Some(body) = self.body_mut(body) {
            for shape in &mut body.shapes {
                shape.geometry_fails = true;
            }
        }
    }

    fn body(&self, handle: BodyHandle) -> Option<&StubBody> {
        let (index, _) = handle.into_raw_parts();
        self.bodies.get(index as usize)?.as_ref()
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut StubBody> {
        let (index, _) = handle.into_raw_parts();
        self.bodies.get_mut(index as usize)?.as_mut()
    }

    fn shape(&self, handle: ShapeHandle) -> Option<&StubShape> {
        let (body, shape) = handle.into_raw_parts();
        self.bodies
            .get(body as usize)?
            .as_ref()?
            .shapes
            .get(shape as usize)
    }

    fn insert(&mut self, desc: &BodyDesc, dynamic: bool) -> BodyHandle {
        let shapes = desc
            .shapes
            .iter()
            .map(|shape| StubShape {
                geometry: shape.geometry,
                local_pose: shape.local_pose,
                geometry_fails: false,
            })
            .collect();
        self.bodies.push(Some(StubBody {
            pose: desc.pose,
            dynamic,
            velocity: Vec3::zeros(),
            shapes,
        }));
        BodyHandle::from_raw_parts(self.bodies.len() as u32 - 1, 0)
    }
}

impl SimulationStep for StubEngine {
    fn simulate(&mut self, dt: f32) {
        self.simulate_calls += 1;
        self.pending_polls = self.not_ready_polls;
        let gravity = self.gravity;
        for body in self.bodies.iter_mut().flatten().filter(|b| b.dynamic) {
            body.pose.translation.vector += body.velocity * dt;
            body.velocity += gravity * dt;
        }
    }

    fn fetch_results(&mut self, _block: bool) -> bool {
        self.fetch_calls += 1;
        if self.pending_polls > 0 {
            self.pending_polls -= 1;
            return false;
        }
        true
    }
}

impl SimulationEngine for StubEngine {
    fn create_static_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        self.insert(desc, false)
    }

    fn create_dynamic_body(&mut self, desc: &BodyDesc, _density: f32) -> BodyHandle {
        self.insert(desc, true)
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let (index, _) = body.into_raw_parts();
        self.bodies
            .get_mut(index as usize)
            .and_then(Option::take)
            .is_some()
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.body_mut(body) {
            body.velocity = velocity;
        }
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.body(body).map(|b| b.velocity)
    }

    fn shapes(&self, body: BodyHandle) -> Vec<ShapeHandle> {
        let (index, _) = body.into_raw_parts();
        self.body(body)
            .map(|b| {
                (0..b.shapes.len() as u32)
                    .map(|shape| ShapeHandle::from_raw_parts(index, shape))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn global_pose(&self, body: BodyHandle) -> Option<Iso> {
        self.body(body).map(|b| b.pose)
    }

    fn is_dynamic(&self, body: BodyHandle) -> bool {
        self.body(body).is_some_and(|b| b.dynamic)
    }

    fn shape_kind(&self, shape: ShapeHandle) -> ShapeKind {
        match self.shape(shape).map(|s| s.geometry) {
            Some(ShapeGeometry::Box { .. }) => ShapeKind::Box,
            Some(ShapeGeometry::Sphere { .. }) => ShapeKind::Sphere,
            Some(ShapeGeometry::Capsule { .. }) => ShapeKind::Capsule,
            Some(ShapeGeometry::Plane) | None => ShapeKind::Other,
        }
    }

    fn box_geometry(&self, shape: ShapeHandle) -> Option<Vec3> {
        match self.shape(shape)? {
            StubShape {
                geometry: ShapeGeometry::Box { half_extents },
                geometry_fails: false,
                ..
            } => Some(*half_extents),
            _ => None,
        }
    }

    fn sphere_geometry(&self, shape: ShapeHandle) -> Option<f32> {
        match self.shape(shape)? {
            StubShape {
                geometry: ShapeGeometry::Sphere { radius },
                geometry_fails: false,
                ..
            } => Some(*radius),
            _ => None,
        }
    }

    fn capsule_geometry(&self, shape: ShapeHandle) -> Option<(f32, f32)> {
        match self.shape(shape)? {
            StubShape {
                geometry:
                    ShapeGeometry::Capsule {
                        radius,
                        half_height,
                    },
                geometry_fails: false,
                ..
            } => Some((*radius, *half_height)),
            _ => None,
        }
    }

    fn shape_local_pose(&self, shape: ShapeHandle) -> Iso {
        self.shape(shape)
            .map(|s| s.local_pose)
            .unwrap_or_else(Iso::identity)
    }

    fn create_controller(&mut self, desc: &ControllerDesc) -> ControllerHandle {
        self.controllers.push(StubController {
            position: desc.position,
        });
        ControllerHandle::from_raw_parts(self.controllers.len() as u32 - 1, 0)
    }

    fn controller_position(&self, controller: ControllerHandle) -> Option<Vec3> {
        let (index, _) = controller.into_raw_parts();
        self.controllers.get(index as usize).map(|c| c.position)
    }

    fn move_controller(
        &mut self,
        controller: ControllerHandle,
        displacement: Vec3,
        min_distance: f32,
        _dt: f32,
        _filters: &ControllerFilters,
        report: &mut dyn ControllerHitReport,
    ) -> MoveOutcome {
        self.moves.push(displacement);
        let (index, _) = controller.into_raw_parts();
        if displacement.norm() < min_distance {
            return MoveOutcome::default();
        }
        let Some(slot) = self.controllers.get_mut(index as usize) else {
            return MoveOutcome::default();
        };
        slot.position += displacement;

        let mut hits = 0;
        if let Some(normal) = self.scripted_normal.take() {
            hits = 1;
            report.on_shape_hit(&ShapeHit {
                controller,
                shape: ShapeHandle::from_raw_parts(u32::MAX, 0),
                body: None,
                body_is_dynamic: false,
                world_normal: normal,
                direction: displacement.normalize(),
                length: 0.0,
            });
        }

        MoveOutcome {
            translation: displacement,
            grounded: hits > 0,
            hits,
        }
    }
}
