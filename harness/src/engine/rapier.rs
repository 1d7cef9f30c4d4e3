//! Rapier3d-backed simulation engine.
//!
//! Owns every rapier set and pipeline object in one struct because
//! `PhysicsPipeline::step()` needs mutable access to all of them at once.
//! Controllers use rapier's `KinematicCharacterController` against a borrowed
//! query pipeline, exactly like a query-only world would, but the world here
//! is fully simulated.
//!
//! Release order is the field order: controllers go first, then the sets they
//! point into.

use log::{debug, trace};
use rapier3d::control::{CharacterCollision, CharacterLength, KinematicCharacterController};
use rapier3d::pipeline::QueryFilterFlags;
use rapier3d::prelude::*;

use crate::engine::{
    BodyDesc, BodyHandle, ControllerDesc, ControllerFilters, ControllerHandle, ControllerHit,
    ControllerHitReport, Material, MoveOutcome, ShapeDesc, ShapeGeometry, ShapeHandle, ShapeHit,
    ShapeKind, SimulationEngine, SimulationStep,
};
use crate::math::{Iso, Vec3};

/// Rapier state kept per kinematic controller.
struct ControllerSlot {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    shape: Capsule,
    /// Capsule center, updated immediately by every move so consecutive moves compose
    /// even when no step runs in between.
    position: Vec3,
    kcc: KinematicCharacterController,
}

/// All rapier state in a single owner.
pub struct RapierEngine {
    controllers: Vec<ControllerSlot>,

    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    /// A `simulate` ran and its results were not fetched yet.
    results_pending: bool,
}

impl RapierEngine {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            controllers: Vec::new(),
            gravity,
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            results_pending: false,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Number of bodies in the world, controllers included.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn insert_body(
        &mut self,
        builder: RigidBodyBuilder,
        desc: &BodyDesc,
        density: Option<f32>,
    ) -> BodyHandle {
        let body = builder
            .translation(desc.pose.translation.vector)
            .rotation(desc.pose.rotation.scaled_axis())
            .build();
        let handle = self.bodies.insert(body);

        for shape in &desc.shapes {
            let mut collider = collider_from_shape(shape, &desc.material);
            if let Some(density) = density {
                collider = collider.density(density);
            }
            self.colliders
                .insert_with_parent(collider.build(), handle, &mut self.bodies);
        }

        body_handle(handle)
    }

    fn controller_for_body(&self, body: RigidBodyHandle) -> Option<ControllerHandle> {
        self.controllers
            .iter()
            .position(|slot| slot.body == body)
            .map(|index| ControllerHandle::from_raw_parts(index as u32, 0))
    }

    /// Translate one rapier collision into the matching report hook.
    fn dispatch_hit(
        &self,
        controller: ControllerHandle,
        collision: &CharacterCollision,
        direction: Vec3,
        report: &mut dyn ControllerHitReport,
    ) {
        // Keep the normal opposing the attempted motion so ground contacts point up.
        let mut normal = collision.hit.normal1.into_inner();
        if normal.dot(&direction) > 0.0 {
            normal = -normal;
        }

        let parent = self
            .colliders
            .get(collision.handle)
            .and_then(|collider| collider.parent());

        if let Some(other) = parent.and_then(|body| self.controller_for_body(body)) {
            report.on_controller_hit(&ControllerHit {
                controller,
                other,
                world_normal: normal,
            });
            return;
        }

        let body_is_dynamic = parent
            .and_then(|body| self.bodies.get(body))
            .is_some_and(|body| body.is_dynamic());

        report.on_shape_hit(&ShapeHit {
            controller,
            shape: shape_handle(collision.handle),
            body: parent.map(body_handle),
            body_is_dynamic,
            world_normal: normal,
            direction,
            length: collision.translation_remaining.norm(),
        });
    }
}

impl Default for RapierEngine {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.81, 0.0))
    }
}

impl SimulationStep for RapierEngine {
    fn simulate(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        self.results_pending = true;
    }

    fn fetch_results(&mut self, _block: bool) -> bool {
        // Rapier steps synchronously: results exist as soon as `simulate` returns.
        if self.results_pending {
            trace!("rapier results fetched");
        }
        self.results_pending = false;
        true
    }
}

impl SimulationEngine for RapierEngine {
    fn create_static_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        self.insert_body(RigidBodyBuilder::fixed(), desc, None)
    }

    fn create_dynamic_body(&mut self, desc: &BodyDesc, density: f32) -> BodyHandle {
        self.insert_body(RigidBodyBuilder::dynamic(), desc, Some(density))
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        self.bodies
            .remove(
                rapier_body(body),
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(rb) = self.bodies.get_mut(rapier_body(body)) {
            rb.set_linvel(velocity, true);
        }
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(rapier_body(body)).map(|rb| *rb.linvel())
    }

    fn shapes(&self, body: BodyHandle) -> Vec<ShapeHandle> {
        self.bodies
            .get(rapier_body(body))
            .map(|rb| rb.colliders().iter().copied().map(shape_handle).collect())
            .unwrap_or_default()
    }

    fn global_pose(&self, body: BodyHandle) -> Option<Iso> {
        self.bodies.get(rapier_body(body)).map(|rb| *rb.position())
    }

    fn is_dynamic(&self, body: BodyHandle) -> bool {
        self.bodies
            .get(rapier_body(body))
            .is_some_and(|rb| rb.is_dynamic())
    }

    fn shape_kind(&self, shape: ShapeHandle) -> ShapeKind {
        let Some(collider) = self.colliders.get(rapier_collider(shape)) else {
            return ShapeKind::Other;
        };
        match collider.shape().shape_type() {
            ShapeType::Cuboid => ShapeKind::Box,
            ShapeType::Ball => ShapeKind::Sphere,
            ShapeType::Capsule => ShapeKind::Capsule,
            _ => ShapeKind::Other,
        }
    }

    fn box_geometry(&self, shape: ShapeHandle) -> Option<Vec3> {
        self.colliders
            .get(rapier_collider(shape))?
            .shape()
            .as_cuboid()
            .map(|cuboid| cuboid.half_extents)
    }

    fn sphere_geometry(&self, shape: ShapeHandle) -> Option<f32> {
        self.colliders
            .get(rapier_collider(shape))?
            .shape()
            .as_ball()
            .map(|ball| ball.radius)
    }

    fn capsule_geometry(&self, shape: ShapeHandle) -> Option<(f32, f32)> {
        self.colliders
            .get(rapier_collider(shape))?
            .shape()
            .as_capsule()
            .map(|capsule| (capsule.radius, capsule.half_height()))
    }

    fn shape_local_pose(&self, shape: ShapeHandle) -> Iso {
        self.colliders
            .get(rapier_collider(shape))
            .and_then(|collider| collider.position_wrt_parent().copied())
            .unwrap_or_else(Iso::identity)
    }

    fn create_controller(&mut self, desc: &ControllerDesc) -> ControllerHandle {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(desc.position)
            .build();
        let body = self.bodies.insert(body);

        let collider = ColliderBuilder::capsule_y(desc.half_height, desc.radius)
            .friction(desc.material.dynamic_friction)
            .restitution(desc.material.restitution)
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        let kcc = KinematicCharacterController {
            up: Vector::y_axis(),
            offset: CharacterLength::Absolute(desc.contact_offset),
            max_slope_climb_angle: desc.max_slope_climb,
            ..KinematicCharacterController::default()
        };

        let index = self.controllers.len() as u32;
        self.controllers.push(ControllerSlot {
            body,
            collider,
            shape: Capsule::new_y(desc.half_height, desc.radius),
            position: desc.position,
            kcc,
        });
        debug!("created capsule controller {index} at {:?}", desc.position);

        ControllerHandle::from_raw_parts(index, 0)
    }

    fn controller_position(&self, controller: ControllerHandle) -> Option<Vec3> {
        let (index, _) = controller.into_raw_parts();
        self.controllers
            .get(index as usize)
            .map(|slot| slot.position)
    }

    fn move_controller(
        &mut self,
        controller: ControllerHandle,
        displacement: Vec3,
        min_distance: f32,
        dt: f32,
        filters: &ControllerFilters,
        report: &mut dyn ControllerHitReport,
    ) -> MoveOutcome {
        let (index, _) = controller.into_raw_parts();
        let index = index as usize;
        let Some(slot) = self.controllers.get(index) else {
            return MoveOutcome::default();
        };

        let length = displacement.norm();
        if !length.is_finite() || length < min_distance {
            return MoveOutcome::default();
        }
        let direction = displacement / length;

        let mut filter = QueryFilter::default()
            .exclude_rigid_body(slot.body)
            .exclude_collider(slot.collider);
        if filters.exclude_sensors {
            filter.flags |= QueryFilterFlags::EXCLUDE_SENSORS;
        }
        if filters.exclude_dynamic {
            filter.flags |= QueryFilterFlags::EXCLUDE_DYNAMIC;
        }

        let query_pipeline = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        );

        let start = Isometry::translation(slot.position.x, slot.position.y, slot.position.z);
        let mut collisions = Vec::new();
        let corrected = slot.kcc.move_shape(
            dt,
            &query_pipeline,
            &slot.shape,
            &start,
            displacement,
            |collision| collisions.push(collision),
        );

        for collision in &collisions {
            self.dispatch_hit(controller, collision, direction, report);
        }

        let slot = &mut self.controllers[index];
        slot.position += corrected.translation;
        let body = slot.body;
        let position = slot.position;
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.set_next_kinematic_translation(position);
        }

        MoveOutcome {
            translation: corrected.translation,
            grounded: corrected.grounded,
            hits: collisions.len(),
        }
    }
}

/// Build a rapier collider for one body shape.
///
/// The shape's local pose becomes the collider's pose relative to its parent body.
fn collider_from_shape(desc: &ShapeDesc, material: &Material) -> ColliderBuilder {
    let builder = match desc.geometry {
        // Local +Y normal; the parent pose and local rotation orient it.
        ShapeGeometry::Plane => ColliderBuilder::halfspace(Vector::y_axis()),

        ShapeGeometry::Box { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ShapeGeometry::Sphere { radius } => ColliderBuilder::ball(radius),

        ShapeGeometry::Capsule {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(half_height, radius),
    };

    builder
        .translation(desc.local_pose.translation.vector)
        .rotation(desc.local_pose.rotation.scaled_axis())
        .friction(material.dynamic_friction)
        .restitution(material.restitution)
}

fn body_handle(handle: RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle::from_raw_parts(index, generation)
}

fn rapier_body(handle: BodyHandle) -> RigidBodyHandle {
    let (index, generation) = handle.into_raw_parts();
    RigidBodyHandle::from_raw_parts(index, generation)
}

fn shape_handle(handle: ColliderHandle) -> ShapeHandle {
    let (index, generation) = handle.into_raw_parts();
    ShapeHandle::from_raw_parts(index, generation)
}

fn rapier_collider(handle: ShapeHandle) -> ColliderHandle {
    let (index, generation) = handle.into_raw_parts();
    ColliderHandle::from_raw_parts(index, generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{iso_from_parts, iso_from_translation, yaw_rotation};

    const DT: f32 = 1.0 / 60.0;

    fn ground(engine: &mut RapierEngine) -> BodyHandle {
        engine.create_static_body(&BodyDesc::new(
            Iso::identity(),
            ShapeDesc::new(ShapeGeometry::Plane),
        ))
    }

    fn controller_desc(position: Vec3) -> ControllerDesc {
        ControllerDesc {
            position,
            radius: 0.5,
            half_height: 0.5,
            contact_offset: 0.01,
            max_slope_climb: 45_f32.to_radians(),
            material: Material::default(),
        }
    }

    #[derive(Default)]
    struct LastNormal(Option<Vec3>);

    impl ControllerHitReport for LastNormal {
        fn on_shape_hit(&mut self, hit: &ShapeHit) {
            self.0 = Some(hit.world_normal);
        }
    }

    #[test]
    fn dynamic_body_falls_and_static_body_stays() {
        let mut engine = RapierEngine::default();
        let fixed = engine.create_static_body(&BodyDesc::new(
            iso_from_translation(Vec3::new(5.0, 0.0, 0.0)),
            ShapeDesc::new(ShapeGeometry::Box {
                half_extents: Vec3::new(1.0, 1.0, 1.0),
            }),
        ));
        let ball = engine.create_dynamic_body(
            &BodyDesc::new(
                iso_from_translation(Vec3::new(0.0, 10.0, 0.0)),
                ShapeDesc::new(ShapeGeometry::Sphere { radius: 0.5 }),
            ),
            10.0,
        );

        for _ in 0..30 {
            engine.simulate(DT);
            assert!(engine.fetch_results(true));
        }

        let ball_y = engine.global_pose(ball).unwrap().translation.y;
        assert!(ball_y < 10.0, "ball should fall, y = {ball_y}");
        assert_eq!(
            engine.global_pose(fixed).unwrap().translation.vector,
            Vec3::new(5.0, 0.0, 0.0)
        );
        assert!(engine.is_dynamic(ball));
        assert!(!engine.is_dynamic(fixed));
    }

    #[test]
    fn geometry_queries_match_the_created_shapes() {
        let mut engine = RapierEngine::default();
        let local = iso_from_translation(Vec3::new(0.0, 2.0, 0.0));
        let body = engine.create_dynamic_body(
            &BodyDesc::new(
                Iso::identity(),
                ShapeDesc::new(ShapeGeometry::Box {
                    half_extents: Vec3::new(0.1, 4.0, 0.1),
                }),
            )
            .with_shape(ShapeDesc::new(ShapeGeometry::Sphere { radius: 0.3 }).with_local_pose(local))
            .with_shape(ShapeDesc::new(ShapeGeometry::Capsule {
                radius: 0.2,
                half_height: 0.7,
            })),
            300.0,
        );

        let shapes = engine.shapes(body);
        assert_eq!(shapes.len(), 3);

        assert_eq!(engine.shape_kind(shapes[0]), ShapeKind::Box);
        assert_eq!(engine.box_geometry(shapes[0]), Some(Vec3::new(0.1, 4.0, 0.1)));
        assert_eq!(engine.sphere_geometry(shapes[0]), None);

        assert_eq!(engine.shape_kind(shapes[1]), ShapeKind::Sphere);
        assert_eq!(engine.sphere_geometry(shapes[1]), Some(0.3));
        let pose = engine.shape_local_pose(shapes[1]);
        assert!((pose.translation.vector - Vec3::new(0.0, 2.0, 0.0)).norm() < 1.0e-6);

        assert_eq!(engine.shape_kind(shapes[2]), ShapeKind::Capsule);
        let (radius, half_height) = engine.capsule_geometry(shapes[2]).unwrap();
        assert!((radius - 0.2).abs() < 1.0e-6);
        assert!((half_height - 0.7).abs() < 1.0e-6);
    }

    #[test]
    fn plane_reports_other_kind() {
        let mut engine = RapierEngine::default();
        let plane = ground(&mut engine);
        let shapes = engine.shapes(plane);
        assert_eq!(shapes.len(), 1);
        assert_eq!(engine.shape_kind(shapes[0]), ShapeKind::Other);
    }

    #[test]
    fn body_pose_is_applied_at_creation() {
        let mut engine = RapierEngine::default();
        let pose = iso_from_parts(Vec3::new(1.0, 2.0, 3.0), yaw_rotation(0.25));
        let body = engine.create_static_body(&BodyDesc::new(
            pose,
            ShapeDesc::new(ShapeGeometry::Sphere { radius: 1.0 }),
        ));
        let read = engine.global_pose(body).unwrap();
        assert!((read.translation.vector - pose.translation.vector).norm() < 1.0e-6);
        assert!(read.rotation.angle_to(&pose.rotation) < 1.0e-5);
    }

    #[test]
    fn removed_body_has_no_shapes_or_pose() {
        let mut engine = RapierEngine::default();
        let body = engine.create_dynamic_body(
            &BodyDesc::new(
                Iso::identity(),
                ShapeDesc::new(ShapeGeometry::Sphere { radius: 0.5 }),
            ),
            1.0,
        );
        assert!(engine.remove_body(body));
        assert!(!engine.remove_body(body));
        assert!(engine.shapes(body).is_empty());
        assert!(engine.global_pose(body).is_none());
    }

    #[test]
    fn controller_lands_on_ground_and_reports_upward_normal() {
        let mut engine = RapierEngine::default();
        ground(&mut engine);
        // Populate the broad-phase before querying.
        engine.simulate(DT);
        engine.fetch_results(true);

        let controller = engine.create_controller(&controller_desc(Vec3::new(0.0, 2.0, 0.0)));
        let mut report = LastNormal::default();
        let outcome = engine.move_controller(
            controller,
            Vec3::new(0.0, -5.0, 0.0),
            0.001,
            DT,
            &ControllerFilters::default(),
            &mut report,
        );

        assert!(outcome.hits > 0);
        let normal = report.0.expect("ground hit");
        assert!(normal.y > 0.9, "normal = {normal:?}");

        let y = engine.controller_position(controller).unwrap().y;
        assert!(y > 0.9 && y < 1.2, "capsule center should rest on the plane, y = {y}");
    }

    #[test]
    fn controller_ignores_moves_below_min_distance() {
        let mut engine = RapierEngine::default();
        let start = Vec3::new(0.0, 3.0, 0.0);
        let controller = engine.create_controller(&controller_desc(start));

        let outcome = engine.move_controller(
            controller,
            Vec3::new(0.0005, 0.0, 0.0),
            0.001,
            DT,
            &ControllerFilters::default(),
            &mut (),
        );

        assert_eq!(outcome, MoveOutcome::default());
        assert_eq!(engine.controller_position(controller), Some(start));
    }

    #[test]
    fn unknown_controller_is_a_no_op() {
        let mut engine = RapierEngine::default();
        let outcome = engine.move_controller(
            ControllerHandle::from_raw_parts(7, 0),
            Vec3::new(1.0, 0.0, 0.0),
            0.001,
            DT,
            &ControllerFilters::default(),
            &mut (),
        );
        assert_eq!(outcome, MoveOutcome::default());
    }
}
