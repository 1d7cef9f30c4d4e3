/*!
Simulation engine seam.

The harness never talks to a physics library directly. It drives whatever
implements [`SimulationEngine`]:

- types:   handles, body/shape/controller descriptors, move outcome
- report:  controller hit-report capability trait
- rapier:  the rapier3d-backed engine used by the demo

Contracts
- Handles returned by the engine stay valid until `remove_body`.
- Poses and geometry read through the trait are only meaningful after
  `fetch_results` reported `true` for the last `simulate` call.
- Geometry queries mirror a "fill this struct, return success" API: they
  return `None` when the shape is not of the requested kind or the engine
  cannot answer. Callers decide how to recover.
*/

pub mod rapier;
pub mod report;
pub mod types;

pub use rapier::RapierEngine;
pub use report::{ControllerHit, ControllerHitReport, ObstacleHit, ShapeHit};
pub use types::{
    BodyDesc, BodyHandle, ControllerDesc, ControllerFilters, ControllerHandle, Material,
    MoveOutcome, ShapeDesc, ShapeGeometry, ShapeHandle, ShapeKind,
};

use crate::math::{Iso, Vec3};

/// The two-phase step of an engine: kick off a simulation, then collect results.
///
/// Split from [`SimulationEngine`] so the stepper only depends on what it calls.
pub trait SimulationStep {
    /// Start advancing the world by `dt` seconds. `dt` is always positive here.
    fn simulate(&mut self, dt: f32);

    /// Returns `true` once the last `simulate` call finished and its results are readable.
    ///
    /// With `block = true` the engine may wait internally before answering.
    fn fetch_results(&mut self, block: bool) -> bool;
}

/// Everything the harness consumes from a physics engine.
pub trait SimulationEngine: SimulationStep {
    fn create_static_body(&mut self, desc: &BodyDesc) -> BodyHandle;

    fn create_dynamic_body(&mut self, desc: &BodyDesc, density: f32) -> BodyHandle;

    /// Remove a body and all its shapes. Returns `false` if the handle was already stale.
    fn remove_body(&mut self, body: BodyHandle) -> bool;

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3);

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3>;

    /// Shapes attached to `body`, in attachment order. Empty for stale handles.
    fn shapes(&self, body: BodyHandle) -> Vec<ShapeHandle>;

    /// World pose of the body origin.
    fn global_pose(&self, body: BodyHandle) -> Option<Iso>;

    fn is_dynamic(&self, body: BodyHandle) -> bool;

    fn shape_kind(&self, shape: ShapeHandle) -> ShapeKind;

    /// Box half-extents, or `None` if the query fails.
    fn box_geometry(&self, shape: ShapeHandle) -> Option<Vec3>;

    /// Sphere radius, or `None` if the query fails.
    fn sphere_geometry(&self, shape: ShapeHandle) -> Option<f32>;

    /// Capsule `(radius, half_height)`, or `None` if the query fails.
    fn capsule_geometry(&self, shape: ShapeHandle) -> Option<(f32, f32)>;

    /// Pose of the shape relative to its body.
    fn shape_local_pose(&self, shape: ShapeHandle) -> Iso;

    fn create_controller(&mut self, desc: &ControllerDesc) -> ControllerHandle;

    /// Current capsule center of the controller.
    fn controller_position(&self, controller: ControllerHandle) -> Option<Vec3>;

    /// Sweep the controller capsule by `displacement`, sliding along what it hits.
    ///
    /// Displacements shorter than `min_distance` are dropped. Every contact is
    /// reported through `report` before this returns.
    fn move_controller(
        &mut self,
        controller: ControllerHandle,
        displacement: Vec3,
        min_distance: f32,
        dt: f32,
        filters: &ControllerFilters,
        report: &mut dyn ControllerHitReport,
    ) -> MoveOutcome;
}
