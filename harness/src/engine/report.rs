//! Hit reporting for controller moves.
//!
//! The engine calls one hook per contact produced while sweeping a controller.
//! All hooks default to no-ops so a report only overrides what it cares about.

use crate::engine::{BodyHandle, ControllerHandle, ShapeHandle};
use crate::math::Vec3;

/// Controller touched a regular shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeHit {
    pub controller: ControllerHandle,
    pub shape: ShapeHandle,
    /// Body owning the shape, if the shape is attached to one.
    pub body: Option<BodyHandle>,
    /// True if `body` is dynamic; hits on dynamic bodies can receive response forces.
    pub body_is_dynamic: bool,
    /// World-space contact normal pointing from the surface toward the controller.
    pub world_normal: Vec3,
    /// Direction of the attempted motion at the time of contact.
    pub direction: Vec3,
    /// Remaining length of the attempted motion at the time of contact.
    pub length: f32,
}

/// Controller touched another controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerHit {
    pub controller: ControllerHandle,
    pub other: ControllerHandle,
    pub world_normal: Vec3,
}

/// Controller touched a user obstacle (engines without obstacles never emit this).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleHit {
    pub controller: ControllerHandle,
    pub world_normal: Vec3,
}

/// Capability interface injected into `SimulationEngine::move_controller`.
pub trait ControllerHitReport {
    fn on_shape_hit(&mut self, _hit: &ShapeHit) {}

    fn on_controller_hit(&mut self, _hit: &ControllerHit) {}

    fn on_obstacle_hit(&mut self, _hit: &ObstacleHit) {}
}

/// Report that ignores every hit.
impl ControllerHitReport for () {}
