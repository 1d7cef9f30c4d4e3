/*!
Harness tuning constants.

These centralize the numbers used by the controller, the widget builder and
the demo scene so they stay consistent between the library defaults, the
config defaults and the tests.

Notes
- Distances are in meters, time in seconds, angles in radians.
- Controller vertical quantities are per-frame displacements, matching how the
  sweep/move call consumes them.
*/

/// Tag that marks a body as the pickup; its widgets render green.
pub const PICKUP_TAG: &str = "Pickup1";

/// A contact normal counts as ground when its Y component exceeds this.
pub const GROUND_NORMAL_Y_THRESHOLD: f32 = 0.3;

/// Vertical velocity applied while grounded.
///
/// Small downward bias that keeps the capsule pressed onto the ground instead of floating.
pub const GROUNDED_VERTICAL_VELOCITY: f32 = -0.1;

/// Default controller gravity (negative, applied while airborne).
pub const DEFAULT_PLAYER_GRAVITY: f32 = -0.5;

/// Default lateral speed of the player (meters per second).
pub const DEFAULT_MOVEMENT_SPEED: f32 = 10.0;

/// Default turn rate of the player (radians per second).
pub const DEFAULT_ROTATION_SPEED: f32 = 1.0;

/// Default vertical velocity set by the jump key.
pub const DEFAULT_JUMP_SPEED: f32 = 0.2;

/// Displacements shorter than this are not applied by the controller move.
pub const DEFAULT_MIN_MOVE_DISTANCE: f32 = 0.001;

/// Extent/radius used when a shape reports a kind but its geometry query fails.
pub const FALLBACK_SHAPE_EXTENT: f32 = 1.0;

/// Projectile defaults (sphere fired from the camera).
pub const DEFAULT_PROJECTILE_RADIUS: f32 = 0.5;
pub const DEFAULT_PROJECTILE_DENSITY: f32 = 10.0;
pub const DEFAULT_MUZZLE_SPEED: f32 = 20.0;
pub const DEFAULT_SPAWN_DROP: f32 = 0.5;

/// Cells per axis of the reference grid drawn under the scene.
pub const DEFAULT_GRID_SIZE: u32 = 50;

/// Height of the reference grid. Slightly below zero so it does not z-fight the ground.
pub const GRID_HEIGHT: f32 = -0.01;
