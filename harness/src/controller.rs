/*!
Kinematic capsule character controller.

Per frame the controller:

1. decides Grounded/Airborne from the contact normal recorded by the previous
   move, integrates vertical velocity, then clears the normal;
2. maps held keys to a lateral step, a turn and an optional jump;
3. rotates `(lateral, vertical, 0)` by the facing yaw and hands it to the
   engine's sweep/move call together with its hit report.

Vertical velocity is a per-frame displacement (the move call consumes it
as-is), lateral motion is scaled by `dt`.
*/

use log::trace;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_JUMP_SPEED, DEFAULT_MIN_MOVE_DISTANCE, DEFAULT_MOVEMENT_SPEED, DEFAULT_PLAYER_GRAVITY,
    DEFAULT_ROTATION_SPEED, GROUND_NORMAL_Y_THRESHOLD, GROUNDED_VERTICAL_VELOCITY,
};
use crate::engine::{
    ControllerDesc, ControllerFilters, ControllerHandle, ControllerHitReport, Material,
    MoveOutcome, ShapeHit, SimulationEngine,
};
use crate::input::{InputState, KeyBindings, axis};
use crate::math::{Vec3, yaw_rotation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundState {
    Grounded,
    Airborne,
}

/// Player kinematic state, mutated once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterState {
    pub vertical_velocity: f32,
    /// Yaw about +Y (radians).
    pub facing_rotation: f32,
    /// Normal of the last surface hit by the previous move; zero when nothing was hit.
    pub last_ground_contact_normal: Vec3,
    /// Negative: pulls the character down while airborne.
    pub gravity_accel: f32,
    pub ground: GroundState,
}

impl CharacterState {
    pub fn new(gravity_accel: f32) -> Self {
        Self {
            vertical_velocity: 0.0,
            facing_rotation: 0.0,
            last_ground_contact_normal: Vec3::zeros(),
            gravity_accel,
            ground: GroundState::Airborne,
        }
    }

    /// Ground check and vertical integration for one frame.
    pub fn update_vertical(&mut self, dt: f32) -> GroundState {
        if self.last_ground_contact_normal.y > GROUND_NORMAL_Y_THRESHOLD {
            self.ground = GroundState::Grounded;
            self.vertical_velocity = GROUNDED_VERTICAL_VELOCITY;
        } else {
            self.ground = GroundState::Airborne;
            self.vertical_velocity += self.gravity_accel * dt;
        }
        self.last_ground_contact_normal = Vec3::zeros();
        self.ground
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Initial capsule center.
    pub spawn: [f32; 3],
    pub radius: f32,
    pub half_height: f32,
    pub contact_offset: f32,
    pub max_slope_climb_deg: f32,
    pub gravity: f32,
    pub movement_speed: f32,
    pub rotation_speed: f32,
    pub jump_speed: f32,
    pub min_move_distance: f32,
    /// Only let jump take effect while grounded.
    pub jump_requires_ground: bool,
    pub exclude_sensors: bool,
    pub exclude_dynamic: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            spawn: [0.0, 2.0, 5.0],
            radius: 0.5,
            half_height: 0.5,
            contact_offset: 0.05,
            max_slope_climb_deg: 45.0,
            gravity: DEFAULT_PLAYER_GRAVITY,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
            min_move_distance: DEFAULT_MIN_MOVE_DISTANCE,
            jump_requires_ground: false,
            exclude_sensors: true,
            exclude_dynamic: false,
        }
    }
}

impl ControllerSettings {
    pub fn desc(&self) -> ControllerDesc {
        ControllerDesc {
            position: Vec3::from(self.spawn),
            radius: self.radius,
            half_height: self.half_height,
            contact_offset: self.contact_offset,
            max_slope_climb: self.max_slope_climb_deg.to_radians(),
            material: Material::default(),
        }
    }

    pub fn filters(&self) -> ControllerFilters {
        ControllerFilters {
            exclude_sensors: self.exclude_sensors,
            exclude_dynamic: self.exclude_dynamic,
        }
    }
}

/// Held-key snapshot mapped to controller actions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveIntent {
    /// +1 forward, -1 back.
    pub forward: f32,
    /// +1 turn left, -1 turn right.
    pub turn: f32,
    pub jump: bool,
}

impl MoveIntent {
    pub fn from_input(input: &dyn InputState, bindings: &KeyBindings) -> Self {
        Self {
            forward: axis(input, bindings.forward, bindings.back),
            turn: axis(input, bindings.turn_left, bindings.turn_right),
            jump: input.is_key_down(bindings.jump),
        }
    }
}

/// Hit report injected into every move: keeps the last shape-hit normal.
#[derive(Debug, Default)]
pub struct GroundContactReport {
    pub last_normal: Option<Vec3>,
}

impl GroundContactReport {
    /// Extension point for pushing dynamic bodies the capsule runs into.
    pub fn on_dynamic_hit(&mut self, hit: &ShapeHit) {
        trace!("controller {:?} touched dynamic body {:?}", hit.controller, hit.body);
    }
}

impl ControllerHitReport for GroundContactReport {
    fn on_shape_hit(&mut self, hit: &ShapeHit) {
        self.last_normal = Some(hit.world_normal);
        if hit.body_is_dynamic {
            self.on_dynamic_hit(hit);
        }
    }
}

pub struct CharacterController {
    handle: ControllerHandle,
    state: CharacterState,
    settings: ControllerSettings,
    report: GroundContactReport,
}

impl CharacterController {
    pub fn spawn<E: SimulationEngine + ?Sized>(engine: &mut E, settings: ControllerSettings) -> Self {
        let handle = engine.create_controller(&settings.desc());
        Self {
            handle,
            state: CharacterState::new(settings.gravity),
            settings,
            report: GroundContactReport::default(),
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        self.handle
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn position<E: SimulationEngine + ?Sized>(&self, engine: &E) -> Option<Vec3> {
        engine.controller_position(self.handle)
    }

    /// Apply one intent on top of an already updated vertical state and return
    /// the world displacement to request.
    fn apply_intent(&mut self, intent: MoveIntent, dt: f32) -> Vec3 {
        let lateral = intent.forward * self.settings.movement_speed * dt;
        self.state.facing_rotation += intent.turn * self.settings.rotation_speed * dt;

        let may_jump =
            !self.settings.jump_requires_ground || self.state.ground == GroundState::Grounded;
        if intent.jump && may_jump {
            self.state.vertical_velocity = self.settings.jump_speed;
        }

        yaw_rotation(self.state.facing_rotation)
            * Vec3::new(lateral, self.state.vertical_velocity, 0.0)
    }

    /// Run one controller frame against `engine`.
    pub fn update<E: SimulationEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        input: &dyn InputState,
        bindings: &KeyBindings,
        dt: f32,
    ) -> MoveOutcome {
        // 1) Ground check from last frame's contact, then forget it.
        self.state.update_vertical(dt);

        // 2) Keys → lateral step, turn, jump.
        let intent = MoveIntent::from_input(input, bindings);
        let displacement = self.apply_intent(intent, dt);

        // 3) Sweep; the report captures this frame's contact for the next one.
        self.report.last_normal = None;
        let outcome = engine.move_controller(
            self.handle,
            displacement,
            self.settings.min_move_distance,
            dt,
            &self.settings.filters(),
            &mut self.report,
        );
        if let Some(normal) = self.report.last_normal {
            self.state.last_ground_contact_normal = normal;
        }

        trace!(
            "controller {:?}: {:?} vy={} moved={:?}",
            self.handle, self.state.ground, self.state.vertical_velocity, outcome.translation
        );
        outcome
    }
}
