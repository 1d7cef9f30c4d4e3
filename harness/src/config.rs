//! Harness configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//! `validate()` runs after parsing and rejects values the simulation cannot use.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::camera::CameraSettings;
use crate::constants::{
    DEFAULT_GRID_SIZE, DEFAULT_MUZZLE_SPEED, DEFAULT_PROJECTILE_DENSITY, DEFAULT_PROJECTILE_RADIUS,
    DEFAULT_SPAWN_DROP,
};
use crate::controller::ControllerSettings;
use crate::error::{HarnessError, Result};
use crate::input::KeyBindings;
use crate::scene::SceneSettings;
use crate::stepper::Timestep;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// World gravity applied to dynamic bodies (m/s²).
    pub gravity: [f32; 3],
    pub timestep: Timestep,
    /// Bound on the per-step results poll, in milliseconds. Unbounded when absent.
    pub fetch_timeout_ms: Option<u64>,
    pub grid_size: u32,
    pub controller: ControllerSettings,
    pub camera: CameraSettings,
    pub projectile: ProjectileSettings,
    pub scene: SceneSettings,
    pub bindings: KeyBindings,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: Timestep::default(),
            fetch_timeout_ms: None,
            grid_size: DEFAULT_GRID_SIZE,
            controller: ControllerSettings::default(),
            camera: CameraSettings::default(),
            projectile: ProjectileSettings::default(),
            scene: SceneSettings::default(),
            bindings: KeyBindings::default(),
        }
    }
}

/// Sphere fired from the camera.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectileSettings {
    #[serde(default = "default_projectile_radius")]
    pub radius: f32,
    #[serde(default = "default_projectile_density")]
    pub density: f32,
    #[serde(default = "default_muzzle_speed")]
    pub muzzle_speed: f32,
    /// Spawn this far below the camera so the sphere does not fill the view.
    #[serde(default = "default_spawn_drop")]
    pub spawn_drop: f32,
}

const fn default_projectile_radius() -> f32 {
    DEFAULT_PROJECTILE_RADIUS
}

const fn default_projectile_density() -> f32 {
    DEFAULT_PROJECTILE_DENSITY
}

const fn default_muzzle_speed() -> f32 {
    DEFAULT_MUZZLE_SPEED
}

const fn default_spawn_drop() -> f32 {
    DEFAULT_SPAWN_DROP
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            radius: default_projectile_radius(),
            density: default_projectile_density(),
            muzzle_speed: default_muzzle_speed(),
            spawn_drop: default_spawn_drop(),
        }
    }
}

impl HarnessConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(HarnessError::invalid("gravity", "components must be finite"));
        }

        match self.timestep {
            Timestep::Fixed { dt } if !(dt.is_finite() && dt > 0.0) => {
                return Err(HarnessError::invalid("timestep.dt", "must be positive"));
            }
            Timestep::Variable { max_dt } if !(max_dt.is_finite() && max_dt > 0.0) => {
                return Err(HarnessError::invalid("timestep.max_dt", "must be positive"));
            }
            _ => {}
        }

        if self.fetch_timeout_ms == Some(0) {
            return Err(HarnessError::invalid(
                "fetch_timeout_ms",
                "must be at least 1 (omit it to poll without a bound)",
            ));
        }

        let c = &self.controller;
        positive("controller.radius", c.radius)?;
        non_negative("controller.half_height", c.half_height)?;
        non_negative("controller.contact_offset", c.contact_offset)?;
        non_negative("controller.min_move_distance", c.min_move_distance)?;
        non_negative("controller.movement_speed", c.movement_speed)?;
        non_negative("controller.rotation_speed", c.rotation_speed)?;
        if !(c.gravity.is_finite() && c.gravity <= 0.0) {
            return Err(HarnessError::invalid(
                "controller.gravity",
                "must be zero or negative",
            ));
        }
        if !(0.0..=90.0).contains(&c.max_slope_climb_deg) {
            return Err(HarnessError::invalid(
                "controller.max_slope_climb_deg",
                "must be within [0, 90]",
            ));
        }

        let cam = &self.camera;
        if !(cam.fov_y_deg > 0.0 && cam.fov_y_deg < 180.0) {
            return Err(HarnessError::invalid("camera.fov_y_deg", "must be within (0, 180)"));
        }
        positive("camera.near", cam.near)?;
        if !(cam.far > cam.near) {
            return Err(HarnessError::invalid("camera.far", "must be greater than camera.near"));
        }

        positive("projectile.radius", self.projectile.radius)?;
        positive("projectile.density", self.projectile.density)?;

        self.scene.validate()
    }
}

pub(crate) fn positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(HarnessError::invalid(field, "must be positive"))
    }
}

pub(crate) fn non_negative(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(HarnessError::invalid(field, "must be zero or positive"))
    }
}
