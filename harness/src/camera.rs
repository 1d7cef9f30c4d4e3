//! Keyboard-driven fly camera.

use nalgebra::{Perspective3, Point3};
use serde::Deserialize;

use crate::input::{CameraBindings, InputState, axis};
use crate::math::{Iso, Mat4, Vec3, up};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Fly speed (meters per second).
    pub speed: f32,
    /// Initial viewport size in pixels.
    pub viewport: [u32; 2],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 10.0],
            look_at: [0.0, 0.0, 0.0],
            fov_y_deg: 60.0,
            near: 0.1,
            far: 1000.0,
            speed: 10.0,
            viewport: [1280, 720],
        }
    }
}

#[derive(Clone, Debug)]
pub struct FlyCamera {
    position: Vec3,
    forward: Vec3,
    speed: f32,
    projection: Perspective3<f32>,
}

impl FlyCamera {
    pub fn new(settings: &CameraSettings) -> Self {
        let [width, height] = settings.viewport;
        let mut camera = Self {
            position: Vec3::from(settings.position),
            forward: -Vec3::z(),
            speed: settings.speed,
            projection: Perspective3::new(
                aspect(width, height).unwrap_or(1.0),
                settings.fov_y_deg.to_radians(),
                settings.near,
                settings.far,
            ),
        };
        camera.look_at(Vec3::from(settings.look_at));
        camera
    }

    /// Turn to face `target`. Ignored when `target` is the camera position.
    pub fn look_at(&mut self, target: Vec3) {
        if let Some(dir) = (target - self.position).try_normalize(f32::EPSILON) {
            self.forward = dir;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn aspect(&self) -> f32 {
        self.projection.aspect()
    }

    pub fn view(&self) -> Mat4 {
        let eye = Point3::from(self.position);
        let target = Point3::from(self.position + self.forward);
        Iso::look_at_rh(&eye, &target, &up()).to_homogeneous()
    }

    pub fn projection(&self) -> Mat4 {
        self.projection.to_homogeneous()
    }

    /// Fly along the view direction, strafe, and rise/sink along world up.
    pub fn update(&mut self, input: &dyn InputState, bindings: &CameraBindings, dt: f32) {
        let right = self
            .forward
            .cross(&up())
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::x);
        let motion = self.forward * axis(input, bindings.forward, bindings.back)
            + right * axis(input, bindings.right, bindings.left)
            + up() * axis(input, bindings.up, bindings.down);
        self.position += motion * self.speed * dt;
    }

    /// Recompute the projection for a new viewport. Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(aspect) = aspect(width, height) {
            self.projection.set_aspect(aspect);
        }
    }
}

fn aspect(width: u32, height: u32) -> Option<f32> {
    (width > 0 && height > 0).then(|| width as f32 / height as f32)
}
