//! Renderer seam.
//!
//! The harness submits immediate-mode primitives and mesh instances each frame,
//! then asks the renderer to draw with the camera matrices. Everything below
//! the trait (shaders, buffers, windows) belongs to the implementation.

use crate::constants::GRID_HEIGHT;
use crate::error::Result;
use crate::math::{Iso, Mat4, Quat, Vec3};

/// Renderer-assigned identifier of a loaded mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Linear RGBA color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

pub trait Renderer {
    /// Load a mesh by name. Failure here is fatal for startup.
    fn load_mesh(&mut self, name: &str) -> Result<MeshId>;

    /// Discard primitives submitted for the previous frame.
    fn begin_frame(&mut self) {}

    fn submit_line(&mut self, start: Vec3, end: Vec3, color: Color);

    fn submit_filled_box(&mut self, center: Vec3, half_extents: Vec3, rotation: Quat, color: Color);

    fn submit_filled_sphere(&mut self, center: Vec3, radius: f32, color: Color);

    /// Y-aligned capsule in the frame of `transform`.
    fn submit_capsule(&mut self, transform: Iso, radius: f32, half_height: f32, color: Color);

    fn submit_mesh(&mut self, mesh: MeshId, world: Iso);

    fn draw_frame(&mut self, view: &Mat4, projection: &Mat4);
}

/// Submit the reference grid: `size + 1` lines along each axis, centre lines white.
pub fn submit_grid(renderer: &mut dyn Renderer, size: u32) {
    let half = (size / 2) as f32;
    for i in 0..=size {
        let offset = -half + i as f32;
        let color = if i == size / 2 {
            Color::WHITE
        } else {
            Color::BLACK
        };
        renderer.submit_line(
            Vec3::new(offset, GRID_HEIGHT, -half),
            Vec3::new(offset, GRID_HEIGHT, half),
            color,
        );
        renderer.submit_line(
            Vec3::new(-half, GRID_HEIGHT, offset),
            Vec3::new(half, GRID_HEIGHT, offset),
            color,
        );
    }
}


#[cfg(test)]
mod tests {
    use super::recording::{RecordingRenderer, Submitted};
    use super::*;

    #[test]
    fn grid_has_two_white_centre_lines() {
        let mut renderer = RecordingRenderer::default();
        submit_grid(&mut renderer, 50);

        assert_eq!(renderer.submitted.len(), 102);
        let white = renderer.count(|s| matches!(s, Submitted::Line(_, _, c) if *c == Color::WHITE));
        assert_eq!(white, 2);
        assert!(renderer.submitted.iter().all(|s| match s {
            Submitted::Line(a, b, _) => a.y == GRID_HEIGHT && b.y == GRID_HEIGHT,
            _ => false,
        }));
    }

    #[test]
    fn grid_spans_from_minus_half_to_half() {
        let mut renderer = RecordingRenderer::default();
        submit_grid(&mut renderer, 4);
        let Submitted::Line(start, end, _) = &renderer.submitted[0] else {
            panic!("expected a line");
        };
        assert_eq!(*start, Vec3::new(-2.0, GRID_HEIGHT, -2.0));
        assert_eq!(*end, Vec3::new(-2.0, GRID_HEIGHT, 2.0));
    }
}
