/*!
Handles and descriptors exchanged with a simulation engine.

This module intentionally contains no algorithms. Handles are opaque raw
index/generation pairs so that any engine (rapier, a test stub) can mint them
without exposing its own handle types to the rest of the harness.
*/

use crate::math::{Iso, Vec3};

macro_rules! raw_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            #[inline]
            pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            #[inline]
            pub const fn into_raw_parts(self) -> (u32, u32) {
                (self.index, self.generation)
            }
        }
    };
}

raw_handle!(
    /// Non-owning reference to a rigid body living in the engine.
    BodyHandle
);
raw_handle!(
    /// Non-owning reference to one collision shape attached to a body.
    ShapeHandle
);
raw_handle!(
    /// Non-owning reference to a kinematic capsule controller.
    ControllerHandle
);

/// Surface response parameters shared by the shapes of one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            static_friction: 0.5,
            dynamic_friction: 0.5,
            restitution: 0.5,
        }
    }
}

/// Supported collision geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeGeometry {
    /// Infinite plane (half-space) with +Y local normal.
    ///
    /// The plane normal is derived from the shape's world pose as `rotation * +Y`.
    Plane,

    /// Oriented box with given half-extents (meters).
    Box { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters). `half_height` is half the cylinder section length.
    Capsule { radius: f32, half_height: f32 },
}

/// One shape of a body, placed in body-local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeDesc {
    pub geometry: ShapeGeometry,
    pub local_pose: Iso,
}

impl ShapeDesc {
    /// Shape centered on the body origin.
    pub fn new(geometry: ShapeGeometry) -> Self {
        Self {
            geometry,
            local_pose: Iso::identity(),
        }
    }

    pub fn with_local_pose(mut self, local_pose: Iso) -> Self {
        self.local_pose = local_pose;
        self
    }
}

/// Everything the engine needs to create a body.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDesc {
    /// World-space pose of the body origin.
    pub pose: Iso,
    /// At least one shape; compound bodies carry several.
    pub shapes: Vec<ShapeDesc>,
    pub material: Material,
}

impl BodyDesc {
    pub fn new(pose: Iso, shape: ShapeDesc) -> Self {
        Self {
            pose,
            shapes: vec![shape],
            material: Material::default(),
        }
    }

    pub fn with_shape(mut self, shape: ShapeDesc) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }
}

/// Shape kind as reported by the engine's capability switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Sphere,
    Capsule,
    /// Anything the widget builder does not draw (planes, meshes, ...).
    Other,
}

/// Capsule controller parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerDesc {
    /// Initial capsule center (world space).
    pub position: Vec3,
    pub radius: f32,
    /// Half of the cylinder length along +Y.
    pub half_height: f32,
    /// Skin kept between the capsule and surfaces (meters).
    pub contact_offset: f32,
    /// Steepest slope the controller can climb (radians).
    pub max_slope_climb: f32,
    pub material: Material,
}

/// Scene-query filtering applied during a controller move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerFilters {
    /// Ignore sensor shapes.
    pub exclude_sensors: bool,
    /// Ignore shapes attached to dynamic bodies.
    pub exclude_dynamic: bool,
}

/// Result of a single controller move.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveOutcome {
    /// Translation actually applied after collision resolution.
    pub translation: Vec3,
    /// Whether the engine found support under the capsule.
    pub grounded: bool,
    /// Number of hit events reported during the move.
    pub hits: usize,
}
