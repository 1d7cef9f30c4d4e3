/*!
Math aliases shared by every harness module.

The engine, the sync table and the renderer seam all exchange poses as
nalgebra isometries. Rapier uses the same nalgebra types through workspace
settings, so these convert to and from rapier without copies.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;
pub type Mat4 = na::Matrix4<f32>;

/// World up axis. Every yaw in the harness is a rotation about it.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Yaw-only rotation about +Y.
#[inline]
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_axis_angle(&na::Vector3::y_axis(), yaw)
}

/// Build an isometry from a translation and a rotation.
#[inline]
pub fn iso_from_parts(translation: Vec3, rotation: Quat) -> Iso {
    Iso::from_parts(
        na::Translation3::new(translation.x, translation.y, translation.z),
        rotation,
    )
}

/// Pure translation isometry.
#[inline]
pub fn iso_from_translation(translation: Vec3) -> Iso {
    iso_from_parts(translation, Quat::identity())
}
