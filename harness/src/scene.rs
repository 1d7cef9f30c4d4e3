/*!
Tutorial scene.

Populates a context with the demo content:

- a static ground plane
- a stack of dynamic boxes
- a dynamic sphere and a dynamic capsule
- a static box tagged as the pickup
- a compound dynamic "pole" body (shaft + head) carrying a mesh visual

The pole mesh is loaded through the renderer; failing to load it fails the
whole population.
*/

use log::info;
use serde::Deserialize;

use crate::config::{non_negative, positive};
use crate::constants::PICKUP_TAG;
use crate::context::SimulationContext;
use crate::engine::{BodyDesc, BodyHandle, ShapeDesc, ShapeGeometry, SimulationEngine};
use crate::error::Result;
use crate::math::{Iso, Vec3, iso_from_translation};
use crate::render::Renderer;

pub const GROUND_TAG: &str = "Ground";
pub const CRATE_TAG: &str = "Crate";
pub const POLE_TAG: &str = "Pole";

const POLE_DENSITY: f32 = 300.0;
const POLE_SHAFT_HALF_EXTENTS: [f32; 3] = [0.1, 4.0, 0.1];
const POLE_SHAFT_OFFSET: [f32; 3] = [0.0, 4.0, 0.0];
const POLE_HEAD_HALF_EXTENTS: [f32; 3] = [0.8, 0.5, 0.3];
const POLE_HEAD_OFFSET: [f32; 3] = [0.0, 2.0, 0.0];

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub box_stack_height: u32,
    pub box_half_extent: f32,
    /// Base of the box stack (ground contact point of the lowest box).
    pub stack_base: [f32; 3],
    pub body_density: f32,
    pub sphere_position: [f32; 3],
    pub capsule_position: [f32; 3],
    pub pickup_position: [f32; 3],
    pub pole_position: [f32; 3],
    /// Mesh bound to the pole body.
    pub pole_mesh: String,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            box_stack_height: 5,
            box_half_extent: 0.5,
            stack_base: [0.0, 0.0, -5.0],
            body_density: 10.0,
            sphere_position: [3.0, 6.0, 0.0],
            capsule_position: [-3.0, 6.0, 0.0],
            pickup_position: [5.0, 0.5, 5.0],
            pole_position: [-5.0, 0.0, -5.0],
            pole_mesh: "data/pole.fbx".to_string(),
        }
    }
}

impl SceneSettings {
    pub fn validate(&self) -> Result<()> {
        positive("scene.box_half_extent", self.box_half_extent)?;
        positive("scene.body_density", self.body_density)?;
        non_negative("scene.stack_base.y", self.stack_base[1])
    }
}

/// Handles of the bodies the tutorial scene created.
#[derive(Clone, Debug)]
pub struct SceneBodies {
    pub ground: BodyHandle,
    pub stack: Vec<BodyHandle>,
    pub sphere: BodyHandle,
    pub capsule: BodyHandle,
    pub pickup: BodyHandle,
    pub pole: BodyHandle,
}

/// Shaft and head boxes of the pole, in body-local space.
pub fn pole_desc(pose: Iso) -> BodyDesc {
    BodyDesc::new(
        pose,
        ShapeDesc::new(ShapeGeometry::Box {
            half_extents: Vec3::from(POLE_SHAFT_HALF_EXTENTS),
        })
        .with_local_pose(iso_from_translation(Vec3::from(POLE_SHAFT_OFFSET))),
    )
    .with_shape(
        ShapeDesc::new(ShapeGeometry::Box {
            half_extents: Vec3::from(POLE_HEAD_HALF_EXTENTS),
        })
        .with_local_pose(iso_from_translation(Vec3::from(POLE_HEAD_OFFSET))),
    )
}

pub fn populate<E: SimulationEngine>(
    ctx: &mut SimulationContext<E>,
    renderer: &mut dyn Renderer,
    settings: &SceneSettings,
) -> Result<SceneBodies> {
    // Load first so a missing asset leaves the scene empty.
    let pole_mesh = renderer.load_mesh(&settings.pole_mesh)?;

    let ground = ctx.spawn_static(
        &BodyDesc::new(Iso::identity(), ShapeDesc::new(ShapeGeometry::Plane)),
        Some(GROUND_TAG),
    );

    let h = settings.box_half_extent;
    let base = Vec3::from(settings.stack_base);
    let stack = (0..settings.box_stack_height)
        .map(|level| {
            let center = base + Vec3::new(0.0, h + 2.0 * h * level as f32, 0.0);
            ctx.spawn_dynamic(
                &BodyDesc::new(
                    iso_from_translation(center),
                    ShapeDesc::new(ShapeGeometry::Box {
                        half_extents: Vec3::repeat(h),
                    }),
                ),
                settings.body_density,
                Some(CRATE_TAG),
            )
        })
        .collect();

    let sphere = ctx.spawn_dynamic(
        &BodyDesc::new(
            iso_from_translation(Vec3::from(settings.sphere_position)),
            ShapeDesc::new(ShapeGeometry::Sphere { radius: h }),
        ),
        settings.body_density,
        None,
    );

    let capsule = ctx.spawn_dynamic(
        &BodyDesc::new(
            iso_from_translation(Vec3::from(settings.capsule_position)),
            ShapeDesc::new(ShapeGeometry::Capsule {
                radius: h * 0.6,
                half_height: h,
            }),
        ),
        settings.body_density,
        None,
    );

    let pickup = ctx.spawn_static(
        &BodyDesc::new(
            iso_from_translation(Vec3::from(settings.pickup_position)),
            ShapeDesc::new(ShapeGeometry::Box {
                half_extents: Vec3::repeat(h),
            }),
        ),
        Some(PICKUP_TAG),
    );

    let pole = ctx.spawn_dynamic_with_visual(
        &pole_desc(iso_from_translation(Vec3::from(settings.pole_position))),
        POLE_DENSITY,
        Some(POLE_TAG),
        pole_mesh,
    );

    info!(
        "tutorial scene ready: {} bodies, {} bound visuals",
        ctx.registry().len(),
        ctx.visuals().len()
    );

    Ok(SceneBodies {
        ground,
        stack,
        sphere,
        capsule,
        pickup,
        pole,
    })
}
