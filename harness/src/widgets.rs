//! Collision shapes → debug-draw widgets.
//!
//! Widgets are rebuilt from the live simulation every frame. Nothing here is
//! cached: bodies come and go, and a widget must never outlive the frame it was
//! derived for.

use log::trace;

use crate::constants::{FALLBACK_SHAPE_EXTENT, PICKUP_TAG};
use crate::context::{BodyRegistry, RegisteredBody};
use crate::engine::{ShapeHandle, ShapeKind, SimulationEngine};
use crate::math::{Iso, Vec3};
use crate::render::{Color, Renderer};

/// Drawable geometry of one widget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WidgetShape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    Capsule { radius: f32, half_height: f32 },
}

/// One debug-draw primitive derived from a (body, shape) pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeDescriptor {
    pub shape: WidgetShape,
    /// World transform of the shape (body pose composed with the shape's local pose).
    pub transform: Iso,
    pub color: Color,
}

impl ShapeDescriptor {
    pub fn submit(&self, renderer: &mut dyn Renderer) {
        let center = self.transform.translation.vector;
        match self.shape {
            WidgetShape::Box { half_extents } => {
                renderer.submit_filled_box(center, half_extents, self.transform.rotation, self.color)
            }
            WidgetShape::Sphere { radius } => {
                renderer.submit_filled_sphere(center, radius, self.color)
            }
            WidgetShape::Capsule {
                radius,
                half_height,
            } => renderer.submit_capsule(self.transform, radius, half_height, self.color),
        }
    }
}

/// Pickups render green, everything else red.
pub fn color_for_tag(tag: Option<&str>) -> Color {
    if tag == Some(PICKUP_TAG) {
        Color::GREEN
    } else {
        Color::RED
    }
}

/// Lazily derive one descriptor per drawable (body, shape) pair.
///
/// The iterator borrows both the engine and the registry, so the set of bodies
/// cannot change while a pass is running; call again next frame for fresh data.
pub fn build_widgets<'a, E: SimulationEngine + ?Sized>(
    engine: &'a E,
    registry: &'a BodyRegistry,
) -> impl Iterator<Item = ShapeDescriptor> + 'a {
    registry.iter().flat_map(move |body| body_widgets(engine, body))
}

fn body_widgets<'a, E: SimulationEngine + ?Sized>(
    engine: &'a E,
    body: &'a RegisteredBody,
) -> impl Iterator<Item = ShapeDescriptor> + 'a {
    let pose = engine.global_pose(body.handle);
    let color = color_for_tag(body.tag.as_deref());
    let shapes = if pose.is_some() {
        engine.shapes(body.handle)
    } else {
        Vec::new()
    };

    shapes.into_iter().filter_map(move |shape| {
        let pose = pose?;
        let widget = widget_shape(engine, shape)?;
        Some(ShapeDescriptor {
            shape: widget,
            transform: pose * engine.shape_local_pose(shape),
            color,
        })
    })
}

/// Capability switch over the shape kind. Failed geometry queries fall back to
/// a unit extent so the widget keeps drawing.
fn widget_shape<E: SimulationEngine + ?Sized>(engine: &E, shape: ShapeHandle) -> Option<WidgetShape> {
    match engine.shape_kind(shape) {
        ShapeKind::Box => Some(WidgetShape::Box {
            half_extents: engine.box_geometry(shape).unwrap_or_else(|| {
                trace!("box query failed for {shape:?}, using fallback extents");
                Vec3::repeat(FALLBACK_SHAPE_EXTENT)
            }),
        }),
        ShapeKind::Sphere => Some(WidgetShape::Sphere {
            radius: engine
                .sphere_geometry(shape)
                .unwrap_or(FALLBACK_SHAPE_EXTENT),
        }),
        ShapeKind::Capsule => {
            let (radius, half_height) = engine
                .capsule_geometry(shape)
                .unwrap_or((FALLBACK_SHAPE_EXTENT, FALLBACK_SHAPE_EXTENT));
            Some(WidgetShape::Capsule {
                radius,
                half_height,
            })
        }
        ShapeKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BodyDesc, ShapeDesc, ShapeGeometry};
    use crate::math::{iso_from_parts, iso_from_translation, yaw_rotation};
    use crate::render::recording::{RecordingRenderer, Submitted};
    use crate::testing::StubEngine;

    fn unit_box() -> ShapeDesc {
        ShapeDesc::new(ShapeGeometry::Box {
            half_extents: Vec3::new(0.5, 0.5, 0.5),
        })
    }

    #[test]
    fn one_descriptor_per_drawable_shape() {
        let mut engine = StubEngine::default();
        let mut registry = BodyRegistry::new();

        let ground = engine.create_static_body(&BodyDesc::new(
            Iso::identity(),
            ShapeDesc::new(ShapeGeometry::Plane),
        ));
        registry.register(ground, None);

        let compound = engine.create_dynamic_body(
            &BodyDesc::new(Iso::identity(), unit_box())
                .with_shape(ShapeDesc::new(ShapeGeometry::Sphere { radius: 0.2 }))
                .with_shape(ShapeDesc::new(ShapeGeometry::Capsule {
                    radius: 0.3,
                    half_height: 0.6,
                })),
            1.0,
        );
        registry.register(compound, None);

        let widgets: Vec<_> = build_widgets(&engine, &registry).collect();
        assert_eq!(widgets.len(), 3);
        assert!(matches!(widgets[0].shape, WidgetShape::Box { .. }));
        assert_eq!(widgets[1].shape, WidgetShape::Sphere { radius: 0.2 });
        assert_eq!(
            widgets[2].shape,
            WidgetShape::Capsule {
                radius: 0.3,
                half_height: 0.6
            }
        );
    }

    #[test]
    fn transform_composes_body_and_local_pose() {
        let mut engine = StubEngine::default();
        let mut registry = BodyRegistry::new();
        let body_pose = iso_from_parts(Vec3::new(1.0, 0.0, 0.0), yaw_rotation(std::f32::consts::FRAC_PI_2));
        let local = iso_from_translation(Vec3::new(0.0, 4.0, 2.0));
        let body = engine.create_dynamic_body(
            &BodyDesc::new(body_pose, unit_box().with_local_pose(local)),
            1.0,
        );
        registry.register(body, None);

        let widget = build_widgets(&engine, &registry).next().unwrap();
        assert_eq!(widget.transform, body_pose * local);
        // +Z local offset rotated a quarter turn about +Y lands on +X.
        let t = widget.transform.translation.vector;
        assert!((t - Vec3::new(3.0, 4.0, 0.0)).norm() < 1.0e-5, "t = {t:?}");
    }

    #[test]
    fn failed_geometry_queries_fall_back_to_unit_extent() {
        let mut engine = StubEngine::default();
        let mut registry = BodyRegistry::new();
        let body = engine.create_dynamic_body(
            &BodyDesc::new(Iso::identity(), unit_box())
                .with_shape(ShapeDesc::new(ShapeGeometry::Sphere { radius: 0.2 }))
                .with_shape(ShapeDesc::new(ShapeGeometry::Capsule {
                    radius: 0.3,
                    half_height: 0.6,
                })),
            1.0,
        );
        engine.fail_geometry(body);
        registry.register(body, None);

        let widgets: Vec<_> = build_widgets(&engine, &registry).map(|w| w.shape).collect();
        assert_eq!(
            widgets,
            vec![
                WidgetShape::Box {
                    half_extents: Vec3::new(1.0, 1.0, 1.0)
                },
                WidgetShape::Sphere { radius: 1.0 },
                WidgetShape::Capsule {
                    radius: 1.0,
                    half_height: 1.0
                },
            ]
        );
    }

    #[test]
    fn pickup_tag_is_green_and_everything_else_red() {
        assert_eq!(color_for_tag(Some("Pickup1")), Color::GREEN);
        assert_eq!(color_for_tag(Some("pickup1")), Color::RED);
        assert_eq!(color_for_tag(Some("Pickup10")), Color::RED);
        assert_eq!(color_for_tag(None), Color::RED);

        let mut engine = StubEngine::default();
        let mut registry = BodyRegistry::new();
        let pickup = engine.create_static_body(&BodyDesc::new(Iso::identity(), unit_box()));
        let crate_box = engine.create_static_body(&BodyDesc::new(Iso::identity(), unit_box()));
        registry.register(pickup, Some("Pickup1".to_string()));
        registry.register(crate_box, Some("Crate".to_string()));

        let colors: Vec<_> = build_widgets(&engine, &registry).map(|w| w.color).collect();
        assert_eq!(colors, vec![Color::GREEN, Color::RED]);
    }

    #[test]
    fn removed_body_disappears_from_the_next_pass() {
        let mut engine = StubEngine::default();
        let mut registry = BodyRegistry::new();
        let a = engine.create_dynamic_body(&BodyDesc::new(Iso::identity(), unit_box()), 1.0);
        let b = engine.create_dynamic_body(&BodyDesc::new(Iso::identity(), unit_box()), 1.0);
        registry.register(a, None);
        registry.register(b, None);

        assert_eq!(build_widgets(&engine, &registry).count(), 2);

        registry.remove(a);
        engine.remove_body(a);
        assert_eq!(build_widgets(&engine, &registry).count(), 1);
    }

    #[test]
    fn stale_registry_entry_yields_nothing() {
        let mut engine = StubEngine::default();
        let mut registry = BodyRegistry::new();
        let a = engine.create_dynamic_body(&BodyDesc::new(Iso::identity(), unit_box()), 1.0);
        registry.register(a, None);
        engine.remove_body(a);
        assert_eq!(build_widgets(&engine, &registry).count(), 0);
    }

    #[test]
    fn descriptors_submit_matching_primitives() {
        let mut renderer = RecordingRenderer::default();
        let transform = iso_from_translation(Vec3::new(0.0, 1.0, 0.0));
        ShapeDescriptor {
            shape: WidgetShape::Sphere { radius: 0.5 },
            transform,
            color: Color::RED,
        }
        .submit(&mut renderer);
        ShapeDescriptor {
            shape: WidgetShape::Capsule {
                radius: 0.5,
                half_height: 1.0,
            },
            transform,
            color: Color::GREEN,
        }
        .submit(&mut renderer);

        assert_eq!(
            renderer.submitted,
            vec![
                Submitted::Sphere(Vec3::new(0.0, 1.0, 0.0), 0.5, Color::RED),
                Submitted::Capsule(transform, 0.5, 1.0, Color::GREEN),
            ]
        );
    }
}
