/*!
Per-frame scene driver.

`SceneDriver` owns the simulation context and runs one frame in a fixed order:

1. fly camera
2. fire handling (spawns projectiles)
3. character controller
4. simulation step
5. body → visual sync
6. grid, widgets, player capsule and meshes submitted, then `draw_frame`

Bodies are only read after the step's results are available, and the sync
always sees the state the widgets are built from.
*/

use log::{debug, info};

use crate::camera::FlyCamera;
use crate::config::{HarnessConfig, ProjectileSettings};
use crate::context::SimulationContext;
use crate::controller::{CharacterController, GroundState};
use crate::engine::{BodyDesc, BodyHandle, ShapeDesc, ShapeGeometry, SimulationEngine};
use crate::error::Result;
use crate::input::{InputState, KeyBindings};
use crate::math::{Vec3, iso_from_translation, up};
use crate::render::{Color, Renderer, submit_grid};
use crate::scene::{SceneBodies, populate};
use crate::stepper::{SimulationStepper, StepOutcome};

pub const PLAYER_COLOR: Color = Color::rgb(0.2, 0.4, 1.0);

/// What happened during one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub step: StepOutcome,
    pub projectiles_fired: usize,
    pub synced: usize,
    pub widgets: usize,
    pub ground: GroundState,
}

pub struct SceneDriver<E: SimulationEngine> {
    ctx: SimulationContext<E>,
    scene: SceneBodies,
    controller: CharacterController,
    stepper: SimulationStepper,
    camera: FlyCamera,
    bindings: KeyBindings,
    projectile: ProjectileSettings,
    grid_size: u32,
    fire_was_down: bool,
    projectiles: Vec<BodyHandle>,
    frames: u64,
}

impl<E: SimulationEngine> SceneDriver<E> {
    /// Build the scene on `engine`. Any failure here is fatal for the demo.
    pub fn startup(engine: E, renderer: &mut dyn Renderer, config: &HarnessConfig) -> Result<Self> {
        config.validate()?;

        let mut ctx = SimulationContext::new(engine);
        let scene = populate(&mut ctx, renderer, &config.scene)?;
        let controller = CharacterController::spawn(ctx.engine_mut(), config.controller.clone());

        info!(
            "scene driver started: {} bodies, timestep {:?}, fetch timeout {:?}",
            ctx.registry().len(),
            config.timestep,
            config.fetch_timeout()
        );

        Ok(Self {
            ctx,
            scene,
            controller,
            stepper: SimulationStepper::new(config.fetch_timeout()),
            camera: FlyCamera::new(&config.camera),
            bindings: config.bindings.clone(),
            projectile: config.projectile.clone(),
            grid_size: config.grid_size,
            fire_was_down: false,
            projectiles: Vec::new(),
            frames: 0,
        })
    }

    pub fn frame(
        &mut self,
        input: &dyn InputState,
        renderer: &mut dyn Renderer,
        dt: f32,
    ) -> Result<FrameReport> {
        self.frames += 1;
        let advancing = dt > 0.0;

        if advancing {
            self.camera.update(input, &self.bindings.camera, dt);
        }

        let projectiles_fired = self.handle_fire(input);

        if advancing {
            self.controller
                .update(self.ctx.engine_mut(), input, &self.bindings, dt);
        }

        let step = self.stepper.step(self.ctx.engine_mut(), dt)?;
        let synced = self.ctx.sync_all();

        renderer.begin_frame();
        submit_grid(renderer, self.grid_size);
        let mut widgets = 0;
        for widget in self.ctx.widgets() {
            widget.submit(renderer);
            widgets += 1;
        }
        if let Some(position) = self.controller.position(self.ctx.engine()) {
            let settings = self.controller.settings();
            renderer.submit_capsule(
                iso_from_translation(position),
                settings.radius,
                settings.half_height,
                PLAYER_COLOR,
            );
        }
        for entity in self.ctx.visuals().entities() {
            renderer.submit_mesh(entity.mesh, entity.world);
        }
        renderer.draw_frame(&self.camera.view(), &self.camera.projection());

        Ok(FrameReport {
            step,
            projectiles_fired,
            synced,
            widgets,
            ground: self.controller.state().ground,
        })
    }

    /// One projectile per press; every frame while the override is held.
    fn handle_fire(&mut self, input: &dyn InputState) -> usize {
        let down = input.is_mouse_button_down(self.bindings.fire);
        let held_override = input.is_key_down(self.bindings.fire_override);
        let fire = down && (!self.fire_was_down || held_override);
        self.fire_was_down = down;

        if fire {
            self.fire_projectile();
            1
        } else {
            0
        }
    }

    /// Launch a sphere from just below the camera along its view direction.
    pub fn fire_projectile(&mut self) -> BodyHandle {
        let origin = self.camera.position() - up() * self.projectile.spawn_drop;
        let velocity = self.camera.forward() * self.projectile.muzzle_speed;
        let body = self.ctx.spawn_dynamic(
            &BodyDesc::new(
                iso_from_translation(origin),
                ShapeDesc::new(ShapeGeometry::Sphere {
                    radius: self.projectile.radius,
                }),
            ),
            self.projectile.density,
            None,
        );
        self.ctx.engine_mut().set_linear_velocity(body, velocity);
        self.projectiles.push(body);
        debug!("fired projectile {body:?} from {origin:?} at {velocity:?}");
        body
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        debug!("viewport resized to {width}x{height}");
    }

    pub fn context(&self) -> &SimulationContext<E> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SimulationContext<E> {
        &mut self.ctx
    }

    pub fn scene(&self) -> &SceneBodies {
        &self.scene
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn projectiles(&self) -> &[BodyHandle] {
        &self.projectiles
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn player_position(&self) -> Option<Vec3> {
        self.controller.position(self.ctx.engine())
    }

    /// Tear down the scene and hand the engine back.
    pub fn shutdown(self) -> E {
        info!(
            "scene driver stopped after {} frames, {} projectiles fired",
            self.frames,
            self.projectiles.len()
        );
        self.ctx.into_engine()
    }
}
