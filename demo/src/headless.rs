//! Window-less renderer and scripted input for running the demo in a terminal.

use std::path::Path;

use harness::math::{Iso, Mat4, Quat, Vec3};
use harness::{Color, HarnessError, InputState, Key, MeshId, MouseButton, Renderer};
use log::{debug, trace};

use crate::config::ScriptStep;

/// Counts what a real renderer would draw each frame.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    require_assets: bool,
    meshes: Vec<String>,
    pub lines: usize,
    pub solids: usize,
    pub instances: usize,
    pub frames: u64,
}

impl HeadlessRenderer {
    pub fn new(require_assets: bool) -> Self {
        Self {
            require_assets,
            ..Self::default()
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn load_mesh(&mut self, name: &str) -> harness::Result<MeshId> {
        if self.require_assets && !Path::new(name).is_file() {
            return Err(HarnessError::MeshLoad {
                name: name.to_string(),
                reason: "file not found".to_string(),
            });
        }
        self.meshes.push(name.to_string());
        debug!("registered mesh `{name}`");
        Ok(MeshId(self.meshes.len() as u32 - 1))
    }

    fn begin_frame(&mut self) {
        self.lines = 0;
        self.solids = 0;
        self.instances = 0;
    }

    fn submit_line(&mut self, _start: Vec3, _end: Vec3, _color: Color) {
        self.lines += 1;
    }

    fn submit_filled_box(&mut self, _center: Vec3, _half_extents: Vec3, _rotation: Quat, _color: Color) {
        self.solids += 1;
    }

    fn submit_filled_sphere(&mut self, _center: Vec3, _radius: f32, _color: Color) {
        self.solids += 1;
    }

    fn submit_capsule(&mut self, _transform: Iso, _radius: f32, _half_height: f32, _color: Color) {
        self.solids += 1;
    }

    fn submit_mesh(&mut self, mesh: MeshId, world: Iso) {
        self.instances += 1;
        trace!("mesh {mesh:?} at {:?}", world.translation.vector);
    }

    fn draw_frame(&mut self, _view: &Mat4, _projection: &Mat4) {
        self.frames += 1;
    }
}

/// Replays a list of held-input steps, one frame at a time.
pub struct ScriptedInput {
    steps: Vec<ScriptStep>,
    step: usize,
    frames_in_step: u32,
}

impl ScriptedInput {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            step: 0,
            frames_in_step: 0,
        }
    }

    fn current(&self) -> Option<&ScriptStep> {
        self.steps.get(self.step).or_else(|| self.steps.last())
    }

    /// Move to the next frame of the script.
    pub fn advance(&mut self) {
        let Some(step) = self.steps.get(self.step) else {
            return;
        };
        self.frames_in_step += 1;
        if self.frames_in_step >= step.frames {
            self.step += 1;
            self.frames_in_step = 0;
        }
    }
}

impl InputState for ScriptedInput {
    fn is_key_down(&self, key: Key) -> bool {
        self.current().is_some_and(|s| s.keys.contains(&key))
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        button == MouseButton::Left && self.current().is_some_and(|s| s.fire)
    }
}
