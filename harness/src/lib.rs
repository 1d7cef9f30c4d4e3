pub mod camera;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod driver;
pub mod engine;
pub mod error;
pub mod input;
pub mod math;
pub mod render;
pub mod scene;
pub mod stepper;
pub mod sync;
pub mod widgets;

#[cfg(test)]
pub(crate) mod testing;

pub use camera::{CameraSettings, FlyCamera};
pub use config::{HarnessConfig, ProjectileSettings};
pub use constants::{
    DEFAULT_GRID_SIZE, FALLBACK_SHAPE_EXTENT, GROUND_NORMAL_Y_THRESHOLD,
    GROUNDED_VERTICAL_VELOCITY, PICKUP_TAG,
};
pub use context::{BodyRegistry, RegisteredBody, SimulationContext};
pub use controller::{
    CharacterController, CharacterState, ControllerSettings, GroundContactReport, GroundState,
    MoveIntent,
};
pub use driver::{FrameReport, SceneDriver};
pub use engine::{
    BodyDesc, BodyHandle, ControllerHandle, RapierEngine, ShapeDesc, ShapeGeometry, ShapeHandle,
    ShapeKind, SimulationEngine, SimulationStep,
};
pub use error::{HarnessError, Result};
pub use input::{InputState, Key, KeyBindings, MouseButton};
pub use render::{Color, MeshId, Renderer, submit_grid};
pub use scene::{SceneBodies, SceneSettings};
pub use stepper::{FrameClock, SimulationStepper, StepOutcome, Timestep};
pub use sync::{BodySyncTable, VisualEntity};
pub use widgets::{ShapeDescriptor, WidgetShape, build_widgets, color_for_tag};
