mod config;
mod headless;

use std::path::PathBuf;
use std::process::ExitCode;

use harness::{FrameClock, RapierEngine, SceneDriver};
use harness::math::Vec3;
use log::{error, info};

use crate::config::DemoConfig;
use crate::headless::{HeadlessRenderer, ScriptedInput};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match DemoConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load config {path:?}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = HeadlessRenderer::new(config.run.require_assets);
    let engine = RapierEngine::new(Vec3::from(config.harness.gravity));
    let mut driver = match SceneDriver::startup(engine, &mut renderer, &config.harness) {
        Ok(driver) => driver,
        Err(err) => {
            error!("startup failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut input = ScriptedInput::new(config.script.clone());
    let mut clock = FrameClock::new(config.harness.timestep);
    let run = &config.run;

    for frame in 0..run.frames {
        if let Some([width, height]) = run.resize_to {
            if frame == run.resize_at_frame {
                driver.resize(width, height);
            }
        }

        let report = match driver.frame(&input, &mut renderer, clock.tick()) {
            Ok(report) => report,
            Err(err) => {
                error!("frame {frame} failed: {err}");
                return ExitCode::FAILURE;
            }
        };
        input.advance();

        if run.report_every > 0 && (frame + 1) % run.report_every == 0 {
            info!(
                "frame {}: {:?}, player {:?} at {:?}, {} widgets, {} lines, {} mesh instances",
                frame + 1,
                report.step,
                report.ground,
                driver.player_position(),
                report.widgets,
                renderer.lines,
                renderer.instances
            );
        }
    }

    let projectiles = driver.projectiles().len();
    let engine = driver.shutdown();
    info!(
        "done: {} frames drawn, {projectiles} projectiles, {} rapier bodies",
        renderer.frames,
        engine.body_count()
    );
    ExitCode::SUCCESS
}
