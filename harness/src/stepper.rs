//! Frame-synchronous simulation stepping.

use std::time::{Duration, Instant};

use log::{trace, warn};
use serde::Deserialize;

use crate::engine::SimulationStep;
use crate::error::{HarnessError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// `dt` was not positive; the engine was not touched.
    Skipped,
    /// The world advanced; `polls` counts the `fetch_results` calls it took.
    Advanced { polls: u32 },
}

/// Advances an engine by one timestep and waits for its results.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulationStepper {
    /// Bound on the results poll. `None` polls until the engine answers.
    fetch_timeout: Option<Duration>,
}

impl SimulationStepper {
    pub fn new(fetch_timeout: Option<Duration>) -> Self {
        Self { fetch_timeout }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    /// Simulate `dt` seconds, then poll until the results are readable.
    ///
    /// Non-positive and NaN timesteps are skipped, not rejected. No pose may be
    /// read from the engine between `simulate` and a `true` poll.
    pub fn step<S: SimulationStep + ?Sized>(&self, engine: &mut S, dt: f32) -> Result<StepOutcome> {
        if dt.is_nan() || dt <= 0.0 {
            trace!("skipping step with dt={dt}");
            return Ok(StepOutcome::Skipped);
        }

        engine.simulate(dt);

        let started = Instant::now();
        let mut polls = 0u32;
        loop {
            polls += 1;
            if engine.fetch_results(false) {
                return Ok(StepOutcome::Advanced { polls });
            }
            if let Some(limit) = self.fetch_timeout {
                let waited = started.elapsed();
                if waited >= limit {
                    warn!("simulation results not ready after {polls} polls ({waited:?})");
                    return Err(HarnessError::SimulationTimeout { waited });
                }
            }
            std::hint::spin_loop();
        }
    }
}

/// How each frame's `dt` is produced.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Timestep {
    /// Same `dt` every frame.
    Fixed { dt: f32 },
    /// Wall-clock time since the previous tick, clamped to `max_dt`.
    Variable { max_dt: f32 },
}

impl Default for Timestep {
    fn default() -> Self {
        Timestep::Fixed { dt: 1.0 / 60.0 }
    }
}

#[derive(Debug)]
pub struct FrameClock {
    timestep: Timestep,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new(timestep: Timestep) -> Self {
        Self {
            timestep,
            last: None,
        }
    }

    pub fn timestep(&self) -> Timestep {
        self.timestep
    }

    /// `dt` for the frame starting now. The first variable tick returns 0.
    pub fn tick(&mut self) -> f32 {
        match self.timestep {
            Timestep::Fixed { dt } => dt,
            Timestep::Variable { max_dt } => {
                let now = Instant::now();
                let elapsed = self
                    .last
                    .map(|last| now.duration_since(last).as_secs_f32())
                    .unwrap_or(0.0);
                self.last = Some(now);
                elapsed.clamp(0.0, max_dt)
            }
        }
    }
}
