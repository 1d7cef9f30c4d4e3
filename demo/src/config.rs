use std::path::Path;

use harness::{HarnessConfig, HarnessError, Key};
use serde::Deserialize;

/// Demo runner settings wrapped around the harness config.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub run: RunSettings,
    /// Input timeline; the last step repeats once the script runs out.
    pub script: Vec<ScriptStep>,
    pub harness: HarnessConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub frames: u32,
    /// Log a frame summary every this many frames (0 disables it).
    pub report_every: u32,
    /// Fail mesh loads whose file is missing on disk.
    pub require_assets: bool,
    /// Viewport resize applied at `resize_at_frame`.
    pub resize_to: Option<[u32; 2]>,
    pub resize_at_frame: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frames: 600,
            report_every: 60,
            require_assets: false,
            resize_to: None,
            resize_at_frame: 0,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScriptStep {
    /// How many frames this step lasts.
    pub frames: u32,
    pub keys: Vec<Key>,
    pub fire: bool,
}

impl DemoConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, HarnessError> {
        let config: Self = match path {
            Some(path) => toml::from_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.harness.validate()?;
        Ok(config)
    }
}
