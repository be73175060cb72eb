use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SimError};
use crate::mission::FlightPlan;
use crate::vehicle::ControlMode;

// ---------------------------------------------------------------------------
// Simulation configuration (TOML)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub sample_time: f64,              // s
    pub initial_steps: Option<usize>,
    pub control_mode: String,
    pub profile: PathBuf,
    pub output: PathBuf,
    pub summary: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sample_time: 0.1,  // 10 Hz
            initial_steps: None,
            control_mode: ControlMode::DepthHeadingAutopilot.to_string(),
            profile: PathBuf::from("mission.csv"),
            output: PathBuf::from("trajectory.csv"),
            summary: None,
        }
    }
}

impl SimConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let cfg: SimConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_time.is_finite() && self.sample_time > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "sample_time must be positive, got {}",
                self.sample_time
            )));
        }
        self.mode().map(|_| ())
    }

    pub fn mode(&self) -> Result<ControlMode> {
        self.control_mode.parse()
    }

    pub fn plan(&self) -> FlightPlan {
        FlightPlan {
            sample_time: self.sample_time,
            initial_steps: self.initial_steps,
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<SimConfig> {
    let text = std::fs::read_to_string(path)?;
    SimConfig::from_toml(&text)
}
