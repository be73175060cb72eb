use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;

use crate::dynamics::state::{Pose, Velocity};
use crate::error::{Result, SimError};

// ---------------------------------------------------------------------------
// Control modes
// ---------------------------------------------------------------------------

/// Closed set of control modes a vehicle may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMode {
    DepthAutopilot,
    HeadingAutopilot,
    DepthHeadingAutopilot,
    DpControl,
    StepInput,
}

impl ControlMode {
    pub const ALL: [ControlMode; 5] = [
        ControlMode::DepthAutopilot,
        ControlMode::HeadingAutopilot,
        ControlMode::DepthHeadingAutopilot,
        ControlMode::DpControl,
        ControlMode::StepInput,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::DepthAutopilot => "depthAutopilot",
            ControlMode::HeadingAutopilot => "headingAutopilot",
            ControlMode::DepthHeadingAutopilot => "depthHeadingAutopilot",
            ControlMode::DpControl => "DPcontrol",
            ControlMode::StepInput => "stepInput",
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlMode {
    type Err = SimError;

    /// Exact, case-sensitive match on the mode name.
    fn from_str(s: &str) -> Result<Self> {
        ControlMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| SimError::UnknownControlMode(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Setpoints and environment
// ---------------------------------------------------------------------------

/// Autopilot references. Heading in degrees, depth in metres (positive down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Setpoints {
    pub depth: f64,
    pub heading: f64,
    pub propulsion: f64,
}

/// Uniform ocean current: speed (m/s) and direction (deg).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Current {
    pub speed: f64,
    pub direction: f64,
}

// ---------------------------------------------------------------------------
// Vehicle model contract
// ---------------------------------------------------------------------------

/// Build the error returned by a control law a vehicle does not provide.
pub fn unsupported(vehicle: &str, mode: ControlMode) -> SimError {
    SimError::UnsupportedControlMode {
        vehicle: vehicle.to_string(),
        mode: mode.to_string(),
    }
}

/// Capability interface every simulated vehicle implements.
///
/// A vehicle declares one [`ControlMode`]; the simulation loop calls the
/// matching control-law method each step. Control laws a vehicle does not
/// implement fail with [`SimError::UnsupportedControlMode`].
pub trait VehicleModel {
    fn name(&self) -> &str;

    /// Characteristic length, m.
    fn length(&self) -> f64;

    fn control_description(&self) -> String;

    /// Number of actuator/propulsion channels.
    fn dim_u(&self) -> usize;

    /// Column labels for the actuator channels, in `u` order.
    fn actuator_names(&self) -> Vec<String> {
        (1..=self.dim_u()).map(|i| format!("u{i}")).collect()
    }

    fn control_mode(&self) -> ControlMode;

    fn setpoints(&self) -> Setpoints;

    fn set_setpoints(&mut self, setpoints: Setpoints);

    /// Current body-frame velocity.
    fn nu(&self) -> Velocity;

    /// Current realized actuator state.
    fn u_actual(&self) -> DVector<f64>;

    fn set_state(&mut self, nu: Velocity, u_actual: DVector<f64>);

    /// Propagate vehicle dynamics one sample interval.
    /// Returns the next (ν, u_actual).
    fn dynamics(
        &self,
        eta: &Pose,
        nu: &Velocity,
        u_actual: &DVector<f64>,
        u_control: &DVector<f64>,
        dt: f64,
    ) -> (Velocity, DVector<f64>);

    fn depth_autopilot(&mut self, _eta: &Pose, _nu: &Velocity, _dt: f64) -> Result<DVector<f64>> {
        Err(unsupported(self.name(), ControlMode::DepthAutopilot))
    }

    fn heading_autopilot(&mut self, _eta: &Pose, _nu: &Velocity, _dt: f64) -> Result<DVector<f64>> {
        Err(unsupported(self.name(), ControlMode::HeadingAutopilot))
    }

    fn depth_heading_autopilot(
        &mut self,
        _eta: &Pose,
        _nu: &Velocity,
        _dt: f64,
    ) -> Result<DVector<f64>> {
        Err(unsupported(self.name(), ControlMode::DepthHeadingAutopilot))
    }

    fn dp_control(&mut self, _eta: &Pose, _nu: &Velocity, _dt: f64) -> Result<DVector<f64>> {
        Err(unsupported(self.name(), ControlMode::DpControl))
    }

    fn step_input(&mut self, _t: f64) -> Result<DVector<f64>> {
        Err(unsupported(self.name(), ControlMode::StepInput))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_round_trip() {
        for mode in ControlMode::ALL {
            assert_eq!(mode.as_str().parse::<ControlMode>().unwrap(), mode);
        }
    }

    #[test]
    fn unknown_mode_is_error() {
        let err = "depthheadingautopilot".parse::<ControlMode>().unwrap_err();
        assert!(matches!(err, SimError::UnknownControlMode(ref s) if s == "depthheadingautopilot"));
    }

    #[test]
    fn dp_mode_name_is_mixed_case() {
        assert_eq!("DPcontrol".parse::<ControlMode>().unwrap(), ControlMode::DpControl);
    }
}
