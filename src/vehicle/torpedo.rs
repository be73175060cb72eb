use nalgebra::DVector;

use crate::dynamics::state::{Pose, Velocity};
use crate::error::Result;
use crate::gnc::Pid;
use super::model::{ControlMode, Current, Setpoints, VehicleModel};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Surrogate model coefficients. First-order lags throughout; no added mass,
/// no coupling beyond what the kinematics introduce.
#[derive(Debug, Clone)]
pub struct TorpedoParams {
    pub length: f64,             // m
    pub max_rudder: f64,         // rad
    pub max_stern: f64,          // rad
    pub max_rpm: f64,
    pub actuator_tau: f64,       // s, fin servo lag
    pub rpm_tau: f64,            // s, propeller spin-up lag
    pub speed_per_rpm: f64,      // m/s per rpm at steady state
    pub surge_tau: f64,          // s
    pub yaw_gain: f64,           // r_ss per (u · δr)
    pub yaw_tau: f64,            // s
    pub pitch_gain: f64,         // q_ss per (u · δs)
    pub pitch_tau: f64,          // s
    pub pitch_restoring: f64,    // 1/s², metacentric restoring
    pub roll_tau: f64,           // s
    pub max_pitch_cmd: f64,      // rad, depth loop output limit
}

impl Default for TorpedoParams {
    fn default() -> Self {
        Self {
            length: 1.6,
            max_rudder: 30f64.to_radians(),
            max_stern: 30f64.to_radians(),
            max_rpm: 1525.0,
            actuator_tau: 1.0,
            rpm_tau: 1.0,
            speed_per_rpm: 2.0 / 1525.0,
            surge_tau: 4.0,
            yaw_gain: 0.6,
            yaw_tau: 1.5,
            pitch_gain: 0.6,
            pitch_tau: 1.5,
            pitch_restoring: 0.05,
            roll_tau: 2.0,
            max_pitch_cmd: 20f64.to_radians(),
        }
    }
}

// ---------------------------------------------------------------------------
// Torpedo-shaped AUV, u = [δr, δs, n]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Torpedo {
    pub params: TorpedoParams,
    pub current: Current,
    mode: ControlMode,
    setpoints: Setpoints,
    nu: Velocity,
    u_actual: DVector<f64>,
    depth_pid: Pid,
    pitch_pid: Pid,
    heading_pid: Pid,
}

impl Torpedo {
    pub const DIM_U: usize = 3;

    pub fn new(mode: ControlMode, setpoints: Setpoints, current: Current) -> Self {
        Self::with_params(TorpedoParams::default(), mode, setpoints, current)
    }

    pub fn with_params(
        params: TorpedoParams,
        mode: ControlMode,
        setpoints: Setpoints,
        current: Current,
    ) -> Self {
        let setpoints = Setpoints {
            propulsion: setpoints.propulsion.clamp(-params.max_rpm, params.max_rpm),
            ..setpoints
        };
        Self {
            params,
            current,
            mode,
            setpoints,
            nu: Velocity::zeros(),
            u_actual: DVector::zeros(Self::DIM_U),
            depth_pid: Pid::new(0.1, 0.005, 0.0).with_integral_limit(20.0),
            pitch_pid: Pid::new(2.0, 0.0, 1.0),
            heading_pid: Pid::new(1.5, 0.0, 2.0),
        }
    }

    fn pitch_command(&mut self, eta: &Pose, dt: f64) -> f64 {
        // z is positive down: deeper target → nose down → negative pitch.
        let depth_error = self.setpoints.depth - eta[2];
        let limit = self.params.max_pitch_cmd;
        (-self.depth_pid.update(depth_error, dt)).clamp(-limit, limit)
    }

    fn stern_command(&mut self, eta: &Pose, dt: f64) -> f64 {
        let theta_d = self.pitch_command(eta, dt);
        let stern = self.pitch_pid.update(theta_d - eta[4], dt);
        stern.clamp(-self.params.max_stern, self.params.max_stern)
    }

    fn rudder_command(&mut self, eta: &Pose, dt: f64) -> f64 {
        let psi_d = self.setpoints.heading.to_radians();
        let rudder = self.heading_pid.update(psi_d - eta[5], dt);
        rudder.clamp(-self.params.max_rudder, self.params.max_rudder)
    }

    fn rpm_command(&self) -> f64 {
        self.setpoints.propulsion
    }
}

impl VehicleModel for Torpedo {
    fn name(&self) -> &str {
        "Torpedo AUV (first-order surrogate)"
    }

    fn length(&self) -> f64 {
        self.params.length
    }

    fn control_description(&self) -> String {
        match self.mode {
            ControlMode::DepthAutopilot => format!(
                "Depth autopilot, z_d = {:.1} m, n = {:.0} rpm",
                self.setpoints.depth, self.setpoints.propulsion
            ),
            ControlMode::HeadingAutopilot => format!(
                "Heading autopilot, psi_d = {:.1} deg, n = {:.0} rpm",
                self.setpoints.heading, self.setpoints.propulsion
            ),
            ControlMode::DepthHeadingAutopilot => format!(
                "Depth and heading autopilots, z_d = {:.1} m, psi_d = {:.1} deg, n = {:.0} rpm",
                self.setpoints.depth, self.setpoints.heading, self.setpoints.propulsion
            ),
            ControlMode::StepInput => format!(
                "Step input: rudder 10 deg at t = 10 s, n = {:.0} rpm",
                self.setpoints.propulsion
            ),
            ControlMode::DpControl => "Dynamic positioning (not available)".to_string(),
        }
    }

    fn dim_u(&self) -> usize {
        Self::DIM_U
    }

    fn actuator_names(&self) -> Vec<String> {
        vec!["rudder".into(), "stern_plane".into(), "rpm".into()]
    }

    fn control_mode(&self) -> ControlMode {
        self.mode
    }

    fn setpoints(&self) -> Setpoints {
        self.setpoints
    }

    fn set_setpoints(&mut self, setpoints: Setpoints) {
        self.setpoints = Setpoints {
            propulsion: setpoints
                .propulsion
                .clamp(-self.params.max_rpm, self.params.max_rpm),
            ..setpoints
        };
    }

    fn nu(&self) -> Velocity {
        self.nu
    }

    fn u_actual(&self) -> DVector<f64> {
        self.u_actual.clone()
    }

    fn set_state(&mut self, nu: Velocity, u_actual: DVector<f64>) {
        self.nu = nu;
        self.u_actual = u_actual;
    }

    fn dynamics(
        &self,
        eta: &Pose,
        nu: &Velocity,
        u_actual: &DVector<f64>,
        u_control: &DVector<f64>,
        dt: f64,
    ) -> (Velocity, DVector<f64>) {
        let p = &self.params;
        let limits = [p.max_rudder, p.max_stern, p.max_rpm];
        let taus = [p.actuator_tau, p.actuator_tau, p.rpm_tau];

        // Actuator lag toward the saturated command.
        let mut actual = u_actual.clone();
        for i in 0..Self::DIM_U {
            let cmd = u_control[i].clamp(-limits[i], limits[i]);
            actual[i] = (actual[i] + dt * (cmd - actual[i]) / taus[i]).clamp(-limits[i], limits[i]);
        }
        let (rudder, stern, rpm) = (actual[0], actual[1], actual[2]);

        let (theta, psi) = (eta[4], eta[5]);
        let u_current = self.current.speed * (self.current.direction.to_radians() - psi).cos();
        let u_rel = nu[0] - u_current;

        let u_dot = (p.speed_per_rpm * rpm - u_rel) / p.surge_tau;
        let p_dot = -nu[3] / p.roll_tau;
        let q_dot = (p.pitch_gain * nu[0] * stern - nu[4]) / p.pitch_tau - p.pitch_restoring * theta;
        let r_dot = (p.yaw_gain * nu[0] * rudder - nu[5]) / p.yaw_tau;

        let next = Velocity::new(
            nu[0] + dt * u_dot,
            0.0,
            0.0,
            nu[3] + dt * p_dot,
            nu[4] + dt * q_dot,
            nu[5] + dt * r_dot,
        );
        (next, actual)
    }

    fn depth_autopilot(&mut self, eta: &Pose, _nu: &Velocity, dt: f64) -> Result<DVector<f64>> {
        let stern = self.stern_command(eta, dt);
        Ok(DVector::from_vec(vec![0.0, stern, self.rpm_command()]))
    }

    fn heading_autopilot(&mut self, eta: &Pose, _nu: &Velocity, dt: f64) -> Result<DVector<f64>> {
        let rudder = self.rudder_command(eta, dt);
        Ok(DVector::from_vec(vec![rudder, 0.0, self.rpm_command()]))
    }

    fn depth_heading_autopilot(
        &mut self,
        eta: &Pose,
        _nu: &Velocity,
        dt: f64,
    ) -> Result<DVector<f64>> {
        let stern = self.stern_command(eta, dt);
        let rudder = self.rudder_command(eta, dt);
        Ok(DVector::from_vec(vec![rudder, stern, self.rpm_command()]))
    }

    fn step_input(&mut self, t: f64) -> Result<DVector<f64>> {
        let rudder = if t > 10.0 { 10f64.to_radians() } else { 0.0 };
        Ok(DVector::from_vec(vec![rudder, 0.0, self.rpm_command()]))
    }
}
