use nalgebra::DVector;
use tracing::debug;

use crate::dynamics::state::{Pose, SampleRow, Velocity};
use crate::error::{Result, SimError};
use crate::vehicle::{ControlMode, VehicleModel};
use super::integrator::attitude_euler;
use super::trajectory::Segment;

// ---------------------------------------------------------------------------
// Control-law dispatch
// ---------------------------------------------------------------------------

/// Evaluate the control law bound to the vehicle's declared mode.
pub fn control_demand(
    vehicle: &mut dyn VehicleModel,
    eta: &Pose,
    nu: &Velocity,
    t: f64,
    dt: f64,
) -> Result<DVector<f64>> {
    let u_control = match vehicle.control_mode() {
        ControlMode::DepthAutopilot => vehicle.depth_autopilot(eta, nu, dt)?,
        ControlMode::HeadingAutopilot => vehicle.heading_autopilot(eta, nu, dt)?,
        ControlMode::DepthHeadingAutopilot => vehicle.depth_heading_autopilot(eta, nu, dt)?,
        ControlMode::DpControl => vehicle.dp_control(eta, nu, dt)?,
        ControlMode::StepInput => vehicle.step_input(t)?,
    };

    if u_control.len() != vehicle.dim_u() {
        return Err(SimError::ShapeMismatch {
            what: "control demand length",
            expected: vehicle.dim_u(),
            found: u_control.len(),
        });
    }
    Ok(u_control)
}

// ---------------------------------------------------------------------------
// Fixed-step simulation loop
// ---------------------------------------------------------------------------

/// Run `steps + 1` samples at interval `dt`, starting from `initial_pose` and
/// the vehicle's current ν and u_actual.
///
/// Each row records the state at the start of its step together with the
/// control demand computed from it. Sample times are `i·dt + time_offset`.
pub fn simulate(
    steps: usize,
    dt: f64,
    vehicle: &mut dyn VehicleModel,
    time_offset: f64,
    initial_pose: Pose,
) -> Result<Segment> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "sample time must be positive, got {dt}"
        )));
    }

    let mut eta = initial_pose;
    let mut nu = vehicle.nu();
    let mut u_actual = vehicle.u_actual();
    if u_actual.len() != vehicle.dim_u() {
        return Err(SimError::ShapeMismatch {
            what: "actual actuation length",
            expected: vehicle.dim_u(),
            found: u_actual.len(),
        });
    }

    let rows = steps.checked_add(1).ok_or_else(|| {
        SimError::InvalidParameter(format!("step count {steps} is too large"))
    })?;
    let mut segment = Segment::with_capacity(vehicle.dim_u(), rows.min(200_000));

    for i in 0..=steps {
        let t = i as f64 * dt;

        let u_control = control_demand(vehicle, &eta, &nu, t, dt)?;

        segment.push(
            t + time_offset,
            SampleRow {
                eta,
                nu,
                u_control: u_control.clone(),
                u_actual: u_actual.clone(),
            },
        )?;

        let (next_nu, next_u) = vehicle.dynamics(&eta, &nu, &u_actual, &u_control, dt);
        nu = next_nu;
        u_actual = next_u;
        eta = attitude_euler(&eta, &nu, dt);
    }

    vehicle.set_state(nu, u_actual);

    debug!(
        rows = segment.len(),
        start = time_offset,
        end = segment.last_time().unwrap_or(time_offset),
        "segment complete"
    );
    Ok(segment)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::vehicle::Setpoints;

    /// Vehicle whose dynamics hold ν at zero and leave u_actual untouched.
    pub(crate) struct Frozen {
        pub mode: ControlMode,
        pub setpoints: Setpoints,
        pub nu: Velocity,
        pub u_actual: DVector<f64>,
    }

    impl Frozen {
        pub(crate) fn new(mode: ControlMode) -> Self {
            Self {
                mode,
                setpoints: Setpoints::default(),
                nu: Velocity::zeros(),
                u_actual: DVector::from_vec(vec![0.1, 0.2, 0.3]),
            }
        }
    }

    impl VehicleModel for Frozen {
        fn name(&self) -> &str {
            "frozen"
        }
        fn length(&self) -> f64 {
            1.0
        }
        fn control_description(&self) -> String {
            "none".into()
        }
        fn dim_u(&self) -> usize {
            3
        }
        fn control_mode(&self) -> ControlMode {
            self.mode
        }
        fn setpoints(&self) -> Setpoints {
            self.setpoints
        }
        fn set_setpoints(&mut self, setpoints: Setpoints) {
            self.setpoints = setpoints;
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
            _eta: &Pose,
            _nu: &Velocity,
            u_actual: &DVector<f64>,
            _u_control: &DVector<f64>,
            _dt: f64,
        ) -> (Velocity, DVector<f64>) {
            (Velocity::zeros(), u_actual.clone())
        }
        fn depth_heading_autopilot(
            &mut self,
            _eta: &Pose,
            _nu: &Velocity,
            _dt: f64,
        ) -> Result<DVector<f64>> {
            Ok(DVector::from_vec(vec![
                self.setpoints.heading,
                self.setpoints.depth,
                self.setpoints.propulsion,
            ]))
        }
        fn step_input(&mut self, t: f64) -> Result<DVector<f64>> {
            Ok(DVector::from_vec(vec![t, 0.0, 0.0]))
        }
    }

    /// Vehicle that surges at a constant 1 m/s and counts actuation up by one per step.
    pub(crate) struct Cruiser {
        pub nu: Velocity,
        pub u_actual: DVector<f64>,
        pub setpoints: Setpoints,
    }

    impl Cruiser {
        pub(crate) fn new() -> Self {
            Self {
                nu: Velocity::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0),
                u_actual: DVector::zeros(3),
                setpoints: Setpoints::default(),
            }
        }
    }

    impl VehicleModel for Cruiser {
        fn name(&self) -> &str {
            "cruiser"
        }
        fn length(&self) -> f64 {
            2.0
        }
        fn control_description(&self) -> String {
            "constant surge".into()
        }
        fn dim_u(&self) -> usize {
            3
        }
        fn control_mode(&self) -> ControlMode {
            ControlMode::DepthHeadingAutopilot
        }
        fn setpoints(&self) -> Setpoints {
            self.setpoints
        }
        fn set_setpoints(&mut self, setpoints: Setpoints) {
            self.setpoints = setpoints;
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
            _eta: &Pose,
            nu: &Velocity,
            u_actual: &DVector<f64>,
            _u_control: &DVector<f64>,
            _dt: f64,
        ) -> (Velocity, DVector<f64>) {
            (*nu, u_actual.add_scalar(1.0))
        }
        fn depth_heading_autopilot(
            &mut self,
            eta: &Pose,
            _nu: &Velocity,
            _dt: f64,
        ) -> Result<DVector<f64>> {
            Ok(DVector::from_vec(vec![eta[0], self.setpoints.depth, self.setpoints.propulsion]))
        }
    }

    #[test]
    fn row_count_is_steps_plus_one() {
        for steps in [0, 1, 7, 50] {
            let mut v = Frozen::new(ControlMode::DepthHeadingAutopilot);
            let seg = simulate(steps, 0.1, &mut v, 0.0, Pose::zeros()).unwrap();
            assert_eq!(seg.len(), steps + 1);
            assert_eq!(seg.times().len(), seg.rows().len());
        }
    }

    #[test]
    fn times_are_offset_multiples_of_dt() {
        let mut v = Frozen::new(ControlMode::DepthHeadingAutopilot);
        let seg = simulate(4, 0.25, &mut v, 10.0, Pose::zeros()).unwrap();
        assert_eq!(seg.times(), &[10.0, 10.25, 10.5, 10.75, 11.0]);
    }

    #[test]
    fn frozen_dynamics_keep_pose() {
        let start = Pose::new(3.0, -2.0, 15.0, 0.05, -0.1, 1.3);
        let mut v = Frozen::new(ControlMode::DepthHeadingAutopilot);
        let seg = simulate(25, 0.1, &mut v, 0.0, start).unwrap();
        for row in seg.rows() {
            assert_eq!(row.eta, start);
        }
    }

    #[test]
    fn rows_record_state_before_the_step() {
        let mut v = Cruiser::new();
        let seg = simulate(3, 0.5, &mut v, 0.0, Pose::zeros()).unwrap();
        let rows = seg.rows();
        assert_eq!(rows[0].eta[0], 0.0);
        assert_eq!(rows[0].u_actual[0], 0.0);
        assert_eq!(rows[1].eta[0], 0.5);
        assert_eq!(rows[1].u_actual[0], 1.0);
        // Control demand is computed from the recorded pose.
        assert_eq!(rows[2].u_control[0], rows[2].eta[0]);
    }

    #[test]
    fn vehicle_state_is_left_at_end_of_run() {
        let mut v = Cruiser::new();
        simulate(4, 0.1, &mut v, 0.0, Pose::zeros()).unwrap();
        assert_eq!(v.u_actual[0], 5.0);
    }

    #[test]
    fn step_input_sees_segment_local_time() {
        let mut v = Frozen::new(ControlMode::StepInput);
        let seg = simulate(2, 0.5, &mut v, 100.0, Pose::zeros()).unwrap();
        assert_eq!(seg.rows()[2].u_control[0], 1.0);
        assert_eq!(seg.times()[2], 101.0);
    }

    #[test]
    fn unsupported_mode_fails_before_any_row() {
        let mut v = Frozen::new(ControlMode::DpControl);
        let err = simulate(10, 0.1, &mut v, 0.0, Pose::zeros()).unwrap_err();
        assert!(matches!(err, SimError::UnsupportedControlMode { ref mode, .. } if mode == "DPcontrol"));
        assert_eq!(v.u_actual, DVector::from_vec(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn non_positive_dt_is_rejected() {
        let mut v = Frozen::new(ControlMode::DepthHeadingAutopilot);
        assert!(matches!(
            simulate(1, 0.0, &mut v, 0.0, Pose::zeros()),
            Err(SimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn overflowing_step_count_is_an_error() {
        let mut v = Frozen::new(ControlMode::DepthHeadingAutopilot);
        assert!(matches!(
            simulate(usize::MAX, 0.1, &mut v, 0.0, Pose::zeros()),
            Err(SimError::InvalidParameter(_))
        ));
        assert_eq!(v.u_actual, DVector::from_vec(vec![0.1, 0.2, 0.3]));
    }
}
