use nalgebra::DVector;

use auv_sim::mission::{self, FlightPlan, Leg, MissionBuilder};
use auv_sim::prelude::*;
use auv_sim::Result;

/// A kinematic glider: surge speed follows the rpm setpoint, pitch rate
/// follows the depth error, yaw rate follows the heading error.
struct Glider {
    setpoints: Setpoints,
    nu: Velocity,
    u_actual: DVector<f64>,
}

impl VehicleModel for Glider {
    fn name(&self) -> &str {
        "Glider"
    }

    fn length(&self) -> f64 {
        2.0
    }

    fn control_description(&self) -> String {
        "Proportional depth + heading".into()
    }

    fn dim_u(&self) -> usize {
        2
    }

    fn actuator_names(&self) -> Vec<String> {
        vec!["pitch_rate_cmd".into(), "yaw_rate_cmd".into()]
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
        _nu: &Velocity,
        _u_actual: &DVector<f64>,
        u_control: &DVector<f64>,
        _dt: f64,
    ) -> (Velocity, DVector<f64>) {
        let surge = self.setpoints.propulsion / 1000.0;
        let nu = Velocity::new(surge, 0.0, 0.0, 0.0, u_control[0], u_control[1]);
        (nu, u_control.clone())
    }

    fn depth_heading_autopilot(&mut self, eta: &Pose, _nu: &Velocity, _dt: f64) -> Result<DVector<f64>> {
        let pitch_d = (-0.05 * (self.setpoints.depth - eta[2])).clamp(-0.3, 0.3);
        let q = 0.5 * (pitch_d - eta[4]);
        let r = 0.2 * (self.setpoints.heading.to_radians() - eta[5]);
        Ok(DVector::from_vec(vec![q, r]))
    }
}

fn main() -> Result<()> {
    let mission = MissionBuilder::new("Glider Demo")
        .leg(Leg::new(0.0, 0.0, 1000.0, 30.0))
        .leg(Leg::new(20.0, 90.0, 1000.0, 120.0))
        .leg(Leg::new(20.0, 350.0, 1500.0, 120.0))
        .leg(Leg::new(5.0, 180.0, 800.0, 60.0))
        .build();

    let mut glider = Glider {
        setpoints: mission.legs[0].setpoints(),
        nu: Velocity::zeros(),
        u_actual: DVector::zeros(2),
    };

    let plan = FlightPlan { sample_time: 0.1, initial_steps: None };
    let trajectory = mission::fly(&mut glider, &mission, &plan)?;

    let last = &trajectory.rows()[trajectory.len() - 1];
    println!("Samples: {}", trajectory.len());
    println!("Legs flown: {}", trajectory.segment_count() - 1);
    println!(
        "Final position: x={:.1} m  y={:.1} m  z={:.1} m",
        last.eta[0], last.eta[1], last.eta[2]
    );
    Ok(())
}
