use std::ops::ControlFlow;

use tracing::{info, warn};

use crate::dynamics::state::{Pose, StateSnapshot};
use crate::error::{Result, SimError};
use crate::sim::{simulate, Trajectory};
use crate::vehicle::{Setpoints, VehicleModel};
use super::leg::{Leg, Mission};

// ---------------------------------------------------------------------------
// Run parameters shared by every leg
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct FlightPlan {
    pub sample_time: f64,
    /// Steps of the seeding run. `None` derives them from the seeding row's duration.
    pub initial_steps: Option<usize>,
}

// ---------------------------------------------------------------------------
// Leg arithmetic
// ---------------------------------------------------------------------------

/// Upper bound on the steps of a single run.
pub const MAX_STEPS: usize = 100_000_000;

fn check_steps(steps: usize) -> Result<usize> {
    if steps > MAX_STEPS {
        return Err(SimError::InvalidParameter(format!(
            "{steps} steps exceeds the per-run limit of {MAX_STEPS}"
        )));
    }
    Ok(steps)
}

/// Number of steps for a leg, `round(duration / dt)`, halves away from zero.
pub fn leg_steps(duration: f64, dt: f64) -> Result<usize> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "sample time must be positive, got {dt}"
        )));
    }
    if !(duration.is_finite() && duration >= 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "leg duration must be finite and non-negative, got {duration}"
        )));
    }
    let steps = (duration / dt).round();
    if steps > MAX_STEPS as f64 {
        return Err(SimError::InvalidParameter(format!(
            "leg duration {duration} s at dt {dt} s exceeds the per-run limit of {MAX_STEPS} steps"
        )));
    }
    Ok(steps as usize)
}

/// Heading setpoint for a new leg. A jump of more than 180° from the current
/// setpoint is shifted up by a full turn.
pub fn wrap_heading(current: f64, target: f64) -> f64 {
    if (current - target).abs() > 180.0 {
        target + 360.0
    } else {
        target
    }
}

/// Setpoints for `leg` flown after `previous`, heading wrapped.
pub fn leg_setpoints(previous: &Setpoints, leg: &Leg) -> Setpoints {
    Setpoints {
        depth: leg.depth,
        heading: wrap_heading(previous.heading, leg.heading),
        propulsion: leg.propulsion,
    }
}

/// Apply a snapshot to the vehicle, returning the pose to start from.
pub fn reseed(vehicle: &mut dyn VehicleModel, snapshot: &StateSnapshot) -> Result<Pose> {
    if snapshot.u_actual.len() != vehicle.dim_u() {
        return Err(SimError::ShapeMismatch {
            what: "re-seed actuation length",
            expected: vehicle.dim_u(),
            found: snapshot.u_actual.len(),
        });
    }
    vehicle.set_state(snapshot.nu, snapshot.u_actual.clone());
    Ok(snapshot.eta)
}

// ---------------------------------------------------------------------------
// Seeding run and leg chaining
// ---------------------------------------------------------------------------

/// Simulate the seeding row from the zero pose and start a trajectory.
pub fn seed(vehicle: &mut dyn VehicleModel, leg: &Leg, plan: &FlightPlan) -> Result<Trajectory> {
    let steps = match plan.initial_steps {
        Some(n) => check_steps(n)?,
        None => leg_steps(leg.duration, plan.sample_time)?,
    };
    vehicle.set_setpoints(leg.setpoints());

    info!(
        vehicle = vehicle.name(),
        length_m = vehicle.length(),
        control = %vehicle.control_description(),
        sampling_hz = (1.0 / plan.sample_time).round(),
        duration_s = (steps as f64 * plan.sample_time).round(),
        "seeding run"
    );

    let segment = simulate(steps, plan.sample_time, vehicle, 0.0, Pose::zeros())?;
    Trajectory::from_segment(segment)
}

/// Fly one leg from the end of `trajectory` and return the extended trajectory.
pub fn fly_leg(
    vehicle: &mut dyn VehicleModel,
    mut trajectory: Trajectory,
    leg: &Leg,
    dt: f64,
) -> Result<Trajectory> {
    let steps = leg_steps(leg.duration, dt)?;
    if trajectory.dim_u() != vehicle.dim_u() {
        return Err(SimError::ShapeMismatch {
            what: "trajectory actuator count",
            expected: vehicle.dim_u(),
            found: trajectory.dim_u(),
        });
    }

    let previous = vehicle.setpoints();
    let setpoints = leg_setpoints(&previous, leg);
    if setpoints.heading != leg.heading {
        warn!(
            from = previous.heading,
            to = leg.heading,
            setpoint = setpoints.heading,
            "heading wrapped"
        );
    }
    vehicle.set_setpoints(setpoints);

    let snapshot = trajectory.last_snapshot().ok_or_else(|| {
        SimError::InvalidParameter("cannot fly a leg from an empty trajectory".into())
    })?;
    let pose = reseed(vehicle, &snapshot)?;
    let offset = trajectory.last_time().unwrap_or(0.0);

    let segment = simulate(steps, dt, vehicle, offset, pose)?;
    trajectory.append(segment)?;
    Ok(trajectory)
}

/// Fly a whole mission, asking `before_leg` whether to continue ahead of
/// each leg. Breaking keeps the legs flown so far.
pub fn fly_with<F>(
    vehicle: &mut dyn VehicleModel,
    mission: &Mission,
    plan: &FlightPlan,
    mut before_leg: F,
) -> Result<Trajectory>
where
    F: FnMut(usize, &Leg, &Trajectory) -> ControlFlow<()>,
{
    let seed_leg = mission.seed_leg().ok_or(SimError::EmptyMission)?;
    for leg in mission.flown_legs() {
        leg_steps(leg.duration, plan.sample_time)?;
    }
    info!(
        mission = %mission.name,
        legs = mission.flown_legs().len(),
        planned_s = mission.flown_duration(),
        "mission planned"
    );

    let mut trajectory = seed(vehicle, seed_leg, plan)?;

    for (idx, leg) in mission.flown_legs().iter().enumerate() {
        let number = idx + 1;
        if before_leg(number, leg, &trajectory).is_break() {
            info!(leg = number, "mission stopped before leg");
            break;
        }
        info!(
            leg = number,
            label = leg.label.as_deref().unwrap_or(""),
            depth = leg.depth,
            heading = leg_setpoints(&vehicle.setpoints(), leg).heading,
            propulsion = leg.propulsion,
            duration = leg.duration,
            "flying leg"
        );
        trajectory = fly_leg(vehicle, trajectory, leg, plan.sample_time)?;
    }

    info!(
        samples = trajectory.len(),
        segments = trajectory.segment_count(),
        end_time = trajectory.last_time().unwrap_or(0.0),
        "mission complete"
    );
    Ok(trajectory)
}

pub fn fly(vehicle: &mut dyn VehicleModel, mission: &Mission, plan: &FlightPlan) -> Result<Trajectory> {
    fly_with(vehicle, mission, plan, |_, _, _| ControlFlow::Continue(()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
