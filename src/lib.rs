pub mod config;
pub mod dynamics;
pub mod error;
pub mod gnc;
pub mod io;
pub mod mission;
pub mod sim;
pub mod vehicle;

pub use error::{Result, SimError};

pub mod prelude {
    pub use crate::dynamics::state::{Pose, SampleRow, StateSnapshot, Velocity, DOF};
    pub use crate::mission::{fly, fly_leg, FlightPlan, Leg, Mission, MissionBuilder};
    pub use crate::sim::{simulate, Segment, Trajectory};
    pub use crate::vehicle::{ControlMode, Current, Setpoints, VehicleModel};
}
