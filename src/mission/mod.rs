pub mod leg;
pub mod orchestrator;

pub use leg::{Leg, LegBuilder, Mission, MissionBuilder};
pub use orchestrator::{fly, fly_leg, fly_with, leg_setpoints, leg_steps, reseed, seed, wrap_heading, FlightPlan, MAX_STEPS};
