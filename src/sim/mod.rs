pub mod integrator;
pub mod runner;
pub mod trajectory;

pub use integrator::attitude_euler;
pub use runner::{control_demand, simulate};
pub use trajectory::{Segment, Trajectory};
