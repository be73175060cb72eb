pub mod state;

pub use state::{row_width, Pose, SampleRow, StateSnapshot, Velocity, DOF};
