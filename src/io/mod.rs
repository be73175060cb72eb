pub mod csv;
pub mod json;
pub mod profile;

pub use profile::{parse_mission, read_mission};
