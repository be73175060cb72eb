pub mod model;
pub mod torpedo;

pub use model::{unsupported, ControlMode, Current, Setpoints, VehicleModel};
pub use torpedo::{Torpedo, TorpedoParams};
