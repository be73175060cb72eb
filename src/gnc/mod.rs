pub mod pid;

pub use pid::Pid;
