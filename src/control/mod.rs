pub mod pid;

pub use pid::{saturate, Gains, Pid};
