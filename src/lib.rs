pub mod config;
pub mod control;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod sim;

pub use config::SimConfig;
pub use error::{Result, SimError};
pub use sim::{Simulator, StepParams};
