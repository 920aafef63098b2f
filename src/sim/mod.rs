pub mod event;
pub mod integrator;
pub mod runner;
pub mod simulator;

pub use event::{EventDetector, EventKind, SimEvent};
pub use integrator::semi_implicit_euler;
pub use runner::{default_detectors, run, simulate, Pacing};
pub use simulator::{Simulator, StepParams};
