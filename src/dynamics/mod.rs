pub mod plant;
pub mod state;

pub use plant::{acceleration, PlantParams};
pub use state::{Phase, Sample};
