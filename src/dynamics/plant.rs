use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

// ---------------------------------------------------------------------------
// Vertical-axis plant: point mass with linear drag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantParams {
    pub mass: f64, // kg
    pub drag: f64, // N per m/s
}

impl PlantParams {
    pub fn new(mass: f64, drag: f64) -> Self {
        Self { mass, drag }
    }

    /// Reject masses that would divide by zero or flip the sign of thrust.
    pub fn validate(&self) -> Result<()> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(SimError::InvalidMass(self.mass));
        }
        Ok(())
    }
}

impl Default for PlantParams {
    fn default() -> Self {
        Self { mass: 1.0, drag: 0.1 }
    }
}

/// Net vertical acceleration: `m * a = u - drag * v`.
///
/// Only the control term `u` is saturated upstream; the drag term is applied
/// as-is on top of it.
pub fn acceleration(output: f64, velocity: f64, plant: &PlantParams) -> f64 {
    (output - plant.drag * velocity) / plant.mass
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_opposes_velocity() {
        let plant = PlantParams::new(2.0, 0.5);
        assert!((acceleration(0.0, 4.0, &plant) + 1.0).abs() < 1e-12);
        assert!((acceleration(0.0, -4.0, &plant) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn thrust_divided_by_mass() {
        let plant = PlantParams::new(4.0, 0.0);
        assert!((acceleration(10.0, 123.0, &plant) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn non_positive_mass_rejected() {
        assert!(matches!(PlantParams::new(0.0, 0.1).validate(), Err(SimError::InvalidMass(_))));
        assert!(matches!(PlantParams::new(-1.0, 0.1).validate(), Err(SimError::InvalidMass(_))));
        assert!(PlantParams::new(f64::NAN, 0.1).validate().is_err());
        assert!(PlantParams::default().validate().is_ok());
    }
}
