use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Recorded sample: one row of simulation history
// ---------------------------------------------------------------------------

/// Snapshot taken at the end of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,      // s, elapsed simulated time
    pub position: f64,  // m, altitude
    pub velocity: f64,  // m/s, vertical
    pub output: f64,    // N, saturated controller output (thrust)
    pub error: f64,     // m, setpoint - position before the step
}

impl Sample {
    /// True when every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.position.is_finite()
            && self.velocity.is_finite()
            && self.output.is_finite()
            && self.error.is_finite()
    }

    /// Tuple in export column order `(t, y, v, u, error)`.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64) {
        (self.time, self.position, self.velocity, self.output, self.error)
    }
}

// ---------------------------------------------------------------------------
// Simulator phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Freshly created or reset, no step taken since.
    #[default]
    Idle,
    /// At least one step taken since the last reset.
    Running,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_follows_export_order() {
        let s = Sample { time: 0.1, position: 0.2, velocity: 0.3, output: 0.4, error: 0.5 };
        assert_eq!(s.as_tuple(), (0.1, 0.2, 0.3, 0.4, 0.5));
    }

    #[test]
    fn nan_field_is_not_finite() {
        let s = Sample { time: 0.1, position: f64::NAN, velocity: 0.0, output: 0.0, error: 0.0 };
        assert!(!s.is_finite());
    }
}
