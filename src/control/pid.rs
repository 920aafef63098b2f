use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PID gains (supplied by the caller on every step)
// ---------------------------------------------------------------------------

/// Gains are not validated: zero and negative values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

impl Default for Gains {
    fn default() -> Self {
        Self { kp: 1.0, ki: 0.0, kd: 0.0 }
    }
}

// ---------------------------------------------------------------------------
// PID controller memory (single axis)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pid {
    integral: f64,
    prev_error: f64,
    integral_limit: Option<f64>,
}

impl Pid {
    /// Controller with unbounded integral accumulation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp the accumulated integral to `[-limit, limit]` after every update.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit.abs());
        self
    }

    pub fn set_integral_limit(&mut self, limit: Option<f64>) {
        self.integral_limit = limit.map(f64::abs);
    }

    pub fn integral_limit(&self) -> Option<f64> {
        self.integral_limit
    }

    /// Accumulate `error` and return the unsaturated control output.
    ///
    /// Rectangular integration for I, backward difference for D. `dt` must be
    /// positive; the simulator checks this at reset.
    pub fn update(&mut self, error: f64, gains: &Gains, dt: f64) -> f64 {
        self.integral += error * dt;
        if let Some(limit) = self.integral_limit {
            // max/min rather than clamp: a NaN limit must not panic mid-run.
            self.integral = self.integral.max(-limit).min(limit);
        }
        let derivative = (error - self.prev_error) / dt;
        self.prev_error = error;
        gains.kp * error + gains.ki * self.integral + gains.kd * derivative
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }
}

/// Symmetric saturation to `[-limit, limit]`.
pub fn saturate(raw: f64, limit: f64) -> f64 {
    raw.clamp(-limit, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_proportional() {
        let mut pid = Pid::new();
        let out = pid.update(0.5, &Gains::new(1.0, 0.0, 0.0), 0.01);
        assert!((out - 0.5).abs() < 1e-10, "Pure P should output Kp * error");
    }

    #[test]
    fn pid_integral_accumulates() {
        let mut pid = Pid::new();
        let gains = Gains::new(0.0, 1.0, 0.0);
        pid.update(1.0, &gains, 0.1);
        let out = pid.update(1.0, &gains, 0.1);
        assert!((out - 0.2).abs() < 1e-10, "Integral should accumulate");
    }

    #[test]
    fn integral_unbounded_by_default() {
        let mut pid = Pid::new();
        let gains = Gains::new(0.0, 1.0, 0.0);
        for _ in 0..100 {
            pid.update(10.0, &gains, 0.1);
        }
        assert!((pid.integral() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn integral_limit_clamps() {
        let mut pid = Pid::new().with_integral_limit(2.0);
        let gains = Gains::new(0.0, 1.0, 0.0);
        for _ in 0..100 {
            pid.update(10.0, &gains, 0.1);
        }
        assert_eq!(pid.integral(), 2.0);
        for _ in 0..100 {
            pid.update(-10.0, &gains, 0.1);
        }
        assert_eq!(pid.integral(), -2.0);
    }

    #[test]
    fn derivative_uses_previous_error() {
        let mut pid = Pid::new();
        let gains = Gains::new(0.0, 0.0, 1.0);
        // First step differences against zero.
        assert!((pid.update(1.0, &gains, 0.5) - 2.0).abs() < 1e-12);
        assert!((pid.update(1.0, &gains, 0.5)).abs() < 1e-12);
        assert_eq!(pid.prev_error(), 1.0);
    }

    #[test]
    fn reset_clears_memory_keeps_limit() {
        let mut pid = Pid::new().with_integral_limit(5.0);
        pid.update(3.0, &Gains::default(), 0.1);
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.prev_error(), 0.0);
        assert_eq!(pid.integral_limit(), Some(5.0));
    }

    #[test]
    fn saturate_is_symmetric() {
        assert_eq!(saturate(50.0, 20.0), 20.0);
        assert_eq!(saturate(-50.0, 20.0), -20.0);
        assert_eq!(saturate(3.0, 20.0), 3.0);
        assert_eq!(saturate(1e300, f64::INFINITY), 1e300);
    }
}
