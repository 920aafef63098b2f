use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::control::{saturate, Gains, Pid};
use crate::dynamics::{acceleration, Phase, PlantParams, Sample};
use crate::error::{Result, SimError};
use super::integrator::semi_implicit_euler;

// ---------------------------------------------------------------------------
// Per-step inputs
// ---------------------------------------------------------------------------

/// Tuning and plant parameters, read fresh on every [`Simulator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    pub setpoint: f64,      // m
    pub gains: Gains,
    pub plant: PlantParams,
    pub output_limit: f64,  // N, symmetric bound on controller output
}

impl StepParams {
    pub fn validate(&self) -> Result<()> {
        self.plant.validate()?;
        if self.output_limit.is_nan() || self.output_limit < 0.0 {
            return Err(SimError::InvalidOutputLimit(self.output_limit));
        }
        Ok(())
    }

    /// True when the given output sits on the saturation bound.
    pub fn is_saturated(&self, output: f64) -> bool {
        output.abs() >= self.output_limit
    }
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            setpoint: 10.0,
            gains: Gains::default(),
            plant: PlantParams::default(),
            output_limit: 20.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Closed-loop simulator state
// ---------------------------------------------------------------------------

/// Owned simulation state: plant, controller memory and recorded history.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulator {
    dt: f64,
    time: f64,
    position: f64,
    velocity: f64,
    pid: Pid,
    history: Vec<Sample>,
    phase: Phase,
    non_finite_reported: bool,
}

impl Simulator {
    pub fn new(dt: f64) -> Result<Self> {
        check_dt(dt)?;
        Ok(Self {
            dt,
            time: 0.0,
            position: 0.0,
            velocity: 0.0,
            pid: Pid::new(),
            history: Vec::new(),
            phase: Phase::Idle,
            non_finite_reported: false,
        })
    }

    /// Enable the optional anti-windup clamp on the integral term.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.pid.set_integral_limit(Some(limit));
        self
    }

    pub fn set_integral_limit(&mut self, limit: Option<f64>) {
        self.pid.set_integral_limit(limit);
    }

    pub fn integral_limit(&self) -> Option<f64> {
        self.pid.integral_limit()
    }

    /// Return to t = 0 at rest with cleared controller memory and history.
    ///
    /// An invalid `dt` leaves the state untouched.
    pub fn reset(&mut self, dt: f64) -> Result<()> {
        check_dt(dt)?;
        self.dt = dt;
        self.time = 0.0;
        self.position = 0.0;
        self.velocity = 0.0;
        self.pid.reset();
        self.history.clear();
        self.phase = Phase::Idle;
        self.non_finite_reported = false;
        debug!(dt, "simulator reset");
        Ok(())
    }

    /// Advance one fixed step of `dt` and record the resulting sample.
    pub fn step(&mut self, params: &StepParams) -> Result<Sample> {
        params.validate()?;

        let error = params.setpoint - self.position;
        let raw = self.pid.update(error, &params.gains, self.dt);
        let output = saturate(raw, params.output_limit);
        let accel = acceleration(output, self.velocity, &params.plant);

        let (position, velocity) = semi_implicit_euler(self.position, self.velocity, accel, self.dt);
        self.position = position;
        self.velocity = velocity;
        self.time += self.dt;

        let sample = Sample {
            time: self.time,
            position: self.position,
            velocity: self.velocity,
            output,
            error,
        };
        self.history.push(sample);
        self.phase = Phase::Running;

        trace!(t = sample.time, y = sample.position, u = sample.output, "step");
        if !self.non_finite_reported && !sample.is_finite() {
            self.non_finite_reported = true;
            warn!(t = sample.time, step = self.history.len(), "simulation state became non-finite");
        }

        Ok(sample)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn integral_error(&self) -> f64 {
        self.pid.integral()
    }

    pub fn previous_error(&self) -> f64 {
        self.pid.prev_error()
    }

    pub fn history(&self) -> &[Sample] {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of steps completed since the last reset.
    pub fn steps(&self) -> usize {
        self.history.len()
    }
}

fn check_dt(dt: f64) -> Result<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SimError::InvalidTimeStep(dt));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
