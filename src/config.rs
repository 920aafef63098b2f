//! Run configuration.
//!
//! A [`SimConfig`] gathers everything a driving loop needs: the fixed step
//! size, how many steps to take, and the per-step tuning and plant
//! parameters. It can be read from a TOML file where every key is optional;
//! missing keys fall back to the defaults below.
//!
//! ```toml
//! dt = 0.02
//! steps = 2000
//! setpoint = 10.0
//! kp = 1.0
//! ki = 0.0
//! kd = 0.0
//! mass = 1.0
//! drag = 0.1
//! output_limit = 20.0
//! # integral_limit = 5.0
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::control::Gains;
use crate::dynamics::PlantParams;
use crate::error::{Result, SimError};
use crate::sim::StepParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub dt: f64,
    pub steps: usize,
    pub setpoint: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub mass: f64,
    pub drag: f64,
    pub output_limit: f64,
    /// Anti-windup clamp on the integral term; unbounded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integral_limit: Option<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,      // 50 Hz
            steps: 2000,   // 40 s
            setpoint: 10.0,
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            mass: 1.0,
            drag: 0.1,
            output_limit: 20.0,
            integral_limit: None,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Check the parameters the simulator would otherwise reject mid-run.
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::InvalidTimeStep(self.dt));
        }
        if let Some(limit) = self.integral_limit {
            if limit.is_nan() {
                return Err(SimError::InvalidParameter { name: "integral_limit", value: limit.to_string() });
            }
        }
        self.step_params().validate()
    }

    pub fn step_params(&self) -> StepParams {
        StepParams {
            setpoint: self.setpoint,
            gains: Gains::new(self.kp, self.ki, self.kd),
            plant: PlantParams::new(self.mass, self.drag),
            output_limit: self.output_limit,
        }
    }
}

/// Parse caller-supplied text for the parameter `name` into a finite real.
///
/// Surrounding whitespace is ignored.
pub fn parse_param(name: &'static str, text: &str) -> Result<f64> {
    let invalid = || SimError::InvalidParameter { name, value: text.to_string() };
    let value: f64 = text.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard() {
        let p = SimConfig::default().step_params();
        assert_eq!(p, StepParams::default());
        assert_eq!(p.gains, Gains::new(1.0, 0.0, 0.0));
        assert_eq!(p.plant, PlantParams::new(1.0, 0.1));
        assert_eq!(p.output_limit, 20.0);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c = SimConfig::from_toml_str("kp = 2.5\nsteps = 10\nintegral_limit = 3.0\n").unwrap();
        assert_eq!(c.kp, 2.5);
        assert_eq!(c.steps, 10);
        assert_eq!(c.integral_limit, Some(3.0));
        assert_eq!(c.dt, 0.02);
        assert_eq!(c.drag, 0.1);
    }

    #[test]
    fn toml_round_trip() {
        let c = SimConfig { kd: 0.5, integral_limit: Some(1.0), ..Default::default() };
        let text = c.to_toml_string().unwrap();
        assert_eq!(SimConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(matches!(SimConfig::from_toml_str("kq = 1.0"), Err(SimError::Config(_))));
    }

    #[test]
    fn degenerate_values_rejected() {
        assert!(matches!(SimConfig::from_toml_str("dt = 0.0"), Err(SimError::InvalidTimeStep(_))));
        assert!(matches!(SimConfig::from_toml_str("mass = -1.0"), Err(SimError::InvalidMass(_))));
        assert!(matches!(
            SimConfig::from_toml_str("output_limit = -5.0"),
            Err(SimError::InvalidOutputLimit(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, "setpoint = 3.0\n").unwrap();
        assert_eq!(SimConfig::load(&path).unwrap().setpoint, 3.0);
        assert!(matches!(SimConfig::load(dir.path().join("missing.toml")), Err(SimError::Io(_))));
    }

    #[test]
    fn parse_param_accepts_reals() {
        assert_eq!(parse_param("kp", "1.5").unwrap(), 1.5);
        assert_eq!(parse_param("kd", " -0.25 ").unwrap(), -0.25);
        assert_eq!(parse_param("mass", "1e-3").unwrap(), 0.001);
    }

    #[test]
    fn parse_param_names_offender() {
        let err = parse_param("setpoint", "ten").unwrap_err();
        assert!(matches!(&err, SimError::InvalidParameter { name: "setpoint", value } if value == "ten"));
        assert!(err.to_string().contains("setpoint"));
        assert!(parse_param("kp", "").is_err());
        assert!(parse_param("kp", "NaN").is_err());
        assert!(parse_param("kp", "inf").is_err());
    }
}
