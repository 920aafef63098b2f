use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::dynamics::Sample;
use crate::error::Result;
use crate::sim::StepParams;

const SETTLE_BAND: f64 = 0.02;

/// Step-response figures computed from recorded history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSummary {
    pub samples: usize,
    pub final_time: f64,
    pub final_position: f64,
    pub final_error: f64,
    pub peak_position: f64,
    pub peak_time: f64,
    /// Percent beyond the setpoint in the direction of travel; `None` for a zero setpoint.
    pub overshoot_pct: Option<f64>,
    /// 10% to 90% of the setpoint.
    pub rise_time: Option<f64>,
    /// Time after which the position stays within 2% of the setpoint.
    pub settling_time: Option<f64>,
    pub max_abs_output: f64,
    pub saturated_samples: usize,
}

impl ResponseSummary {
    /// Compute summary from history. Returns `None` for an empty history.
    pub fn from_history(history: &[Sample], params: &StepParams) -> Option<Self> {
        let last = history.last()?;
        let sp = params.setpoint;
        // Orient so that "towards the setpoint" is positive.
        let dir = if sp < 0.0 { -1.0 } else { 1.0 };

        let peak = history
            .iter()
            .max_by(|a, b| (a.position * dir).total_cmp(&(b.position * dir)))?;

        let overshoot_pct = (sp != 0.0)
            .then(|| (((peak.position - sp) * dir) / sp.abs() * 100.0).max(0.0));

        let rise_time = if sp == 0.0 {
            None
        } else {
            let reach = |frac: f64| {
                history
                    .iter()
                    .find(|s| s.position * dir >= frac * sp.abs())
                    .map(|s| s.time)
            };
            match (reach(0.1), reach(0.9)) {
                (Some(lo), Some(hi)) => Some(hi - lo),
                _ => None,
            }
        };

        let band = if sp == 0.0 { SETTLE_BAND } else { SETTLE_BAND * sp.abs() };
        let settling_time = match history.iter().rposition(|s| (sp - s.position).abs() > band) {
            None => Some(history[0].time),
            Some(i) => history.get(i + 1).map(|s| s.time),
        };

        Some(ResponseSummary {
            samples: history.len(),
            final_time: last.time,
            final_position: last.position,
            final_error: sp - last.position,
            peak_position: peak.position,
            peak_time: peak.time,
            overshoot_pct,
            rise_time,
            settling_time,
            max_abs_output: history.iter().map(|s| s.output.abs()).fold(0.0_f64, f64::max),
            saturated_samples: history.iter().filter(|s| params.is_saturated(s.output)).count(),
        })
    }
}

#[derive(Serialize)]
struct Report<'a> {
    dt: f64,
    params: &'a StepParams,
    response: &'a ResponseSummary,
}

/// Write run parameters and response summary as pretty JSON.
pub fn write_summary<W: Write>(
    writer: &mut W,
    dt: f64,
    params: &StepParams,
    summary: &ResponseSummary,
) -> Result<()> {
    let report = Report { dt, params, response: summary };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

/// Write summary JSON to a file.
pub fn write_summary_file<P: AsRef<Path>>(
    path: P,
    dt: f64,
    params: &StepParams,
    summary: &ResponseSummary,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_summary(&mut file, dt, params, summary)?;
    file.flush()?;
    Ok(())
}
