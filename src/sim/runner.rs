use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::error::Result;
use crate::dynamics::Phase;
use super::event::{EventDetector, SaturationDetector, SetpointCrossingDetector, SettleDetector, SimEvent};
use super::simulator::{Simulator, StepParams};

// ---------------------------------------------------------------------------
// Wall-clock pacing
// ---------------------------------------------------------------------------

/// How the loop relates simulated time to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Step back-to-back.
    #[default]
    AsFastAsPossible,
    /// Start each step one `dt` of wall-clock time after the previous one.
    RealTime,
}

// ---------------------------------------------------------------------------
// Batch loop
// ---------------------------------------------------------------------------

/// Advance `sim` by `steps` fixed steps with constant parameters.
///
/// Every detector sees each consecutive pair of samples. Detectors are reset
/// when `sim` is idle, so a reset simulator starts them from a clean slate.
/// Stops at the first rejected step; samples recorded before it stay in the
/// history.
pub fn run(
    sim: &mut Simulator,
    params: &StepParams,
    steps: usize,
    pacing: Pacing,
    detectors: &mut [Box<dyn EventDetector>],
) -> Result<Vec<SimEvent>> {
    params.validate()?;
    if sim.phase() == Phase::Idle {
        detectors.iter_mut().for_each(|det| det.reset());
    }
    info!(
        steps,
        dt = sim.dt(),
        setpoint = params.setpoint,
        kp = params.gains.kp,
        ki = params.gains.ki,
        kd = params.gains.kd,
        "starting run"
    );

    let tick = Duration::try_from_secs_f64(sim.dt()).unwrap_or(Duration::MAX);
    let start = Instant::now();
    let mut deadline = Some(start);
    let mut events = Vec::new();

    for _ in 0..steps {
        if pacing == Pacing::RealTime {
            if let Some(at) = deadline {
                let now = Instant::now();
                if at > now {
                    thread::sleep(at - now);
                }
                deadline = at.checked_add(tick);
            }
        }

        let prev = sim.history().last().copied();
        let sample = sim.step(params)?;

        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(prev.as_ref(), &sample, params) {
                info!(t = sample.time, y = sample.position, event = ?kind, "event");
                events.push(SimEvent { time: sample.time, kind, sample });
            }
        }
    }

    info!(
        t = sim.time(),
        y = sim.position(),
        events = events.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "run finished"
    );
    Ok(events)
}

/// Saturation, setpoint-crossing and 2%/1 s settle detectors.
pub fn default_detectors() -> Vec<Box<dyn EventDetector>> {
    vec![
        Box::new(SaturationDetector::default()),
        Box::new(SetpointCrossingDetector),
        Box::new(SettleDetector::default()),
    ]
}

/// Reset, then run with the default detectors (convenience wrapper).
pub fn simulate(sim: &mut Simulator, params: &StepParams, steps: usize) -> Result<Vec<SimEvent>> {
    let dt = sim.dt();
    sim.reset(dt)?;
    let mut detectors = default_detectors();
    run(sim, params, steps, Pacing::AsFastAsPossible, &mut detectors)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
