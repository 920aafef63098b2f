use crate::dynamics::Sample;
use super::simulator::StepParams;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    SaturationEntered,
    SaturationExited,
    SetpointCrossed,
    Settled,
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub sample: Sample,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive samples and report events.
/// `prev` is `None` for the first step after a reset.
pub trait EventDetector {
    fn check(&mut self, prev: Option<&Sample>, current: &Sample, params: &StepParams) -> Option<EventKind>;

    /// Forget any latched state. `run` calls this when the simulator is idle.
    fn reset(&mut self) {}
}

/// Detects transitions into and out of output saturation.
#[derive(Debug, Default)]
pub struct SaturationDetector {
    saturated: bool,
}

impl EventDetector for SaturationDetector {
    fn check(&mut self, _prev: Option<&Sample>, current: &Sample, params: &StepParams) -> Option<EventKind> {
        let now = params.is_saturated(current.output);
        let changed = now != self.saturated;
        self.saturated = now;
        match (changed, now) {
            (true, true) => Some(EventKind::SaturationEntered),
            (true, false) => Some(EventKind::SaturationExited),
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.saturated = false;
    }
}

/// Detects the tracking error changing sign (position crossing the setpoint).
#[derive(Debug, Default)]
pub struct SetpointCrossingDetector;

impl EventDetector for SetpointCrossingDetector {
    fn check(&mut self, prev: Option<&Sample>, current: &Sample, _params: &StepParams) -> Option<EventKind> {
        let prev = prev?;
        let crossed = (prev.error > 0.0 && current.error <= 0.0)
            || (prev.error < 0.0 && current.error >= 0.0);
        crossed.then_some(EventKind::SetpointCrossed)
    }
}

/// Fires once after the position has stayed inside a band around the
/// setpoint for `hold` seconds.
#[derive(Debug)]
pub struct SettleDetector {
    /// Band half-width as a fraction of |setpoint| (absolute when setpoint is 0).
    pub band: f64,
    pub hold: f64,
    entered_at: Option<f64>,
    fired: bool,
}

impl SettleDetector {
    pub fn new(band: f64, hold: f64) -> Self {
        Self { band, hold, entered_at: None, fired: false }
    }
}

impl Default for SettleDetector {
    fn default() -> Self {
        Self::new(0.02, 1.0)
    }
}

impl EventDetector for SettleDetector {
    fn check(&mut self, _prev: Option<&Sample>, current: &Sample, params: &StepParams) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let width = if params.setpoint == 0.0 { self.band } else { self.band * params.setpoint.abs() };
        if (params.setpoint - current.position).abs() > width {
            self.entered_at = None;
            return None;
        }
        let since = *self.entered_at.get_or_insert(current.time);
        if current.time - since >= self.hold {
            self.fired = true;
            Some(EventKind::Settled)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.entered_at = None;
        self.fired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sample(time: f64, position: f64, output: f64, setpoint: f64) -> Sample {
        Sample { time, position, velocity: 0.0, output, error: setpoint - position }
    }

    #[test]
    fn saturation_enter_and_exit() {
        let params = StepParams::default();
        let mut det = SaturationDetector::default();
        let a = make_sample(0.02, 0.0, 20.0, 10.0);
        let b = make_sample(0.04, 0.1, 20.0, 10.0);
        let c = make_sample(0.06, 0.2, 15.0, 10.0);
        assert_eq!(det.check(None, &a, &params), Some(EventKind::SaturationEntered));
        assert_eq!(det.check(Some(&a), &b, &params), None);
        assert_eq!(det.check(Some(&b), &c, &params), Some(EventKind::SaturationExited));
    }

    #[test]
    fn setpoint_crossing_detected() {
        let params = StepParams::default();
        let mut det = SetpointCrossingDetector;
        let below = make_sample(1.0, 9.9, 0.1, 10.0);
        let above = make_sample(1.02, 10.1, -0.1, 10.0);
        assert_eq!(det.check(None, &below, &params), None);
        assert_eq!(det.check(Some(&below), &above, &params), Some(EventKind::SetpointCrossed));
        assert_eq!(det.check(Some(&above), &above, &params), None);
    }

    #[test]
    fn settle_fires_once_after_hold() {
        let params = StepParams::default();
        let mut det = SettleDetector::new(0.02, 0.5);
        assert_eq!(det.check(None, &make_sample(1.0, 9.9, 0.0, 10.0), &params), None);
        // Leaving the band restarts the hold timer.
        assert_eq!(det.check(None, &make_sample(1.2, 9.0, 0.0, 10.0), &params), None);
        assert_eq!(det.check(None, &make_sample(1.4, 9.95, 0.0, 10.0), &params), None);
        assert_eq!(
            det.check(None, &make_sample(2.0, 10.05, 0.0, 10.0), &params),
            Some(EventKind::Settled)
        );
        // Should not fire again
        assert_eq!(det.check(None, &make_sample(2.5, 10.0, 0.0, 10.0), &params), None);
        det.reset();
        assert_eq!(det.check(None, &make_sample(0.1, 10.0, 0.0, 10.0), &params), None);
    }

    #[test]
    fn settle_band_is_absolute_for_zero_setpoint() {
        let params = StepParams { setpoint: 0.0, ..Default::default() };
        let mut det = SettleDetector::new(0.02, 0.5);
        // 0.05 is outside an absolute 0.02 band.
        assert_eq!(det.check(None, &make_sample(1.0, 0.05, 0.0, 0.0), &params), None);
        assert_eq!(det.check(None, &make_sample(2.0, 0.05, 0.0, 0.0), &params), None);
        assert_eq!(det.check(None, &make_sample(3.0, 0.01, 0.0, 0.0), &params), None);
        assert_eq!(
            det.check(None, &make_sample(4.0, -0.015, 0.0, 0.0), &params),
            Some(EventKind::Settled)
        );
    }
}
