use super::state::State;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    RailExit,
    Burnout,
    Apogee,
    Impact,
}

/// A discrete event that occurred during the flight.
#[derive(Debug, Clone)]
pub struct FlightEvent {
    pub time: f64,
    pub kind: EventKind,
    pub state: State,
}

/// Passive detectors: inspect consecutive states and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind>;
}

/// Fires once when the motor stops producing thrust.
pub struct BurnoutDetector {
    burn_time: f64,
    fired: bool,
}

impl BurnoutDetector {
    pub fn new(burn_time: f64) -> Self {
        Self { burn_time, fired: false }
    }
}

impl EventDetector for BurnoutDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        if !self.fired && prev.time < self.burn_time && current.time >= self.burn_time {
            self.fired = true;
            Some(EventKind::Burnout)
        } else {
            None
        }
    }
}

/// Fires once when vertical velocity turns from climbing to descending.
#[derive(Default)]
pub struct ApogeeDetector {
    fired: bool,
}

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        if !self.fired && prev.vel.z > 0.0 && current.vel.z <= 0.0 {
            self.fired = true;
            Some(EventKind::Apogee)
        } else {
            None
        }
    }
}

/// Fires once when a descending vehicle reaches the launch elevation.
pub struct ImpactDetector {
    ground: f64,
    fired: bool,
}

impl ImpactDetector {
    pub fn new(ground: f64) -> Self {
        Self { ground, fired: false }
    }
}

impl EventDetector for ImpactDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        if !self.fired && current.vel.z < 0.0 && prev.pos.z > self.ground && current.pos.z <= self.ground {
            self.fired = true;
            Some(EventKind::Impact)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn make_state(time: f64, alt: f64, vz: f64) -> State {
        State {
            time,
            pos: Vector3::new(0.0, 0.0, alt),
            vel: Vector3::new(0.0, 0.0, vz),
            mass: 1.0,
        }
    }

    #[test]
    fn apogee_detected_once() {
        let mut det = ApogeeDetector::default();
        let prev = make_state(5.0, 60.0, 0.2);
        let curr = make_state(5.01, 60.001, -0.05);
        assert_eq!(det.check(&prev, &curr), Some(EventKind::Apogee));
        assert!(det.check(&prev, &curr).is_none());
    }

    #[test]
    fn burnout_detected_at_burn_time() {
        let mut det = BurnoutDetector::new(3.5);
        assert!(det.check(&make_state(3.48, 40.0, 20.0), &make_state(3.49, 40.2, 20.0)).is_none());
        assert_eq!(
            det.check(&make_state(3.49, 40.2, 20.0), &make_state(3.50, 40.4, 20.0)),
            Some(EventKind::Burnout)
        );
    }

    #[test]
    fn impact_needs_descent_through_ground() {
        let mut det = ImpactDetector::new(1.0);
        // climbing off the pad is not an impact
        assert!(det.check(&make_state(0.0, 1.0, 0.0), &make_state(0.01, 1.001, 0.2)).is_none());
        assert_eq!(
            det.check(&make_state(9.0, 1.2, -15.0), &make_state(9.01, 1.0, -15.0)),
            Some(EventKind::Impact)
        );
    }
}
