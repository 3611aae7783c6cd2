//! Camera choreographer
//!
//! Owns at most one camera flight at a time. A new request cancels the
//! in-progress flight and departs from wherever the rig currently sits,
//! so rapid phase changes never snap or fight each other. Flights ease
//! in and out; a completed return to home can notify the embedder.

use crate::phase::Phase;
use otaviz_animation::{Easing, Timeline};
use otaviz_scene::{CameraPose, CameraRig};
use tracing::debug;

/// Dwell before the camera drifts back home on its own
pub const RETURN_DWELL: f64 = 2.0;
/// Duration of the automatic return flight
pub const RETURN_DURATION: f32 = 1.8;

/// What a finished flight was doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraEvent {
    /// A phase flight reached its destination
    Arrived { phase: Phase },
    /// The camera is back at the home pose
    ReturnedHome { notify: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlightKind {
    PhaseMove { phase: Phase },
    ReturnHome { notify: bool },
}

struct Flight {
    from: CameraPose,
    to: CameraPose,
    timeline: Timeline<f32>,
    kind: FlightKind,
}

/// Single-flight camera driver
#[derive(Default)]
pub struct CameraChoreographer {
    flight: Option<Flight>,
    return_deadline: Option<f64>,
}

impl CameraChoreographer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destination pose and flight duration for phases that move the camera
    pub fn pose_for(phase: Phase) -> Option<(CameraPose, f32)> {
        let (position, target, duration) = match phase {
            Phase::ApproachLedger => ((-20.0, 0.0, 18.0), (-20.0, -5.0, 0.0), 2.0),
            Phase::CarInterior => ((0.0, 0.8, 1.2), (0.0, 0.5, -2.0), 1.6),
            Phase::ContentDownload => ((20.0, 2.0, 20.0), (20.0, -2.0, 0.0), 1.6),
            Phase::HashVerification | Phase::KeyExchangeDecryption => {
                ((0.0, 4.0, 16.0), (0.0, 1.5, 0.0), 1.6)
            }
            _ => return None,
        };
        Some((
            CameraPose {
                position: otaviz_core::Vec3::new(position.0, position.1, position.2),
                target: otaviz_core::Vec3::new(target.0, target.1, target.2),
            },
            duration,
        ))
    }

    /// Start a flight from the rig's live pose, cancelling any current one.
    /// The arrival event carries `phase` back to the caller.
    pub fn fly_to(&mut self, rig: &CameraRig, phase: Phase, to: CameraPose, duration: f32) {
        self.cancel();
        debug!(?phase, to = ?to.position, duration, "camera flight");
        self.flight = Some(Flight {
            from: rig.pose(),
            to,
            timeline: Timeline::new(0.0, 1.0, duration, Easing::EaseInOutQuad),
            kind: FlightKind::PhaseMove { phase },
        });
    }

    /// Fly back to the captured home pose. Returns false when no home
    /// pose exists yet.
    pub fn return_home(&mut self, rig: &CameraRig, notify: bool) -> bool {
        let Some(home) = rig.home() else {
            return false;
        };
        self.cancel();
        self.return_deadline = None;
        self.flight = Some(Flight {
            from: rig.pose(),
            to: home,
            timeline: Timeline::new(0.0, 1.0, RETURN_DURATION, Easing::EaseInOutQuad),
            kind: FlightKind::ReturnHome { notify },
        });
        true
    }

    /// Arm the automatic return for `at` (absolute seconds)
    pub fn schedule_return_home(&mut self, at: f64) {
        self.return_deadline = Some(at);
    }

    /// Drop any pending automatic return
    pub fn cancel_scheduled_return(&mut self) {
        self.return_deadline = None;
    }

    /// Cancel the in-progress flight, freezing the rig where it is
    pub fn cancel(&mut self) {
        if let Some(flight) = self.flight.as_mut() {
            flight.timeline.cancel();
        }
        self.flight = None;
    }

    pub fn is_flying(&self) -> bool {
        self.flight.is_some()
    }

    /// Destination of the current flight, if any
    pub fn flight_target(&self) -> Option<CameraPose> {
        self.flight.as_ref().map(|f| f.to)
    }

    /// Advance the active flight and the scheduled return
    pub fn tick(&mut self, rig: &mut CameraRig, now: f64, dt: f32) -> Option<CameraEvent> {
        if self.return_deadline.is_some_and(|at| now >= at) {
            self.return_deadline = None;
            self.return_home(rig, false);
        }

        let flight = self.flight.as_mut()?;
        flight.timeline.advance(dt);
        let eased = flight.timeline.value();
        rig.set_pose(CameraPose {
            position: flight.from.position.lerp(&flight.to.position, eased),
            target: flight.from.target.lerp(&flight.to.target, eased),
        });
        rig.transitioning = true;

        if flight.timeline.is_complete() {
            rig.set_pose(flight.to);
            rig.transitioning = false;
            let kind = flight.kind;
            self.flight = None;
            return Some(match kind {
                FlightKind::PhaseMove { phase } => CameraEvent::Arrived { phase },
                FlightKind::ReturnHome { notify } => CameraEvent::ReturnedHome { notify },
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otaviz_core::Vec3;

    fn rig() -> CameraRig {
        let mut rig = CameraRig::new(Vec3::new(0.0, 10.0, 55.0), Vec3::ZERO);
        rig.capture_home();
        rig
    }

    #[test]
    fn test_flight_reaches_destination() {
        let mut rig = rig();
        let mut choreo = CameraChoreographer::new();
        let (pose, duration) = CameraChoreographer::pose_for(Phase::ApproachLedger).unwrap();
        choreo.fly_to(&rig, Phase::ApproachLedger, pose, duration);

        let mut event = None;
        let mut now = 0.0;
        for _ in 0..150 {
            now += 1.0 / 60.0;
            if let Some(ev) = choreo.tick(&mut rig, now, 1.0 / 60.0) {
                event = Some(ev);
                break;
            }
        }
        assert_eq!(
            event,
            Some(CameraEvent::Arrived {
                phase: Phase::ApproachLedger
            })
        );
        assert!(rig.position.distance(pose.position) < 1e-4);
        assert!(!rig.transitioning);
    }

    #[test]
    fn test_restart_departs_from_live_pose() {
        let mut rig = rig();
        let mut choreo = CameraChoreographer::new();
        let (ledger, duration) = CameraChoreographer::pose_for(Phase::ApproachLedger).unwrap();
        choreo.fly_to(&rig, Phase::ApproachLedger, ledger, duration);
        // Halfway through, retarget to the interior pose.
        for _ in 0..60 {
            choreo.tick(&mut rig, 0.0, 1.0 / 60.0);
        }
        let midway = rig.position;
        assert!(midway.distance(ledger.position) > 0.1);

        let (interior, duration) = CameraChoreographer::pose_for(Phase::CarInterior).unwrap();
        choreo.fly_to(&rig, Phase::CarInterior, interior, duration);
        // First step of the new flight starts near the midway pose.
        choreo.tick(&mut rig, 0.0, 1.0 / 240.0);
        assert!(rig.position.distance(midway) < 0.5);
    }

    #[test]
    fn test_scheduled_return_fires_after_deadline() {
        let mut rig = rig();
        let mut choreo = CameraChoreographer::new();
        let (pose, _) = CameraChoreographer::pose_for(Phase::CarInterior).unwrap();
        rig.set_pose(pose);
        choreo.schedule_return_home(5.0);

        assert!(choreo.tick(&mut rig, 4.9, 1.0 / 60.0).is_none());
        assert!(!choreo.is_flying());
        choreo.tick(&mut rig, 5.0, 1.0 / 60.0);
        assert!(choreo.is_flying());

        let mut now = 5.0;
        let mut returned = false;
        for _ in 0..200 {
            now += 1.0 / 60.0;
            if let Some(CameraEvent::ReturnedHome { notify }) =
                choreo.tick(&mut rig, now, 1.0 / 60.0)
            {
                assert!(!notify);
                returned = true;
                break;
            }
        }
        assert!(returned);
        let home = rig.home().unwrap();
        assert!(rig.position.distance(home.position) < 1e-4);
    }

    #[test]
    fn test_return_home_requires_home_pose() {
        let rig = CameraRig::new(Vec3::ZERO, Vec3::ZERO);
        let mut choreo = CameraChoreographer::new();
        assert!(!choreo.return_home(&rig, true));
    }
}
