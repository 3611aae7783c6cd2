//! Live camera state

use otaviz_core::Vec3;
use serde::Serialize;

/// A camera position / look-at pair
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }
}

/// The single live camera.
///
/// Only the camera choreographer writes to this; the composer reads it.
/// The home pose is captured lazily from the live pose on the first tick
/// and never recaptured, so free camera control before the first scripted
/// move is preserved as "home".
#[derive(Clone, Debug)]
pub struct CameraRig {
    pub position: Vec3,
    pub target: Vec3,
    home: Option<CameraPose>,
    /// Whether a scripted transition is currently in flight
    pub transitioning: bool,
}

impl CameraRig {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            home: None,
            transitioning: false,
        }
    }

    /// Capture the current live pose as home. Subsequent calls are no-ops.
    pub fn capture_home(&mut self) {
        if self.home.is_none() {
            self.home = Some(CameraPose::new(self.position, self.target));
        }
    }

    pub fn home(&self) -> Option<CameraPose> {
        self.home
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.target)
    }

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.position = pose.position;
        self.target = pose.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_captured_once() {
        let mut rig = CameraRig::new(Vec3::new(0.0, 10.0, 55.0), Vec3::ZERO);
        rig.capture_home();
        rig.position = Vec3::new(5.0, 5.0, 5.0);
        rig.capture_home();
        let home = rig.home().unwrap();
        assert!((home.position.z - 55.0).abs() < 1e-6);
    }
}
