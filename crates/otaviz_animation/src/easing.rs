//! Easing functions

use std::f32::consts::FRAC_PI_2;

/// Easing curve applied to normalized timeline progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    /// Symmetric quadratic ease (camera flights)
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    /// Sine-based slow start (content-download transfer)
    SineIn,
    /// Sine-based slow finish
    SineOut,
}

impl Easing {
    /// Apply easing to a value
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            Easing::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
            Easing::SineOut => (t * FRAC_PI_2).sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::EaseInQuad,
            Easing::EaseOutQuad,
            Easing::EaseInOutQuad,
            Easing::EaseInCubic,
            Easing::EaseOutCubic,
            Easing::SineIn,
            Easing::SineOut,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_shapes() {
        assert!((Easing::Linear.apply(0.5) - 0.5).abs() < 1e-6);
        assert!(Easing::EaseInQuad.apply(0.5) < 0.5);
        assert!(Easing::EaseOutQuad.apply(0.5) > 0.5);
        assert!(Easing::SineIn.apply(0.5) < 0.5);
        assert!(Easing::SineOut.apply(0.5) > 0.5);
    }

    #[test]
    fn test_out_of_range_clamped() {
        assert_eq!(Easing::EaseInOutQuad.apply(-3.0), 0.0);
        assert_eq!(Easing::EaseInOutQuad.apply(42.0), 1.0);
    }
}
