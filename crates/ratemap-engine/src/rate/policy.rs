use glam::Vec2;

use crate::settings::Sensitivities;

use super::ShadingRate;

/// Maps a tile's feature and displacement to a shading rate.
///
/// Error model: the feature is the tile's contrast per axis. Motion
/// amplifies the error a coarse rate would introduce, and past
/// `motion_full_rate` the tile is shaded at full rate outright. Each axis
/// then picks the coarsest rate whose predicted error stays below the error
/// sensitivity:
///
/// - quarter rate when `error * quarter_rate_scale < error_sensitivity`
/// - half rate when `error < error_sensitivity`
/// - full rate otherwise
///
/// The result is clamped to one log2 step of anisotropy. The mapping is
/// monotone: a larger feature or displacement never yields a coarser rate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RatePolicy {
    /// Error growth from half to quarter rate.
    pub quarter_rate_scale: f32,
    /// How strongly motion energy amplifies the error.
    pub motion_error_gain: f32,
    /// Motion energy at and above which tiles are forced to full rate.
    pub motion_full_rate: f32,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            quarter_rate_scale: 2.13,
            motion_error_gain: 1.0,
            motion_full_rate: 4.0,
        }
    }
}

impl RatePolicy {
    /// Rate for a tile with `feature` (per-axis contrast) that moved
    /// `displacement_px` pixels since the previous frame.
    pub fn classify(
        &self,
        feature: Vec2,
        displacement_px: f32,
        sensitivities: &Sensitivities,
    ) -> ShadingRate {
        let motion = sensitivities.motion * displacement_px;
        // NaN motion (unknown history) counts as unbounded.
        if motion.is_nan() || motion >= self.motion_full_rate {
            return ShadingRate::Rate1x1;
        }

        let error = feature * (1.0 + self.motion_error_gain * motion);
        let lx = self.axis_level(error.x, sensitivities.error);
        let ly = self.axis_level(error.y, sensitivities.error);

        let (cx, cy) = (lx.min(ly + 1), ly.min(lx + 1));
        ShadingRate::from_axes(cx, cy).unwrap_or(ShadingRate::Rate1x1)
    }

    fn axis_level(&self, error: f32, threshold: f32) -> u32 {
        // NaN feature: no information, shade fully.
        if error.is_nan() {
            return 0;
        }
        if error * self.quarter_rate_scale < threshold {
            2
        } else if error < threshold {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sens() -> Sensitivities {
        Sensitivities::default()
    }

    #[test]
    fn flat_static_tile_is_coarsest() {
        let rate = RatePolicy::default().classify(Vec2::ZERO, 0.0, &sens());
        assert_eq!(rate, ShadingRate::Rate4x4);
    }

    #[test]
    fn busy_tile_is_full_rate() {
        let rate = RatePolicy::default().classify(Vec2::splat(1.0), 0.0, &sens());
        assert_eq!(rate, ShadingRate::Rate1x1);
    }

    #[test]
    fn axes_are_decided_independently() {
        let p = RatePolicy::default();
        // x well below threshold, y between the half and quarter bands.
        let feature = Vec2::new(0.0, 0.05);
        assert_eq!(p.classify(feature, 0.0, &sens()), ShadingRate::Rate4x2);
    }

    #[test]
    fn anisotropy_is_limited_to_one_step() {
        let p = RatePolicy::default();
        let rate = p.classify(Vec2::new(0.0, 1.0), 0.0, &sens());
        assert_eq!(rate, ShadingRate::Rate2x1);
        let rate = p.classify(Vec2::new(1.0, 0.0), 0.0, &sens());
        assert_eq!(rate, ShadingRate::Rate1x2);
    }

    #[test]
    fn fast_motion_forces_full_rate() {
        let p = RatePolicy::default();
        // 0.5 * 8px = 4.0 motion energy.
        assert_eq!(p.classify(Vec2::ZERO, 8.0, &sens()), ShadingRate::Rate1x1);
        assert_eq!(p.classify(Vec2::ZERO, f32::INFINITY, &sens()), ShadingRate::Rate1x1);
        assert_eq!(p.classify(Vec2::ZERO, f32::NAN, &sens()), ShadingRate::Rate1x1);
    }

    #[test]
    fn zero_motion_sensitivity_ignores_displacement() {
        let s = Sensitivities { motion: 0.0, ..sens() };
        let p = RatePolicy::default();
        let still = p.classify(Vec2::splat(0.02), 0.0, &s);
        let moving = p.classify(Vec2::splat(0.02), 500.0, &s);
        assert_eq!(still, moving);
    }

    #[test]
    fn monotone_in_feature_and_displacement() {
        let p = RatePolicy::default();
        let s = sens();
        let features: Vec<f32> = (0..40).map(|i| i as f32 * 0.005).collect();
        let displacements: Vec<f32> = (0..40).map(|i| i as f32 * 0.25).collect();

        for &fy in &features {
            for pair in features.windows(2) {
                for &d in &displacements {
                    let a = p.classify(Vec2::new(pair[0], fy), d, &s);
                    let b = p.classify(Vec2::new(pair[1], fy), d, &s);
                    assert!(b.level() <= a.level(), "feature {pair:?} at d={d}");
                }
            }
        }

        for &fx in &features {
            for pair in displacements.windows(2) {
                let f = Vec2::new(fx, fx * 0.5);
                let a = p.classify(f, pair[0], &s);
                let b = p.classify(f, pair[1], &s);
                assert!(b.level() <= a.level(), "displacement {pair:?} at f={fx}");
            }
        }
    }
}
