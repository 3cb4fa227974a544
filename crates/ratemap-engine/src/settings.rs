//! Per-frame controller configuration.
//!
//! The host owns these values (UI sliders, CLI flags) and hands the
//! controller a copy every frame. Nothing here is cached across frames.

use std::ops::RangeInclusive;

/// Sensitivities of the rate decision.
///
/// - `error`: perceptual error a tile may carry before shading gets finer.
///   Higher values allow coarser rates.
/// - `motion`: weight of screen-space displacement. Higher values push moving
///   tiles toward full rate sooner.
/// - `brightness`: adaptation floor added to the mean luminance. Higher values
///   make dark tiles look flatter, so they get coarser rates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sensitivities {
    pub error: f32,
    pub motion: f32,
    pub brightness: f32,
}

impl Sensitivities {
    pub const ERROR_RANGE: RangeInclusive<f32> = 0.001..=0.2;
    pub const MOTION_RANGE: RangeInclusive<f32> = 0.0..=2.0;
    pub const BRIGHTNESS_RANGE: RangeInclusive<f32> = 0.01..=0.2;

    /// Copy with every value clamped to its range. NaN falls back to the default.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            error: clamp_to(self.error, Self::ERROR_RANGE, d.error),
            motion: clamp_to(self.motion, Self::MOTION_RANGE, d.motion),
            brightness: clamp_to(self.brightness, Self::BRIGHTNESS_RANGE, d.brightness),
        }
    }
}

impl Default for Sensitivities {
    fn default() -> Self {
        Self {
            error: 0.07,
            motion: 0.5,
            brightness: 0.1,
        }
    }
}

fn clamp_to(value: f32, range: RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

/// Controller snapshot for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerSettings {
    /// Master switch. When off, no rates are produced and the shading pass
    /// runs at full rate.
    pub enabled: bool,

    /// Run the smoother. When off, the raw estimate becomes the rate surface.
    pub smoothing: bool,

    /// Draw the rate overlay.
    pub visualize: bool,

    pub sensitivities: Sensitivities,

    /// Maximum level difference the smoother allows between adjacent tiles.
    pub max_level_delta: u32,
}

impl ControllerSettings {
    pub const MAX_LEVEL_DELTA_RANGE: RangeInclusive<u32> = 1..=4;

    /// Copy with sensitivities and `max_level_delta` clamped to their ranges.
    pub fn sanitized(self) -> Self {
        Self {
            sensitivities: self.sensitivities.clamped(),
            max_level_delta: self.max_level_delta.clamp(
                *Self::MAX_LEVEL_DELTA_RANGE.start(),
                *Self::MAX_LEVEL_DELTA_RANGE.end(),
            ),
            ..self
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            smoothing: true,
            visualize: false,
            sensitivities: Sensitivities::default(),
            max_level_delta: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_range() {
        let s = Sensitivities::default();
        assert_eq!(s, s.clamped());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let s = Sensitivities {
            error: 5.0,
            motion: -1.0,
            brightness: f32::NAN,
        }
        .clamped();
        assert_eq!(s.error, 0.2);
        assert_eq!(s.motion, 0.0);
        assert_eq!(s.brightness, Sensitivities::default().brightness);
    }

    #[test]
    fn sanitized_keeps_flags_and_bounds_delta() {
        let settings = ControllerSettings {
            smoothing: false,
            max_level_delta: 0,
            ..Default::default()
        }
        .sanitized();
        assert!(!settings.smoothing);
        assert!(settings.enabled);
        assert_eq!(settings.max_level_delta, 1);

        let wide = ControllerSettings {
            max_level_delta: 9,
            ..Default::default()
        };
        assert_eq!(wide.sanitized().max_level_delta, 4);
    }
}
