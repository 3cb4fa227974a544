use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ratemap_engine::settings::{ControllerSettings, Sensitivities};

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive the adaptive shading-rate controller over a scripted camera path")]
pub struct Arguments {
    /// Render-target width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,
    /// Render-target height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
    /// Shading-rate tile size reported for the device.
    #[arg(long, default_value_t = 16)]
    pub tile_size: u32,
    /// Depth/motion sample count (1 or 4).
    #[arg(long, default_value_t = 1)]
    pub sample_count: u32,
    /// Number of frames to render.
    #[arg(long, default_value_t = 90)]
    pub frames: u32,
    /// Camera path.
    #[arg(long, value_enum, default_value = "pan")]
    pub scenario: Scenario,

    #[arg(long, default_value_t = 0.07)]
    pub error_sensitivity: f32,
    #[arg(long, default_value_t = 0.5)]
    pub motion_sensitivity: f32,
    #[arg(long, default_value_t = 0.1)]
    pub brightness_sensitivity: f32,
    /// Largest level step the smoother allows between adjacent tiles.
    #[arg(long, default_value_t = 1)]
    pub max_level_delta: u32,

    /// Skip smoothing; the raw estimate drives shading.
    #[arg(long)]
    pub no_smoothing: bool,
    /// Turn the controller off (full-rate shading).
    #[arg(long)]
    pub disabled: bool,
    /// Draw the rate overlay.
    #[arg(long)]
    pub visualize: bool,
    /// Write the last frame (with overlay, if enabled) as PNG.
    #[arg(long, value_parser)]
    pub snapshot: Option<PathBuf>,
    /// Log a rate report every N frames (0 = only the summary).
    #[arg(long, default_value_t = 15)]
    pub report_every: u32,
    /// Use a software adapter.
    #[arg(long)]
    pub fallback_adapter: bool,
    /// Logger filter, overrides RUST_LOG.
    #[arg(long)]
    pub log: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Camera never moves.
    Static,
    /// Static, then a fast yaw pan, then a slow drift.
    Pan,
    /// Slow orbit around the scene.
    Orbit,
    /// Static shots separated by camera cuts.
    Cut,
    /// Stereo rendering: the controller must stay out of the way.
    Stereo,
}

impl Arguments {
    pub fn settings(&self) -> ControllerSettings {
        ControllerSettings {
            enabled: !self.disabled,
            smoothing: !self.no_smoothing,
            visualize: self.visualize,
            sensitivities: Sensitivities {
                error: self.error_sensitivity,
                motion: self.motion_sensitivity,
                brightness: self.brightness_sensitivity,
            },
            max_level_delta: self.max_level_delta,
        }
        .sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_controller_defaults() {
        let args = Arguments::parse_from(["ratemap-studio"]);
        assert_eq!(args.settings(), ControllerSettings::default());
        assert_eq!(args.scenario, Scenario::Pan);
    }

    #[test]
    fn flags_flow_into_settings() {
        let args = Arguments::parse_from([
            "ratemap-studio",
            "--no-smoothing",
            "--visualize",
            "--error-sensitivity",
            "0.5",
            "--scenario",
            "static",
        ]);
        let settings = args.settings();
        assert!(!settings.smoothing);
        assert!(settings.visualize);
        // Clamped to the slider range.
        assert_eq!(settings.sensitivities.error, 0.2);
        assert_eq!(args.scenario, Scenario::Static);
    }
}
