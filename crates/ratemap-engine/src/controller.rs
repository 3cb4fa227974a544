//! Per-frame orchestration.
//!
//! Frame order expected from the host:
//! 1. record depth (and motion vectors) for the current frame
//! 2. [`AdaptiveShading::encode_rates`] into the same or a later encoder
//! 3. [`AdaptiveShading::bracket_shading_pass`] around the main shading pass
//! 4. optionally [`AdaptiveShading::visualize`] over the final image
//!
//! The final color of this frame is the `previous_color` input of the next.

use glam::UVec2;

use crate::apply::{ApplierState, RateApplier, RateStateSink};
use crate::device::ShadingRateCapability;
use crate::error::ControllerError;
use crate::grid::TileGrid;
use crate::rate::RatePolicy;
use crate::render::passes::{
    EstimatePass, EstimateUniform, FeaturePass, RateVisualizer, SmoothPass, VisualizerStatus,
};
use crate::render::{capture_errors, RateSurfaces, RenderCtx};
use crate::settings::ControllerSettings;
use crate::view::{FrameViews, Reprojection, ViewLayout};

/// Render-target configuration the rate surfaces are built for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub resolution: UVec2,
    pub sample_count: u32,
}

impl RenderTargetDesc {
    pub fn new(resolution: UVec2, sample_count: u32) -> Self {
        Self {
            resolution,
            sample_count,
        }
    }
}

/// Host resources read by [`AdaptiveShading::encode_rates`].
pub struct FrameInputs<'a> {
    /// Current frame depth, `Depth32Float` or another sampleable depth
    /// format, matching the configured sample count.
    pub depth: &'a wgpu::TextureView,

    /// Last frame's final color at render-target size.
    ///
    /// Read-only here. The host must not overwrite it before the commands
    /// recorded by `encode_rates` are submitted.
    pub previous_color: &'a wgpu::TextureView,

    pub views: &'a FrameViews,
}

/// The adaptive shading-rate controller.
pub struct AdaptiveShading {
    tile_size: u32,
    policy: RatePolicy,

    surfaces: Option<RateSurfaces>,
    /// Surfaces were (re)created since the last encoded frame.
    history_reset: bool,

    feature_pass: FeaturePass,
    estimate_pass: EstimatePass,
    smooth_pass: SmoothPass,
    visualizer: RateVisualizer,
    applier: RateApplier,

    /// Rates were produced for the frame being rendered.
    rates_ready: bool,
    warned_unconfigured: bool,
}

impl AdaptiveShading {
    /// Builds the controller. Fails when the device reports no shading-rate
    /// image support or rejects one of the compute pipelines.
    pub fn new(
        device: &wgpu::Device,
        caps: &impl ShadingRateCapability,
    ) -> Result<Self, ControllerError> {
        let info = caps.require_variable_rate_shading()?;

        let (feature_pass, smooth_pass) =
            capture_errors(device, || (FeaturePass::new(device), SmoothPass::new(device)))
                .map_err(|error| gpu_error("controller pipelines", error))?;
        log::info!("adaptive shading: {}px shading-rate tiles", info.tile_size);

        Ok(Self {
            tile_size: info.tile_size,
            policy: RatePolicy::default(),
            surfaces: None,
            history_reset: true,
            feature_pass,
            estimate_pass: EstimatePass::new(),
            smooth_pass,
            visualizer: RateVisualizer::new(),
            applier: RateApplier::new(),
            rates_ready: false,
            warned_unconfigured: false,
        })
    }

    pub fn with_policy(mut self, policy: RatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RatePolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: RatePolicy) {
        self.policy = policy;
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Ensures surfaces exist for `target`. Returns `true` when they were
    /// (re)created; the next frame then runs without history.
    ///
    /// On error the controller is left unconfigured: `encode_rates` produces
    /// nothing until a later `configure` succeeds.
    pub fn configure(
        &mut self,
        device: &wgpu::Device,
        target: RenderTargetDesc,
    ) -> Result<bool, ControllerError> {
        let current = self.surfaces.as_ref();
        if current.is_some_and(|s| s.matches(target.resolution, target.sample_count)) {
            return Ok(false);
        }

        // The old set no longer describes the target, whatever happens next.
        self.surfaces = None;
        self.history_reset = true;
        self.rates_ready = false;

        if !matches!(target.sample_count, 1 | 2 | 4 | 8 | 16) {
            return Err(ControllerError::UnsupportedSampleCount(target.sample_count));
        }
        let grid = TileGrid::new(target.resolution, self.tile_size)?;

        let estimate_pass = &mut self.estimate_pass;
        let created = capture_errors(device, || {
            estimate_pass.prepare(device, target.sample_count > 1);
            RateSurfaces::new(device, grid, target.sample_count)
        });
        match created {
            Ok(surfaces) => {
                self.surfaces = Some(surfaces);
                Ok(true)
            }
            Err(error) => {
                self.estimate_pass = EstimatePass::new();
                Err(gpu_error("rate surfaces", error))
            }
        }
    }

    pub fn grid(&self) -> Option<&TileGrid> {
        self.surfaces.as_ref().map(RateSurfaces::grid)
    }

    pub fn surfaces(&self) -> Option<&RateSurfaces> {
        self.surfaces.as_ref()
    }

    /// Final rate surface (`R32Uint`, one texel per tile).
    pub fn rate_view(&self) -> Option<&wgpu::TextureView> {
        self.surfaces.as_ref().map(|s| &s.rates().view)
    }

    /// Whether `encode_rates` produced rates for the current frame.
    pub fn rates_ready(&self) -> bool {
        self.rates_ready
    }

    pub fn applier_state(&self) -> ApplierState {
        self.applier.state()
    }

    pub fn visualizer_status(&self) -> VisualizerStatus {
        self.visualizer.status()
    }

    /// Records features, estimate and smoothing for this frame.
    ///
    /// Returns whether a rate surface was produced. Without usable history
    /// (first frame, camera cut, fresh surfaces, multi-viewport) the surface
    /// is uniformly 1x1.
    pub fn encode_rates(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        inputs: &FrameInputs<'_>,
        settings: &ControllerSettings,
    ) -> bool {
        self.rates_ready = false;
        let settings = settings.sanitized();
        if !settings.enabled {
            log::trace!("adaptive shading disabled; no rates this frame");
            return false;
        }

        let Some(surfaces) = self.surfaces.as_ref() else {
            if !self.warned_unconfigured {
                log::warn!("encode_rates called before configure; skipping");
                self.warned_unconfigured = true;
            }
            return false;
        };

        let reprojection = if self.history_reset {
            log::debug!("rate surfaces are fresh; running without history");
            None
        } else {
            inputs
                .views
                .planar_history()
                .and_then(|(current, previous)| Reprojection::between(current, previous))
        };

        self.feature_pass.encode(
            ctx,
            encoder,
            surfaces,
            inputs.previous_color,
            settings.sensitivities.brightness,
        );

        let params = EstimateUniform::new(
            reprojection.as_ref(),
            &settings.sensitivities,
            &self.policy,
            self.tile_size,
        );
        self.estimate_pass.encode(ctx, encoder, surfaces, inputs.depth, &params);

        if settings.smoothing {
            self.smooth_pass.encode(ctx, encoder, surfaces, settings.max_level_delta);
        } else {
            surfaces.copy_estimate_to_rates(encoder);
        }

        self.history_reset = false;
        self.rates_ready = true;
        true
    }

    /// Runs `pass` once, with the rate image engaged when this frame has
    /// rates and `layout` is planar.
    pub fn bracket_shading_pass<S, R>(
        &mut self,
        sink: &mut S,
        layout: &ViewLayout,
        settings: &ControllerSettings,
        pass: impl FnOnce(&mut S) -> R,
    ) -> R
    where
        S: RateStateSink + ?Sized,
    {
        self.applier
            .bracket(sink, layout, settings, self.rates_ready, pass)
    }

    /// Draws the rate overlay when `settings.visualize` is set and rates exist.
    pub fn visualize(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        target_format: wgpu::TextureFormat,
        motion_vectors: Option<&wgpu::TextureView>,
        settings: &ControllerSettings,
    ) {
        if !settings.visualize || !self.rates_ready {
            return;
        }
        let Some(surfaces) = self.surfaces.as_ref() else { return };
        self.visualizer
            .render(ctx, encoder, target, target_format, surfaces, motion_vectors);
    }
}

fn gpu_error(label: &'static str, error: wgpu::Error) -> ControllerError {
    log::error!("adaptive shading: device rejected {label}: {error}");
    ControllerError::GpuResource {
        label,
        message: error.to_string(),
    }
}
