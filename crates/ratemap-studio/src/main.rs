mod args;
mod camera;
mod report;
mod scene;
mod sink;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glam::UVec2;
use ratemap_engine::device::{Gpu, GpuInit, VariableRateShadingInfo};
use ratemap_engine::logging::{init_logging, LoggingConfig};
use ratemap_engine::render::{readback, RenderCtx};
use ratemap_engine::settings::ControllerSettings;
use ratemap_engine::view::{FrameViews, ViewState};
use ratemap_engine::{AdaptiveShading, FrameInputs, RenderTargetDesc};

use args::Arguments;
use camera::CameraPath;
use report::{FrameReport, RunSummary};
use scene::{SceneRenderer, SceneTargets, SceneUniform, COLOR_FORMAT};
use sink::RecordingSink;

fn main() -> Result<()> {
    let args = Arguments::parse();
    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.as_str()),
        None => LoggingConfig::default(),
    });

    print_banner(&args);

    let gpu = Gpu::new_headless_blocking(GpuInit {
        force_fallback_adapter: args.fallback_adapter,
        variable_rate_shading: Some(VariableRateShadingInfo {
            tile_size: args.tile_size,
        }),
        ..GpuInit::default()
    })?;

    let mut studio = Studio::new(&gpu, &args)?;
    let summary = studio.run(args.frames, args.report_every)?;

    println!();
    println!("  frames rendered      {}", summary.frames());
    println!("  frames with coarse   {}", summary.coarse_frames());
    println!("  mean shading work    {:.1}%", summary.mean_work() * 100.0);
    println!("  lowest shading work  {:.1}%", summary.min_work() * 100.0);
    println!("  worst adjacent step  {}", summary.worst_delta());
    println!("  engaged shade passes {}", studio.sink.engaged_passes);
    println!("  rate state changes   {}", studio.sink.state_changes);
    println!();
    log::debug!("final shading rate state: {:?}", studio.sink.current());

    if let Some(path) = &args.snapshot {
        studio.save_snapshot(path)?;
        log::info!("snapshot written to {}", path.display());
    }
    Ok(())
}

fn print_banner(args: &Arguments) {
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║          RATEMAP STUDIO v0.1           ║");
    println!("  ║   adaptive shading-rate controller     ║");
    println!("  ╚════════════════════════════════════════╝");
    println!(
        "  {}x{}  tile {}px  {} frame(s)  scenario {:?}",
        args.width, args.height, args.tile_size, args.frames, args.scenario
    );
    println!();
}

struct Studio<'g> {
    gpu: &'g Gpu,
    resolution: UVec2,
    settings: ControllerSettings,
    path: CameraPath,

    controller: AdaptiveShading,
    scene: SceneRenderer,
    targets: SceneTargets,
    sink: RecordingSink,
}

impl<'g> Studio<'g> {
    fn new(gpu: &'g Gpu, args: &Arguments) -> Result<Self> {
        let resolution = UVec2::new(args.width, args.height);
        let mut controller = AdaptiveShading::new(gpu.device(), gpu)?;
        controller.configure(gpu.device(), RenderTargetDesc::new(resolution, args.sample_count))?;

        let grid = controller.grid().context("controller has no tile grid after configure")?;
        log::info!(
            "tile grid {}x{} ({} tiles)",
            grid.dimensions().x,
            grid.dimensions().y,
            grid.tile_count()
        );

        Ok(Self {
            gpu,
            resolution,
            settings: args.settings(),
            path: CameraPath::new(args.scenario, args.frames),
            controller,
            scene: SceneRenderer::new(gpu.device(), args.sample_count),
            targets: SceneTargets::new(gpu.device(), resolution, args.sample_count),
            sink: RecordingSink::new(),
        })
    }

    fn run(&mut self, frames: u32, report_every: u32) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut views: Option<FrameViews> = None;
        let mut previous_view: Option<ViewState> = None;

        for frame in 0..frames {
            let frame_views = self.path.frame_views(frame, views, self.resolution);
            let key = self.path.key(frame);
            let view = key.view(self.resolution);
            let motion_from = match previous_view {
                Some(prev) if frame_views.previous_valid => prev,
                _ => view,
            };

            let rates_ready = self.render_frame(&frame_views, &view, &motion_from, key.eye);

            if rates_ready {
                let report = self.read_report(frame)?;
                if self.settings.smoothing
                    && report.max_level_delta > self.settings.sanitized().max_level_delta
                {
                    bail!(
                        "frame {frame}: adjacent tiles differ by {} levels",
                        report.max_level_delta
                    );
                }
                if report_every > 0 && frame % report_every == 0 {
                    log::info!("{report}");
                }
                summary.record(&report);
            }

            views = Some(frame_views);
            previous_view = Some(view);
        }
        Ok(summary)
    }

    /// Records and submits one frame. Returns whether rates were produced.
    fn render_frame(
        &mut self,
        frame_views: &FrameViews,
        view: &ViewState,
        previous_view: &ViewState,
        eye: glam::Vec3,
    ) -> bool {
        let ctx = RenderCtx::from(self.gpu);
        self.scene
            .upload(ctx.queue, &SceneUniform::new(view, previous_view, eye));

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("studio frame encoder"),
            });

        self.scene.encode_geometry(&mut encoder, &self.targets);

        let inputs = FrameInputs {
            depth: &self.targets.depth_view,
            previous_color: &self.targets.history_view,
            views: frame_views,
        };
        let rates_ready = self
            .controller
            .encode_rates(&ctx, &mut encoder, &inputs, &self.settings);

        let scene = &self.scene;
        let targets = &self.targets;
        self.controller.bracket_shading_pass(
            &mut self.sink,
            &frame_views.current,
            &self.settings,
            |_| scene.encode_shade(&mut encoder, targets),
        );

        // History excludes the overlay.
        targets.store_history(&mut encoder);
        self.controller.visualize(
            &ctx,
            &mut encoder,
            &targets.color_view,
            COLOR_FORMAT,
            Some(&targets.motion_view),
            &self.settings,
        );

        self.gpu.submit(encoder);
        rates_ready
    }

    fn read_report(&self, frame: u32) -> Result<FrameReport> {
        let surfaces = self
            .controller
            .surfaces()
            .context("rates produced without surfaces")?;
        let rates = readback::read_rate_grid(
            self.gpu.device(),
            self.gpu.queue(),
            &surfaces.rates().texture,
            surfaces.grid().dimensions(),
        )?;
        Ok(FrameReport::new(frame, &rates))
    }

    fn save_snapshot(&self, path: &Path) -> Result<()> {
        let bytes = readback::read_texture(
            self.gpu.device(),
            self.gpu.queue(),
            &self.targets.color,
            self.resolution,
            4,
        )?;
        let image = image::RgbaImage::from_raw(self.resolution.x, self.resolution.y, bytes)
            .context("snapshot size mismatch")?;
        image
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}
