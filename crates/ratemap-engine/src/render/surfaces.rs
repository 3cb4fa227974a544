use glam::UVec2;

use crate::grid::TileGrid;

/// Grid-sized texture plus its default view.
pub struct GridTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GridTexture {
    fn new(
        device: &wgpu::Device,
        label: &str,
        size: UVec2,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// The controller's grid-sized surfaces for one render-target configuration.
///
/// All three textures are created and dropped together. Any change of
/// resolution or sample count replaces the whole set.
pub struct RateSurfaces {
    grid: TileGrid,
    sample_count: u32,

    /// Per-tile contrast of the previous frame's color.
    ///
    /// Single-buffered: written by the feature pass and read by the estimate
    /// pass in the same submission, so the estimate always sees this frame's
    /// features.
    features: GridTexture,

    /// Raw per-tile estimate, read by the smoother.
    rates_estimate: GridTexture,

    /// Final rate surface consumed by the shading pass and the overlay.
    rates: GridTexture,
}

impl RateSurfaces {
    /// Only `.xy` is used. `Rg32Float` has no storage binding on downlevel
    /// adapters.
    pub const FEATURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
    pub const RATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Uint;

    pub fn new(device: &wgpu::Device, grid: TileGrid, sample_count: u32) -> Self {
        let dims = grid.dimensions();
        let storage = wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING;

        let features = GridTexture::new(
            device,
            "ratemap features",
            dims,
            Self::FEATURE_FORMAT,
            storage | wgpu::TextureUsages::COPY_SRC,
        );
        let rates_estimate = GridTexture::new(
            device,
            "ratemap rates estimate",
            dims,
            Self::RATE_FORMAT,
            storage | wgpu::TextureUsages::COPY_SRC,
        );
        let rates = GridTexture::new(
            device,
            "ratemap rates",
            dims,
            Self::RATE_FORMAT,
            storage | wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST,
        );

        log::debug!(
            "rate surfaces created: {}x{} tiles for {}x{} px, {} sample(s)",
            dims.x,
            dims.y,
            grid.resolution().x,
            grid.resolution().y,
            sample_count
        );

        Self {
            grid,
            sample_count,
            features,
            rates_estimate,
            rates,
        }
    }

    /// Whether these surfaces were built for `resolution` at `sample_count`.
    pub fn matches(&self, resolution: UVec2, sample_count: u32) -> bool {
        self.grid.resolution() == resolution && self.sample_count == sample_count
    }

    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    #[inline]
    pub fn features(&self) -> &GridTexture {
        &self.features
    }

    #[inline]
    pub fn rates_estimate(&self) -> &GridTexture {
        &self.rates_estimate
    }

    #[inline]
    pub fn rates(&self) -> &GridTexture {
        &self.rates
    }

    /// Copies the raw estimate into the final surface (smoothing off).
    pub fn copy_estimate_to_rates(&self, encoder: &mut wgpu::CommandEncoder) {
        let dims = self.grid.dimensions();
        encoder.copy_texture_to_texture(
            self.rates_estimate.texture.as_image_copy(),
            self.rates.texture.as_image_copy(),
            wgpu::Extent3d {
                width: dims.x,
                height: dims.y,
                depth_or_array_layers: 1,
            },
        );
    }
}
