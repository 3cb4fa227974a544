//! Blocking texture readback.
//!
//! For diagnostics and tests only; the per-frame path never waits on the GPU.

use anyhow::{Context, Result};
use glam::UVec2;

use crate::grid::{Image2d, RateGrid};

/// Copies a single-sampled 2D texture to the CPU, tightly packed.
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    size: UVec2,
    bytes_per_pixel: u32,
) -> Result<Vec<u8>> {
    let unpadded_bytes_per_row = size.x * bytes_per_pixel;
    let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let buffer_size = padded_bytes_per_row as u64 * size.y as u64;

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("ratemap readback"),
        size: buffer_size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("ratemap readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: Some(size.y),
            },
        },
        wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = readback.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .context("device poll failed during readback")?;
    receiver
        .recv()
        .context("readback map callback dropped")?
        .context("failed to map readback buffer")?;

    let mapped = slice.get_mapped_range();
    let mut bytes = Vec::with_capacity((unpadded_bytes_per_row * size.y) as usize);
    for row in mapped.chunks(padded_bytes_per_row as usize) {
        bytes.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
    }
    drop(mapped);
    readback.unmap();
    Ok(bytes)
}

/// Reads a rate surface back as a [`RateGrid`].
pub fn read_rate_grid(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    dimensions: UVec2,
) -> Result<RateGrid> {
    let bytes = read_texture(device, queue, texture, dimensions, 4)?;
    let codes: Vec<u32> = bytes
        .chunks_exact(4)
        .map(bytemuck::pod_read_unaligned::<u32>)
        .collect();
    RateGrid::from_codes(dimensions, &codes).context("rate readback size mismatch")
}

/// Reads the `.xy` channels of an `Rgba32Float` feature surface.
pub fn read_feature_grid(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    dimensions: UVec2,
) -> Result<Image2d<glam::Vec2>> {
    let bytes = read_texture(device, queue, texture, dimensions, 16)?;
    let features = bytes
        .chunks_exact(16)
        .map(|texel| glam::Vec2::from_array(bytemuck::pod_read_unaligned::<[f32; 2]>(&texel[..8])))
        .collect();
    Image2d::from_vec(dimensions, features).context("feature readback size mismatch")
}
