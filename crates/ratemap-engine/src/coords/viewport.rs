use glam::{UVec2, Vec2};

/// Viewport rectangle in physical pixels.
///
/// Maps NDC onto the render target: NDC (-1, +1) is `origin`, NDC (+1, -1)
/// is `origin + size`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewportRect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl ViewportRect {
    #[inline]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Viewport covering a whole target of `resolution` pixels.
    #[inline]
    pub fn full(resolution: UVec2) -> Self {
        Self::new(Vec2::ZERO, resolution.as_vec2())
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.size.x > 0.0 && self.size.y > 0.0 && self.origin.is_finite() && self.size.is_finite()
    }

    /// Snaps origin and size down to whole pixels.
    #[inline]
    pub fn floor(self) -> Self {
        Self::new(self.origin.floor(), self.size.floor())
    }

    /// Pixel position (not pixel index) of an NDC point.
    #[inline]
    pub fn ndc_to_pixel(self, ndc: Vec2) -> Vec2 {
        let uv = Vec2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
        self.origin + uv * self.size
    }

    /// NDC of a pixel position. Inverse of [`ViewportRect::ndc_to_pixel`].
    #[inline]
    pub fn pixel_to_ndc(self, pixel: Vec2) -> Vec2 {
        let uv = (pixel - self.origin) / self.size;
        Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_map_to_viewport_corners() {
        let vp = ViewportRect::new(Vec2::new(10.0, 20.0), Vec2::new(100.0, 50.0));
        assert_eq!(vp.ndc_to_pixel(Vec2::new(-1.0, 1.0)), Vec2::new(10.0, 20.0));
        assert_eq!(vp.ndc_to_pixel(Vec2::new(1.0, -1.0)), Vec2::new(110.0, 70.0));
    }

    #[test]
    fn pixel_to_ndc_inverts_ndc_to_pixel() {
        let vp = ViewportRect::full(UVec2::new(640, 360));
        let p = Vec2::new(123.5, 77.5);
        let back = vp.ndc_to_pixel(vp.pixel_to_ndc(p));
        assert!((back - p).length() < 1e-3);
    }

    #[test]
    fn zero_size_is_invalid() {
        assert!(!ViewportRect::new(Vec2::ZERO, Vec2::new(0.0, 10.0)).is_valid());
        assert!(ViewportRect::full(UVec2::new(1, 1)).is_valid());
    }

    #[test]
    fn floor_snaps_to_whole_pixels() {
        let vp = ViewportRect::new(Vec2::new(0.7, 1.2), Vec2::new(99.9, 50.5)).floor();
        assert_eq!(vp, ViewportRect::new(Vec2::new(0.0, 1.0), Vec2::new(99.0, 50.0)));
    }
}
