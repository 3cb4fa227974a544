use std::fmt;

use glam::{uvec2, UVec2};

/// Coarse shading rate of one tile.
///
/// Discriminants are the hardware encoding `(log2(w) << 2) | log2(h)` shared
/// by D3D12 and Vulkan shading-rate images. Rates whose axes differ by more
/// than one step (1x4, 4x1) are not representable.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShadingRate {
    Rate1x1 = 0,
    Rate1x2 = 1,
    Rate2x1 = 4,
    Rate2x2 = 5,
    Rate2x4 = 6,
    Rate4x2 = 9,
    Rate4x4 = 10,
}

impl ShadingRate {
    /// All rates, finest first.
    pub const ALL: [ShadingRate; 7] = [
        Self::Rate1x1,
        Self::Rate1x2,
        Self::Rate2x1,
        Self::Rate2x2,
        Self::Rate2x4,
        Self::Rate4x2,
        Self::Rate4x4,
    ];

    /// Highest coarseness level (4x4).
    pub const MAX_LEVEL: u32 = 4;

    /// Decodes a rate-surface texel.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    /// Rate with `log2` coarseness `lx` horizontally and `ly` vertically.
    pub fn from_axes(lx: u32, ly: u32) -> Option<Self> {
        if lx > 2 || ly > 2 || lx.abs_diff(ly) > 1 {
            return None;
        }
        Self::from_code((lx << 2) | ly)
    }

    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// `(log2(w), log2(h))`.
    #[inline]
    pub fn axes(self) -> (u32, u32) {
        (self.code() >> 2, self.code() & 3)
    }

    /// Coarseness level: `log2(w) + log2(h)`, 0 for 1x1 up to 4 for 4x4.
    #[inline]
    pub fn level(self) -> u32 {
        let (lx, ly) = self.axes();
        lx + ly
    }

    pub fn texel_size(self) -> UVec2 {
        let (lx, ly) = self.axes();
        uvec2(1 << lx, 1 << ly)
    }

    /// Fraction of full-rate pixel shader invocations.
    pub fn shading_work(self) -> f32 {
        let size = self.texel_size();
        1.0 / (size.x * size.y) as f32
    }

    /// Next finer rate: steps down the coarser axis (x on ties).
    pub fn finer(self) -> Self {
        let (lx, ly) = self.axes();
        let (lx, ly) = match (lx, ly) {
            (0, 0) => (0, 0),
            (lx, ly) if lx >= ly => (lx - 1, ly),
            (lx, ly) => (lx, ly - 1),
        };
        Self::from_axes(lx, ly).unwrap_or(Self::Rate1x1)
    }

    /// Steps finer until `level() <= max_level`.
    pub fn limit_level(self, max_level: u32) -> Self {
        let mut rate = self;
        while rate.level() > max_level {
            rate = rate.finer();
        }
        rate
    }
}

impl Default for ShadingRate {
    fn default() -> Self {
        Self::Rate1x1
    }
}

impl fmt::Display for ShadingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.texel_size();
        write!(f, "{}x{}", size.x, size.y)
    }
}
