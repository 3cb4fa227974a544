use glam::UVec2;

use crate::rate::ShadingRate;

use super::Image2d;

/// CPU copy of a rate surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RateGrid {
    rates: Image2d<ShadingRate>,
}

/// Tile counts per rate, indexed like [`ShadingRate::ALL`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RateHistogram {
    pub counts: [usize; 7],
}

impl RateHistogram {
    pub fn count(&self, rate: ShadingRate) -> usize {
        ShadingRate::ALL
            .iter()
            .position(|r| *r == rate)
            .map_or(0, |i| self.counts[i])
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl RateGrid {
    pub fn uniform(dimensions: UVec2, rate: ShadingRate) -> Self {
        Self {
            rates: Image2d::filled(dimensions, rate),
        }
    }

    pub fn from_fn(dimensions: UVec2, f: impl FnMut(u32, u32) -> ShadingRate) -> Self {
        Self {
            rates: Image2d::from_fn(dimensions, f),
        }
    }

    /// Decodes raw surface texels. Unknown codes are read as 1x1.
    pub fn from_codes(dimensions: UVec2, codes: &[u32]) -> Option<Self> {
        let rates = codes
            .iter()
            .map(|c| ShadingRate::from_code(*c).unwrap_or_default())
            .collect();
        Image2d::from_vec(dimensions, rates).map(|rates| Self { rates })
    }

    #[inline]
    pub fn dimensions(&self) -> UVec2 {
        self.rates.size()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> ShadingRate {
        self.rates.get(x, y)
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, rate: ShadingRate) {
        self.rates.set(x, y, rate);
    }

    pub fn rates(&self) -> &[ShadingRate] {
        self.rates.as_slice()
    }

    pub fn codes(&self) -> Vec<u32> {
        self.rates().iter().map(|r| r.code()).collect()
    }

    pub fn histogram(&self) -> RateHistogram {
        let mut hist = RateHistogram::default();
        for rate in self.rates() {
            if let Some(i) = ShadingRate::ALL.iter().position(|r| r == rate) {
                hist.counts[i] += 1;
            }
        }
        hist
    }

    /// Mean fraction of full-rate shading work across tiles.
    pub fn shading_work(&self) -> f32 {
        let rates = self.rates();
        if rates.is_empty() {
            return 1.0;
        }
        rates.iter().map(|r| r.shading_work()).sum::<f32>() / rates.len() as f32
    }

    /// Largest level difference between any two 8-adjacent tiles.
    pub fn max_adjacent_level_delta(&self) -> u32 {
        let dims = self.dimensions();
        let mut worst = 0;
        for y in 0..dims.y {
            for x in 0..dims.x {
                let level = self.get(x, y).level();
                // Forward half of the 8-neighbourhood visits every pair once.
                for (dx, dy) in [(1i64, 0i64), (-1, 1), (0, 1), (1, 1)] {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= dims.x as i64 || ny >= dims.y as i64 {
                        continue;
                    }
                    let other = self.get(nx as u32, ny as u32).level();
                    worst = worst.max(level.abs_diff(other));
                }
            }
        }
        worst
    }

    pub fn is_uniform(&self, rate: ShadingRate) -> bool {
        self.rates().iter().all(|r| *r == rate)
    }
}
