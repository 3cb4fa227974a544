//! Bounded-gradient smoothing of a rate grid.
//!
//! Each tile's level is limited to
//! `min over j (level(j) + max_delta * chebyshev(i, j))`, taken over the
//! unsmoothed input. Terms further than `ceil(MAX_LEVEL / max_delta)` tiles
//! away can never win, so the window is finite and one pass is exact:
//!
//! - 8-adjacent tiles of the output differ by at most `max_delta` levels
//! - tiles only ever get finer
//! - a grid that already satisfies the bound is returned unchanged

use crate::grid::RateGrid;

use super::ShadingRate;

/// Window radius in tiles for a given level delta.
pub fn smoothing_radius(max_delta: u32) -> u32 {
    let delta = max_delta.max(1);
    ShadingRate::MAX_LEVEL.div_ceil(delta)
}

/// Level limit of tile `(x, y)`.
pub fn level_limit(input: &RateGrid, x: u32, y: u32, max_delta: u32) -> u32 {
    let delta = max_delta.max(1);
    let radius = smoothing_radius(delta) as i64;
    let dims = input.dimensions();

    let mut limit = input.get(x, y).level();
    for dy in -radius..=radius {
        let ny = y as i64 + dy;
        if ny < 0 || ny >= dims.y as i64 {
            continue;
        }
        for dx in -radius..=radius {
            let nx = x as i64 + dx;
            if nx < 0 || nx >= dims.x as i64 {
                continue;
            }
            let distance = dx.unsigned_abs().max(dy.unsigned_abs()) as u32;
            let bound = input.get(nx as u32, ny as u32).level() + delta * distance;
            limit = limit.min(bound);
        }
    }
    limit
}

/// Smoothed copy of `input`.
pub fn smooth_rates(input: &RateGrid, max_delta: u32) -> RateGrid {
    RateGrid::from_fn(input.dimensions(), |x, y| {
        input.get(x, y).limit_level(level_limit(input, x, y, max_delta))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    /// Deterministic pseudo-random grid (xorshift).
    fn noisy_grid(dims: UVec2, seed: u32) -> RateGrid {
        let mut state = seed.max(1);
        RateGrid::from_fn(dims, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            ShadingRate::ALL[(state % 7) as usize]
        })
    }

    #[test]
    fn radius_covers_the_level_range() {
        assert_eq!(smoothing_radius(1), 4);
        assert_eq!(smoothing_radius(2), 2);
        assert_eq!(smoothing_radius(3), 2);
        assert_eq!(smoothing_radius(4), 1);
        assert_eq!(smoothing_radius(0), 4);
    }

    #[test]
    fn single_fine_tile_spreads_a_ramp() {
        let mut grid = RateGrid::uniform(UVec2::new(9, 1), ShadingRate::Rate4x4);
        grid.set(0, 0, ShadingRate::Rate1x1);
        let out = smooth_rates(&grid, 1);
        let levels: Vec<u32> = out.rates().iter().map(|r| r.level()).collect();
        assert_eq!(levels, vec![0, 1, 2, 3, 4, 4, 4, 4, 4]);
    }

    #[test]
    fn output_is_bounded_after_one_pass() {
        for seed in 1..20 {
            for delta in 1..=3 {
                let grid = noisy_grid(UVec2::new(23, 17), seed);
                let out = smooth_rates(&grid, delta);
                assert!(out.max_adjacent_level_delta() <= delta, "seed {seed} delta {delta}");
            }
        }
    }

    #[test]
    fn smoothing_is_idempotent() {
        for seed in 1..20 {
            let once = smooth_rates(&noisy_grid(UVec2::new(19, 11), seed), 1);
            let twice = smooth_rates(&once, 1);
            assert_eq!(once, twice, "seed {seed}");
        }
    }

    #[test]
    fn tiles_never_get_coarser() {
        let grid = noisy_grid(UVec2::new(16, 16), 7);
        let out = smooth_rates(&grid, 1);
        for (a, b) in grid.rates().iter().zip(out.rates()) {
            assert!(b.level() <= a.level());
        }
    }

    #[test]
    fn already_smooth_grid_is_unchanged() {
        let grid = RateGrid::from_fn(UVec2::new(6, 6), |x, _| match x {
            0 | 1 => ShadingRate::Rate1x1,
            2 => ShadingRate::Rate2x1,
            3 => ShadingRate::Rate2x2,
            _ => ShadingRate::Rate4x2,
        });
        assert_eq!(smooth_rates(&grid, 1), grid);
    }
}
