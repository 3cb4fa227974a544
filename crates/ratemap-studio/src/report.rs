use std::fmt;

use ratemap_engine::grid::{RateGrid, RateHistogram};
use ratemap_engine::rate::ShadingRate;

/// Rate statistics of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u32,
    pub histogram: RateHistogram,
    /// Fraction of full-rate shading work.
    pub work: f32,
    pub max_level_delta: u32,
}

impl FrameReport {
    pub fn new(frame: u32, rates: &RateGrid) -> Self {
        Self {
            frame,
            histogram: rates.histogram(),
            work: rates.shading_work(),
            max_level_delta: rates.max_adjacent_level_delta(),
        }
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {:>4}: work {:>5.1}% |", self.frame, self.work * 100.0)?;
        for rate in ShadingRate::ALL {
            write!(f, " {rate} {:>5}", self.histogram.count(rate))?;
        }
        write!(f, " | max step {}", self.max_level_delta)
    }
}

/// Aggregate over all reported frames.
#[derive(Debug, Default)]
pub struct RunSummary {
    frames: u32,
    work_sum: f64,
    min_work: Option<f32>,
    worst_delta: u32,
    coarse_frames: u32,
}

impl RunSummary {
    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.work_sum += report.work as f64;
        self.min_work = Some(self.min_work.map_or(report.work, |w| w.min(report.work)));
        self.worst_delta = self.worst_delta.max(report.max_level_delta);
        if report.work < 1.0 {
            self.coarse_frames += 1;
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn mean_work(&self) -> f32 {
        if self.frames == 0 {
            return 1.0;
        }
        (self.work_sum / self.frames as f64) as f32
    }

    pub fn min_work(&self) -> f32 {
        self.min_work.unwrap_or(1.0)
    }

    pub fn worst_delta(&self) -> u32 {
        self.worst_delta
    }

    /// Frames with at least one coarse tile.
    pub fn coarse_frames(&self) -> u32 {
        self.coarse_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    #[test]
    fn full_rate_frame_reports_full_work() {
        let rates = RateGrid::uniform(UVec2::new(4, 3), ShadingRate::Rate1x1);
        let report = FrameReport::new(0, &rates);
        assert_eq!(report.work, 1.0);
        assert_eq!(report.histogram.count(ShadingRate::Rate1x1), 12);
        assert_eq!(report.max_level_delta, 0);
        assert!(report.to_string().contains("1x1    12"));
    }

    #[test]
    fn summary_tracks_mean_and_worst() {
        let mut summary = RunSummary::default();
        let full = RateGrid::uniform(UVec2::new(2, 2), ShadingRate::Rate1x1);
        let mut mixed = full.clone();
        mixed.set(0, 0, ShadingRate::Rate2x2);

        summary.record(&FrameReport::new(0, &full));
        summary.record(&FrameReport::new(1, &mixed));

        assert_eq!(summary.frames(), 2);
        assert_eq!(summary.coarse_frames(), 1);
        assert_eq!(summary.worst_delta(), 2);
        assert!(summary.min_work() < 1.0);
        assert!(summary.mean_work() > summary.min_work());
    }

    #[test]
    fn empty_summary_is_full_rate() {
        let summary = RunSummary::default();
        assert_eq!(summary.mean_work(), 1.0);
        assert_eq!(summary.min_work(), 1.0);
    }
}
