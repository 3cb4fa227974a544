use glam::{UVec2, Vec3};
use ratemap_engine::view::{FrameViews, ViewLayout, ViewState};

use crate::args::Scenario;

const FOV_Y_DEG: f32 = 60.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 400.0;
const PAN_STEP_DEG: f32 = 4.0;

/// Camera for one frame of a scenario.
#[derive(Debug, Copy, Clone)]
pub struct CameraKey {
    pub eye: Vec3,
    pub target: Vec3,
    /// History is invalid on this frame.
    pub cut: bool,
}

impl CameraKey {
    pub fn view(&self, resolution: UVec2) -> ViewState {
        ViewState::look_at(
            self.eye,
            self.target,
            FOV_Y_DEG.to_radians(),
            resolution,
            Z_NEAR,
            Z_FAR,
        )
    }
}

/// Scripted camera path.
pub struct CameraPath {
    scenario: Scenario,
    frames: u32,
}

impl CameraPath {
    pub fn new(scenario: Scenario, frames: u32) -> Self {
        Self {
            scenario,
            frames: frames.max(1),
        }
    }

    pub fn key(&self, frame: u32) -> CameraKey {
        let home_eye = Vec3::new(0.0, 1.6, 7.0);
        let home_target = Vec3::new(0.0, 0.8, 0.0);
        let third = (self.frames / 3).max(1);

        match self.scenario {
            Scenario::Static | Scenario::Stereo => CameraKey {
                eye: home_eye,
                target: home_target,
                cut: false,
            },
            Scenario::Pan => {
                let forward = home_target - home_eye;
                let (eye, yaw) = if frame < third {
                    (home_eye, 0.0)
                } else if frame < 2 * third {
                    (home_eye, (frame - third) as f32 * PAN_STEP_DEG.to_radians())
                } else {
                    let drift = (frame - 2 * third) as f32 * 0.002;
                    let yaw = third as f32 * PAN_STEP_DEG.to_radians();
                    (home_eye + Vec3::new(drift, 0.0, 0.0), yaw)
                };
                CameraKey {
                    eye,
                    target: eye + yaw_dir(yaw, forward),
                    cut: false,
                }
            }
            Scenario::Orbit => {
                let angle = frame as f32 * 0.25f32.to_radians();
                let radius = home_eye.z;
                let eye = Vec3::new(radius * angle.sin(), home_eye.y, radius * angle.cos());
                CameraKey {
                    eye,
                    target: home_target,
                    cut: false,
                }
            }
            Scenario::Cut => {
                let shot_length = (third / 2).max(1);
                let angle = (frame / shot_length) as f32 * 70f32.to_radians();
                let eye = Vec3::new(
                    home_eye.z * angle.sin(),
                    home_eye.y,
                    home_eye.z * angle.cos(),
                );
                CameraKey {
                    eye,
                    target: home_target,
                    cut: frame > 0 && frame % shot_length == 0,
                }
            }
        }
    }

    pub fn layout(&self, key: &CameraKey, resolution: UVec2) -> ViewLayout {
        match self.scenario {
            Scenario::Stereo => ViewLayout::MultiViewport(2),
            _ => ViewLayout::Planar(key.view(resolution)),
        }
    }

    /// View snapshot for `frame`, chained from the previous frame's snapshot.
    pub fn frame_views(&self, frame: u32, previous: Option<FrameViews>, resolution: UVec2) -> FrameViews {
        let key = self.key(frame);
        let layout = self.layout(&key, resolution);
        match previous {
            Some(prev) if !key.cut => prev.advance(layout),
            _ => FrameViews::first(layout),
        }
    }
}

fn yaw_dir(yaw: f32, forward: Vec3) -> Vec3 {
    let (s, c) = yaw.sin_cos();
    Vec3::new(forward.x * c + forward.z * s, forward.y, -forward.x * s + forward.z * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RES: UVec2 = UVec2::new(320, 180);

    #[test]
    fn static_path_never_moves() {
        let path = CameraPath::new(Scenario::Static, 30);
        let a = path.key(0);
        let b = path.key(29);
        assert_eq!(a.eye, b.eye);
        assert_eq!(a.target, b.target);
    }

    #[test]
    fn first_frame_has_no_history() {
        let path = CameraPath::new(Scenario::Orbit, 10);
        let views = path.frame_views(0, None, RES);
        assert!(!views.previous_valid);
        let next = path.frame_views(1, Some(views), RES);
        assert!(next.previous_valid);
    }

    #[test]
    fn cuts_reset_history() {
        let path = CameraPath::new(Scenario::Cut, 60);
        let mut views = None;
        let mut resets = 0;
        for frame in 0..60 {
            let v = path.frame_views(frame, views, RES);
            if !v.previous_valid {
                resets += 1;
            }
            views = Some(v);
        }
        // First frame plus one per shot boundary.
        assert!(resets > 2);
    }

    #[test]
    fn stereo_is_multi_viewport() {
        let path = CameraPath::new(Scenario::Stereo, 10);
        let views = path.frame_views(3, None, RES);
        assert!(!views.current.is_planar());
    }
}
