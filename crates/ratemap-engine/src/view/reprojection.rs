use glam::{Mat4, Vec2, Vec4};

use crate::coords::ViewportRect;

use super::ViewState;

/// Smallest previous-frame `w` still treated as in front of the camera.
pub const MIN_CLIP_W: f32 = 1e-6;

/// Maps current-frame pixels back to where they were in the previous frame.
///
/// `current_clip_to_previous_clip` is
/// `prev_proj * prev_view * inverse(cur_view) * inverse(cur_proj)`: it takes a
/// current clip-space position (NDC plus depth, `w = 1`) to the previous
/// frame's homogeneous clip space. Viewports are snapped to whole pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Reprojection {
    pub current_clip_to_previous_clip: Mat4,
    pub current_viewport: ViewportRect,
    pub previous_viewport: ViewportRect,
}

impl Reprojection {
    /// Returns `None` when either view cannot be inverted or has an empty viewport.
    pub fn between(current: &ViewState, previous: &ViewState) -> Option<Self> {
        let current_viewport = current.viewport.floor();
        let previous_viewport = previous.viewport.floor();
        if !current_viewport.is_valid() || !previous_viewport.is_valid() {
            return None;
        }

        let clip_to_world = current.world_to_clip().inverse();
        let m = previous.world_to_clip() * clip_to_world;
        if !m.is_finite() {
            return None;
        }

        Some(Self {
            current_clip_to_previous_clip: m,
            current_viewport,
            previous_viewport,
        })
    }

    /// Previous-frame pixel position of the surface seen at `pixel` with
    /// depth `depth`. `None` when the point was behind the previous camera.
    pub fn previous_pixel(&self, pixel: Vec2, depth: f32) -> Option<Vec2> {
        let ndc = self.current_viewport.pixel_to_ndc(pixel);
        let prev = self.current_clip_to_previous_clip * Vec4::new(ndc.x, ndc.y, depth, 1.0);
        if prev.w <= MIN_CLIP_W {
            return None;
        }
        let prev_ndc = Vec2::new(prev.x, prev.y) / prev.w;
        Some(self.previous_viewport.ndc_to_pixel(prev_ndc))
    }

    /// Screen-space distance in pixels travelled by the surface at `pixel`.
    /// Infinite when the surface was behind the previous camera.
    pub fn displacement(&self, pixel: Vec2, depth: f32) -> f32 {
        self.previous_pixel(pixel, depth)
            .map_or(f32::INFINITY, |prev| prev.distance(pixel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{UVec2, Vec3};

    const RES: UVec2 = UVec2::new(640, 360);

    fn camera(eye: Vec3, target: Vec3) -> ViewState {
        ViewState::look_at(eye, target, 60f32.to_radians(), RES, 0.1, 200.0)
    }

    #[test]
    fn identical_views_do_not_move() {
        let v = camera(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO);
        let r = Reprojection::between(&v, &v).unwrap();
        for (px, depth) in [(Vec2::new(0.5, 0.5), 0.9), (Vec2::new(320.5, 200.5), 0.99)] {
            assert!(r.displacement(px, depth) < 1e-2);
        }
    }

    #[test]
    fn matches_direct_projection_under_camera_motion() {
        let prev = camera(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO);
        let cur = camera(Vec3::new(0.6, 2.1, 7.5), Vec3::new(0.3, 0.0, 0.0));
        let r = Reprojection::between(&cur, &prev).unwrap();

        for world in [Vec3::ZERO, Vec3::new(1.0, 0.5, -2.0), Vec3::new(-2.0, 0.0, 1.0)] {
            let (cur_px, depth) = cur.project(world).unwrap();
            let (prev_px, _) = prev.project(world).unwrap();
            let got = r.previous_pixel(cur_px, depth).unwrap();
            assert!(got.distance(prev_px) < 0.05, "{world}: {got} vs {prev_px}");
        }
    }

    #[test]
    fn surfaces_behind_the_previous_camera_are_unbounded() {
        let prev = camera(Vec3::new(0.0, 1.0, -5.0), Vec3::new(0.0, 1.0, -10.0));
        let cur = camera(Vec3::new(0.0, 1.0, 5.0), Vec3::new(0.0, 1.0, -10.0));
        let r = Reprojection::between(&cur, &prev).unwrap();

        // A point between the two cameras is behind the previous one.
        let (px, depth) = cur.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(r.displacement(px, depth), f32::INFINITY);
    }

    #[test]
    fn degenerate_views_are_rejected() {
        let good = camera(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO);
        let singular = ViewState { world_to_view: Mat4::ZERO, ..good };
        assert!(Reprojection::between(&singular, &good).is_none());

        let empty = ViewState {
            viewport: ViewportRect::new(Vec2::ZERO, Vec2::ZERO),
            ..good
        };
        assert!(Reprojection::between(&good, &empty).is_none());
    }
}
