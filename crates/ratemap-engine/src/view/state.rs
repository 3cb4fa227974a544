use glam::{Mat4, UVec2, Vec3, Vec4};

use crate::coords::ViewportRect;

/// One planar camera: transforms plus the viewport it renders into.
///
/// Matrices use column vectors (`clip = view_to_clip * world_to_view * p`)
/// and wgpu clip conventions (depth in [0, 1]).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    pub world_to_view: Mat4,
    pub view_to_clip: Mat4,
    pub viewport: ViewportRect,
}

impl ViewState {
    pub fn new(world_to_view: Mat4, view_to_clip: Mat4, viewport: ViewportRect) -> Self {
        Self {
            world_to_view,
            view_to_clip,
            viewport,
        }
    }

    /// Right-handed perspective camera looking from `eye` at `target`,
    /// covering a full target of `resolution` pixels.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        fov_y_radians: f32,
        resolution: UVec2,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let aspect = resolution.x.max(1) as f32 / resolution.y.max(1) as f32;
        Self::new(
            Mat4::look_at_rh(eye, target, Vec3::Y),
            Mat4::perspective_rh(fov_y_radians, aspect, z_near, z_far),
            ViewportRect::full(resolution),
        )
    }

    #[inline]
    pub fn world_to_clip(&self) -> Mat4 {
        self.view_to_clip * self.world_to_view
    }

    /// Projects a world point to `(pixel position, depth)`, or `None` when it
    /// is behind the camera.
    pub fn project(&self, world: Vec3) -> Option<(glam::Vec2, f32)> {
        let clip = self.world_to_clip() * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some((self.viewport.ndc_to_pixel(ndc.truncate()), ndc.z))
    }
}

/// How a frame was rendered.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewLayout {
    /// A single planar view. The only layout the controller acts on.
    Planar(ViewState),
    /// Several viewports in one pass (stereo, cube faces). Rendered at full rate.
    MultiViewport(u32),
}

impl ViewLayout {
    #[inline]
    pub fn planar(&self) -> Option<&ViewState> {
        match self {
            Self::Planar(view) => Some(view),
            Self::MultiViewport(_) => None,
        }
    }

    #[inline]
    pub fn is_planar(&self) -> bool {
        self.planar().is_some()
    }
}

/// Read-only view snapshot handed to the controller each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameViews {
    pub current: ViewLayout,
    pub previous: ViewLayout,
    /// False on the first frame and after camera cuts.
    pub previous_valid: bool,
}

impl FrameViews {
    /// First frame: the previous view mirrors the current one and is invalid.
    pub fn first(current: ViewLayout) -> Self {
        Self {
            current,
            previous: current,
            previous_valid: false,
        }
    }

    /// Follow-up frame: last frame's current view becomes the previous one.
    pub fn advance(self, next: ViewLayout) -> Self {
        Self {
            current: next,
            previous: self.current,
            previous_valid: true,
        }
    }

    /// Both views when they form a usable planar pair.
    pub fn planar_history(&self) -> Option<(&ViewState, &ViewState)> {
        if !self.previous_valid {
            return None;
        }
        Some((self.current.planar()?, self.previous.planar()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        ViewState::look_at(
            Vec3::new(0.0, 1.0, 5.0),
            Vec3::ZERO,
            60f32.to_radians(),
            UVec2::new(320, 180),
            0.1,
            100.0,
        )
    }

    #[test]
    fn first_frame_has_no_history() {
        let views = FrameViews::first(ViewLayout::Planar(view()));
        assert!(views.planar_history().is_none());

        let next = views.advance(ViewLayout::Planar(view()));
        assert!(next.planar_history().is_some());
    }

    #[test]
    fn multi_viewport_has_no_history() {
        let views = FrameViews::first(ViewLayout::Planar(view())).advance(ViewLayout::MultiViewport(2));
        assert!(views.planar_history().is_none());
        assert!(!views.current.is_planar());
    }

    #[test]
    fn target_projects_to_the_center() {
        let (pixel, depth) = view().project(Vec3::ZERO).unwrap();
        assert!((pixel - glam::Vec2::new(160.0, 90.0)).length() < 1e-3);
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn points_behind_the_camera_do_not_project() {
        assert!(view().project(Vec3::new(0.0, 1.0, 10.0)).is_none());
    }
}
