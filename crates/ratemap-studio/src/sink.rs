use ratemap_engine::apply::{RateStateSink, VariableRateShadingState};

/// Records the shading-rate state set around the shade pass.
///
/// wgpu exposes no shading-rate image, so the studio's stand-in for a native
/// command list only tracks what would have been bound.
#[derive(Debug, Default)]
pub struct RecordingSink {
    current: VariableRateShadingState,
    /// Shade passes recorded with the rate image engaged.
    pub engaged_passes: u64,
    pub state_changes: u64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> VariableRateShadingState {
        self.current
    }
}

impl RateStateSink for RecordingSink {
    fn set_variable_rate_shading(&mut self, state: VariableRateShadingState) {
        if state.enabled {
            self.engaged_passes += 1;
        }
        if state != self.current {
            self.state_changes += 1;
            log::trace!(
                "shading rate state: enabled={} base={} combiner={:?}",
                state.enabled,
                state.base_rate,
                state.image_combiner
            );
        }
        self.current = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratemap_engine::apply::RateApplier;
    use ratemap_engine::settings::ControllerSettings;
    use ratemap_engine::view::ViewLayout;

    #[test]
    fn multi_viewport_bracket_leaves_sink_untouched() {
        let mut applier = RateApplier::new();
        let mut sink = RecordingSink::new();
        let layout = ViewLayout::MultiViewport(2);

        applier.bracket(&mut sink, &layout, &ControllerSettings::default(), true, |_| {});
        assert_eq!(sink.engaged_passes, 0);
        assert_eq!(sink.state_changes, 0);
    }

    #[test]
    fn planar_bracket_is_counted_and_released() {
        let mut applier = RateApplier::new();
        let mut sink = RecordingSink::new();
        let view = ratemap_engine::view::ViewState::look_at(
            glam::Vec3::new(0.0, 1.0, 5.0),
            glam::Vec3::ZERO,
            1.0,
            glam::UVec2::new(64, 64),
            0.1,
            100.0,
        );
        let layout = ViewLayout::Planar(view);

        let inside = applier.bracket(&mut sink, &layout, &ControllerSettings::default(), true, |s| {
            s.current().enabled
        });
        assert!(inside);
        assert_eq!(sink.engaged_passes, 1);
        assert!(!sink.current().enabled);
    }

    #[test]
    fn disabled_state_is_not_a_change_from_default() {
        let mut sink = RecordingSink::new();
        sink.set_variable_rate_shading(VariableRateShadingState::disabled());
        assert_eq!(sink.state_changes, 0);

        sink.set_variable_rate_shading(VariableRateShadingState::engaged());
        sink.set_variable_rate_shading(VariableRateShadingState::disabled());
        assert_eq!(sink.engaged_passes, 1);
        assert_eq!(sink.state_changes, 2);
        assert!(!sink.current().enabled);
    }
}
