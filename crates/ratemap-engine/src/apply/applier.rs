use crate::settings::ControllerSettings;
use crate::view::ViewLayout;

use super::{ApplierState, VariableRateShadingState};

/// Receives the variable-rate shading state of the planar view.
///
/// Implemented by the host on whatever object carries per-pass pipeline
/// state (a native command list, a render-graph node, a test recorder).
pub trait RateStateSink {
    fn set_variable_rate_shading(&mut self, state: VariableRateShadingState);
}

impl<S: RateStateSink + ?Sized> RateStateSink for &mut S {
    fn set_variable_rate_shading(&mut self, state: VariableRateShadingState) {
        (**self).set_variable_rate_shading(state);
    }
}

/// Brackets exactly one shading pass with the rate state.
#[derive(Debug, Default)]
pub struct RateApplier {
    state: ApplierState,
}

/// Disables the sink when dropped, even while unwinding.
struct EngagedRates<'a, S: RateStateSink + ?Sized> {
    state: &'a mut ApplierState,
    sink: &'a mut S,
}

impl<'a, S: RateStateSink + ?Sized> EngagedRates<'a, S> {
    fn engage(state: &'a mut ApplierState, sink: &'a mut S) -> Self {
        sink.set_variable_rate_shading(VariableRateShadingState::engaged());
        *state = ApplierState::Engaged;
        Self { state, sink }
    }
}

impl<S: RateStateSink + ?Sized> Drop for EngagedRates<'_, S> {
    fn drop(&mut self) {
        self.sink.set_variable_rate_shading(VariableRateShadingState::disabled());
        *self.state = ApplierState::Disabled;
    }
}

impl RateApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ApplierState {
        self.state
    }

    /// Whether `bracket` would engage the rate image.
    pub fn would_engage(layout: &ViewLayout, settings: &ControllerSettings, rates_ready: bool) -> bool {
        settings.enabled && rates_ready && layout.is_planar()
    }

    /// Runs `pass` once with rates engaged when possible.
    ///
    /// - planar view, controller enabled, rates produced this frame: the sink
    ///   is engaged before `pass` and disabled right after it
    /// - planar view otherwise: the sink is set to disabled, `pass` runs at
    ///   full rate
    /// - multi-viewport: the sink is left alone, `pass` runs at full rate
    pub fn bracket<S, R>(
        &mut self,
        sink: &mut S,
        layout: &ViewLayout,
        settings: &ControllerSettings,
        rates_ready: bool,
        pass: impl FnOnce(&mut S) -> R,
    ) -> R
    where
        S: RateStateSink + ?Sized,
    {
        if Self::would_engage(layout, settings, rates_ready) {
            log::trace!("shading pass with rate image");
            let engaged = EngagedRates::engage(&mut self.state, sink);
            return pass(&mut *engaged.sink);
        }

        if layout.is_planar() {
            sink.set_variable_rate_shading(VariableRateShadingState::disabled());
        }
        log::trace!("shading pass at full rate");
        pass(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ViewportRect;
    use crate::view::ViewState;
    use glam::{Mat4, UVec2};

    #[derive(Default)]
    struct Recorder {
        states: Vec<VariableRateShadingState>,
        passes: usize,
    }

    impl RateStateSink for Recorder {
        fn set_variable_rate_shading(&mut self, state: VariableRateShadingState) {
            self.states.push(state);
        }
    }

    fn planar() -> ViewLayout {
        ViewLayout::Planar(ViewState::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            ViewportRect::full(UVec2::new(64, 64)),
        ))
    }

    #[test]
    fn engages_around_exactly_one_pass() {
        let mut applier = RateApplier::new();
        let mut sink = Recorder::default();

        applier.bracket(&mut sink, &planar(), &ControllerSettings::default(), true, |s| {
            assert_eq!(s.states.last(), Some(&VariableRateShadingState::engaged()));
            s.passes += 1;
        });

        assert_eq!(sink.passes, 1);
        assert_eq!(
            sink.states,
            vec![VariableRateShadingState::engaged(), VariableRateShadingState::disabled()]
        );
        assert_eq!(applier.state(), ApplierState::Disabled);
    }

    #[test]
    fn disabled_controller_forces_full_rate() {
        let mut applier = RateApplier::new();
        let mut sink = Recorder::default();
        let settings = ControllerSettings {
            enabled: false,
            ..Default::default()
        };

        applier.bracket(&mut sink, &planar(), &settings, true, |s| s.passes += 1);

        assert_eq!(sink.passes, 1);
        assert_eq!(sink.states, vec![VariableRateShadingState::disabled()]);
    }

    #[test]
    fn missing_rates_force_full_rate() {
        let mut applier = RateApplier::new();
        let mut sink = Recorder::default();
        applier.bracket(&mut sink, &planar(), &ControllerSettings::default(), false, |s| s.passes += 1);
        assert!(sink.states.iter().all(|s| !s.enabled));
    }

    #[test]
    fn multi_viewport_never_touches_the_sink() {
        let mut applier = RateApplier::new();
        let mut sink = Recorder::default();

        applier.bracket(
            &mut sink,
            &ViewLayout::MultiViewport(2),
            &ControllerSettings::default(),
            true,
            |s| s.passes += 1,
        );

        assert_eq!(sink.passes, 1);
        assert!(sink.states.is_empty());
        assert_eq!(applier.state(), ApplierState::Disabled);
    }

    #[test]
    fn failing_pass_still_disables() {
        let mut applier = RateApplier::new();
        let mut sink = Recorder::default();

        let result: Result<(), &str> =
            applier.bracket(&mut sink, &planar(), &ControllerSettings::default(), true, |_| {
                Err("draw failed")
            });

        assert!(result.is_err());
        assert_eq!(sink.states.last(), Some(&VariableRateShadingState::disabled()));
        assert_eq!(applier.state(), ApplierState::Disabled);
    }

    #[test]
    fn panicking_pass_still_disables() {
        let mut sink = Recorder::default();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut applier = RateApplier::new();
            applier.bracket(&mut sink, &planar(), &ControllerSettings::default(), true, |_| -> () {
                panic!("pass panicked")
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(
            sink.states,
            vec![VariableRateShadingState::engaged(), VariableRateShadingState::disabled()]
        );
    }

    #[test]
    fn consecutive_frames_do_not_leak_state() {
        let mut applier = RateApplier::new();
        let mut sink = Recorder::default();
        for _ in 0..3 {
            applier.bracket(&mut sink, &planar(), &ControllerSettings::default(), true, |_| ());
            assert_eq!(applier.state(), ApplierState::Disabled);
        }
        let enables = sink.states.iter().filter(|s| s.enabled).count();
        assert_eq!(enables, 3);
        assert_eq!(sink.states.len(), 6);
    }
}
