//! Full-screen presentation and compositor scheduling, switched in lockstep.

use ::std::{
    fmt::{self, Display},
    rc::Rc,
};
use ::tracing::{debug, warn};

use crate::platform::Compositor;

/// How the window is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    Windowed,
    FullScreen,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Windowed => Self::FullScreen,
            Self::FullScreen => Self::Windowed,
        }
    }

    /// Compositor scheduling only helps composited, windowed presentation.
    fn wants_scheduling_hint(self) -> bool {
        self == Self::Windowed
    }
}

impl Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Windowed => "windowed",
            Self::FullScreen => "full-screen",
        })
    }
}

/// Switches a window between windowed and full-screen presentation, turning
/// the compositor's low-latency scheduling hint on for windowed mode and off
/// for full-screen mode.
///
/// A failure to change the scheduling hint is logged and does not prevent the
/// switch: the window stays usable, merely with suboptimal frame scheduling.
/// A failure to change the presentation itself leaves the mode unchanged.
pub struct FullScreenCoordinator {
    compositor: Rc<dyn Compositor>,
    mode: DisplayMode,
}

impl FullScreenCoordinator {
    /// Constructs a coordinator that assumes the window is currently
    /// presented in `mode`. No OS calls are made until [`activate`].
    ///
    /// [`activate`]: Self::activate
    pub fn new(compositor: Rc<dyn Compositor>, mode: DisplayMode) -> Self {
        Self { compositor, mode }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Applies the current mode's presentation and scheduling hint to the
    /// window. Called once the window exists.
    pub fn activate(&mut self) {
        debug!(mode = %self.mode, "Activating display mode");
        if self.mode == DisplayMode::FullScreen {
            if let Err(e) = self.compositor.set_full_screen(true) {
                warn!(error = %e, "Failed to enter full-screen; staying windowed");
                self.mode = DisplayMode::Windowed;
            }
        }
        self.apply_scheduling_hint();
    }

    /// Flips between windowed and full-screen presentation and returns the
    /// resulting mode.
    pub fn toggle(&mut self) -> DisplayMode {
        let next = self.mode.toggled();
        debug!(from = %self.mode, to = %next, "Toggling display mode");

        if let Err(e) = self
            .compositor
            .set_full_screen(next == DisplayMode::FullScreen)
        {
            warn!(error = %e, mode = %self.mode, "Failed to switch display mode");
            return self.mode;
        }

        self.mode = next;
        self.apply_scheduling_hint();
        self.mode
    }

    fn apply_scheduling_hint(&self) {
        let enabled = self.mode.wants_scheduling_hint();
        if let Err(e) = self.compositor.set_scheduling_hint(enabled) {
            warn!(error = %e, enabled, "Failed to change compositor scheduling hint");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{CompositorCall, MockPlatform};

    use ::pretty_assertions::assert_eq;

    #[test]
    fn test_activate_windowed_enables_hint_only() {
        let platform = Rc::new(MockPlatform::default());
        let mut coordinator = FullScreenCoordinator::new(platform.clone(), DisplayMode::Windowed);

        coordinator.activate();

        assert_eq!(coordinator.mode(), DisplayMode::Windowed);
        assert_eq!(
            *platform.compositor_calls.borrow(),
            vec![CompositorCall::SchedulingHint(true)]
        );
    }

    #[test]
    fn test_activate_full_screen() {
        let platform = Rc::new(MockPlatform::default());
        let mut coordinator =
            FullScreenCoordinator::new(platform.clone(), DisplayMode::FullScreen);

        coordinator.activate();

        assert_eq!(coordinator.mode(), DisplayMode::FullScreen);
        assert_eq!(
            *platform.compositor_calls.borrow(),
            vec![
                CompositorCall::FullScreen(true),
                CompositorCall::SchedulingHint(false)
            ]
        );
    }

    #[test]
    fn test_toggle_round_trip() {
        let platform = Rc::new(MockPlatform::default());
        let mut coordinator = FullScreenCoordinator::new(platform.clone(), DisplayMode::Windowed);

        assert_eq!(coordinator.toggle(), DisplayMode::FullScreen);
        assert_eq!(coordinator.toggle(), DisplayMode::Windowed);

        assert_eq!(
            *platform.compositor_calls.borrow(),
            vec![
                CompositorCall::FullScreen(true),
                CompositorCall::SchedulingHint(false),
                CompositorCall::FullScreen(false),
                CompositorCall::SchedulingHint(true),
            ]
        );
    }

    /// The compositor declining the hint does not block the transition.
    #[test]
    fn test_hint_failure_still_transitions() {
        let platform = Rc::new(MockPlatform::default());
        platform.fail_scheduling_hint(true);
        let mut coordinator = FullScreenCoordinator::new(platform.clone(), DisplayMode::Windowed);

        assert_eq!(coordinator.toggle(), DisplayMode::FullScreen);
        assert_eq!(coordinator.mode(), DisplayMode::FullScreen);
    }

    #[test]
    fn test_presentation_failure_keeps_mode() {
        let platform = Rc::new(MockPlatform::default());
        platform.fail_full_screen(true);
        let mut coordinator = FullScreenCoordinator::new(platform.clone(), DisplayMode::Windowed);

        assert_eq!(coordinator.toggle(), DisplayMode::Windowed);
        assert!(platform.compositor_calls.borrow().is_empty());
    }
}
