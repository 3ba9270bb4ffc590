//! Builder-style configuration of the input pipeline.

use crate::{
    display::DisplayMode,
    input::{keyboard::KeyCode, DEFAULT_QUEUE_CAPACITY},
};

/// Configuration of the input pipeline for one window.
///
/// ```
/// use ::rawpump::config::InputConfig;
/// use ::rawpump::input::keyboard::KeyCode;
///
/// let config = InputConfig::new()
///     .with_full_screen_toggle(KeyCode::F10)
///     .with_system_hotkeys(true);
///
/// assert_eq!(config.full_screen_toggle(), KeyCode::F10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputConfig {
    full_screen_toggle: KeyCode,
    system_hotkeys: bool,
    track_absolute_mouse: bool,
    queue_capacity: usize,
    initial_display_mode: DisplayMode,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl InputConfig {
    /// Construct a new configuration. Default values will be used for all
    /// properties until explicitly set.
    pub fn new() -> Self {
        Self {
            full_screen_toggle: KeyCode::F11,
            system_hotkeys: false,
            track_absolute_mouse: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            initial_display_mode: DisplayMode::Windowed,
        }
    }

    /// Set the key which toggles between full-screen and windowed display
    /// when pressed.
    ///
    /// Defaults to [`KeyCode::F11`] if not set.
    pub fn with_full_screen_toggle(self, key: KeyCode) -> Self {
        Self {
            full_screen_toggle: key,
            ..self
        }
    }

    /// Allow the system to intercept its hotkeys (alt-tab, the Windows key,
    /// etc.) before they reach the app.
    ///
    /// Defaults to `false`: the app receives every key combination.
    pub fn with_system_hotkeys(self, system_hotkeys: bool) -> Self {
        Self {
            system_hotkeys,
            ..self
        }
    }

    /// Convert absolute mouse coordinates into deltas.
    ///
    /// Defaults to `true`.
    pub fn with_absolute_mouse_tracking(self, track_absolute_mouse: bool) -> Self {
        Self {
            track_absolute_mouse,
            ..self
        }
    }

    /// Number of events each input queue pre-allocates room for. Queues are
    /// unbounded regardless.
    ///
    /// Defaults to [`DEFAULT_QUEUE_CAPACITY`].
    pub fn with_queue_capacity(self, queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            ..self
        }
    }

    /// The display mode the window starts in.
    ///
    /// Defaults to [`DisplayMode::Windowed`].
    pub fn with_initial_display_mode(self, initial_display_mode: DisplayMode) -> Self {
        Self {
            initial_display_mode,
            ..self
        }
    }

    pub fn full_screen_toggle(&self) -> KeyCode {
        self.full_screen_toggle
    }

    pub fn system_hotkeys(&self) -> bool {
        self.system_hotkeys
    }

    pub fn track_absolute_mouse(&self) -> bool {
        self.track_absolute_mouse
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn initial_display_mode(&self) -> DisplayMode {
        self.initial_display_mode
    }
}
