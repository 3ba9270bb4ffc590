//! Builder object which constructs [`Window`]s
//!
//! [`Window`]: crate::window::Window

use crate::{config::InputConfig, errors::Result, window::Window};

use ::geoms::d2::Size2D;

/// A builder pattern object which simplifies the process of creating a
/// [`Window`].
///
/// The same builder can be re-used to create multiple windows with the same
/// configuration, as a type of prototype.
///
/// ```no_run
/// use ::rawpump::{config::InputConfig, input::keyboard::KeyCode, window::Builder};
///
/// let window = Builder::new()
///     .with_title("Hello, Redmond!")
///     .with_input(InputConfig::new().with_full_screen_toggle(KeyCode::F10))
///     .build()
///     .expect("Window creation failed");
/// ```
///
/// [`Window`]: crate::window::Window
#[derive(Clone, Debug)]
pub struct Builder {
    title: Option<String>,
    size: Size2D<i32>,
    input: InputConfig,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Construct a new builder. Default values will be used for all properties
    /// until explicitly set.
    pub fn new() -> Self {
        Self {
            title: None,
            size: Size2D {
                width: 1280,
                height: 720,
            },
            input: InputConfig::new(),
        }
    }

    /// Set the window title, as it appears in the title bar and task manager.
    ///
    /// Defaults to the empty string if not set.
    pub fn with_title(self, title: impl AsRef<str>) -> Self {
        Self {
            title: title.as_ref().to_owned().into(),
            ..self
        }
    }

    /// Set the size of the window's client area when windowed.
    ///
    /// Defaults to 1280 x 720 if not set.
    pub fn with_size(self, size: Size2D<i32>) -> Self {
        Self { size, ..self }
    }

    /// Set how the window collects input.
    ///
    /// Defaults to [`InputConfig::new`] if not set.
    pub fn with_input(self, input: InputConfig) -> Self {
        Self { input, ..self }
    }

    /// Gets the currently set window title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Gets the currently set window size
    pub fn size(&self) -> Size2D<i32> {
        self.size
    }

    pub fn input(&self) -> &InputConfig {
        &self.input
    }

    /// Build a new [`Window`] with the properties of the builder.
    ///
    /// [`Window`]: crate::window::Window
    pub fn build(&self) -> Result<Window> {
        Window::new(self.size, self.title().unwrap_or(""), &self.input)
    }
}
