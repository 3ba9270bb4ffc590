//! Top-level rust Window object which abstracts the underlying Win32 API.

use crate::{
    config::InputConfig,
    display::DisplayMode,
    errors::*,
    simulation::{InputSink, StepReport},
    window::WindowInner,
};

use ::geoms::d2::Size2D;
use ::std::{rc::Rc, time::Duration};
use ::tracing::{debug, error};
use ::widestring::U16CString;
use ::windows::{
    core::PCWSTR,
    Win32::{Foundation::HWND, UI::WindowsAndMessaging::SetWindowTextW},
};

/// A Win32 window which collects raw keyboard and mouse input.
///
/// Input is queued as it arrives through the message pump and handed to an
/// [`InputSink`] once per [`step`]. The window's keyboard and mouse
/// registrations live exactly as long as the window does.
///
/// A [Window] is `!Sync + !Send` as Win32 windows must be controlled by the
/// same thread on which they were created.
///
/// # Example
///
/// ```no_run
/// use ::rawpump::{simulation::NullSink, window::Builder};
/// use ::std::time::Duration;
/// use ::windows::Win32::UI::WindowsAndMessaging::{
///     DispatchMessageW, PeekMessageW, PostQuitMessage, TranslateMessage, MSG, PM_REMOVE,
///     WM_QUIT,
/// };
///
/// let window = Builder::new()
///     .with_title("Hello, Redmond!")
///     .build()
///     .expect("Failed to create main window");
///
/// let mut msg = MSG::default();
/// loop {
///     while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
///         if msg.message == WM_QUIT {
///             return;
///         }
///         unsafe {
///             TranslateMessage(&msg);
///             DispatchMessageW(&msg);
///         }
///     }
///
///     window.step(Duration::from_millis(16), &mut NullSink);
///
///     if window.is_requesting_close() {
///         window.clear_close_request();
///         unsafe {
///             PostQuitMessage(0);
///         }
///     }
/// }
/// ```
///
/// [`step`]: Self::step
pub struct Window {
    /// The inner refcounted window object. A clone of this object is held on
    /// the win32 API side and should be released when the window is destroyed.
    inner: Rc<WindowInner>,
}

impl Window {
    /// Construct and display a new window.
    ///
    /// Fails if raw keyboard and mouse input cannot be registered for the
    /// window. The user has already been notified in that case.
    pub fn new(size: Size2D<i32>, title: &str, config: &InputConfig) -> Result<Self> {
        debug!(wnd_title = %title, "Creating window");
        WindowInner::new(size, title, config).map(|inner| Self { inner })
    }

    /// The size of the client area of our Win32 window. The window chrome
    /// is in addition to this size.
    pub fn size(&self) -> Size2D<i32> {
        self.inner.size()
    }

    /// Get a handle to the Win32 window's handle. This is often required when
    /// interacting with other APIs.
    pub fn hwnd(&self) -> HWND {
        self.inner.hwnd()
    }

    /// The current presentation of the window. Switched by the configured
    /// full-screen toggle key.
    pub fn display_mode(&self) -> DisplayMode {
        self.inner.display_mode()
    }

    /// Runs one simulation tick: delivers all input queued since the previous
    /// tick to `sink`, oldest first, mouse before keyboard.
    pub fn step(&self, time_delta: Duration, sink: &mut dyn InputSink) -> StepReport {
        self.inner.step(time_delta, sink)
    }

    /// A description of the most recent input delivered by [`step`].
    ///
    /// [`step`]: Self::step
    pub fn last_input(&self) -> String {
        self.inner.last_input()
    }

    /// Returns whether the window is requesting to close.
    ///
    /// The window is not actually closed until it is dropped, so the [`Window`]
    /// should usually be dropped if this flag is set.  The close request can be
    /// ignored if needed, and the request to close can be cleared.
    pub fn is_requesting_close(&self) -> bool {
        self.inner.is_requesting_close()
    }

    /// Clears a pending close request.
    pub fn clear_close_request(&self) {
        self.inner.clear_close_request();
    }

    /// Returns whether the window has requested to be painted.
    ///
    /// The [`Window`] object provides no drawing functionality. This must be
    /// handled by a higher level as appropriate via GDI, Direct2D, or Direct3D
    /// call. The paint request can be ignored if needed.
    pub fn is_requesting_paint(&self) -> bool {
        self.inner.is_requesting_paint()
    }

    /// Clears a pending paint request.
    pub fn clear_paint_request(&self) {
        self.inner.clear_paint_request();
    }

    /// Set the window title.
    pub fn set_title(&self, title: &str) -> Result<()> {
        let string = U16CString::from_str_truncate(title);
        unsafe { SetWindowTextW(self.hwnd(), PCWSTR::from_raw(string.as_ptr())) }
            .ok()
            .context("Failed to set window title")
            .function("SetWindowTextW")
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        debug!(wnd_title = %&self.inner.title(), "Dropping window");
        if let Err(e) = self.inner.destroy() {
            error!("Failed to destroy window: {}", e);
        }
    }
}
