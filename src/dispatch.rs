//! Entry point for raw input notifications arriving at a window.

use ::std::rc::Rc;
use ::tracing::{debug, error, trace, warn};

use crate::{
    config::InputConfig,
    display::{DisplayMode, FullScreenCoordinator},
    errors::Result,
    input::{
        keyboard::{Keyboard, KeyboardInput},
        mouse::{Mouse, MouseInput},
        raw::{RawInputRecord, MAX_RECORD_SIZE},
        InputQueue,
    },
    platform::{
        Compositor, FatalErrorReporter, RawInputApi, RawInputHandle, RegistrationFlags,
        WindowHandle,
    },
    time::Clock,
};

const REGISTRATION_FAILURE_TITLE: &str = "Input Device Error";
const REGISTRATION_FAILURE_MESSAGE: &str =
    "Unable to receive keyboard and mouse input. The game cannot be played without them.";

/// The pair of queues a window fills with normalized input.
#[derive(Debug, Default)]
pub struct InputQueues {
    pub mouse: InputQueue<MouseInput>,
    pub keyboard: InputQueue<KeyboardInput>,
}

impl InputQueues {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            mouse: InputQueue::with_capacity(capacity),
            keyboard: InputQueue::with_capacity(capacity),
        }
    }
}

/// Where a raw input notification ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Decoded and queued as mouse input.
    Mouse,
    /// Decoded and queued as keyboard input.
    Keyboard,
    /// Not ours; handed back to the OS default raw input handler.
    Forwarded,
    /// The record could not be read from the OS.
    Unreadable,
}

enum Devices {
    Unregistered,
    Registered { mouse: Mouse, keyboard: Keyboard },
    /// Registration was attempted and failed. There is no retry.
    Failed,
}

/// Receives raw input notifications for one window, decodes them, and queues
/// the result.
///
/// The dispatcher starts out unregistered. [`attach`] registers the mouse and
/// keyboard for the window once it exists. Only the first call registers
/// anything, whether or not it succeeds, and a successful registration is
/// never undone for the life of the window. The registrations are removed
/// when the dispatcher is dropped.
///
/// Presses of the configured full-screen toggle key switch the display mode
/// immediately, before the key event is queued, without waiting for the next
/// simulation step. Every down event toggles, including the auto-repeat
/// presses the keyboard sends while the key is held.
///
/// [`attach`]: Self::attach
pub struct WindowInputDispatcher {
    config: InputConfig,
    api: Rc<dyn RawInputApi>,
    clock: Rc<dyn Clock>,
    reporter: Rc<dyn FatalErrorReporter>,
    display: FullScreenCoordinator,
    devices: Devices,
}

impl WindowInputDispatcher {
    pub fn new(
        config: InputConfig,
        api: Rc<dyn RawInputApi>,
        clock: Rc<dyn Clock>,
        reporter: Rc<dyn FatalErrorReporter>,
        compositor: Rc<dyn Compositor>,
    ) -> Self {
        let display = FullScreenCoordinator::new(compositor, config.initial_display_mode());
        Self {
            config,
            api,
            clock,
            reporter,
            display,
            devices: Devices::Unregistered,
        }
    }

    /// Registers mouse and keyboard input for `window` and applies the initial
    /// display mode.
    ///
    /// Registration failure is reported through the [`FatalErrorReporter`]
    /// and returned; the dispatcher then stays unregistered and forwards all
    /// raw input to the OS. Calls after the first are ignored.
    pub fn attach(&mut self, window: WindowHandle) -> Result<()> {
        if !matches!(self.devices, Devices::Unregistered) {
            warn!(
                window = window.get(),
                registered = self.is_registered(),
                "Raw input registration already attempted; ignoring"
            );
            return Ok(());
        }

        let keyboard_flags = if self.config.system_hotkeys() {
            RegistrationFlags::empty()
        } else {
            Keyboard::DEFAULT_FLAGS
        };
        let registered = Mouse::new(self.api.clone(), window).and_then(|mouse| {
            Keyboard::with_flags(self.api.clone(), window, keyboard_flags).map(|keyboard| {
                (
                    mouse.with_absolute_tracking(self.config.track_absolute_mouse()),
                    keyboard,
                )
            })
        });

        match registered {
            Ok((mouse, keyboard)) => {
                debug!(window = window.get(), "Raw input devices registered");
                self.devices = Devices::Registered { mouse, keyboard };
                self.display.activate();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, window = window.get());
                self.devices = Devices::Failed;
                self.reporter.report(
                    REGISTRATION_FAILURE_TITLE,
                    e.code(),
                    REGISTRATION_FAILURE_MESSAGE,
                );
                Err(e)
            }
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.devices, Devices::Registered { .. })
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display.mode()
    }

    /// Handles one raw input notification: reads the record behind `handle`,
    /// decodes it as mouse or keyboard input, and queues the result stamped
    /// with the current time. Records from any other device are forwarded to
    /// the OS unchanged.
    pub fn on_raw_input(&mut self, handle: RawInputHandle, queues: &mut InputQueues) -> Dispatch {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let Some(bytes) = self
            .api
            .read(handle, &mut buf)
            .and_then(|len| buf.get(..len))
        else {
            error!(?handle, "Failed to read raw input record");
            debug_assert!(false, "OS failed to copy a raw input record");
            return Dispatch::Unreadable;
        };

        let record = match RawInputRecord::parse(bytes) {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, len = bytes.len(), "Malformed raw input record");
                debug_assert!(false, "OS delivered a malformed raw input record: {e}");
                self.api.forward_unhandled(bytes);
                return Dispatch::Forwarded;
            }
        };

        let Devices::Registered { mouse, keyboard } = &mut self.devices else {
            trace!(kind = ?record.device_kind(), "Raw input before registration");
            self.api.forward_unhandled(bytes);
            return Dispatch::Forwarded;
        };

        if let Some(input) = mouse.handle(&record) {
            queues.mouse.emplace(self.clock.now(), input);
            return Dispatch::Mouse;
        }

        if let Some(input) = keyboard.handle(&record) {
            if input.is_down() && input.virtual_key == self.config.full_screen_toggle().value() {
                self.display.toggle();
            }
            queues.keyboard.emplace(self.clock.now(), input);
            return Dispatch::Keyboard;
        }

        trace!(kind = ?record.device_kind(), "Forwarding unhandled raw input");
        self.api.forward_unhandled(bytes);
        Dispatch::Forwarded
    }
}
