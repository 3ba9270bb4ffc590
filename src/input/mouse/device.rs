//! Mouse device registration and absolute position tracking.

use ::std::{collections::HashMap, rc::Rc};
use ::tracing::trace;

use crate::{
    errors::Result,
    input::{
        mouse::{MouseInput, MouseStateFlags},
        raw::RawInputRecord,
        registration::DeviceRegistration,
    },
    platform::{DeviceClass, RawInputApi, RegistrationFlags, WindowHandle},
};

/// Raw mouse input for one window.
///
/// While a [`Mouse`] is alive, the OS delivers raw mouse records to its
/// window. Dropping it (or calling [`close`]) stops delivery.
///
/// # Absolute devices
///
/// Pens, touch screens and remote desktop sessions report absolute
/// coordinates. When absolute tracking is enabled (the default), the
/// [`Mouse`] remembers the last absolute position of each source device and
/// turns every absolute sample into a delta from that position, so that
/// [`MouseInput::last_x`] and [`MouseInput::last_y`] are always deltas. The
/// first absolute sample of a device yields a zero delta. Converted samples
/// keep [`MouseStateFlags::ORIGINAL_MOVE_WAS_ABSOLUTE`].
///
/// Samples flagged [`MouseStateFlags::VIRTUAL_DESKTOP`] are normalized to
/// `0..=65535` across the whole virtual desktop rather than the primary
/// monitor, so each coordinate space keeps its own origin. Deltas from such
/// samples are in those normalized units, not pixels; they keep the flag so
/// consumers can tell them apart.
///
/// [`close`]: Self::close
#[derive(Debug)]
pub struct Mouse {
    registration: DeviceRegistration,
    track_absolute: bool,
    /// Last absolute position, by source device handle and whether the
    /// position was relative to the virtual desktop.
    absolute_origins: HashMap<(u64, bool), (i32, i32)>,
}

impl Mouse {
    pub const DEFAULT_FLAGS: RegistrationFlags = RegistrationFlags::empty();

    /// Registers for raw mouse input on `window`, with absolute tracking
    /// enabled.
    pub fn new(api: Rc<dyn RawInputApi>, window: WindowHandle) -> Result<Self> {
        DeviceRegistration::new(api, DeviceClass::MOUSE, Self::DEFAULT_FLAGS, window).map(
            |registration| Self {
                registration,
                track_absolute: true,
                absolute_origins: HashMap::new(),
            },
        )
    }

    /// Enables or disables conversion of absolute coordinates into deltas.
    /// With tracking disabled, absolute coordinates are delivered unchanged.
    pub fn with_absolute_tracking(self, track_absolute: bool) -> Self {
        Self {
            track_absolute,
            ..self
        }
    }

    /// The window the mouse is registered to, or `None` once closed.
    pub fn window(&self) -> Option<WindowHandle> {
        self.registration.window()
    }

    /// Decodes `record` if it came from a mouse.
    pub fn handle(&mut self, record: &RawInputRecord) -> Option<MouseInput> {
        let mut input = MouseInput::decode(record)?;

        if self.track_absolute
            && input
                .mouse_state
                .contains(MouseStateFlags::ORIGINAL_MOVE_WAS_ABSOLUTE)
            && !input
                .mouse_state
                .contains(MouseStateFlags::ATTRIBUTES_CHANGED)
        {
            let position = (input.last_x, input.last_y);
            let space = (
                record.header.device,
                input.mouse_state.contains(MouseStateFlags::VIRTUAL_DESKTOP),
            );
            let origin = self
                .absolute_origins
                .insert(space, position)
                .unwrap_or(position);

            input.last_x = position.0.wrapping_sub(origin.0);
            input.last_y = position.1.wrapping_sub(origin.1);
            trace!(
                device = record.header.device,
                ?position,
                ?origin,
                "Converted absolute mouse position to delta"
            );
        }

        Some(input)
    }

    /// Unregisters from the OS. Further calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        self.registration.close()
    }
}
