//! Decoding of raw mouse records into [`MouseInput`].

use ::bitflags::bitflags;
use ::std::fmt::{self, Display};
use ::tracing::trace;

use crate::input::{
    raw::{RawInputData, RawInputRecord},
    strip_reserved_bit,
};

/// The magnitude of one physical notch of wheel rotation (`WHEEL_DELTA`).
pub const WHEEL_DELTA: f32 = 120.0;

bitflags! {
    /// Mouse motion state.
    ///
    /// All values but [`MOVE_RELATIVE`] match the OS `MOUSE_*` state bits.
    /// The OS signals relative motion by the absence of the absolute bit;
    /// [`MOVE_RELATIVE`] makes that explicit and occupies a bit the OS never
    /// uses.
    ///
    /// [`MOVE_RELATIVE`]: Self::MOVE_RELATIVE
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseStateFlags: u16 {
        /// The device reported absolute coordinates (`MOUSE_MOVE_ABSOLUTE`).
        const ORIGINAL_MOVE_WAS_ABSOLUTE = 0x0001;
        /// Coordinates map to the whole virtual desktop
        /// (`MOUSE_VIRTUAL_DESKTOP`).
        const VIRTUAL_DESKTOP = 0x0002;
        /// Mouse attributes changed; no motion data (`MOUSE_ATTRIBUTES_CHANGED`).
        const ATTRIBUTES_CHANGED = 0x0004;
        /// The sample was not coalesced (`MOUSE_MOVE_NOCOALESCE`).
        const NO_COALESCE = 0x0008;
        /// `last_x` and `last_y` carry non-zero relative motion.
        /// Engine-reserved.
        const MOVE_RELATIVE = 0x8000;
    }
}

bitflags! {
    /// Mouse button and wheel transitions. Values match the OS `RI_MOUSE_*`
    /// bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtonTransitions: u16 {
        const LEFT_DOWN = 0x0001;
        const LEFT_UP = 0x0002;
        const RIGHT_DOWN = 0x0004;
        const RIGHT_UP = 0x0008;
        const MIDDLE_DOWN = 0x0010;
        const MIDDLE_UP = 0x0020;
        const BUTTON_4_DOWN = 0x0040;
        const BUTTON_4_UP = 0x0080;
        const BUTTON_5_DOWN = 0x0100;
        const BUTTON_5_UP = 0x0200;
        /// Vertical wheel rotation; positive is away from the user.
        const WHEEL = 0x0400;
        /// Horizontal wheel rotation; positive is to the right.
        const HWHEEL = 0x0800;
    }
}

/// A normalized mouse sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseInput {
    pub mouse_state: MouseStateFlags,
    pub button_flags: MouseButtonTransitions,
    /// Wheel rotation in notches (fractional for high-resolution wheels).
    /// Zero unless a wheel transition is present.
    pub button_data: f32,
    /// Horizontal motion since the previous sample.
    pub last_x: i32,
    /// Vertical motion since the previous sample.
    pub last_y: i32,
}

impl MouseInput {
    /// Decodes a raw input record. Returns `None` if the record did not come
    /// from a mouse.
    ///
    /// Absolute coordinates are passed through as-is; turning them into
    /// deltas needs per-device history and is done by [`Mouse`].
    ///
    /// [`Mouse`]: crate::input::mouse::Mouse
    pub fn decode(record: &RawInputRecord) -> Option<Self> {
        let RawInputData::Mouse(raw) = &record.data else {
            return None;
        };

        let raw_state = strip_reserved_bit("mouse", raw.flags, MouseStateFlags::MOVE_RELATIVE.bits());
        let mut mouse_state = MouseStateFlags::from_bits_retain(raw_state);

        // A sample without motion is never classified as relative motion.
        let is_absolute = mouse_state.contains(MouseStateFlags::ORIGINAL_MOVE_WAS_ABSOLUTE);
        let has_motion = raw.last_x != 0 || raw.last_y != 0;
        if !is_absolute && has_motion {
            mouse_state.insert(MouseStateFlags::MOVE_RELATIVE);
        }

        let button_flags = MouseButtonTransitions::from_bits_retain(raw.button_flags);
        let button_data = if button_flags
            .intersects(MouseButtonTransitions::WHEEL | MouseButtonTransitions::HWHEEL)
        {
            f32::from(raw.button_data as i16) / WHEEL_DELTA
        } else {
            0.0
        };

        let input = Self {
            mouse_state,
            button_flags,
            button_data,
            last_x: raw.last_x,
            last_y: raw.last_y,
        };
        trace!(%input, "Decoded mouse input");
        Some(input)
    }

    pub fn is_relative(&self) -> bool {
        self.mouse_state.contains(MouseStateFlags::MOVE_RELATIVE)
    }

    /// Vertical wheel rotation in notches, if the wheel moved.
    pub fn wheel(&self) -> Option<f32> {
        self.button_flags
            .contains(MouseButtonTransitions::WHEEL)
            .then_some(self.button_data)
    }

    /// Horizontal wheel rotation in notches, if the wheel moved.
    pub fn horizontal_wheel(&self) -> Option<f32> {
        self.button_flags
            .contains(MouseButtonTransitions::HWHEEL)
            .then_some(self.button_data)
    }
}

impl Display for MouseInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mouse: dx={} dy={}", self.last_x, self.last_y)?;
        if self
            .mouse_state
            .contains(MouseStateFlags::ORIGINAL_MOVE_WAS_ABSOLUTE)
        {
            f.write_str(" (absolute)")?;
        }
        let buttons = self.button_flags - (MouseButtonTransitions::WHEEL | MouseButtonTransitions::HWHEEL);
        if !buttons.is_empty() {
            write!(f, " buttons=0x{:03X}", buttons.bits())?;
        }
        if let Some(notches) = self.wheel() {
            write!(f, " wheel={notches:+.2}")?;
        }
        if let Some(notches) = self.horizontal_wheel() {
            write!(f, " hwheel={notches:+.2}")?;
        }
        Ok(())
    }
}
