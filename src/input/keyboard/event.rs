//! Decoding of raw keyboard records into [`KeyboardInput`].

use ::bitflags::bitflags;
use ::std::fmt::{self, Display};
use ::tracing::trace;

use crate::input::{
    keyboard::KeyCode,
    raw::{RawInputData, RawInputRecord},
    strip_reserved_bit,
};

bitflags! {
    /// Key transition and scan code prefix flags.
    ///
    /// All values but [`DOWN`] match the OS `RI_KEY_*` bits. The OS reports a
    /// press by the *absence* of the break bit; [`DOWN`] makes that explicit
    /// and occupies a bit the OS never uses.
    ///
    /// [`DOWN`]: Self::DOWN
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyboardKeyFlags: u16 {
        /// The key was released (`RI_KEY_BREAK`).
        const UP = 0x0001;
        /// The scan code carries the E0 prefix (`RI_KEY_E0`).
        const E0_PREFIX = 0x0002;
        /// The scan code carries the E1 prefix (`RI_KEY_E1`).
        const E1_PREFIX = 0x0004;
        /// `RI_KEY_TERMSRV_SET_LED`.
        const TERMINAL_SERVER_SET_LED = 0x0008;
        /// `RI_KEY_TERMSRV_SHADOW`.
        const TERMINAL_SERVER_SHADOW = 0x0010;
        /// The key was pressed. Engine-reserved.
        const DOWN = 0x8000;
    }
}

/// `RI_KEY_MAKE`: a press is signalled by the break bit being clear.
const RI_KEY_MAKE: u16 = 0x0000;

/// A normalized keyboard sample.
///
/// Exactly one of [`KeyboardKeyFlags::DOWN`] and [`KeyboardKeyFlags::UP`] is
/// set on every decoded value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyboardInput {
    /// Scan code of the physical key, independent of press state.
    pub make_code: u16,
    pub key_flags: KeyboardKeyFlags,
    /// Platform virtual-key code, passed through untouched.
    pub virtual_key: u16,
    /// Platform window message, passed through untouched.
    pub message: u32,
}

impl KeyboardInput {
    /// The make code a keyboard controller reports when too many keys are
    /// held at once to tell them apart. Such events must be discarded by the
    /// consumer.
    pub const OVERRUN_MAKE_CODE: u16 = 0xFF;

    /// Decodes a raw input record. Returns `None` if the record did not come
    /// from a keyboard.
    ///
    /// Overrun events are decoded like any other and left for the consumer
    /// to discard; see [`is_overrun`].
    ///
    /// [`is_overrun`]: Self::is_overrun
    pub fn decode(record: &RawInputRecord) -> Option<Self> {
        let RawInputData::Keyboard(raw) = &record.data else {
            return None;
        };

        let raw_flags = strip_reserved_bit("keyboard", raw.flags, KeyboardKeyFlags::DOWN.bits());
        let mut key_flags = KeyboardKeyFlags::from_bits_retain(raw_flags);

        let is_make = raw_flags & KeyboardKeyFlags::UP.bits() == RI_KEY_MAKE;
        // Some firmwares report prefixed presses without a usable make bit.
        let is_prefixed_make = !key_flags.contains(KeyboardKeyFlags::UP)
            && key_flags.intersects(KeyboardKeyFlags::E0_PREFIX | KeyboardKeyFlags::E1_PREFIX);
        if is_make || is_prefixed_make {
            key_flags.insert(KeyboardKeyFlags::DOWN);
        }

        let input = Self {
            make_code: raw.make_code,
            key_flags,
            virtual_key: raw.vkey,
            message: raw.message,
        };
        trace!(%input, "Decoded keyboard input");
        Some(input)
    }

    pub fn is_down(&self) -> bool {
        self.key_flags.contains(KeyboardKeyFlags::DOWN)
    }

    pub fn is_up(&self) -> bool {
        self.key_flags.contains(KeyboardKeyFlags::UP)
    }

    pub fn is_overrun(&self) -> bool {
        self.make_code == Self::OVERRUN_MAKE_CODE
    }

    /// The named virtual key, if the virtual-key code is a well-known one.
    pub fn key_code(&self) -> Option<KeyCode> {
        KeyCode::try_from(self.virtual_key).ok()
    }
}

impl Display for KeyboardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key_code() {
            Some(key_code) => write!(f, "Keyboard: {key_code}")?,
            None => write!(f, "Keyboard: VK 0x{:02X}", self.virtual_key)?,
        }
        let transition = if self.is_down() { "down" } else { "up" };
        write!(f, " {transition} (make code 0x{:02X}", self.make_code)?;
        if self.key_flags.contains(KeyboardKeyFlags::E0_PREFIX) {
            f.write_str(", E0")?;
        }
        if self.key_flags.contains(KeyboardKeyFlags::E1_PREFIX) {
            f.write_str(", E1")?;
        }
        f.write_str(")")
    }
}
