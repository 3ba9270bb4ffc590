//! Named virtual-key codes.
//!
//! Values match the Win32 virtual-key codes:
//! <https://learn.microsoft.com/en-us/windows/win32/inputdev/virtual-key-codes>

use ::std::fmt::{self, Display};
use ::strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// A virtual-key code with a well-known meaning. Raw virtual-key values which
/// are not listed here are still carried through the pipeline untouched in
/// [`KeyboardInput::virtual_key`].
///
/// [`KeyboardInput::virtual_key`]: crate::input::keyboard::KeyboardInput::virtual_key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[repr(u16)]
pub enum KeyCode {
    Back = 0x08,
    Tab = 0x09,
    Return = 0x0D,
    Shift = 0x10,
    Control = 0x11,
    Alt = 0x12,
    Pause = 0x13,
    CapsLock = 0x14,
    Escape = 0x1B,
    Space = 0x20,
    PageUp = 0x21,
    PageDown = 0x22,
    End = 0x23,
    Home = 0x24,
    Left = 0x25,
    Up = 0x26,
    Right = 0x27,
    Down = 0x28,
    PrintScreen = 0x2C,
    Insert = 0x2D,
    Delete = 0x2E,
    Key0 = 0x30,
    Key1 = 0x31,
    Key2 = 0x32,
    Key3 = 0x33,
    Key4 = 0x34,
    Key5 = 0x35,
    Key6 = 0x36,
    Key7 = 0x37,
    Key8 = 0x38,
    Key9 = 0x39,
    A = 0x41,
    B = 0x42,
    C = 0x43,
    D = 0x44,
    E = 0x45,
    F = 0x46,
    G = 0x47,
    H = 0x48,
    I = 0x49,
    J = 0x4A,
    K = 0x4B,
    L = 0x4C,
    M = 0x4D,
    N = 0x4E,
    O = 0x4F,
    P = 0x50,
    Q = 0x51,
    R = 0x52,
    S = 0x53,
    T = 0x54,
    U = 0x55,
    V = 0x56,
    W = 0x57,
    X = 0x58,
    Y = 0x59,
    Z = 0x5A,
    LeftWin = 0x5B,
    RightWin = 0x5C,
    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    F11 = 0x7A,
    F12 = 0x7B,
}

impl KeyCode {
    /// The raw virtual-key value.
    pub const fn value(self) -> u16 {
        self as u16
    }
}

impl Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).into())
    }
}

/// Error returned when a raw virtual-key value has no named [`KeyCode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ::thiserror::Error)]
#[error("unrecognised virtual-key code 0x{0:02X}")]
pub struct UnknownKeyCode(pub u16);

impl TryFrom<u16> for KeyCode {
    type Error = UnknownKeyCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::iter()
            .find(|key_code| key_code.value() == value)
            .ok_or(UnknownKeyCode(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_round_trips_every_named_key() {
        for key_code in KeyCode::iter() {
            assert_eq!(KeyCode::try_from(key_code.value()), Ok(key_code));
        }
    }

    #[test]
    fn test_unnamed_value_is_rejected() {
        assert_eq!(KeyCode::try_from(0xFF), Err(UnknownKeyCode(0xFF)));
    }

    #[test]
    fn test_display_uses_variant_name() {
        assert_eq!(KeyCode::F11.to_string(), "F11");
        assert_eq!(KeyCode::A.to_string(), "A");
    }
}
