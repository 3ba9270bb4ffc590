//! Strongly-typed view of the raw input records copied out of the OS.
//!
//! The byte layout matches the OS `RAWINPUT` structure: a header whose last
//! two fields are pointer sized, followed by a device specific payload.
//!
//! Layout references:
//! <https://learn.microsoft.com/en-us/windows/win32/api/winuser/ns-winuser-rawinputheader>
//! <https://learn.microsoft.com/en-us/windows/win32/api/winuser/ns-winuser-rawmouse>
//! <https://learn.microsoft.com/en-us/windows/win32/api/winuser/ns-winuser-rawkeyboard>

use ::deku::prelude::*;
use ::std::mem::size_of;

const POINTER_BYTES: usize = size_of::<usize>();

/// Size in bytes of [`RawInputHeader`] on the current target.
pub const HEADER_SIZE: usize = 8 + 2 * POINTER_BYTES;
/// Size in bytes of a [`RawMouse`] payload.
pub const MOUSE_PAYLOAD_SIZE: usize = 24;
/// Size in bytes of a [`RawKeyboard`] payload.
pub const KEYBOARD_PAYLOAD_SIZE: usize = 16;
/// The largest record the pipeline reads: a mouse record.
pub const MAX_RECORD_SIZE: usize = HEADER_SIZE + MOUSE_PAYLOAD_SIZE;

const KIND_MOUSE: u32 = 0;
const KIND_KEYBOARD: u32 = 1;
const KIND_HID: u32 = 2;

/// The device-type tag of a raw input record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    Mouse,
    Keyboard,
    Hid,
    Unknown(u32),
}

impl From<u32> for DeviceKind {
    fn from(tag: u32) -> Self {
        match tag {
            KIND_MOUSE => Self::Mouse,
            KIND_KEYBOARD => Self::Keyboard,
            KIND_HID => Self::Hid,
            other => Self::Unknown(other),
        }
    }
}

impl From<DeviceKind> for u32 {
    fn from(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Mouse => KIND_MOUSE,
            DeviceKind::Keyboard => KIND_KEYBOARD,
            DeviceKind::Hid => KIND_HID,
            DeviceKind::Unknown(other) => other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct RawInputHeader {
    /// `dwType`. The device-type tag.
    pub kind: u32,
    /// `dwSize`. Size of the entire record, header included.
    pub size: u32,
    /// `hDevice`. Handle of the device which generated the input.
    #[cfg_attr(target_pointer_width = "64", deku(bytes = "8"))]
    #[cfg_attr(target_pointer_width = "32", deku(bytes = "4"))]
    pub device: u64,
    /// `wParam`. The `wParam` of the originating notification.
    #[cfg_attr(target_pointer_width = "64", deku(bytes = "8"))]
    #[cfg_attr(target_pointer_width = "32", deku(bytes = "4"))]
    pub wparam: u64,
}

impl RawInputHeader {
    pub fn device_kind(&self) -> DeviceKind {
        self.kind.into()
    }
}

/// Keyboard payload of a raw input record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct RawKeyboard {
    /// `MakeCode`. The scan code of the key, independent of press state.
    pub make_code: u16,
    /// `Flags`. `RI_KEY_*` bits.
    pub flags: u16,
    pub reserved: u16,
    /// `VKey`. The virtual-key code.
    pub vkey: u16,
    /// `Message`. The corresponding legacy window message.
    pub message: u32,
    pub extra_information: u32,
}

/// Mouse payload of a raw input record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct RawMouse {
    /// `usFlags`. `MOUSE_*` state bits. Followed by two bytes of alignment
    /// padding before the button union.
    #[deku(pad_bytes_after = "2")]
    pub flags: u16,
    /// `usButtonFlags`. `RI_MOUSE_*` transition bits.
    pub button_flags: u16,
    /// `usButtonData`. Wheel rotation when a wheel transition is present.
    pub button_data: u16,
    pub raw_buttons: u32,
    pub last_x: i32,
    pub last_y: i32,
    pub extra_information: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawInputData {
    Mouse(RawMouse),
    Keyboard(RawKeyboard),
    /// HID or unrecognised device; the payload is not interpreted.
    Other,
}

/// A complete raw input record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawInputRecord {
    pub header: RawInputHeader,
    pub data: RawInputData,
}

impl RawInputRecord {
    /// Parses a record from the bytes copied by the OS read primitive.
    pub fn parse(bytes: &[u8]) -> Result<Self, DekuError> {
        let ((payload, _), header) = RawInputHeader::from_bytes((bytes, 0))?;
        let data = match header.device_kind() {
            DeviceKind::Mouse => RawInputData::Mouse(RawMouse::from_bytes((payload, 0))?.1),
            DeviceKind::Keyboard => {
                RawInputData::Keyboard(RawKeyboard::from_bytes((payload, 0))?.1)
            }
            DeviceKind::Hid | DeviceKind::Unknown(_) => RawInputData::Other,
        };

        Ok(Self { header, data })
    }

    /// Builds a mouse record for `device`, as the OS would deliver it.
    pub fn mouse(device: u64, mouse: RawMouse) -> Self {
        Self {
            header: RawInputHeader {
                kind: KIND_MOUSE,
                size: (HEADER_SIZE + MOUSE_PAYLOAD_SIZE) as u32,
                device,
                wparam: 0,
            },
            data: RawInputData::Mouse(mouse),
        }
    }

    /// Builds a keyboard record for `device`, as the OS would deliver it.
    pub fn keyboard(device: u64, keyboard: RawKeyboard) -> Self {
        Self {
            header: RawInputHeader {
                kind: KIND_KEYBOARD,
                size: (HEADER_SIZE + KEYBOARD_PAYLOAD_SIZE) as u32,
                device,
                wparam: 0,
            },
            data: RawInputData::Keyboard(keyboard),
        }
    }

    pub fn device_kind(&self) -> DeviceKind {
        self.header.device_kind()
    }

    /// Serializes the record back into the OS byte layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DekuError> {
        let mut bytes = self.header.to_bytes()?;
        match &self.data {
            RawInputData::Mouse(mouse) => bytes.extend(mouse.to_bytes()?),
            RawInputData::Keyboard(keyboard) => bytes.extend(keyboard.to_bytes()?),
            RawInputData::Other => (),
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::pretty_assertions::assert_eq;

    #[test]
    fn test_payload_sizes_match_os_layout() {
        assert_eq!(
            RawMouse::default().to_bytes().unwrap().len(),
            MOUSE_PAYLOAD_SIZE
        );
        assert_eq!(
            RawKeyboard::default().to_bytes().unwrap().len(),
            KEYBOARD_PAYLOAD_SIZE
        );
        assert_eq!(
            RawInputRecord::mouse(1, RawMouse::default())
                .to_bytes()
                .unwrap()
                .len(),
            MAX_RECORD_SIZE
        );
    }

    /// `hDevice` and `wParam` are pointer sized on every target.
    #[test]
    fn test_header_fields_are_pointer_sized() {
        let header = RawInputHeader {
            kind: 1,
            size: 0,
            device: 0x7F,
            wparam: 0x01,
        };
        let bytes = header.to_bytes().unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(bytes[8], 0x7F);
        assert_eq!(bytes[8 + POINTER_BYTES], 0x01);
        assert_eq!(RawInputHeader::from_bytes((&bytes, 0)).unwrap().1, header);
    }

    /// Pressing 'a' as delivered by a standard keyboard.
    #[test]
    fn test_parse_keyboard_record() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[0] = 0x01; // dwType: keyboard
        bytes[4] = (HEADER_SIZE + KEYBOARD_PAYLOAD_SIZE) as u8;
        bytes[8] = 0x7F; // hDevice
        bytes.extend([
            0x1E, 0x00, // MakeCode
            0x00, 0x00, // Flags
            0x00, 0x00, // Reserved
            0x41, 0x00, // VKey: 'A'
            0x00, 0x01, 0x00, 0x00, // Message: WM_KEYDOWN
            0x00, 0x00, 0x00, 0x00, // ExtraInformation
        ]);

        let record = RawInputRecord::parse(&bytes).unwrap();
        assert_eq!(record.device_kind(), DeviceKind::Keyboard);
        assert_eq!(record.header.device, 0x7F);
        assert_eq!(
            record.data,
            RawInputData::Keyboard(RawKeyboard {
                make_code: 0x1E,
                flags: 0,
                reserved: 0,
                vkey: 0x41,
                message: 0x0100,
                extra_information: 0,
            })
        );
    }

    /// The button union sits after two bytes of padding.
    #[test]
    fn test_parse_mouse_record_respects_union_padding() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[4] = MAX_RECORD_SIZE as u8;
        bytes.extend([
            0x01, 0x00, // usFlags: absolute
            0xFF, 0xFF, // padding
            0x00, 0x04, // usButtonFlags: wheel
            0x88, 0xFF, // usButtonData: -120
            0x00, 0x00, 0x00, 0x00, // ulRawButtons
            0x64, 0x00, 0x00, 0x00, // lLastX: 100
            0xCE, 0xFF, 0xFF, 0xFF, // lLastY: -50
            0x00, 0x00, 0x00, 0x00, // ulExtraInformation
        ]);

        let record = RawInputRecord::parse(&bytes).unwrap();
        assert_eq!(record.device_kind(), DeviceKind::Mouse);
        assert_eq!(
            record.data,
            RawInputData::Mouse(RawMouse {
                flags: 0x0001,
                button_flags: 0x0400,
                button_data: 0xFF88,
                raw_buttons: 0,
                last_x: 100,
                last_y: -50,
                extra_information: 0,
            })
        );
    }

    #[test]
    fn test_hid_record_payload_is_not_interpreted() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[0] = 0x02;
        bytes.extend([0xAB; 12]);

        let record = RawInputRecord::parse(&bytes).unwrap();
        assert_eq!(record.device_kind(), DeviceKind::Hid);
        assert_eq!(record.data, RawInputData::Other);
    }

    #[test]
    fn test_truncated_record_is_rejected() {
        let bytes = RawInputRecord::keyboard(1, RawKeyboard::default())
            .to_bytes()
            .unwrap();

        assert!(RawInputRecord::parse(&bytes[..bytes.len() - 1]).is_err());
        assert!(RawInputRecord::parse(&bytes[..HEADER_SIZE - 1]).is_err());
    }
}
