//! The narrow set of OS primitives the input pipeline depends on.
//!
//! Everything above this module is platform-independent; the Win32 side lives
//! in [`win32`] and is only compiled on Windows.

#[cfg(test)]
pub(crate) mod testing;
#[cfg(windows)]
pub mod win32;

use crate::errors::{ErrorCode, Result};

use ::bitflags::bitflags;
use ::std::num::NonZeroIsize;
use ::tracing::error;

/// An opaque, comparable window identity. A window handle is never null; an
/// absent window is expressed as `Option::<WindowHandle>::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(NonZeroIsize);

impl WindowHandle {
    /// Wraps a raw window handle value, returning `None` for a null handle.
    pub fn new(raw: isize) -> Option<Self> {
        NonZeroIsize::new(raw).map(Self)
    }

    pub fn get(&self) -> isize {
        self.0.get()
    }
}

/// The opaque handle delivered alongside a raw input notification. It may be
/// used to read the full raw input record exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawInputHandle(pub isize);

bitflags! {
    /// Flags passed to the OS raw input registration primitive. Values match
    /// the OS `RIDEV_*` constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegistrationFlags: u32 {
        /// Remove the device class from the inclusion list.
        const REMOVE = 0x0000_0001;
        /// Deliver all key combinations to the app, including those the
        /// system would otherwise intercept as hotkeys.
        const NO_HOTKEYS = 0x0000_0200;
    }
}

/// A class of HID device identified by its usage page and usage id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeviceClass {
    pub usage_page: u16,
    pub usage: u16,
}

impl DeviceClass {
    const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;

    pub const MOUSE: Self = Self {
        usage_page: Self::USAGE_PAGE_GENERIC_DESKTOP,
        usage: 0x02,
    };

    pub const KEYBOARD: Self = Self {
        usage_page: Self::USAGE_PAGE_GENERIC_DESKTOP,
        usage: 0x06,
    };
}

/// A single call to the OS raw input registration primitive.
///
/// Only constructible via [`add`] (which requires a target window) and
/// [`remove`] (which never carries one), matching the OS contract.
///
/// [`add`]: Self::add
/// [`remove`]: Self::remove
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationRequest {
    class: DeviceClass,
    flags: RegistrationFlags,
    target: Option<WindowHandle>,
}

impl RegistrationRequest {
    pub fn add(class: DeviceClass, flags: RegistrationFlags, target: WindowHandle) -> Self {
        Self {
            class,
            flags: flags - RegistrationFlags::REMOVE,
            target: Some(target),
        }
    }

    pub fn remove(class: DeviceClass) -> Self {
        Self {
            class,
            flags: RegistrationFlags::REMOVE,
            target: None,
        }
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    pub fn flags(&self) -> RegistrationFlags {
        self.flags
    }

    pub fn target(&self) -> Option<WindowHandle> {
        self.target
    }

    pub fn is_removal(&self) -> bool {
        self.flags.contains(RegistrationFlags::REMOVE)
    }
}

/// OS raw input primitives.
pub trait RawInputApi {
    /// Registers (or, for a removal request, unregisters) interest in a
    /// device class.
    fn register(&self, request: &RegistrationRequest) -> Result<()>;

    /// Copies the raw input record for `handle` into `buf`. Returns the
    /// number of bytes copied, or `None` if the OS refused the read.
    fn read(&self, handle: RawInputHandle, buf: &mut [u8]) -> Option<usize>;

    /// Hands a raw input record the app did not consume back to the OS
    /// default raw input handler.
    fn forward_unhandled(&self, record: &[u8]);
}

/// Presentation controls of the window's compositor.
pub trait Compositor {
    /// Switches the window between full-screen and windowed presentation.
    fn set_full_screen(&self, full_screen: bool) -> Result<()>;

    /// Enables or disables the compositor's low-latency (MMCSS) scheduling
    /// of the window's frames.
    fn set_scheduling_hint(&self, enabled: bool) -> Result<()>;
}

/// Surfaces unrecoverable conditions to the user. The input pipeline never
/// renders UI itself.
pub trait FatalErrorReporter {
    fn report(&self, title: &str, code: ErrorCode, user_message: &str);
}

/// A [`FatalErrorReporter`] that only writes to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl FatalErrorReporter for LogReporter {
    fn report(&self, title: &str, code: ErrorCode, user_message: &str) {
        error!(%title, %code, "{user_message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::pretty_assertions::assert_eq;

    #[test]
    fn test_window_handle_rejects_null() {
        assert_eq!(WindowHandle::new(0), None);
        assert_eq!(WindowHandle::new(0x1234).map(|h| h.get()), Some(0x1234));
    }

    #[test]
    fn test_add_request_never_carries_remove_flag() {
        let window = WindowHandle::new(42).unwrap();
        let request = RegistrationRequest::add(
            DeviceClass::KEYBOARD,
            RegistrationFlags::NO_HOTKEYS | RegistrationFlags::REMOVE,
            window,
        );

        assert!(!request.is_removal());
        assert_eq!(request.flags(), RegistrationFlags::NO_HOTKEYS);
        assert_eq!(request.target(), Some(window));
    }

    #[test]
    fn test_remove_request_has_no_target() {
        let request = RegistrationRequest::remove(DeviceClass::MOUSE);

        assert!(request.is_removal());
        assert_eq!(request.target(), None);
        assert_eq!(request.class(), DeviceClass::MOUSE);
    }
}
