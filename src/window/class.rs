//! Process-wide registry of the Win32 window classes our windows use.

use crate::errors::*;

use ::std::{
    collections::HashMap,
    mem::size_of,
    num::NonZeroU16,
    sync::{Arc, Weak},
};
use ::tap::prelude::*;
use ::tracing::{debug, error};
use ::widestring::U16CString;
use ::windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            LoadCursorW, RegisterClassExW, UnregisterClassW, CS_HREDRAW, CS_VREDRAW, IDC_ARROW,
            WNDCLASSEXW,
        },
    },
};

use ::lazy_static::lazy_static;
use ::parking_lot::Mutex;

/// Signature of the window procedure installed when a class is registered.
pub(super) type WndProc = extern "system" fn(HWND, u32, WPARAM, LPARAM) -> LRESULT;

lazy_static! {
    /// Live classes by name. Entries whose class has been dropped are
    /// removed by the class itself.
    static ref CLASSES: Mutex<HashMap<U16CString, Weak<WindowClass>>> = Default::default();
}

/// A registered Win32 window class, shared by every window created with it
/// and unregistered when the last of them is gone.
pub(super) struct WindowClass {
    name: U16CString,
}

impl WindowClass {
    /// Returns the live registration of `name`, registering it with
    /// `wnd_proc` if there is none.
    pub(super) fn get_or_create(name: &str, wnd_proc: WndProc) -> Result<Arc<Self>> {
        let name = U16CString::from_str_truncate(name);
        let mut classes = CLASSES.lock();

        if let Some(class) = classes.get(&name).and_then(Weak::upgrade) {
            return Ok(class);
        }

        let class = Self::register(name.clone(), wnd_proc)?;
        classes.insert(name, Arc::downgrade(&class));
        Ok(class)
    }

    pub(super) fn name(&self) -> PCWSTR {
        PCWSTR::from_raw(self.name.as_ptr())
    }

    fn register(name: U16CString, wnd_proc: WndProc) -> Result<Arc<Self>> {
        debug!(wnd_class = name.to_string_lossy(), "Register window class");

        let cursor = unsafe { LoadCursorW(HINSTANCE::default(), IDC_ARROW) }
            .context("Failed to load the arrow cursor for a window class")
            .function("LoadCursorW")?;

        let wnd_class = WNDCLASSEXW {
            cbSize: size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            lpszClassName: PCWSTR::from_raw(name.as_ptr()),
            hCursor: cursor,
            ..Default::default()
        };
        unsafe { RegisterClassExW(&wnd_class) }
            .pipe(NonZeroU16::new)
            .context("Failed to register window class")
            .function("RegisterClassExW")?;

        // A `WindowClass` only ever exists for a registered class.
        Ok(Arc::new(Self { name }))
    }
}

impl Drop for WindowClass {
    fn drop(&mut self) {
        debug!(wnd_class = self.name.to_string_lossy(), "Unregister window class");

        let unregistered = unsafe { GetModuleHandleW(None) }
            .function("GetModuleHandleW")
            .and_then(|module| {
                unsafe { UnregisterClassW(self.name(), module) }
                    .ok()
                    .function("UnregisterClassW")
            });
        if let Err(e) = unregistered {
            error!(error = %e, "Failed to unregister window class");
        }

        let mut classes = CLASSES.lock();
        if classes
            .get(&self.name)
            .map_or(false, |class| class.strong_count() == 0)
        {
            classes.remove(&self.name);
        }
    }
}
