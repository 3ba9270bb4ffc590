//! Win32 implementations of the platform primitives.

use crate::{
    errors::{Context, ErrorCode, Result, SystemError},
    platform::{
        Compositor, FatalErrorReporter, RawInputApi, RawInputHandle, RegistrationRequest,
        WindowHandle,
    },
};

use ::std::{
    cell::{Cell, RefCell},
    mem::size_of,
};
use ::tracing::{debug, error};
use ::widestring::U16CString;
use ::windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{BOOL, E_HANDLE, HWND, RECT},
        Graphics::{
            Dwm::DwmEnableMMCSS,
            Gdi::{GetMonitorInfoW, MonitorFromWindow, MONITORINFO, MONITOR_DEFAULTTONEAREST},
        },
        UI::{
            Input::{
                DefRawInputProc, GetRawInputData, RegisterRawInputDevices, HRAWINPUT, RAWINPUT,
                RAWINPUTDEVICE, RAWINPUTDEVICE_FLAGS, RAWINPUTHEADER, RID_INPUT,
            },
            WindowsAndMessaging::{
                GetWindowLongPtrW, GetWindowPlacement, MessageBoxW, SetWindowLongPtrW,
                SetWindowPlacement, SetWindowPos, GWL_STYLE, HWND_TOP, MB_ICONERROR, MB_OK,
                SWP_FRAMECHANGED, SWP_NOMOVE, SWP_NOOWNERZORDER, SWP_NOSIZE, SWP_NOZORDER,
                WINDOWPLACEMENT, WS_OVERLAPPEDWINDOW,
            },
        },
    },
};

/// `GetRawInputData` reports failure as `(UINT)-1`.
const RAW_INPUT_READ_FAILED: u32 = u32::MAX;

const HEADER_SIZE: u32 = size_of::<RAWINPUTHEADER>() as u32;

/// Raw input primitives backed by `RegisterRawInputDevices`,
/// `GetRawInputData` and `DefRawInputProc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32RawInput;

impl RawInputApi for Win32RawInput {
    fn register(&self, request: &RegistrationRequest) -> Result<()> {
        let device = RAWINPUTDEVICE {
            usUsagePage: request.class().usage_page,
            usUsage: request.class().usage,
            dwFlags: RAWINPUTDEVICE_FLAGS(request.flags().bits()),
            hwndTarget: request
                .target()
                .map(|window| HWND(window.get()))
                .unwrap_or_default(),
        };

        unsafe { RegisterRawInputDevices(&[device], size_of::<RAWINPUTDEVICE>() as u32) }
            .ok()
            .function("RegisterRawInputDevices")
    }

    fn read(&self, handle: RawInputHandle, buf: &mut [u8]) -> Option<usize> {
        let mut size = u32::try_from(buf.len()).ok()?;
        let copied = unsafe {
            GetRawInputData(
                HRAWINPUT(handle.0),
                RID_INPUT,
                buf.as_mut_ptr().cast(),
                &mut size,
                HEADER_SIZE,
            )
        };

        (copied != RAW_INPUT_READ_FAILED).then_some(copied as usize)
    }

    fn forward_unhandled(&self, record: &[u8]) {
        let records = [record.as_ptr() as *const RAWINPUT];
        unsafe {
            DefRawInputProc(&records, HEADER_SIZE);
        }
    }
}

/// Borderless full-screen presentation and DWM frame scheduling for one
/// window.
///
/// The compositor is created before its window exists and must be
/// [`bind`]ed to it before use.
///
/// [`bind`]: Self::bind
#[derive(Default)]
pub struct Win32Compositor {
    window: Cell<Option<WindowHandle>>,
    /// Where the window sat before going full-screen.
    windowed_placement: RefCell<Option<WINDOWPLACEMENT>>,
}

impl Win32Compositor {
    pub fn bind(&self, window: WindowHandle) {
        self.window.set(Some(window));
    }

    fn hwnd(&self) -> Result<HWND> {
        self.window
            .get()
            .map(|window| HWND(window.get()))
            .ok_or_else(|| SystemError::new(ErrorCode(E_HANDLE.0), "No window bound").into())
    }

    fn enter_full_screen(&self, hwnd: HWND) -> Result<()> {
        let mut placement = WINDOWPLACEMENT {
            length: size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        unsafe { GetWindowPlacement(hwnd, &mut placement) }
            .ok()
            .context("Failed to save windowed placement")
            .function("GetWindowPlacement")?;

        let monitor = unsafe { MonitorFromWindow(hwnd, MONITOR_DEFAULTTONEAREST) };
        let mut info = MONITORINFO {
            cbSize: size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        unsafe { GetMonitorInfoW(monitor, &mut info) }
            .ok()
            .context("Failed to query monitor bounds")
            .function("GetMonitorInfoW")?;

        let style = unsafe { GetWindowLongPtrW(hwnd, GWL_STYLE) };
        unsafe {
            SetWindowLongPtrW(hwnd, GWL_STYLE, style & !(WS_OVERLAPPEDWINDOW.0 as isize));
        }

        let RECT {
            left,
            top,
            right,
            bottom,
        } = info.rcMonitor;
        unsafe {
            SetWindowPos(
                hwnd,
                HWND_TOP,
                left,
                top,
                right - left,
                bottom - top,
                SWP_NOOWNERZORDER | SWP_FRAMECHANGED,
            )
        }
        .ok()
        .context("Failed to cover monitor")
        .function("SetWindowPos")?;

        *self.windowed_placement.borrow_mut() = Some(placement);
        Ok(())
    }

    fn leave_full_screen(&self, hwnd: HWND) -> Result<()> {
        let style = unsafe { GetWindowLongPtrW(hwnd, GWL_STYLE) };
        unsafe {
            SetWindowLongPtrW(hwnd, GWL_STYLE, style | WS_OVERLAPPEDWINDOW.0 as isize);
        }

        if let Some(placement) = self.windowed_placement.borrow_mut().take() {
            unsafe { SetWindowPlacement(hwnd, &placement) }
                .ok()
                .context("Failed to restore windowed placement")
                .function("SetWindowPlacement")?;
        }

        unsafe {
            SetWindowPos(
                hwnd,
                HWND::default(),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOOWNERZORDER | SWP_FRAMECHANGED,
            )
        }
        .ok()
        .context("Failed to restore window frame")
        .function("SetWindowPos")
    }
}

impl Compositor for Win32Compositor {
    fn set_full_screen(&self, full_screen: bool) -> Result<()> {
        let hwnd = self.hwnd()?;
        debug!(hwnd = hwnd.0, full_screen, "Set full-screen presentation");

        if full_screen {
            self.enter_full_screen(hwnd)
        } else {
            self.leave_full_screen(hwnd)
        }
    }

    fn set_scheduling_hint(&self, enabled: bool) -> Result<()> {
        debug!(enabled, "Set DWM MMCSS scheduling");
        unsafe { DwmEnableMMCSS(BOOL::from(enabled)) }
            .context("Failed to change DWM scheduling")
            .function("DwmEnableMMCSS")
    }
}

/// Reports fatal errors in a modal message box, in addition to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageBoxReporter;

impl FatalErrorReporter for MessageBoxReporter {
    fn report(&self, title: &str, code: ErrorCode, user_message: &str) {
        error!(%title, %code, "{user_message}");

        let caption = U16CString::from_str_truncate(title);
        let text = U16CString::from_str_truncate(format!("{user_message}\n\nError code: {code}"));
        unsafe {
            MessageBoxW(
                HWND::default(),
                PCWSTR::from_raw(text.as_ptr()),
                PCWSTR::from_raw(caption.as_ptr()),
                MB_OK | MB_ICONERROR,
            );
        }
    }
}
