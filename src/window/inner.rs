use crate::{
    config::InputConfig,
    dispatch::{InputQueues, WindowInputDispatcher},
    display::DisplayMode,
    errors::{self, Context, Result},
    platform::{
        win32::{MessageBoxReporter, Win32Compositor, Win32RawInput},
        RawInputHandle, WindowHandle,
    },
    simulation::{InputSink, SimulationStep, StepReport},
    time::SteadyClock,
    window::WindowClass,
};

use ::geoms::d2::{Point2D, Rect2D, Size2D};
use ::std::{
    cell::{Cell, RefCell, UnsafeCell},
    marker::PhantomData,
    num::NonZeroIsize,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use ::tap::Pipe;
use ::tracing::{debug, error, trace};
use ::widestring::U16CString;
use ::windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::UpdateWindow,
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, DestroyWindow,
            GetWindowLongPtrW, SetWindowLongPtrW, ShowWindow, CREATESTRUCTW, CW_USEDEFAULT,
            GWLP_USERDATA, GWLP_WNDPROC, SW_SHOWNORMAL, WINDOW_EX_STYLE, WM_CLOSE, WM_CREATE,
            WM_INPUT, WM_NCCREATE, WM_NCDESTROY, WM_PAINT, WS_OVERLAPPEDWINDOW,
        },
    },
};

/// `WM_CREATE` return value which aborts window creation.
const ABORT_CREATION: LRESULT = LRESULT(-1);

pub(super) struct WindowInner {
    /// Force !Send & !Sync, as our window can only be used by the thread on
    /// which it was created.
    phantom: PhantomData<UnsafeCell<()>>,
    /// A reference-counted handle to the Win32 window class registered for
    /// windows of this type. When the last `Window` instance is released, the
    /// corresponding Win32 window class will be de-registered.
    window_class: Arc<WindowClass>,
    /// A handle to our corresponding Win32 window. If zero, the window has been
    /// destroyed on the Win32 side.
    hwnd: Cell<HWND>,
    /// Fixed size for our window's client area.
    size: Size2D<i32>,
    /// The Window's title, as it appears in the Windows title bar.
    title: String,
    /// Stores an outstanding close request from the Win32 side. This must
    /// either be actioned by dropping the top level window, or the close
    /// request can be cleared if it is to be ignored.
    close_request: AtomicBool,
    /// Stores an outstanding paint request from the Win32 side.
    paint_request: AtomicBool,
    compositor: Rc<Win32Compositor>,
    /// Owns the raw input device registrations for this window.
    dispatcher: RefCell<WindowInputDispatcher>,
    /// Written by the dispatcher from the window procedure, drained by
    /// `step`. Both happen on the window's thread.
    queues: RefCell<InputQueues>,
    step: RefCell<SimulationStep>,
}

impl WindowInner {
    /// Construct and display a new window.
    pub(super) fn new(size: Size2D<i32>, title: &str, config: &InputConfig) -> Result<Rc<Self>> {
        debug!(wnd_title = %title, "Creating window inner");

        let compositor = Rc::new(Win32Compositor::default());
        let dispatcher = WindowInputDispatcher::new(
            config.clone(),
            Rc::new(Win32RawInput),
            Rc::new(SteadyClock::new()),
            Rc::new(MessageBoxReporter),
            compositor.clone(),
        );

        let this = Rc::new(Self {
            phantom: Default::default(),
            title: title.to_string(),
            window_class: WindowClass::get_or_create("RawInputWindow", Self::wnd_proc_setup)?,
            hwnd: Default::default(),
            size,
            close_request: AtomicBool::new(false),
            paint_request: AtomicBool::new(true), // Request immediate draw
            compositor,
            dispatcher: RefCell::new(dispatcher),
            queues: RefCell::new(InputQueues::with_capacity(config.queue_capacity())),
            step: RefCell::new(SimulationStep::new()),
        });

        // The window is created at its final size so that a full-screen
        // initial display mode, applied during `WM_CREATE`, is not undone.
        let mut rect: RECT = Rect2D::with_size_and_origin(size, Point2D::zero()).into();
        unsafe {
            AdjustWindowRectEx(
                &mut rect,
                WS_OVERLAPPEDWINDOW,
                false,
                WINDOW_EX_STYLE::default(),
            )
        }
        .ok()
        .context("Failed to calculate window size")
        .function("AdjustWindowRectEx")?;

        let hwnd = {
            let module = unsafe { GetModuleHandleW(None) }
                .context("Failed to construct new window")
                .function("GetModuleHandleW")?;
            let title = U16CString::from_str_truncate(title);

            unsafe {
                CreateWindowExW(
                    WINDOW_EX_STYLE::default(),
                    this.window_class.name(),
                    PCWSTR::from_raw(title.as_ptr()),
                    WS_OVERLAPPEDWINDOW,
                    CW_USEDEFAULT,
                    CW_USEDEFAULT,
                    rect.right - rect.left,
                    rect.bottom - rect.top,
                    None,
                    None,
                    module,
                    Some(Rc::into_raw(this.clone()) as *const _),
                )
            }
            .pipe(|hwnd| (hwnd.0 != 0).then_some(hwnd))
            .context("Failed to create window")
            .function("CreateWindowExW")?
        };
        this.hwnd.set(hwnd);

        unsafe {
            ShowWindow(hwnd, SW_SHOWNORMAL);
            UpdateWindow(hwnd);
        }

        Ok(this)
    }

    /// The size of the client area of our Win32 window. The window chrome
    /// is in addition to this size.
    pub(super) const fn size(&self) -> Size2D<i32> {
        self.size
    }

    pub(super) fn title(&self) -> &str {
        &self.title
    }

    /// Get a handle to the Win32 window's handle.
    pub(super) fn hwnd(&self) -> HWND {
        let val = self.hwnd.get();
        assert_ne!(val.0, 0, "Window handle was NULL");
        val
    }

    /// Returns whether the window is requesting to close.
    pub(super) fn is_requesting_close(&self) -> bool {
        self.close_request.load(Ordering::SeqCst)
    }

    /// Clears a pending request to close. The window will not request to close
    /// until the next interaction or message triggers this.
    pub(super) fn clear_close_request(&self) {
        self.close_request.store(false, Ordering::SeqCst);
    }

    /// Returns whether the window is requesting to paint.
    pub(super) fn is_requesting_paint(&self) -> bool {
        self.paint_request.load(Ordering::SeqCst)
    }

    /// Clears a pending request to paint. The window will not request to paint
    /// until the next interaction or message triggers this.
    pub(super) fn clear_paint_request(&self) {
        self.paint_request.store(false, Ordering::SeqCst)
    }

    pub(super) fn display_mode(&self) -> DisplayMode {
        self.dispatcher.borrow().display_mode()
    }

    pub(super) fn step(&self, time_delta: Duration, sink: &mut dyn InputSink) -> StepReport {
        let mut queues = self.queues.borrow_mut();
        let InputQueues { mouse, keyboard } = &mut *queues;
        self.step
            .borrow_mut()
            .step(time_delta, mouse, keyboard, sink)
    }

    pub(super) fn last_input(&self) -> String {
        self.step.borrow().last_input().to_owned()
    }

    pub(super) fn destroy(&self) -> Result<()> {
        unsafe { DestroyWindow(self.hwnd()) }
            .ok()
            .context("Failed to destroy window")
            .function("DestroyWindow")
    }

    /// Registers raw input devices once the Win32 window exists. Failure
    /// aborts window creation.
    fn on_create(&self, hwnd: HWND) -> Option<LRESULT> {
        let Some(window) = WindowHandle::new(hwnd.0) else {
            return Some(ABORT_CREATION);
        };
        self.compositor.bind(window);

        match self.dispatcher.borrow_mut().attach(window) {
            Ok(()) => None,
            Err(_) => Some(ABORT_CREATION),
        }
    }

    fn on_input(&self, lparam: LPARAM) {
        let handle = RawInputHandle(lparam.0);
        match (
            self.dispatcher.try_borrow_mut(),
            self.queues.try_borrow_mut(),
        ) {
            (Ok(mut dispatcher), Ok(mut queues)) => {
                let outcome = dispatcher.on_raw_input(handle, &mut queues);
                trace!(?outcome, "WM_INPUT");
            }
            _ => error!(?handle, "Raw input delivered while input state was in use"),
        }
    }

    /// Handles a Win32 message.
    ///
    /// ## Return Value
    ///
    /// Returns the result of a fully handled message, which is then not
    /// forwarded to the default window procedure. Returns `None` if the
    /// message was not handled, or was only intercepted/tapped on the way
    /// though and should still be forwarded to the default procedure.
    fn handle_message(
        &self,
        hwnd: HWND,
        umsg: u32,
        _wparam: WPARAM,
        lparam: LPARAM,
    ) -> Option<LRESULT> {
        match umsg {
            WM_CREATE => self.on_create(hwnd),
            WM_INPUT => {
                self.on_input(lparam);
                // The default procedure releases the raw input buffer.
                None
            }
            WM_PAINT => {
                self.paint_request.store(true, Ordering::SeqCst);
                None
            }
            WM_CLOSE => {
                self.close_request.store(true, Ordering::SeqCst);
                Some(LRESULT(0))
            }
            WM_NCDESTROY => {
                debug!(wnd_title = %self.title, "Destroying window inner");

                // Our window is being destroyed, so we must clean up our Rc'd
                // handle on the Win32 side.
                errors::clear_last_error();

                let cleared = unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) }
                    .pipe(|val| errors::get_last_err().map(|_| val))
                    .context("Failed to clear Rust window reference from Win32 window data")
                    .function("SetWindowLongPtrW");
                match cleared {
                    Ok(self_) => drop(unsafe { Rc::from_raw(self_ as *const Self) }),
                    Err(e) => error!(error = %e),
                }

                // Clear our window handle now that we're destroyed.
                self.hwnd.set(HWND(0));

                // forward to default procedure too
                None
            }
            _ => None,
        }
    }

    /// C-function Win32 window procedure performs one-time setup of the
    /// structures on the Win32 side to associate our Rust object with the Win32
    /// object.
    extern "system" fn wnd_proc_setup(
        hwnd: HWND,
        umsg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        // If we've received a create event, then we populate an `Rc`'ed
        // reference our rust window type in the user data section of the Win32
        // window.
        if umsg == WM_NCCREATE {
            let create_struct = lparam.0 as *const CREATESTRUCTW;
            // SAFETY:
            // The `CREATESTRUCTW` structure is guaranteed by the Win32 API to be
            // valid if we've received an event of type `WM_NCCREATE`.
            let self_ = unsafe { (*create_struct).lpCreateParams } as *const Self;

            errors::clear_last_error();
            unsafe {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, self_ as _);
            }
            if let Err(e) = errors::get_last_err()
                .context("Failed to store reference to Rust window in Win32 window data")
                .function("SetWindowLongPtrW")
            {
                error!(error = %e);
                return LRESULT(0);
            }

            unsafe {
                SetWindowLongPtrW(hwnd, GWLP_WNDPROC, (Self::wnd_proc_thunk as usize) as isize);
            }
            if let Err(e) = errors::get_last_err()
                .context("Failed to swap Win32 window proc function")
                .function("SetWindowLongPtrW")
            {
                error!(error = %e);
                return LRESULT(0);
            }
        }

        // We _always_ pass our message through to the default window procedure.
        unsafe { DefWindowProcW(hwnd, umsg, wparam, lparam) }
    }

    /// A minimal shim which forwards Win32 window proc messages to our own
    /// type for handling.
    extern "system" fn wnd_proc_thunk(
        hwnd: HWND,
        umsg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        if let Ok(ptr) = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) }
            .pipe(NonZeroIsize::new)
            .context("Failed to setup window messaging")
            .function("GetWindowLongPtrW")
        {
            let self_ = ptr.get() as *const Self;

            unsafe {
                // Add extra retain for the duration of following call
                Rc::increment_strong_count(self_);
                if let Some(result) =
                    Rc::from_raw(self_).handle_message(hwnd, umsg, wparam, lparam)
                {
                    return result;
                }
            }
        }

        unsafe { DefWindowProcW(hwnd, umsg, wparam, lparam) }
    }
}
