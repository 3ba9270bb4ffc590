// The feature flag `stdio` can be used to conditionally disable the windows
// subsystem which allows program output to be sent to the console which
// launched the app. Useful mostly for debugging.
#![cfg_attr(not(feature = "stdio"), windows_subsystem = "windows")]

use ::geoms::d2::Size2D;
use ::rawpump::{
    config::InputConfig,
    input::{keyboard::KeyboardInput, mouse::MouseInput, InputEvent},
    simulation::InputSink,
    window::Builder,
};
use ::std::time::{Duration, Instant};
use ::tracing::info;
use ::tracing_subscriber::{fmt, prelude::*, EnvFilter};
use ::windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, PeekMessageW, PostQuitMessage, TranslateMessage, MSG, PM_REMOVE, WM_QUIT,
};

const TICK: Duration = Duration::from_millis(16);

/// Stands in for game logic: logs key presses and accumulates mouse motion.
#[derive(Default)]
struct Logger {
    cursor: (i64, i64),
}

impl InputSink for Logger {
    fn on_mouse(&mut self, event: &InputEvent<MouseInput>) {
        if event.data.is_relative() {
            self.cursor.0 += i64::from(event.data.last_x);
            self.cursor.1 += i64::from(event.data.last_y);
        }
    }

    fn on_keyboard(&mut self, event: &InputEvent<KeyboardInput>) {
        if event.data.is_down() {
            info!(at = %event.create_time, cursor = ?self.cursor, "{}", event.data);
        }
    }
}

pub fn main() {
    ::tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Build and display a new window. Registration failures have already
    // been shown to the user by the time `build` returns.
    let Ok(main_window) = Builder::new()
        .with_size(Size2D {
            width: 1280,
            height: 720,
        })
        .with_title("Hello, Redmond!")
        .with_input(InputConfig::new())
        .build()
    else {
        return;
    };

    // Pump our Win32 message loop without blocking, then run one simulation
    // tick with whatever input arrived since the last one.
    let mut sink = Logger::default();
    let mut msg = MSG::default();
    let mut last_tick = Instant::now();
    loop {
        while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
            if msg.message == WM_QUIT {
                return;
            }
            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        let now = Instant::now();
        main_window.step(now - last_tick, &mut sink);
        last_tick = now;

        if main_window.is_requesting_paint() {
            // paint as needed (Direct2D, Direct3D, GDI, etc.)
            main_window.clear_paint_request();
        }

        if main_window.is_requesting_close() {
            main_window.clear_close_request();
            unsafe {
                PostQuitMessage(0);
            }
        }

        ::std::thread::sleep(TICK.saturating_sub(last_tick.elapsed()));
    }
}
