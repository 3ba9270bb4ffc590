//! Raw keyboard and mouse input for a real-time simulation loop.
//!
//! Input arrives from the OS as raw device records delivered to a window. The
//! [`dispatch::WindowInputDispatcher`] decodes each record into a normalized
//! [`input::InputEvent`] stamped with a monotonic timestamp and appends it to
//! a per-device [`input::InputQueue`]. Once per tick, a
//! [`simulation::SimulationStep`] drains both queues in arrival order.
//!
//! Everything above [`platform`] is OS independent. On Windows, [`window`]
//! wires the pipeline into a Win32 window.

pub mod config;
pub mod dispatch;
pub mod display;
pub mod errors;
pub mod input;
pub mod platform;
pub mod simulation;
pub mod time;
#[cfg(windows)]
pub mod window;
