//! Raw keyboard input: registration and decoding.

mod codes;
mod device;
mod event;

pub use codes::*;
pub use device::*;
pub use event::*;
