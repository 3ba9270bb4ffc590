//! Raw mouse input: registration and decoding.

mod device;
mod event;

pub use device::*;
pub use event::*;
