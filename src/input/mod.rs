//! Raw keyboard and mouse input: decoding, device registration and queueing.

mod event;
pub mod keyboard;
pub mod mouse;
mod queue;
pub mod raw;
mod registration;

pub use event::*;
pub use queue::*;

use ::tracing::error;

/// Masks an engine-reserved bit out of raw OS flags.
///
/// The normalized flag sets borrow one bit the OS never sets for its own use.
/// Should the OS ever report that bit, the platform has broken its contract:
/// debug builds abort, release builds log and drop the bit rather than let it
/// be mistaken for the engine's own meaning.
pub(crate) fn strip_reserved_bit(device: &'static str, raw_flags: u16, reserved: u16) -> u16 {
    if raw_flags & reserved != 0 {
        error!(
            device,
            raw_flags, reserved, "OS reported a flag bit reserved by the engine"
        );
        debug_assert!(
            false,
            "{device} flags 0x{raw_flags:04X} collide with reserved bit 0x{reserved:04X}"
        );
    }
    raw_flags & !reserved
}
