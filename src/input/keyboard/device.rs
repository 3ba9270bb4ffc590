//! Keyboard device registration.

use ::std::rc::Rc;

use crate::{
    errors::Result,
    input::{keyboard::KeyboardInput, raw::RawInputRecord, registration::DeviceRegistration},
    platform::{DeviceClass, RawInputApi, RegistrationFlags, WindowHandle},
};

/// Raw keyboard input for one window.
///
/// While a [`Keyboard`] is alive, the OS delivers raw keyboard records to its
/// window. Dropping it (or calling [`close`]) stops delivery. There can only
/// ever be one owner of the registration; moving a [`Keyboard`] moves the
/// registration with it.
///
/// [`close`]: Self::close
#[derive(Debug)]
pub struct Keyboard {
    registration: DeviceRegistration,
}

impl Keyboard {
    /// Suppress system hotkey handling so every key combination reaches the
    /// app.
    pub const DEFAULT_FLAGS: RegistrationFlags = RegistrationFlags::NO_HOTKEYS;

    /// Registers for raw keyboard input on `window` with [`DEFAULT_FLAGS`].
    ///
    /// [`DEFAULT_FLAGS`]: Self::DEFAULT_FLAGS
    pub fn new(api: Rc<dyn RawInputApi>, window: WindowHandle) -> Result<Self> {
        Self::with_flags(api, window, Self::DEFAULT_FLAGS)
    }

    pub fn with_flags(
        api: Rc<dyn RawInputApi>,
        window: WindowHandle,
        flags: RegistrationFlags,
    ) -> Result<Self> {
        DeviceRegistration::new(api, DeviceClass::KEYBOARD, flags, window)
            .map(|registration| Self { registration })
    }

    /// The window the keyboard is registered to, or `None` once closed.
    pub fn window(&self) -> Option<WindowHandle> {
        self.registration.window()
    }

    /// Decodes `record` if it came from a keyboard.
    pub fn handle(&mut self, record: &RawInputRecord) -> Option<KeyboardInput> {
        KeyboardInput::decode(record)
    }

    /// Unregisters from the OS. Further calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        self.registration.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::raw::{RawKeyboard, RawMouse},
        platform::{testing::MockPlatform, RegistrationRequest},
    };

    use ::pretty_assertions::assert_eq;

    fn window() -> WindowHandle {
        WindowHandle::new(0x10).unwrap()
    }

    #[test]
    fn test_registers_without_hotkeys() {
        let platform = Rc::new(MockPlatform::default());
        let keyboard = Keyboard::new(platform.clone(), window()).unwrap();

        assert_eq!(keyboard.window(), Some(window()));
        assert_eq!(
            platform.adds(),
            vec![RegistrationRequest::add(
                DeviceClass::KEYBOARD,
                RegistrationFlags::NO_HOTKEYS,
                window()
            )]
        );
        assert!(platform.removes().is_empty());
    }

    /// Every successful registration is matched by exactly one removal with
    /// no target window.
    #[test]
    fn test_drop_unregisters_once() {
        let platform = Rc::new(MockPlatform::default());
        drop(Keyboard::new(platform.clone(), window()).unwrap());

        assert_eq!(
            platform.removes(),
            vec![RegistrationRequest::remove(DeviceClass::KEYBOARD)]
        );
        assert_eq!(platform.removes()[0].target(), None);
    }

    #[test]
    fn test_close_then_drop_unregisters_once() {
        let platform = Rc::new(MockPlatform::default());
        let mut keyboard = Keyboard::new(platform.clone(), window()).unwrap();

        keyboard.close().unwrap();
        keyboard.close().unwrap();
        assert_eq!(keyboard.window(), None);
        drop(keyboard);

        assert_eq!(platform.removes().len(), 1);
    }

    /// Moving the keyboard moves the registration; only the final owner
    /// unregisters.
    #[test]
    fn test_move_transfers_registration() {
        let platform = Rc::new(MockPlatform::default());
        let keyboard = Keyboard::new(platform.clone(), window()).unwrap();

        let moved = vec![keyboard];
        assert!(platform.removes().is_empty());
        drop(moved);

        assert_eq!(platform.adds().len(), 1);
        assert_eq!(platform.removes().len(), 1);
    }

    #[test]
    fn test_registration_failure_is_reported_and_nothing_is_removed() {
        let platform = Rc::new(MockPlatform::default());
        platform.fail_registration_of(DeviceClass::KEYBOARD);

        let err = Keyboard::new(platform.clone(), window()).unwrap_err();
        assert_eq!(err.code(), crate::platform::testing::ACCESS_DENIED);
        assert!(platform.registrations.borrow().is_empty());
    }

    #[test]
    fn test_handle_only_accepts_keyboard_records() {
        let platform = Rc::new(MockPlatform::default());
        let mut keyboard = Keyboard::new(platform, window()).unwrap();

        let key = RawInputRecord::keyboard(
            0x1,
            RawKeyboard {
                make_code: 0x1E,
                vkey: 0x41,
                ..Default::default()
            },
        );
        assert!(keyboard.handle(&key).is_some_and(|input| input.is_down()));
        assert_eq!(
            keyboard.handle(&RawInputRecord::mouse(0x1, RawMouse::default())),
            None
        );
    }
}
