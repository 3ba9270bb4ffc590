//! Ownership of a single raw input device class registration.

use ::std::{fmt, rc::Rc};
use ::tracing::{debug, warn};

use crate::{
    errors::{Context, Result},
    platform::{DeviceClass, RawInputApi, RegistrationFlags, RegistrationRequest, WindowHandle},
};

/// A RAII object which owns the OS registration of one device class for one
/// window.
///
/// A registration is either bound to exactly one window, or inert once it has
/// been [`close`]d. Dropping a bound registration removes it. Removal
/// failures on drop are logged and otherwise ignored.
///
/// [`close`]: Self::close
pub(crate) struct DeviceRegistration {
    api: Rc<dyn RawInputApi>,
    class: DeviceClass,
    window: Option<WindowHandle>,
}

impl DeviceRegistration {
    pub(crate) fn new(
        api: Rc<dyn RawInputApi>,
        class: DeviceClass,
        flags: RegistrationFlags,
        window: WindowHandle,
    ) -> Result<Self> {
        debug!(?class, ?flags, window = window.get(), "Register raw input device");

        api.register(&RegistrationRequest::add(class, flags, window))
            .context(format!(
                "Failed to register raw input device (usage page 0x{:02X}, usage 0x{:02X})",
                class.usage_page, class.usage
            ))?;

        Ok(Self {
            api,
            class,
            window: Some(window),
        })
    }

    pub(crate) fn window(&self) -> Option<WindowHandle> {
        self.window
    }

    /// Removes the registration, leaving `self` inert. Closing an inert
    /// registration does nothing.
    pub(crate) fn close(&mut self) -> Result<()> {
        if let Some(window) = self.window.take() {
            debug!(class = ?self.class, window = window.get(), "Unregister raw input device");
            self.api
                .register(&RegistrationRequest::remove(self.class))
                .context("Failed to unregister raw input device")?;
        }
        Ok(())
    }
}

impl fmt::Debug for DeviceRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceRegistration")
            .field("class", &self.class)
            .field("window", &self.window)
            .finish()
    }
}

impl Drop for DeviceRegistration {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e);
        }
    }
}
