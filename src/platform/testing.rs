//! In-memory stand-ins for the OS primitives, recording every call made
//! through them.

use super::{
    Compositor, DeviceClass, FatalErrorReporter, RawInputApi, RawInputHandle, RegistrationRequest,
};
use crate::{
    errors::{ErrorCode, Result, SystemError},
    time::{Clock, MonotonicTimestamp},
};

use ::std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    time::Duration,
};

/// `ERROR_ACCESS_DENIED` as an `HRESULT`.
pub(crate) const ACCESS_DENIED: ErrorCode = ErrorCode(0x8007_0005_u32 as i32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum CompositorCall {
    FullScreen(bool),
    SchedulingHint(bool),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FatalReport {
    pub(crate) title: String,
    pub(crate) code: ErrorCode,
    pub(crate) user_message: String,
}

#[derive(Default)]
pub(crate) struct MockPlatform {
    pub(crate) registrations: RefCell<Vec<RegistrationRequest>>,
    pub(crate) forwarded: RefCell<Vec<Vec<u8>>>,
    pub(crate) compositor_calls: RefCell<Vec<CompositorCall>>,
    pub(crate) reports: RefCell<Vec<FatalReport>>,
    pending: RefCell<HashMap<isize, Vec<u8>>>,
    next_handle: Cell<isize>,
    failing_classes: RefCell<Vec<DeviceClass>>,
    fail_scheduling_hint: Cell<bool>,
    fail_full_screen: Cell<bool>,
}

impl MockPlatform {
    /// Queues a raw record to be read back through the returned handle.
    pub(crate) fn deliver(&self, record: Vec<u8>) -> RawInputHandle {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        self.pending.borrow_mut().insert(handle, record);
        RawInputHandle(handle)
    }

    pub(crate) fn fail_registration_of(&self, class: DeviceClass) {
        self.failing_classes.borrow_mut().push(class);
    }

    pub(crate) fn fail_scheduling_hint(&self, fail: bool) {
        self.fail_scheduling_hint.set(fail);
    }

    pub(crate) fn fail_full_screen(&self, fail: bool) {
        self.fail_full_screen.set(fail);
    }

    pub(crate) fn adds(&self) -> Vec<RegistrationRequest> {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| !r.is_removal())
            .copied()
            .collect()
    }

    pub(crate) fn removes(&self) -> Vec<RegistrationRequest> {
        self.registrations
            .borrow()
            .iter()
            .filter(|r| r.is_removal())
            .copied()
            .collect()
    }

    fn denied(&self, message: &str) -> Result<()> {
        Err(SystemError::new(ACCESS_DENIED, message).into())
    }
}

impl RawInputApi for MockPlatform {
    fn register(&self, request: &RegistrationRequest) -> Result<()> {
        if !request.is_removal() && self.failing_classes.borrow().contains(&request.class()) {
            return self.denied("Access is denied.");
        }
        self.registrations.borrow_mut().push(*request);
        Ok(())
    }

    fn read(&self, handle: RawInputHandle, buf: &mut [u8]) -> Option<usize> {
        let record = self.pending.borrow_mut().remove(&handle.0)?;
        let dest = buf.get_mut(..record.len())?;
        dest.copy_from_slice(&record);
        Some(record.len())
    }

    fn forward_unhandled(&self, record: &[u8]) {
        self.forwarded.borrow_mut().push(record.to_vec());
    }
}

impl Compositor for MockPlatform {
    fn set_full_screen(&self, full_screen: bool) -> Result<()> {
        if self.fail_full_screen.get() {
            return self.denied("The display mode could not be changed.");
        }
        self.compositor_calls
            .borrow_mut()
            .push(CompositorCall::FullScreen(full_screen));
        Ok(())
    }

    fn set_scheduling_hint(&self, enabled: bool) -> Result<()> {
        self.compositor_calls
            .borrow_mut()
            .push(CompositorCall::SchedulingHint(enabled));
        if self.fail_scheduling_hint.get() {
            return self.denied("The compositor declined the request.");
        }
        Ok(())
    }
}

impl FatalErrorReporter for MockPlatform {
    fn report(&self, title: &str, code: ErrorCode, user_message: &str) {
        self.reports.borrow_mut().push(FatalReport {
            title: title.to_owned(),
            code,
            user_message: user_message.to_owned(),
        });
    }
}

/// A [`Clock`] that only moves when told to.
#[derive(Default)]
pub(crate) struct ManualClock(Cell<Duration>);

impl ManualClock {
    pub(crate) fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> MonotonicTimestamp {
        MonotonicTimestamp::from_elapsed(self.0.get())
    }
}
