//! Crate-specific error and result types, plus common conversions.

use ::std::fmt::{self, Display};

/// Result type returned by functions that call into the OS input and window
/// APIs.
pub type Result<T> = ::std::result::Result<T, Error>;

/// A raw OS error code (an `HRESULT` on Windows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i32);

impl Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// The error reported by the operating system itself: a code plus whatever
/// system message string could be gathered at the point of failure.
#[derive(Clone, Debug, PartialEq, Eq, ::thiserror::Error)]
#[error("{message} ({code})")]
pub struct SystemError {
    code: ErrorCode,
    message: String,
}

impl SystemError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(windows)]
impl From<::windows::core::Error> for SystemError {
    fn from(err: ::windows::core::Error) -> Self {
        Self {
            code: ErrorCode(err.code().0),
            message: err.message().to_string_lossy(),
        }
    }
}

/// Error type for functions that call into the OS. The error attempts to
/// pro-actively capture as much context as possible (error codes, system error
/// message strings, the failing function).
#[derive(Clone, Debug)]
pub struct Error {
    /// The underlying system error. Implements [`Display`] to conveniently
    /// print any error codes or system error messages which were gathered at
    /// the point of the error.
    ///
    /// [`Display`]: std::fmt::Display
    underlying_error: SystemError,

    /// The name of the OS API function which failed.
    function: Option<&'static str>,

    /// An optional context information which describes what was happening
    /// at the time error.
    context: Option<String>,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            underlying_error,
            function,
            context,
        } = &self;

        if let Some(context) = context {
            write!(f, "{context}\nCaused by:\n    {underlying_error}")?;
        } else {
            write!(f, "{underlying_error}")?;
        }

        if let Some(function) = function {
            write!(f, " ({function})")?;
        }

        Ok(())
    }
}

impl ::std::error::Error for Error {
    fn source(&self) -> Option<&(dyn ::std::error::Error + 'static)> {
        Some(&self.underlying_error)
    }
}

impl From<SystemError> for Error {
    fn from(underlying_error: SystemError) -> Self {
        Self {
            underlying_error,
            function: None,
            context: None,
        }
    }
}

impl Error {
    /// Returns the underlying OS error code.
    pub fn code(&self) -> ErrorCode {
        self.underlying_error.code()
    }

    /// The name of the OS function which failed, if known.
    pub fn function_name(&self) -> Option<&'static str> {
        self.function
    }
}

/// A crate-private trait which allows context information to be attached to
/// fallible types.
///
/// This is useful to attach high level context information and track which
/// particular OS API function failed, something that might not be obvious
/// when relying on the inner system error alone.
pub(crate) trait Context<T> {
    /// Attach the name of the function which failed to the error as additional
    /// context.
    fn function(self, function: &'static str) -> Result<T>
    where
        Self: Sized;

    /// Attach a context message to a fallible type and return crate error.
    fn context(self, ctx: impl AsRef<str>) -> Result<T>
    where
        Self: Sized;
}

impl<T> Context<T> for Result<T> {
    fn function(mut self, f: &'static str) -> Result<T> {
        if let Err(err) = &mut self {
            err.function = Some(f);
        }
        self
    }

    fn context(mut self, ctx: impl AsRef<str>) -> Result<T> {
        if let Err(err) = &mut self {
            err.context = Some(ctx.as_ref().to_owned());
        }
        self
    }
}

impl<T> Context<T> for ::std::result::Result<T, SystemError> {
    fn function(self, function: &'static str) -> Result<T> {
        self.map_err(|source| Error {
            underlying_error: source,
            context: None,
            function: Some(function),
        })
    }

    fn context(self, ctx: impl AsRef<str>) -> Result<T> {
        self.map_err(|source| Error {
            underlying_error: source,
            context: Some(ctx.as_ref().to_owned()),
            function: None,
        })
    }
}

#[cfg(windows)]
impl<T> Context<T> for ::std::result::Result<T, ::windows::core::Error> {
    fn function(self, function: &'static str) -> Result<T> {
        self.map_err(SystemError::from).function(function)
    }

    fn context(self, ctx: impl AsRef<str>) -> Result<T> {
        self.map_err(SystemError::from).context(ctx)
    }
}

#[cfg(windows)]
impl<T> Context<T> for Option<T> {
    fn function(self, function: &'static str) -> Result<T> {
        self.ok_or_else(|| SystemError::from(::windows::core::Error::from_win32()))
            .function(function)
    }

    fn context(self, ctx: impl AsRef<str>) -> Result<T> {
        self.ok_or_else(|| SystemError::from(::windows::core::Error::from_win32()))
            .context(ctx)
    }
}

/// Gets the last Win32 error by calling [`GetLastError`].
///
/// Returns `Ok` if there is no last error. Otherwise, returns `Err` with an
/// inner error that contains the system error message and code.
///
/// [`GetLastError`]: https://learn.microsoft.com/en-us/windows/win32/api/errhandlingapi/nf-errhandlingapi-getlasterror
#[cfg(windows)]
pub(crate) fn get_last_err() -> Result<()> {
    let last_err = ::windows::core::Error::from_win32();

    if last_err == ::windows::core::Error::OK {
        Ok(())
    } else {
        Err(SystemError::from(last_err).into())
    }
}

/// Clears the last error by setting the system error value to
/// `ERROR_SUCCESS`.
#[cfg(windows)]
pub(crate) fn clear_last_error() {
    unsafe {
        ::windows::Win32::Foundation::SetLastError(::windows::Win32::Foundation::NO_ERROR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::pretty_assertions::assert_eq;

    #[test]
    fn test_display_with_context_and_function() {
        let err = Err::<(), _>(SystemError::new(ErrorCode(0x8007_0005_u32 as i32), "Access is denied."))
            .context("Failed to register keyboard")
            .function("RegisterRawInputDevices")
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to register keyboard\nCaused by:\n    Access is denied. (0x80070005) (RegisterRawInputDevices)"
        );
        assert_eq!(err.code(), ErrorCode(0x8007_0005_u32 as i32));
        assert_eq!(err.function_name(), Some("RegisterRawInputDevices"));
    }

    #[test]
    fn test_display_bare() {
        let err = Error::from(SystemError::new(ErrorCode(5), "Access is denied."));
        assert_eq!(err.to_string(), "Access is denied. (0x00000005)");
    }
}
