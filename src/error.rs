//! Unified error type for blesync.
//!
//! No `alloc` - all error variants carry only fixed-size data, so the enum
//! stays `Copy`. With the `defmt` feature it implements `defmt::Format`.

use core::fmt;

use crate::ble::Status;

/// Outcome of a blocking client operation that did not succeed.
///
/// Submission failures (`Submit`) never waited for the controller; every
/// other variant is either a local precondition or what the controller
/// reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The bus refused the command; nothing was awaited.
    Submit(SubmitError),

    /// No matching response arrived within the response timeout.
    Timeout,

    /// Connection-scoped operation called while disconnected.
    WrongState,

    /// Payload longer than the controller accepts.
    PayloadTooLarge { len: usize, max: usize },

    /// The controller processed the command and reported a failure.
    Controller(Status),
}

/// Why the bus could not accept a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubmitError {
    /// Transport not brought up, or the service is not open.
    NotReady,
    /// Outbound queue has no room.
    QueueFull,
    /// Raw transport error code.
    Raw(i32),
}

impl Error {
    /// Collapse both failure levels into a single status code.
    pub fn status(&self) -> Status {
        match self {
            Error::Submit(_) => Status::Error,
            Error::Timeout => Status::Timeout,
            Error::WrongState => Status::WrongState,
            Error::PayloadTooLarge { .. } => Status::InvalidParameter,
            Error::Controller(status) => *status,
        }
    }
}

// Convenience conversions

impl From<SubmitError> for Error {
    fn from(e: SubmitError) -> Self {
        Error::Submit(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Submit(e) => write!(f, "command submission failed: {e}"),
            Error::Timeout => f.write_str("timed out waiting for controller response"),
            Error::WrongState => f.write_str("operation requires an active connection"),
            Error::PayloadTooLarge { len, max } => {
                write!(f, "payload of {len} bytes exceeds limit of {max}")
            }
            Error::Controller(status) => write!(f, "controller reported {status:?}"),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::NotReady => f.write_str("bus not ready"),
            SubmitError::QueueFull => f.write_str("bus queue full"),
            SubmitError::Raw(code) => write!(f, "transport error {code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_flattens_both_levels() {
        assert_eq!(Error::Submit(SubmitError::QueueFull).status(), Status::Error);
        assert_eq!(Error::Timeout.status(), Status::Timeout);
        assert_eq!(Error::WrongState.status(), Status::WrongState);
        assert_eq!(
            Error::PayloadTooLarge { len: 40, max: 31 }.status(),
            Status::InvalidParameter
        );
        assert_eq!(
            Error::Controller(Status::Other(0x0105)).status(),
            Status::Other(0x0105)
        );
    }

    #[test]
    fn submit_error_converts() {
        let err: Error = SubmitError::NotReady.into();
        assert_eq!(err, Error::Submit(SubmitError::NotReady));
    }

    #[test]
    fn display_mentions_limits() {
        let text = std::format!("{}", Error::PayloadTooLarge { len: 40, max: 31 });
        assert!(text.contains("40"));
        assert!(text.contains("31"));
    }
}
