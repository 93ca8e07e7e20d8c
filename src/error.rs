//! Custom error types for the adaptor.
//!
//! The vendor library reports failures as a non-zero 32-bit status code and exports
//! no message-decoding entry point, so [`CcsError::Driver`] carries the raw code
//! only. Parameter validation fails before the driver is touched; every failure is
//! fatal to the current operation.

use crate::status::DeviceStatus;
use std::time::Duration;
use thiserror::Error;

/// Convenience alias for results using the adaptor error type.
pub type CcsResult<T> = std::result::Result<T, CcsError>;

/// Errors produced by the CCS100 adaptor.
#[derive(Error, Debug)]
pub enum CcsError {
    /// Non-zero status code returned by a TLCCS driver call.
    #[error("TLCCS driver error {code}")]
    Driver {
        /// Raw status code reported by the driver.
        code: i32,
    },

    /// Failure while loading the configuration sources.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Semantic configuration error caught during validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// File or terminal I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested integration time is outside the supported range.
    #[error("integration time {requested} s out of range (1e-5 to 60 s)")]
    IntegrationTimeOutOfRange {
        /// The rejected value, in seconds.
        requested: f64,
    },

    /// Integration time read back from the device differs from the request.
    #[error(
        "integration time readback {actual} s differs from requested {requested} s by more than 0.01 s"
    )]
    IntegrationTimeMismatch {
        /// Value passed to the driver, in seconds.
        requested: f64,
        /// Value the device reported afterwards, in seconds.
        actual: f64,
    },

    /// The device is not armed for a software-triggered scan.
    #[error("spectrometer not ready for a software-triggered scan (status {0})")]
    NotReady(DeviceStatus),

    /// The scan did not reach the ready state before the deadline.
    #[error("scan did not complete within {waited:?}")]
    ScanTimeout {
        /// How long the poll loop waited before giving up.
        waited: Duration,
    },

    /// Operation attempted after the instrument handle was released.
    #[error("instrument handle already released")]
    NotConnected,

    /// Functionality compiled out of this build.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(&'static str),
}

impl From<figment::Error> for CcsError {
    fn from(err: figment::Error) -> Self {
        CcsError::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = CcsError::Driver { code: -1073807343 };
        assert_eq!(err.to_string(), "TLCCS driver error -1073807343");
    }

    #[test]
    fn test_out_of_range_display() {
        let err = CcsError::IntegrationTimeOutOfRange { requested: 61.0 };
        assert!(err.to_string().contains("61"));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_not_ready_carries_status() {
        let err = CcsError::NotReady(DeviceStatus::from_raw(0x0004));
        assert!(err.to_string().contains("scan_in_progress"));
    }
}
