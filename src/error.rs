//! Error types for the photobooth pipeline.
//!
//! This module defines all possible errors that can occur between pressing
//! the shutter button and the printed photo leaving the printer: USB
//! transport, image encoding, the capture subprocess and the ambient
//! configuration/counter plumbing.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Main error type for photobooth operations.
///
/// Every error raised by the capture-and-print workflow is reported on the
/// display and in the log; none of them terminate the appliance.
#[derive(Error, Debug)]
pub enum Error {
    /// USB communication error.
    ///
    /// Wraps underlying rusb errors for device communication issues
    /// or permission problems.
    #[error(transparent)]
    Usb(#[from] rusb::Error),

    /// Printer device is not connected or not responding.
    ///
    /// No attached USB device matches the configured vendor/product pair.
    #[error("printer {vendor_id:04x}:{product_id:04x} not found, check connection")]
    DeviceOffline { vendor_id: u16, product_id: u16 },

    /// The device matched but exposes no bulk OUT endpoint.
    #[error("printer has no bulk OUT endpoint")]
    MissingEndpoint,

    /// A bulk write did not complete within the configured timeout.
    #[error("bulk write timed out after {0:?}")]
    WriteTimeout(Duration),

    /// The device accepted fewer bytes than were supplied.
    #[error("short bulk write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },

    /// The source photo could not be decoded.
    #[error("could not read source image {path}")]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The capture subprocess could not be spawned at all.
    #[error("could not launch capture command `{command}`")]
    CaptureSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The capture subprocess ran but exited with a failure status.
    #[error("capture command failed with {status}")]
    CaptureFailed { status: ExitStatus },

    /// The shutter counter file could not be written.
    #[error("could not persist shutter count to {path}")]
    CounterWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but could not be read.
    #[error("could not read config file {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but is not valid TOML.
    #[error("could not parse config file {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The button input level could not be sampled.
    #[error("could not read button input {path}")]
    ButtonIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
