//! Camera capture collaborator.
//!
//! The camera is driven as an external process that leaves a JPEG at the
//! requested path. The workflow only depends on the [`Capturer`] trait, so a
//! native camera driver can replace the subprocess later without touching
//! the gesture handling.

use log::{debug, info};
use std::path::Path;
use std::process::Command;

use crate::error::Error;

/// Capability interface for taking a photo.
pub trait Capturer {
    /// Produce a photo at `output`. Success means exit code 0 with the file
    /// present at the given path.
    fn capture(&self, output: &Path) -> Result<(), Error>;
}

/// Capture via a still-camera command such as `libcamera-still`.
pub struct StillCommand {
    command: String,
    width: u32,
    height: u32,
}

impl StillCommand {
    pub fn new(command: String, width: u32, height: u32) -> Self {
        StillCommand {
            command,
            width,
            height,
        }
    }
}

impl Capturer for StillCommand {
    fn capture(&self, output: &Path) -> Result<(), Error> {
        debug!("running {} -> {}", self.command, output.display());
        let status = Command::new(&self.command)
            .arg("-o")
            .arg(output)
            .arg("--autofocus-on-capture")
            .args(["--width", &self.width.to_string()])
            .args(["--height", &self.height.to_string()])
            .arg("--nopreview")
            .arg("--immediate")
            .status()
            .map_err(|source| Error::CaptureSpawn {
                command: self.command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(Error::CaptureFailed { status });
        }
        info!("captured {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_command_reports_spawn_failure() {
        let capturer = StillCommand::new("/nonexistent/capture-cmd".to_string(), 1080, 1080);
        let err = capturer.capture(&PathBuf::from("/tmp/out.jpg")).unwrap_err();
        assert!(matches!(err, Error::CaptureSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_exit_status() {
        // `false` ignores its arguments and exits non-zero.
        let capturer = StillCommand::new("false".to_string(), 1080, 1080);
        let err = capturer.capture(&PathBuf::from("/tmp/out.jpg")).unwrap_err();
        match err {
            Error::CaptureFailed { status } => assert!(!status.success()),
            other => panic!("expected CaptureFailed, got {:?}", other),
        }
    }
}
