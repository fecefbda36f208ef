//! Configuration file handling.
//!
//! Loads booth settings from a TOML file; every field has a default
//! matching the reference hardware, and a missing file yields the full
//! default configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::printer::PrinterConfig;

/// Booth configuration, loaded from `pilaroid.toml` (or a custom path via
/// `--config`).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub printer: PrinterSection,
    #[serde(default)]
    pub button: ButtonSection,
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub power: PowerSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PrinterSection {
    pub vendor_id: u16,
    pub product_id: u16,
    pub timeout_ms: u64,
    pub max_width: u32,
    pub enhance_factor: f32,
}

impl Default for PrinterSection {
    fn default() -> Self {
        PrinterSection {
            vendor_id: crate::VENDOR_ID,
            product_id: crate::PRODUCT_ID,
            timeout_ms: 5000,
            max_width: crate::PRINT_WIDTH,
            enhance_factor: 1.8,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ButtonSection {
    /// Sysfs value file of the shutter button GPIO.
    pub gpio_value: PathBuf,
    pub poll_interval_ms: u64,
    pub hold_secs: u64,
    /// Button wired to ground with the pull-up enabled reads low when
    /// pressed.
    pub active_low: bool,
}

impl Default for ButtonSection {
    fn default() -> Self {
        ButtonSection {
            gpio_value: PathBuf::from("/sys/class/gpio/gpio17/value"),
            poll_interval_ms: 100,
            hold_secs: 10,
            active_low: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CameraSection {
    pub command: String,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraSection {
    fn default() -> Self {
        CameraSection {
            command: "libcamera-still".to_string(),
            width: 1080,
            height: 1080,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub counter_file: PathBuf,
    pub photo_dir: PathBuf,
    /// Optional file of one-liners shown during boot, one per line.
    pub startup_lines: Option<PathBuf>,
}

impl Default for PathsSection {
    fn default() -> Self {
        PathsSection {
            counter_file: PathBuf::from("shuttercount.txt"),
            photo_dir: PathBuf::from("."),
            startup_lines: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PowerSection {
    /// Command run after a long press, e.g. `sudo shutdown now`. When unset
    /// the process simply exits.
    pub shutdown_command: Option<String>,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Returns the default config if the file doesn't exist and an error if
    /// it exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => PathBuf::from("pilaroid.toml"),
        };

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| Error::ConfigIo {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse { path, source })
    }

    pub fn printer_config(&self) -> PrinterConfig {
        PrinterConfig {
            vendor_id: self.printer.vendor_id,
            product_id: self.printer.product_id,
            timeout: Duration::from_millis(self.printer.timeout_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.button.poll_interval_ms)
    }

    pub fn hold_threshold(&self) -> Duration {
        Duration::from_secs(self.button.hold_secs)
    }
}
