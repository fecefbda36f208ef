//! Pilaroid photobooth
//!
//! This crate drives a button-triggered photobooth: a short press of the
//! shutter button captures a photo and prints it on a receipt-style thermal
//! printer over USB, a ten-second hold powers the booth down, and a pair of
//! animated eyes wanders across the status display in between.
//!
//! # Example
//!
//! ```rust,no_run
//! use pilaroid::{frame, Printer, PrinterConfig};
//!
//! let raster = pilaroid::encode("photo.jpg", pilaroid::PRINT_WIDTH, 1.8).unwrap();
//! let printer = Printer::open(&PrinterConfig::default()).unwrap();
//! printer.send(&frame(&raster)).unwrap();
//! printer.feed().unwrap();
//! ```

mod animation;
mod booth;
mod capture;
mod config;
mod counter;
mod display;
mod error;
mod gesture;
mod printer;
mod protocol;
mod raster;

pub use crate::{
    booth::{run_appliance, Booth, BoothOptions},
    capture::{Capturer, StillCommand},
    config::Config,
    counter::{photo_filename, ShutterCounter},
    display::{spawn_renderer, DisplayHandle, DisplaySink, LogDisplay},
    error::Error,
    gesture::{
        ButtonInput, GestureEvent, GestureStateMachine, SysfsButton, HOLD_THRESHOLD, POLL_INTERVAL,
    },
    printer::{PhotoPrinter, Printer, PrinterConfig, UsbPhotoPrinter},
    protocol::{decode_header, frame, PrintJob, PAPER_FEED, RASTER_MODE},
    raster::{encode, encode_image, RasterImage},
};

/// Print head width in dots for the 58 mm thermal printer.
///
/// Rasters are encoded to exactly this many columns; at one bit per dot a
/// row packs into 48 bytes (384 / 8 = 48).
pub const PRINT_WIDTH: u32 = 384;

/// USB vendor id of the thermal printer.
pub const VENDOR_ID: u16 = 0x0483;

/// USB product id of the thermal printer.
pub const PRODUCT_ID: u16 = 0x5840;
