//! USB transport for the thermal printer.
//!
//! Discovers the printer by its vendor/product pair, detaches any in-kernel
//! driver, claims the interface exclusively and selects the first bulk OUT
//! endpoint found while walking the configuration/interface/endpoint
//! hierarchy. The protocol is write-only; every transfer is bounded by the
//! configured timeout and never retried.

use log::{debug, info};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, Direction, TransferType, UsbContext};
use std::time::Duration;

use crate::error::Error;
use crate::protocol::{self, PrintJob, PAPER_FEED};
use crate::raster::RasterImage;

/// Location of an endpoint within the device descriptor tree.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    config: u8,
    iface: u8,
    setting: u8,
    address: u8,
}

/// USB identity and transfer timeout for the printer.
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    pub timeout: Duration,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        PrinterConfig {
            vendor_id: crate::VENDOR_ID,
            product_id: crate::PRODUCT_ID,
            timeout: Duration::from_secs(5),
        }
    }
}

/// An open, claimed printer with its bulk OUT endpoint resolved.
pub struct Printer {
    handle: DeviceHandle<Context>,
    endpoint_out: Endpoint,
    timeout: Duration,
}

impl Printer {
    /// Open the printer matching the configured vendor/product pair.
    ///
    /// No device match yields [`Error::DeviceOffline`]; a matched device
    /// without a bulk OUT endpoint yields [`Error::MissingEndpoint`].
    pub fn open(config: &PrinterConfig) -> Result<Self, Error> {
        let mut context = Context::new()?;
        let (mut device, device_desc, mut handle) =
            Self::open_device(&mut context, config.vendor_id, config.product_id)?;

        let endpoint_out =
            match Self::find_endpoint(&mut device, &device_desc, Direction::Out, TransferType::Bulk)
            {
                Some(endpoint) => endpoint,
                None => return Err(Error::MissingEndpoint),
            };

        // The kernel usblp driver claims these printers on Linux; it has to
        // be detached before the interface can be claimed exclusively.
        handle.set_auto_detach_kernel_driver(true)?;
        let has_kernel_driver = matches!(handle.kernel_driver_active(endpoint_out.iface), Ok(true));
        info!("kernel driver active: {}", has_kernel_driver);

        handle.set_active_configuration(endpoint_out.config)?;
        handle.claim_interface(endpoint_out.iface)?;
        handle.set_alternate_setting(endpoint_out.iface, endpoint_out.setting)?;

        debug!("claimed bulk OUT endpoint {:#04x}", endpoint_out.address);

        Ok(Printer {
            handle,
            endpoint_out,
            timeout: config.timeout,
        })
    }

    fn open_device(
        context: &mut Context,
        vid: u16,
        pid: u16,
    ) -> Result<(Device<Context>, DeviceDescriptor, DeviceHandle<Context>), Error> {
        let devices = context.devices()?;

        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("skipping device without descriptor: {:?}", err);
                    continue;
                }
            };

            if device_desc.vendor_id() == vid && device_desc.product_id() == pid {
                match device.open() {
                    Ok(handle) => return Ok((device, device_desc, handle)),
                    Err(err) => {
                        debug!("failed to open {:04x}:{:04x}: {:?}", vid, pid, err);
                        continue;
                    }
                }
            }
        }

        Err(Error::DeviceOffline {
            vendor_id: vid,
            product_id: pid,
        })
    }

    fn find_endpoint(
        device: &mut Device<Context>,
        device_desc: &DeviceDescriptor,
        direction: Direction,
        transfer_type: TransferType,
    ) -> Option<Endpoint> {
        for n in 0..device_desc.num_configurations() {
            let config_desc = match device.config_descriptor(n) {
                Ok(c) => c,
                Err(_) => continue,
            };
            for interface in config_desc.interfaces() {
                for interface_desc in interface.descriptors() {
                    for endpoint_desc in interface_desc.endpoint_descriptors() {
                        if endpoint_desc.direction() == direction
                            && endpoint_desc.transfer_type() == transfer_type
                        {
                            return Some(Endpoint {
                                config: config_desc.number(),
                                iface: interface_desc.interface_number(),
                                setting: interface_desc.setting_number(),
                                address: endpoint_desc.address(),
                            });
                        }
                    }
                }
            }
        }
        None
    }

    fn write(&self, buf: &[u8]) -> Result<(), Error> {
        match self
            .handle
            .write_bulk(self.endpoint_out.address, buf, self.timeout)
        {
            Ok(n) if n == buf.len() => Ok(()),
            Ok(n) => {
                debug!("short write: {} of {} bytes accepted", n, buf.len());
                Err(Error::ShortWrite {
                    written: n,
                    expected: buf.len(),
                })
            }
            Err(rusb::Error::Timeout) => Err(Error::WriteTimeout(self.timeout)),
            Err(e) => Err(Error::Usb(e)),
        }
    }

    /// Transmit a framed job as a single bulk transfer.
    pub fn send(&self, job: &PrintJob) -> Result<(), Error> {
        debug!(
            "sending print job: {} rows of {} bytes",
            job.row_count(),
            job.row_bytes()
        );
        self.write(&job.to_bytes())
    }

    /// Transmit the trailing double line feed as its own transfer.
    pub fn feed(&self) -> Result<(), Error> {
        self.write(&PAPER_FEED)
    }
}

/// Capability interface for printing a raster, so the capture workflow can
/// be exercised without hardware.
pub trait PhotoPrinter {
    fn print(&mut self, image: &RasterImage) -> Result<(), Error>;
}

/// The real provider: opens the USB device per job, frames the raster and
/// sends job then feed.
pub struct UsbPhotoPrinter {
    config: PrinterConfig,
}

impl UsbPhotoPrinter {
    pub fn new(config: PrinterConfig) -> Self {
        UsbPhotoPrinter { config }
    }
}

impl PhotoPrinter for UsbPhotoPrinter {
    fn print(&mut self, image: &RasterImage) -> Result<(), Error> {
        let printer = Printer::open(&self.config)?;
        let job = protocol::frame(image);
        printer.send(&job)?;
        printer.feed()?;
        info!(
            "printed {}x{} raster ({} payload bytes)",
            image.width(),
            image.height(),
            job.payload().len()
        );
        Ok(())
    }
}
