//! Booth orchestration.
//!
//! Wires the collaborators together and runs the two long-lived tasks: the
//! gesture loop polling the shutter button and the idle animation redrawing
//! the display. Both share only the display channel and the shutdown flag;
//! the flag is the single way the appliance stops, set by a long press or
//! by Ctrl-C.

use log::{debug, error, info, warn};
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::animation;
use crate::capture::{Capturer, StillCommand};
use crate::config::Config;
use crate::counter::{photo_filename, ShutterCounter};
use crate::display::{spawn_renderer, DisplayHandle, LogDisplay};
use crate::error::Error;
use crate::gesture::{ButtonInput, GestureEvent, GestureStateMachine, SysfsButton};
use crate::printer::{PhotoPrinter, UsbPhotoPrinter};
use crate::raster;

/// Settings the gesture loop needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct BoothOptions {
    pub photo_dir: PathBuf,
    pub max_width: u32,
    pub enhance_factor: f32,
    pub poll_interval: Duration,
    pub hold_threshold: Duration,
    pub shutdown_command: Option<String>,
}

impl BoothOptions {
    pub fn from_config(config: &Config) -> Self {
        BoothOptions {
            photo_dir: config.paths.photo_dir.clone(),
            max_width: config.printer.max_width,
            enhance_factor: config.printer.enhance_factor,
            poll_interval: config.poll_interval(),
            hold_threshold: config.hold_threshold(),
            shutdown_command: config.power.shutdown_command.clone(),
        }
    }
}

/// The gesture loop and its collaborators.
pub struct Booth<B, C, P> {
    options: BoothOptions,
    button: B,
    capturer: C,
    printer: P,
    counter: ShutterCounter,
    display: DisplayHandle,
    machine: GestureStateMachine,
    shutdown: Arc<AtomicBool>,
}

impl<B, C, P> Booth<B, C, P>
where
    B: ButtonInput,
    C: Capturer,
    P: PhotoPrinter,
{
    pub fn new(
        options: BoothOptions,
        button: B,
        capturer: C,
        printer: P,
        counter: ShutterCounter,
        display: DisplayHandle,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let machine = GestureStateMachine::new(options.hold_threshold);
        Booth {
            options,
            button,
            capturer,
            printer,
            counter,
            display,
            machine,
            shutdown,
        }
    }

    /// Poll the button until a long press or the shutdown flag stops us.
    ///
    /// Every print-pipeline error is reported on the display and in the log
    /// and the loop keeps polling; only the long press terminates.
    pub fn run(mut self) {
        info!("watching shutter button");
        while !self.shutdown.load(Ordering::SeqCst) {
            let pressed = match self.button.is_pressed() {
                Ok(p) => p,
                Err(e) => {
                    warn!("button sample failed: {}", e);
                    thread::sleep(self.options.poll_interval);
                    continue;
                }
            };

            match self.machine.sample(pressed, Instant::now()) {
                Some(GestureEvent::ShortPress(held)) => {
                    debug!("short press ({:?})", held);
                    self.handle_short_press();
                }
                Some(GestureEvent::LongPress(held)) => {
                    debug!("long press ({:?})", held);
                    self.handle_long_press();
                    break;
                }
                None => {}
            }

            thread::sleep(self.options.poll_interval);
        }
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn handle_short_press(&mut self) {
        match self.capture_and_print() {
            Ok(path) => {
                info!("printed {}", path.display());
                self.display.show("Capture complete");
            }
            Err(e) => {
                error!("capture-and-print failed: {}", e);
                self.display.show(format!("Error: {}", e));
            }
        }
    }

    /// Reserve a counter value, capture, commit, encode and print.
    ///
    /// The counter is committed only after the capture collaborator
    /// succeeds, so a failed capture does not burn a number.
    fn capture_and_print(&mut self) -> Result<PathBuf, Error> {
        self.display.show("Capturing a memory!");

        let count = self.counter.next();
        let path = self.options.photo_dir.join(photo_filename(count));
        self.capturer.capture(&path)?;
        self.counter.commit(count)?;
        self.display.show(format!("Photo saved as {}", path.display()));

        let raster = raster::encode(&path, self.options.max_width, self.options.enhance_factor)?;
        self.printer.print(&raster)?;
        Ok(path)
    }

    fn handle_long_press(&mut self) {
        info!("long press, powering down");
        self.display.show("disabling power usage");
        self.display.show("Shutting down...");
        self.shutdown.store(true, Ordering::SeqCst);

        if let Some(cmd) = &self.options.shutdown_command {
            match Command::new("sh").arg("-c").arg(cmd).status() {
                Ok(status) if status.success() => {}
                Ok(status) => warn!("shutdown command exited with {}", status),
                Err(e) => warn!("could not run shutdown command: {}", e),
            }
        }
    }
}

/// Show a handful of random one-liners from the startup file, if present.
fn startup_banter(display: &DisplayHandle, path: Option<&PathBuf>, shutdown: &AtomicBool) {
    let path = match path {
        Some(p) => p,
        None => return,
    };
    let lines: Vec<String> = match std::fs::read_to_string(path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(e) => {
            warn!("no startup lines at {}: {}", path.display(), e);
            return;
        }
    };
    if lines.is_empty() {
        return;
    }

    let mut rng = rand::thread_rng();
    for _ in 0..8 {
        if shutdown.load(Ordering::SeqCst) {
            return;
        }
        if let Some(line) = lines.choose(&mut rng) {
            display.show(line.clone());
        }
        thread::sleep(Duration::from_millis(400));
    }
}

/// Run the full appliance with the hardware collaborators.
///
/// Blocks until a long press or Ctrl-C, then stops the animation and the
/// display renderer cooperatively.
pub fn run_appliance(config: Config) -> Result<(), Error> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let (display, renderer) = spawn_renderer(Box::new(LogDisplay));

    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            warn!("could not install Ctrl-C handler: {}", e);
        }
    }

    display.show("booting...");
    startup_banter(&display, config.paths.startup_lines.as_ref(), &shutdown);

    let animation = {
        let display = display.clone();
        let shutdown = shutdown.clone();
        thread::spawn(move || animation::run(display, shutdown))
    };

    let button = SysfsButton::new(config.button.gpio_value.clone(), config.button.active_low);
    let capturer = StillCommand::new(
        config.camera.command.clone(),
        config.camera.width,
        config.camera.height,
    );
    let printer = UsbPhotoPrinter::new(config.printer_config());
    let counter = ShutterCounter::new(config.paths.counter_file.clone());

    let booth = Booth::new(
        BoothOptions::from_config(&config),
        button,
        capturer,
        printer,
        counter,
        display.clone(),
        shutdown.clone(),
    );
    booth.run();

    // The booth has set the flag; the animation sees it, drops its display
    // handle and exits. Dropping ours lets the renderer drain and stop.
    drop(display);
    if animation.join().is_err() {
        warn!("animation thread panicked");
    }
    if renderer.join().is_err() {
        warn!("display renderer panicked");
    }
    info!("booth stopped");
    Ok(())
}
