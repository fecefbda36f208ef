//! Idle eye animation.
//!
//! A pair of eyes wanders across the little display while the booth waits
//! for a press, blinking now and then. The strip redraws on its own fixed
//! cadence, unaware of gesture state; redraws are idempotent so interleaving
//! with status text is harmless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::display::DisplayHandle;

/// Frame cadence of the idle animation.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// One full wander-and-blink cycle.
const FRAMES: &[&str] = &[
    "     0-0     ",
    "      0-0    ",
    "        0-0  ",
    "         0-0 ",
    "          0-0",
    "          0-0",
    "          0-0",
    "          >-<",
    "          >-<",
    "          0-0",
    "          0-0",
    "         0-0 ",
    "        0-0  ",
    "      0-0    ",
    "     0-0     ",
    "     0-0     ",
    "    0-0      ",
    "  0-0        ",
    " 0-0         ",
    "0-0          ",
    "0-0          ",
    "0-0          ",
    ">-<          ",
    ">-<          ",
    "0-0          ",
    " 0-0         ",
    "   0-0       ",
    "    0-0      ",
    "     0-0     ",
];

/// Redraw the animation until the shutdown flag is set.
///
/// Runs on its own thread; stopping is cooperative so the display handle is
/// dropped cleanly and the renderer can drain.
pub fn run(display: DisplayHandle, shutdown: Arc<AtomicBool>) {
    'outer: loop {
        for frame in FRAMES {
            if shutdown.load(Ordering::SeqCst) {
                break 'outer;
            }
            display.show(*frame);
            std::thread::sleep(FRAME_INTERVAL);
        }
    }
}
