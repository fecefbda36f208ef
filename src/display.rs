//! Status display plumbing.
//!
//! The physical OLED driver is an external collaborator; this module owns
//! the seam in front of it. Both the gesture loop and the idle animation
//! draw through a cloneable [`DisplayHandle`], whose messages are funneled
//! into a single renderer thread that owns the [`DisplaySink`] and
//! serializes redraws. The renderer drains and exits once every handle has
//! been dropped.

use log::{debug, info};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Target of all status output. Implementations decide how text is laid out
/// and whether the panel content needs the 180-degree mounting rotation.
pub trait DisplaySink: Send {
    fn draw_text(&mut self, text: &str);
}

/// Cloneable sender half of the display channel.
#[derive(Clone)]
pub struct DisplayHandle {
    tx: Sender<String>,
}

impl DisplayHandle {
    /// Queue a redraw. A handle outliving the renderer only drops frames,
    /// it never panics the sender.
    pub fn show<S: Into<String>>(&self, text: S) {
        let _ = self.tx.send(text.into());
    }
}

/// Spawn the renderer thread owning `sink`.
///
/// Returns the handle both tasks draw through and the join handle used for
/// cooperative shutdown: drop every `DisplayHandle`, then join.
pub fn spawn_renderer(mut sink: Box<dyn DisplaySink>) -> (DisplayHandle, JoinHandle<()>) {
    let (tx, rx): (Sender<String>, Receiver<String>) = mpsc::channel();
    let handle = thread::spawn(move || {
        for text in rx {
            sink.draw_text(&text);
        }
        debug!("display renderer stopped");
    });
    (DisplayHandle { tx }, handle)
}

/// Fallback sink writing status lines to the log.
///
/// Stands in for the OLED when running off the booth hardware.
pub struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn draw_text(&mut self, text: &str) {
        info!("[display] {}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    impl DisplaySink for RecordingSink {
        fn draw_text(&mut self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn redraws_are_serialized_in_send_order() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (handle, renderer) = spawn_renderer(Box::new(RecordingSink(frames.clone())));

        handle.show("booting...");
        handle.show("ready");
        drop(handle);
        renderer.join().unwrap();

        assert_eq!(*frames.lock().unwrap(), vec!["booting...", "ready"]);
    }

    #[test]
    fn renderer_stops_when_all_handles_drop() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (handle, renderer) = spawn_renderer(Box::new(RecordingSink(frames)));
        let clone = handle.clone();

        drop(handle);
        clone.show("last");
        drop(clone);

        renderer.join().unwrap();
    }

    #[test]
    fn show_after_renderer_exit_is_harmless() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (handle, renderer) = spawn_renderer(Box::new(RecordingSink(frames)));

        let clone = handle.clone();
        drop(handle);
        drop(clone.clone());
        // Renderer may still be alive here; once it exits, sends only drop.
        clone.show("frame");
        drop(clone);
        renderer.join().unwrap();
    }
}
