//! Durable shutter counter.
//!
//! A single decimal integer in a text file, used to number captured photos.
//! The file is re-read before every reservation and written immediately on
//! commit; an absent file reads as zero. Single-process operation is
//! assumed, there are no transactional guarantees.

use log::warn;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::Error;

pub struct ShutterCounter {
    path: PathBuf,
}

impl ShutterCounter {
    pub fn new(path: PathBuf) -> Self {
        ShutterCounter { path }
    }

    /// Current persisted count. Absent file is zero; unparseable content is
    /// logged and also treated as zero so the booth keeps running.
    pub fn peek(&self) -> u32 {
        let content = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!("could not read {}: {}", self.path.display(), e);
                return 0;
            }
        };
        match content.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                warn!(
                    "{} does not hold a number, restarting at 0",
                    self.path.display()
                );
                0
            }
        }
    }

    /// Reserve the next count without persisting it.
    ///
    /// The value is only written by [`commit`], after the capture
    /// collaborator has succeeded, so a failed capture does not burn a
    /// number.
    ///
    /// [`commit`]: ShutterCounter::commit
    pub fn next(&self) -> u32 {
        self.peek() + 1
    }

    /// Persist a count immediately.
    pub fn commit(&self, count: u32) -> Result<(), Error> {
        fs::write(&self.path, count.to_string()).map_err(|source| Error::CounterWrite {
            path: self.path.clone(),
            source,
        })
    }
}

/// Photo filename for a given shutter count, zero-padded to four digits.
pub fn photo_filename(count: u32) -> String {
    format!("pilaroid_{:04}.jpg", count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_file_reads_as_zero() {
        let dir = tempdir().unwrap();
        let counter = ShutterCounter::new(dir.path().join("shuttercount.txt"));

        assert_eq!(counter.peek(), 0);
        assert_eq!(counter.next(), 1);
    }

    #[test]
    fn commit_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shuttercount.txt");
        let counter = ShutterCounter::new(path.clone());

        counter.commit(41).unwrap();
        assert_eq!(counter.peek(), 41);
        assert_eq!(counter.next(), 42);
        assert_eq!(fs::read_to_string(path).unwrap(), "41");
    }

    #[test]
    fn next_does_not_persist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shuttercount.txt");
        let counter = ShutterCounter::new(path.clone());

        assert_eq!(counter.next(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn garbage_content_restarts_at_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shuttercount.txt");
        fs::write(&path, "not a number").unwrap();

        assert_eq!(ShutterCounter::new(path).peek(), 0);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shuttercount.txt");
        fs::write(&path, "  17\n").unwrap();

        assert_eq!(ShutterCounter::new(path).peek(), 17);
    }

    #[test]
    fn filenames_are_zero_padded() {
        assert_eq!(photo_filename(1), "pilaroid_0001.jpg");
        assert_eq!(photo_filename(999), "pilaroid_0999.jpg");
        assert_eq!(photo_filename(12345), "pilaroid_12345.jpg");
    }
}
