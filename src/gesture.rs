//! Shutter-button gesture recognition.
//!
//! A small state machine classifies each physical press as a short press
//! (take a photo) or a long press (power down). It is driven by sampling a
//! logical button level on a fixed interval; the 100 ms default cadence is
//! coarse enough to absorb contact bounce, so no separate debounce window is
//! kept.

use log::warn;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::Error;

/// Default sampling interval.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default hold time distinguishing a long press from a short one.
pub const HOLD_THRESHOLD: Duration = Duration::from_secs(10);

/// One classified press/release pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Released before the hold threshold: take a photo.
    ShortPress(Duration),
    /// Held to the threshold: power down. Terminal, emitted at most once.
    LongPress(Duration),
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    Pressed(Instant),
    Halted,
}

/// Press classifier over sampled button levels.
///
/// Pure: time enters only through the `now` argument of [`sample`], so tests
/// can drive the machine with a synthetic clock.
///
/// [`sample`]: GestureStateMachine::sample
#[derive(Debug)]
pub struct GestureStateMachine {
    state: State,
    hold_threshold: Duration,
}

impl GestureStateMachine {
    pub fn new(hold_threshold: Duration) -> Self {
        GestureStateMachine {
            state: State::Idle,
            hold_threshold,
        }
    }

    /// Feed one sampled level. Returns an event on press classification.
    ///
    /// A press that reaches the hold threshold emits [`GestureEvent::LongPress`]
    /// immediately, without waiting for release, and halts the machine.
    /// A release at or past the threshold on a coarse sampling grid emits
    /// the same single `LongPress`.
    pub fn sample(&mut self, pressed: bool, now: Instant) -> Option<GestureEvent> {
        match (self.state, pressed) {
            (State::Idle, true) => {
                self.state = State::Pressed(now);
                None
            }
            (State::Idle, false) => None,
            (State::Pressed(since), true) => {
                let held = now.duration_since(since);
                if held >= self.hold_threshold {
                    self.state = State::Halted;
                    Some(GestureEvent::LongPress(held))
                } else {
                    None
                }
            }
            (State::Pressed(since), false) => {
                let held = now.duration_since(since);
                if held < self.hold_threshold {
                    self.state = State::Idle;
                    Some(GestureEvent::ShortPress(held))
                } else {
                    // Threshold crossed between samples; classify on release.
                    self.state = State::Halted;
                    Some(GestureEvent::LongPress(held))
                }
            }
            (State::Halted, _) => None,
        }
    }

    /// True once a long press has been emitted; no further events follow.
    pub fn is_halted(&self) -> bool {
        matches!(self.state, State::Halted)
    }
}

/// Source of the logical button level, true meaning "pressed".
pub trait ButtonInput {
    fn is_pressed(&mut self) -> Result<bool, Error>;
}

/// GPIO button read through the sysfs value file.
///
/// The booth wires the button between the pin and ground with the internal
/// pull-up enabled, so the line reads low while pressed (`active_low`).
pub struct SysfsButton {
    value_path: PathBuf,
    active_low: bool,
}

impl SysfsButton {
    pub fn new(value_path: PathBuf, active_low: bool) -> Self {
        SysfsButton {
            value_path,
            active_low,
        }
    }
}

impl ButtonInput for SysfsButton {
    fn is_pressed(&mut self) -> Result<bool, Error> {
        let raw = fs::read_to_string(&self.value_path).map_err(|source| Error::ButtonIo {
            path: self.value_path.clone(),
            source,
        })?;
        let level = match raw.trim() {
            "0" => false,
            "1" => true,
            other => {
                warn!("unexpected GPIO level {:?}, treating as released", other);
                self.active_low
            }
        };
        Ok(level != self.active_low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    /// Drive the machine with `pressed` held for `hold`, sampling every
    /// 100 ms, then one released sample. Returns all emitted events.
    fn run_press(machine: &mut GestureStateMachine, hold: Duration) -> Vec<GestureEvent> {
        let start = Instant::now();
        let mut events = Vec::new();
        let mut t = Duration::ZERO;
        while t < hold {
            events.extend(machine.sample(true, start + t));
            t += Duration::from_millis(100);
        }
        events.extend(machine.sample(false, start + hold));
        events
    }

    #[test]
    fn hold_just_under_threshold_is_a_single_short_press() {
        let mut machine = GestureStateMachine::new(HOLD_THRESHOLD);
        let events = run_press(&mut machine, Duration::from_millis(9900));

        assert_eq!(
            events,
            vec![GestureEvent::ShortPress(Duration::from_millis(9900))]
        );
        assert!(!machine.is_halted());
    }

    #[test]
    fn hold_past_threshold_is_a_single_long_press() {
        let mut machine = GestureStateMachine::new(HOLD_THRESHOLD);
        let events = run_press(&mut machine, Duration::from_millis(10100));

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GestureEvent::LongPress(_)));
        assert!(machine.is_halted());
    }

    #[test]
    fn rapid_tap_still_emits_short_press() {
        let mut machine = GestureStateMachine::new(HOLD_THRESHOLD);
        let start = Instant::now();

        assert_eq!(machine.sample(true, start), None);
        assert_eq!(
            machine.sample(false, start + 300 * MS),
            Some(GestureEvent::ShortPress(300 * MS))
        );
    }

    #[test]
    fn release_after_missed_threshold_sample_still_emits_long_press() {
        let mut machine = GestureStateMachine::new(HOLD_THRESHOLD);
        let start = Instant::now();

        assert_eq!(machine.sample(true, start), None);
        // Release observed past the threshold without an intervening
        // pressed sample: still exactly one LongPress.
        assert_eq!(
            machine.sample(false, start + Duration::from_secs(11)),
            Some(GestureEvent::LongPress(Duration::from_secs(11)))
        );
        assert!(machine.is_halted());
    }

    #[test]
    fn halted_machine_ignores_further_input() {
        let mut machine = GestureStateMachine::new(Duration::from_millis(100));
        let start = Instant::now();

        machine.sample(true, start);
        assert!(machine.sample(true, start + 150 * MS).is_some());
        assert_eq!(machine.sample(false, start + 200 * MS), None);
        assert_eq!(machine.sample(true, start + 300 * MS), None);
    }

    #[test]
    fn consecutive_presses_each_classify() {
        let mut machine = GestureStateMachine::new(HOLD_THRESHOLD);

        let first = run_press(&mut machine, Duration::from_millis(200));
        let second = run_press(&mut machine, Duration::from_millis(400));

        assert_eq!(
            first,
            vec![GestureEvent::ShortPress(Duration::from_millis(200))]
        );
        assert_eq!(
            second,
            vec![GestureEvent::ShortPress(Duration::from_millis(400))]
        );
    }
}
