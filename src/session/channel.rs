//! Control surface fed by a channel of text commands.
//!
//! Commands arrive from any thread (a stdin reader, a signal handler) as
//! [`ControlEvent`]s. The loop's bounded wait is a `recv_timeout` on the
//! channel, so pacing and command polling happen in the same call.

use crate::session::{Command, ControlSurface, THRESHOLD_SLIDER_MAX};
use crate::util::TplCountError;
use std::str::FromStr;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// One command for the playback loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// Move the threshold slider to a position in `0..=THRESHOLD_SLIDER_MAX`.
    Threshold(u32),
    /// Move the position slider to a frame index.
    Seek(usize),
    /// Stop after the current frame.
    Quit,
}

impl FromStr for ControlEvent {
    type Err = TplCountError;

    /// Parses `t <0-20>`, `s <frame>` or `q`, also accepting the long forms
    /// `threshold`, `seek` and `quit`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &'static str| TplCountError::InvalidCommand {
            line: line.trim().to_string(),
            reason,
        };
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            return Err(invalid("empty command"));
        };
        let argument = parts.next();
        if parts.next().is_some() {
            return Err(invalid("too many arguments"));
        }

        match (keyword.to_ascii_lowercase().as_str(), argument) {
            ("q" | "quit", None) => Ok(Self::Quit),
            ("t" | "threshold", Some(value)) => {
                let position: u32 = value
                    .parse()
                    .map_err(|_| invalid("threshold position must be an integer"))?;
                if position > THRESHOLD_SLIDER_MAX {
                    return Err(invalid("threshold position must be at most 20"));
                }
                Ok(Self::Threshold(position))
            }
            ("s" | "seek", Some(value)) => value
                .parse()
                .map(Self::Seek)
                .map_err(|_| invalid("frame index must be a non-negative integer")),
            ("q" | "quit", Some(_)) => Err(invalid("quit takes no argument")),
            ("t" | "threshold" | "s" | "seek", None) => Err(invalid("missing argument")),
            _ => Err(invalid("unknown command")),
        }
    }
}

/// Control surface whose sliders are moved by [`ControlEvent`]s.
///
/// A seek received during a wait is reported by `seek_position` until the
/// loop writes the new position back. A closed channel is not a quit: the
/// loop keeps playing at the last slider values.
pub struct ChannelControls {
    threshold: u32,
    position: usize,
    pending_seek: Option<usize>,
    frames_left: Option<usize>,
    events: Receiver<ControlEvent>,
}

impl ChannelControls {
    /// Starts with the threshold slider at `threshold`.
    pub fn new(threshold: u32, events: Receiver<ControlEvent>) -> Self {
        Self {
            threshold: threshold.min(THRESHOLD_SLIDER_MAX),
            position: 0,
            pending_seek: None,
            frames_left: None,
            events,
        }
    }

    /// Quits after `frames` frames have been processed.
    pub fn with_frame_limit(mut self, frames: usize) -> Self {
        self.frames_left = Some(frames);
        self
    }

    fn apply(&mut self, event: ControlEvent) -> Command {
        match event {
            ControlEvent::Threshold(position) => {
                self.threshold = position.min(THRESHOLD_SLIDER_MAX);
            }
            ControlEvent::Seek(frame) => self.pending_seek = Some(frame),
            ControlEvent::Quit => return Command::Quit,
        }
        Command::Continue
    }
}

impl ControlSurface for ChannelControls {
    fn threshold_position(&self) -> u32 {
        self.threshold
    }

    fn seek_position(&self) -> usize {
        self.pending_seek.unwrap_or(self.position)
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
        self.pending_seek = None;
    }

    fn wait(&mut self, interval: Duration) -> Command {
        if let Some(left) = self.frames_left.as_mut() {
            *left = left.saturating_sub(1);
            if *left == 0 {
                return Command::Quit;
            }
        }

        let deadline = Instant::now() + interval;
        loop {
            let event = match self.events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Disconnected) => {
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    return Command::Continue;
                }
                Err(TryRecvError::Empty) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Command::Continue;
                    }
                    match self.events.recv_timeout(remaining) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => return Command::Continue,
                        Err(RecvTimeoutError::Disconnected) => {
                            thread::sleep(deadline.saturating_duration_since(Instant::now()));
                            return Command::Continue;
                        }
                    }
                }
            };
            if self.apply(event) == Command::Quit {
                return Command::Quit;
            }
        }
    }
}
