//! Slider mapping and a scripted control surface.

use crate::session::{Command, ControlSurface};
use std::time::Duration;

/// Highest threshold slider position.
pub const THRESHOLD_SLIDER_MAX: u32 = 20;

/// Maps a threshold slider position to a detection threshold in `[0, 1]`.
///
/// Positions above the slider range saturate at 1.
pub fn threshold_from_slider(position: u32) -> f32 {
    position.min(THRESHOLD_SLIDER_MAX) as f32 / THRESHOLD_SLIDER_MAX as f32
}

/// Control surface replaying a fixed script, keyed by iteration number.
///
/// Iteration `i` is the `i`-th call to `wait`; seeks and threshold changes
/// scheduled for iteration `i` are visible before frame `i` of the session
/// is read.
#[derive(Clone, Debug)]
pub struct ScriptedControls {
    threshold: u32,
    position: usize,
    iteration: usize,
    seeks: Vec<(usize, usize)>,
    thresholds: Vec<(usize, u32)>,
    quit_after: Option<usize>,
    reported: Vec<usize>,
}

impl ScriptedControls {
    /// Starts with the threshold slider at `threshold` and no scheduled events.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            position: 0,
            iteration: 0,
            seeks: Vec::new(),
            thresholds: Vec::new(),
            quit_after: None,
            reported: Vec::new(),
        }
    }

    /// Drags the position slider to `frame` before iteration `iteration`.
    pub fn seek_at(mut self, iteration: usize, frame: usize) -> Self {
        self.seeks.push((iteration, frame));
        self
    }

    /// Moves the threshold slider to `position` from iteration `iteration` on.
    pub fn threshold_at(mut self, iteration: usize, position: u32) -> Self {
        self.thresholds.push((iteration, position));
        self.thresholds.sort_by_key(|&(i, _)| i);
        self
    }

    /// Sends quit after `frames` iterations.
    pub fn quit_after(mut self, frames: usize) -> Self {
        self.quit_after = Some(frames);
        self
    }

    /// Positions written back by the loop, in order.
    pub fn reported_positions(&self) -> &[usize] {
        &self.reported
    }
}

impl ControlSurface for ScriptedControls {
    fn threshold_position(&self) -> u32 {
        self.thresholds
            .iter()
            .rev()
            .find(|&&(i, _)| i <= self.iteration)
            .map_or(self.threshold, |&(_, position)| position)
    }

    fn seek_position(&self) -> usize {
        self.seeks
            .iter()
            .find(|&&(i, _)| i == self.iteration)
            .map_or(self.position, |&(_, frame)| frame)
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
        self.reported.push(position);
    }

    fn wait(&mut self, _interval: Duration) -> Command {
        self.iteration += 1;
        match self.quit_after {
            Some(frames) if self.iteration >= frames => Command::Quit,
            _ => Command::Continue,
        }
    }
}
