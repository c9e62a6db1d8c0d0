//! Playback loop driving the frame pipeline.
//!
//! One iteration: honour a pending seek, read a frame, run detection at the
//! current slider threshold, hand the result to the sink, report the new
//! position back to the controls, then block on the controls for one frame
//! interval. The interval doubles as pacing and as the only point where a
//! quit command is observed; a frame in flight always completes.
//!
//! Playback position lives in [`PlaybackState`], which each iteration takes
//! by value and returns. After every read the position is taken from the
//! source itself, so seeks and sequential reads cannot drift apart.

use crate::image::ImageView;
use crate::pipeline::{FrameDetector, PipelineResult};
use crate::source::FrameSource;
use crate::trace::{trace_event, trace_span};
use crate::util::TplCountResult;
use std::time::Duration;

#[cfg(feature = "annotate")]
mod annotate;
mod channel;
mod controls;

#[cfg(feature = "annotate")]
pub use annotate::{annotate_frame, AnnotatedFrameSink};
pub use channel::{ChannelControls, ControlEvent};
pub use controls::{threshold_from_slider, ScriptedControls, THRESHOLD_SLIDER_MAX};

/// Command returned by the controls at the end of an iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Proceed to the next frame.
    Continue,
    /// Stop after the current frame.
    Quit,
}

/// Numeric control surface: two sliders and a quit signal.
pub trait ControlSurface {
    /// Threshold slider position in `0..=THRESHOLD_SLIDER_MAX`.
    fn threshold_position(&self) -> u32;

    /// Position slider value, a frame index.
    fn seek_position(&self) -> usize;

    /// Moves the position slider to reflect playback progress.
    fn set_position(&mut self, position: usize);

    /// Blocks for at most `interval` waiting for a command.
    fn wait(&mut self, interval: Duration) -> Command;
}

/// Receives one pipeline result per processed frame.
pub trait ResultSink {
    /// Called after detection on the frame with index `frame_index`.
    fn on_frame(
        &mut self,
        frame_index: usize,
        frame: ImageView<'_, u8>,
        result: &PipelineResult,
    ) -> TplCountResult<()>;
}

/// Sink that keeps every result in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    /// `(frame_index, result)` in processing order.
    pub frames: Vec<(usize, PipelineResult)>,
}

impl ResultSink for CollectSink {
    fn on_frame(
        &mut self,
        frame_index: usize,
        _frame: ImageView<'_, u8>,
        result: &PipelineResult,
    ) -> TplCountResult<()> {
        self.frames.push((frame_index, result.clone()));
        Ok(())
    }
}

/// Playback position carried between iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// Index of the next frame to read.
    pub current_frame: usize,
    /// True when the last iteration began with a seek.
    pub manual_seek: bool,
}

/// Loop configuration.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Bounded wait after each frame.
    pub frame_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(30),
        }
    }
}

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The source ran out of frames.
    EndOfStream,
    /// The controls returned [`Command::Quit`].
    Quit,
}

/// Outcome of one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A frame was processed; continue with the returned state.
    Continue(PlaybackState),
    /// The loop is over; the state is the final playback position.
    Finished(PlaybackState, EndReason),
}

/// Totals reported when the loop ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of frames run through the pipeline.
    pub frames_processed: usize,
    /// Final playback state.
    pub state: PlaybackState,
    /// Why the loop stopped.
    pub end: EndReason,
}

/// Runs one iteration of the playback loop.
pub fn advance<S, C, K>(
    mut state: PlaybackState,
    source: &mut S,
    detector: &FrameDetector,
    controls: &mut C,
    sink: &mut K,
    cfg: &SessionConfig,
) -> TplCountResult<Step>
where
    S: FrameSource + ?Sized,
    C: ControlSurface + ?Sized,
    K: ResultSink + ?Sized,
{
    // Seeking to `frame_count` is a valid end-of-stream position.
    let requested = controls.seek_position().min(source.frame_count());
    if requested != state.current_frame {
        source.seek(requested)?;
        state.manual_seek = true;
        trace_event!("seek", from = state.current_frame, to = requested);
    } else {
        state.manual_seek = false;
    }

    let frame_index = source.position();
    let Some(frame) = source.read_next()? else {
        state.current_frame = source.position();
        return Ok(Step::Finished(state, EndReason::EndOfStream));
    };
    state.current_frame = source.position();

    let threshold = threshold_from_slider(controls.threshold_position());
    let result = detector.detect(frame.view(), threshold)?;
    sink.on_frame(frame_index, frame.view(), &result)?;
    controls.set_position(state.current_frame);

    match controls.wait(cfg.frame_interval) {
        Command::Continue => Ok(Step::Continue(state)),
        Command::Quit => Ok(Step::Finished(state, EndReason::Quit)),
    }
}

/// Runs the playback loop until end of stream or a quit command.
pub fn run_session<S, C, K>(
    source: &mut S,
    detector: &FrameDetector,
    controls: &mut C,
    sink: &mut K,
    cfg: &SessionConfig,
) -> TplCountResult<SessionSummary>
where
    S: FrameSource + ?Sized,
    C: ControlSurface + ?Sized,
    K: ResultSink + ?Sized,
{
    let _span = trace_span!("session", frames = source.frame_count()).entered();

    let mut state = PlaybackState {
        current_frame: source.position(),
        manual_seek: false,
    };
    controls.set_position(state.current_frame);
    let mut frames_processed = 0usize;
    loop {
        match advance(state, source, detector, controls, sink, cfg)? {
            Step::Continue(next) => {
                frames_processed += 1;
                state = next;
            }
            Step::Finished(last, end) => {
                if end == EndReason::Quit {
                    frames_processed += 1;
                }
                trace_event!("session_end", frames = frames_processed);
                return Ok(SessionSummary {
                    frames_processed,
                    state: last,
                    end,
                });
            }
        }
    }
}
