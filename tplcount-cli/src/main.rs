use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;
use tplcount::session::{threshold_from_slider, AnnotatedFrameSink, THRESHOLD_SLIDER_MAX};
use tplcount::source::ImageSequenceSource;
use tplcount::template::io::persist_captured;
use tplcount::{
    capture_indexed, run_session, Backend, ChannelControls, ControlEvent, DetectionConfig,
    EndReason, FrameDetector, FrameSource, ImageView, PipelineResult, ResultSink, Roi,
    SessionConfig, Template, TplCountError, TplCountResult,
};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Count repeated template occurrences in a frame sequence")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Override the threshold slider position (0-20).
    #[arg(long, value_name = "POS")]
    threshold: Option<u32>,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BackendConfig {
    Scalar,
    Rayon,
    Simd,
}

impl From<BackendConfig> for Backend {
    fn from(value: BackendConfig) -> Self {
        match value {
            BackendConfig::Scalar => Backend::Scalar,
            BackendConfig::Rayon => Backend::Rayon,
            BackendConfig::Simd => Backend::Simd,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectionConfigJson {
    overlap_thresh: f64,
    norm_epsilon: f64,
    backend: BackendConfig,
}

impl Default for DetectionConfigJson {
    fn default() -> Self {
        let cfg = DetectionConfig::default();
        Self {
            overlap_thresh: cfg.overlap_thresh,
            norm_epsilon: cfg.norm_epsilon,
            backend: BackendConfig::Scalar,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RoiJson {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl From<&RoiJson> for Roi {
    fn from(value: &RoiJson) -> Self {
        Roi::new(value.x, value.y, value.width, value.height)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    frames_dir: String,
    templates: Vec<RoiJson>,
    template_dir: Option<String>,
    output_path: Option<String>,
    annotated_dir: Option<String>,
    font_path: Option<String>,
    threshold_position: u32,
    frame_interval_ms: u64,
    max_frames: Option<usize>,
    detection: DetectionConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frames_dir: String::new(),
            templates: Vec::new(),
            template_dir: None,
            output_path: None,
            annotated_dir: None,
            font_path: None,
            threshold_position: 1,
            frame_interval_ms: 30,
            max_frames: None,
            detection: DetectionConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    template: usize,
    x1: usize,
    y1: usize,
    x2: usize,
    y2: usize,
}

#[derive(Debug, Serialize)]
struct FrameRecord {
    frame: usize,
    count: usize,
    detections: Vec<DetectionRecord>,
}

impl FrameRecord {
    fn new(frame: usize, result: &PipelineResult) -> Self {
        Self {
            frame,
            count: result.total_count,
            detections: result
                .detections
                .iter()
                .map(|d| DetectionRecord {
                    template: d.template_index,
                    x1: d.bbox.x1,
                    y1: d.bbox.y1,
                    x2: d.bbox.x2,
                    y2: d.bbox.y2,
                })
                .collect(),
        }
    }
}

/// Writes one JSON object per processed frame.
struct JsonLinesSink {
    out: Box<dyn Write>,
}

impl ResultSink for JsonLinesSink {
    fn on_frame(
        &mut self,
        frame_index: usize,
        _frame: ImageView<'_, u8>,
        result: &PipelineResult,
    ) -> TplCountResult<()> {
        tracing::info!(frame = frame_index, count = result.total_count, "frame processed");
        let line = serde_json::to_string(&FrameRecord::new(frame_index, result)).map_err(|err| {
            TplCountError::Sink {
                reason: err.to_string(),
            }
        })?;
        writeln!(self.out, "{line}").map_err(|err| TplCountError::Sink {
            reason: err.to_string(),
        })
    }
}

/// JSON lines plus optional annotated frames.
struct CliSink {
    json: JsonLinesSink,
    annotated: Option<AnnotatedFrameSink>,
}

impl ResultSink for CliSink {
    fn on_frame(
        &mut self,
        frame_index: usize,
        frame: ImageView<'_, u8>,
        result: &PipelineResult,
    ) -> TplCountResult<()> {
        self.json.on_frame(frame_index, frame, result)?;
        if let Some(annotated) = self.annotated.as_mut() {
            annotated.on_frame(frame_index, frame, result)?;
        }
        Ok(())
    }
}

/// Forwards `t <0-20>`, `s <frame>` and `q` lines from stdin to the loop.
fn spawn_command_reader(events: Sender<ControlEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ControlEvent>() {
                Ok(event) => {
                    if events.send(event).is_err() {
                        break;
                    }
                }
                Err(err) => eprintln!("{err}"),
            }
        }
    });
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("tplcount=debug".parse()?))
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.frames_dir.is_empty() {
        return Err("frames_dir must be set in the config".into());
    }
    let threshold = cli.threshold.unwrap_or(config.threshold_position);
    if threshold > THRESHOLD_SLIDER_MAX {
        return Err(format!("threshold position must be at most {THRESHOLD_SLIDER_MAX}").into());
    }
    if config.max_frames == Some(0) {
        return Err("max_frames must be at least 1".into());
    }

    let mut source = ImageSequenceSource::open(&config.frames_dir)?;
    let first = source
        .read_next()?
        .ok_or_else(|| TplCountError::Initialization {
            reason: "cannot read first frame".to_string(),
        })?;

    let rois: Vec<Roi> = config.templates.iter().map(Roi::from).collect();
    let captured = capture_indexed(first.view(), &rois)?;
    if captured.is_empty() {
        tracing::warn!("no non-empty template regions; every count will be zero");
    }
    if let Some(dir) = &config.template_dir {
        for entry in &captured {
            let path = persist_captured(dir, entry)?;
            tracing::info!(path = %path.display(), "template saved");
        }
    }
    let templates: Vec<Template> = captured.into_iter().map(|entry| entry.template).collect();
    source.seek(0)?;

    let detector = FrameDetector::new(&templates).with_config(DetectionConfig {
        overlap_thresh: config.detection.overlap_thresh,
        norm_epsilon: config.detection.norm_epsilon,
        backend: config.detection.backend.into(),
    })?;

    let (events, commands) = mpsc::channel();
    let quit_events = events.clone();
    ctrlc::set_handler(move || {
        let _ = quit_events.send(ControlEvent::Quit);
    })?;
    spawn_command_reader(events);
    eprintln!("commands: t <0-{THRESHOLD_SLIDER_MAX}> (threshold), s <frame> (seek), q (quit)");

    let mut controls = ChannelControls::new(threshold, commands);
    if let Some(frames) = config.max_frames {
        controls = controls.with_frame_limit(frames);
    }
    let out: Box<dyn Write> = match &config.output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let annotated = match &config.annotated_dir {
        Some(dir) => {
            let sink = AnnotatedFrameSink::create(dir)?;
            Some(match &config.font_path {
                Some(font) => sink.with_font_file(font)?,
                None => sink,
            })
        }
        None => None,
    };
    let mut sink = CliSink {
        json: JsonLinesSink { out },
        annotated,
    };

    tracing::info!(
        frames = source.frame_count(),
        templates = detector.num_templates(),
        threshold = threshold_from_slider(threshold),
        "starting playback"
    );
    let summary = run_session(
        &mut source,
        &detector,
        &mut controls,
        &mut sink,
        &SessionConfig {
            frame_interval: Duration::from_millis(config.frame_interval_ms),
        },
    )?;
    sink.json.out.flush()?;

    let reason = match summary.end {
        EndReason::EndOfStream => "end of stream",
        EndReason::Quit => "quit",
    };
    tracing::info!(frames = summary.frames_processed, reason, "playback finished");
    Ok(())
}
