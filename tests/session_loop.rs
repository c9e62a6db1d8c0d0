use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::mpsc;
use tplcount::session::{advance, threshold_from_slider, CollectSink, ScriptedControls, Step};
use tplcount::{
    run_session, ChannelControls, ControlEvent, EndReason, FrameDetector, FrameSource,
    MemorySource, OwnedImage, PlaybackState, SessionConfig, Template,
};

const HIGH: u32 = 19;

fn template() -> Template {
    let mut rng = StdRng::seed_from_u64(11);
    let data = (0..36).map(|_| rng.random_range(0..=255u8)).collect();
    Template::new(data, 6, 6).unwrap()
}

/// Frame `k` holds `k + 1` copies of the template.
fn frames(tpl: &Template, count: usize) -> Vec<OwnedImage> {
    let (width, height) = (64, 24);
    (0..count)
        .map(|k| {
            let mut data = vec![0u8; width * height];
            for copy in 0..=k {
                let x0 = 2 + 12 * copy;
                for (ty, row) in tpl.view().rows().enumerate() {
                    let start = (8 + ty) * width + x0;
                    data[start..start + row.len()].copy_from_slice(row);
                }
            }
            OwnedImage::new(data, width, height).unwrap()
        })
        .collect()
}

fn setup(count: usize) -> (MemorySource, FrameDetector) {
    let tpl = template();
    let source = MemorySource::new(frames(&tpl, count)).unwrap();
    (source, FrameDetector::new(&[tpl]))
}

fn cfg() -> SessionConfig {
    SessionConfig {
        frame_interval: std::time::Duration::ZERO,
    }
}

fn processed(sink: &CollectSink) -> Vec<(usize, usize)> {
    sink.frames
        .iter()
        .map(|(index, result)| (*index, result.total_count))
        .collect()
}

#[test]
fn plays_every_frame_until_end_of_stream() {
    let (mut source, detector) = setup(4);
    let mut controls = ScriptedControls::new(HIGH);
    let mut sink = CollectSink::default();

    let summary = run_session(&mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap();

    assert_eq!(summary.end, EndReason::EndOfStream);
    assert_eq!(summary.frames_processed, 4);
    assert_eq!(summary.state.current_frame, 4);
    assert_eq!(processed(&sink), vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
    assert_eq!(controls.reported_positions(), &[0, 1, 2, 3, 4]);
}

#[test]
fn quit_stops_after_the_frame_in_flight() {
    let (mut source, detector) = setup(5);
    let mut controls = ScriptedControls::new(HIGH).quit_after(2);
    let mut sink = CollectSink::default();

    let summary = run_session(&mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap();

    assert_eq!(summary.end, EndReason::Quit);
    assert_eq!(summary.frames_processed, 2);
    assert_eq!(processed(&sink), vec![(0, 1), (1, 2)]);
}

#[test]
fn forward_seek_skips_frames() {
    let (mut source, detector) = setup(5);
    let mut controls = ScriptedControls::new(HIGH).seek_at(1, 3);
    let mut sink = CollectSink::default();

    let summary = run_session(&mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap();

    assert_eq!(summary.frames_processed, 3);
    assert_eq!(processed(&sink), vec![(0, 1), (3, 4), (4, 5)]);
    assert_eq!(controls.reported_positions(), &[0, 1, 4, 5]);
}

#[test]
fn backward_seek_replays_frames() {
    let (mut source, detector) = setup(4);
    let mut controls = ScriptedControls::new(HIGH).seek_at(2, 0);
    let mut sink = CollectSink::default();

    run_session(&mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap();

    let indices: Vec<usize> = sink.frames.iter().map(|(index, _)| *index).collect();
    assert_eq!(indices, vec![0, 1, 0, 1, 2, 3]);
}

#[test]
fn seek_past_the_end_finishes_the_session() {
    let (mut source, detector) = setup(4);
    let mut controls = ScriptedControls::new(HIGH).seek_at(1, 99);
    let mut sink = CollectSink::default();

    let summary = run_session(&mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap();

    assert_eq!(summary.end, EndReason::EndOfStream);
    assert_eq!(summary.frames_processed, 1);
    assert_eq!(summary.state.current_frame, 4);
    assert!(summary.state.manual_seek);
}

#[test]
fn manual_seek_flag_tracks_each_iteration() {
    let (mut source, detector) = setup(5);
    let mut controls = ScriptedControls::new(HIGH).seek_at(1, 3);
    let mut sink = CollectSink::default();

    let mut state = PlaybackState::default();
    let mut flags = Vec::new();
    loop {
        match advance(state, &mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap() {
            Step::Continue(next) => {
                flags.push(next.manual_seek);
                state = next;
            }
            Step::Finished(last, end) => {
                assert_eq!(end, EndReason::EndOfStream);
                assert_eq!(last.current_frame, source.frame_count());
                break;
            }
        }
    }
    assert_eq!(flags, vec![false, true, false]);
}

#[test]
fn threshold_slider_changes_apply_to_the_next_frame() {
    let tpl = template();
    let all = frames(&tpl, 3);
    let mut source = MemorySource::new(all.clone()).unwrap();
    let detector = FrameDetector::new(&[tpl]);
    let mut controls = ScriptedControls::new(HIGH).threshold_at(1, 10);
    let mut sink = CollectSink::default();

    run_session(&mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap();

    for (index, result) in &sink.frames {
        let slider = if *index == 0 { HIGH } else { 10 };
        let expected = detector
            .detect(all[*index].view(), threshold_from_slider(slider))
            .unwrap();
        assert_eq!(result, &expected);
    }
}

#[test]
fn text_commands_move_the_sliders_between_frames() {
    let tpl = template();
    let all = frames(&tpl, 5);
    let mut source = MemorySource::new(all.clone()).unwrap();
    let detector = FrameDetector::new(&[tpl]);
    let (tx, rx) = mpsc::channel();
    let mut controls = ChannelControls::new(HIGH, rx);
    let mut sink = CollectSink::default();

    for line in ["t 10", "s 3"] {
        tx.send(line.parse::<ControlEvent>().unwrap()).unwrap();
    }
    let step = advance(
        PlaybackState::default(),
        &mut source,
        &detector,
        &mut controls,
        &mut sink,
        &cfg(),
    )
    .unwrap();
    let Step::Continue(state) = step else {
        panic!("loop stopped after the first frame: {step:?}");
    };
    assert_eq!(state.current_frame, 1);
    assert!(!state.manual_seek);

    tx.send("q".parse::<ControlEvent>().unwrap()).unwrap();
    let step = advance(state, &mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap();
    assert_eq!(
        step,
        Step::Finished(
            PlaybackState {
                current_frame: 4,
                manual_seek: true,
            },
            EndReason::Quit
        )
    );

    assert_eq!(processed(&sink)[0], (0, 1));
    let (index, result) = &sink.frames[1];
    assert_eq!(*index, 3);
    let expected = detector
        .detect(all[3].view(), threshold_from_slider(10))
        .unwrap();
    assert_eq!(result, &expected);
}

#[test]
fn interrupted_channel_session_reports_quit() {
    let (mut source, detector) = setup(6);
    let (tx, rx) = mpsc::channel();
    let mut controls = ChannelControls::new(HIGH, rx).with_frame_limit(3);
    let mut sink = CollectSink::default();
    drop(tx);

    let summary = run_session(&mut source, &detector, &mut controls, &mut sink, &cfg()).unwrap();

    assert_eq!(summary.end, EndReason::Quit);
    assert_eq!(processed(&sink), vec![(0, 1), (1, 2), (2, 3)]);
}
