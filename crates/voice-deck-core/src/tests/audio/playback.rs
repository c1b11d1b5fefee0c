use crate::{
    DecodedAudio, DeviceEventKind, DeviceEventSink, PlaybackBackend, PlaybackDevice, RecordingId,
    SessionEvent, SpeakerBackend,
    audio::playback::{FillOutcome, Playhead},
    tests::support::test_clip,
};

use tokio::sync::mpsc;

fn mono(samples: Vec<f32>, sample_rate: u32) -> DecodedAudio {
    DecodedAudio {
        samples,
        channels: 1,
        sample_rate,
    }
}

/// WHAT: A paused playhead renders silence and does not move
/// WHY: Devices are created paused and only sound after play
#[test]
fn given_new_playhead_when_filled_then_silence_and_position_unchanged() {
    let mut head = Playhead::new(mono(vec![0.5; 100], 100), 100, 250);
    let mut out = [1.0f32; 8];

    let outcome = head.fill(&mut out, 1);

    assert_eq!(outcome, FillOutcome::Silent);
    assert!(out.iter().all(|&s| s == 0.0));
    assert_eq!(head.seconds(), 0.0);
    assert!(head.is_paused());
}

/// WHAT: Mono source is duplicated across output channels
/// WHY: Clips are commonly mono while outputs are stereo
#[test]
fn given_mono_clip_when_filling_stereo_then_each_frame_duplicated() {
    // Given: A playing mono playhead at matching rate
    let mut head = Playhead::new(mono(vec![0.1, 0.2, 0.3, 0.4], 4), 4, 10_000);
    head.set_paused(false);
    let mut out = [0.0f32; 4];

    // When: Filling two stereo frames
    let outcome = head.fill(&mut out, 2);

    // Then: L/R carry the same sample and position advanced two frames
    assert_eq!(outcome, FillOutcome::Played { report: None });
    assert_eq!(out, [0.1, 0.1, 0.2, 0.2]);
    assert!((head.seconds() - 0.5).abs() < 1e-9);
}

/// WHAT: Progress is reported once per interval
/// WHY: The session shows position without per-callback events
#[test]
fn given_interval_of_quarter_second_when_playing_then_progress_reported_per_interval() {
    // Given: 1 s of audio at 100 Hz, 250 ms progress interval
    let mut head = Playhead::new(mono(vec![0.0; 100], 100), 100, 250);
    head.set_paused(false);
    let mut out = [0.0f32; 10];

    // When: Filling 10 frames at a time
    let outcomes: Vec<_> = (0..3).map(|_| head.fill(&mut out, 1)).collect();

    // Then: Only the third fill crosses 0.25 s
    assert_eq!(outcomes[0], FillOutcome::Played { report: None });
    assert_eq!(outcomes[1], FillOutcome::Played { report: None });
    assert!(matches!(
        outcomes[2],
        FillOutcome::Played { report: Some(s) } if (s - 0.3).abs() < 1e-9
    ));
}

/// WHAT: Reaching the end reports Ended, pauses and rewinds
/// WHY: The next play of a finished clip starts from the top
#[test]
fn given_near_end_when_filled_past_end_then_ended_paused_and_rewound() {
    // Given: A playhead two frames from the end
    let mut head = Playhead::new(mono(vec![0.25; 10], 10), 10, 250);
    head.seek(0.8);
    head.set_paused(false);
    let mut out = [1.0f32; 4];

    // When: Filling four frames
    let outcome = head.fill(&mut out, 1);

    // Then: Two samples then silence, ended, rewound and paused
    assert_eq!(outcome, FillOutcome::Ended);
    assert_eq!(out, [0.25, 0.25, 0.0, 0.0]);
    assert!(head.is_paused());
    assert_eq!(head.seconds(), 0.0);
}

/// WHAT: Seek clamps into the clip
/// WHY: Out-of-range positions must not index past the samples
#[test]
fn given_playhead_when_seeking_out_of_range_then_clamped() {
    let mut head = Playhead::new(mono(vec![0.0; 50], 10), 10, 250);

    head.seek(2.5);
    assert!((head.seconds() - 2.5).abs() < 1e-9);

    head.seek(-3.0);
    assert_eq!(head.seconds(), 0.0);

    head.seek(60.0);
    assert!((head.seconds() - 5.0).abs() < 1e-9);

    head.seek(f64::NAN);
    assert_eq!(head.seconds(), 0.0);
}

/// WHAT: Output at twice the clip rate advances half a source frame per output frame
/// WHY: Clips play at their own speed on devices with other rates
#[test]
fn given_output_rate_double_clip_rate_when_filling_then_each_sample_held_two_frames() {
    let mut head = Playhead::new(mono(vec![0.1, 0.2, 0.3, 0.4], 4), 8, 10_000);
    head.set_paused(false);
    let mut out = [0.0f32; 4];

    head.fill(&mut out, 1);

    assert_eq!(out, [0.1, 0.1, 0.2, 0.2]);
    assert!((head.seconds() - 0.5).abs() < 1e-9);
}

/// WHAT: Real output device plays a clip and reports its duration
/// WHY: Verifies the cpal output path end to end
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn given_default_output_when_clip_played_then_duration_reported() {
    // Given: A backend on the default output
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = RecordingId(1);
    let backend = SpeakerBackend::new(None, 50);

    // When: Creating and playing a device
    let mut device = backend
        .create(id, &test_clip(), DeviceEventSink::new(id, tx))
        .unwrap();
    device.play().unwrap();
    assert!(!device.is_paused());
    device.pause();

    // Then: Duration was announced on creation
    let event = rx.try_recv().unwrap();
    assert!(matches!(
        event,
        SessionEvent::Device(e) if matches!(e.kind, DeviceEventKind::DurationKnown(_))
    ));
    assert!(device.is_paused());
}
