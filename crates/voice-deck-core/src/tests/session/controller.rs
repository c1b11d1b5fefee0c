use crate::{
    CapturePhase, DeviceEventKind, PlaybackStatus, SessionEvent,
    tests::support::{FakeBackend, FakeCapture, harness, harness_with},
};

use std::time::Duration;

/// WHAT: A full capture goes through the device and lands in the collection
/// WHY: Start, tick and stop must drive the real capture collaborator
#[test]
fn given_granting_microphone_when_recording_three_seconds_then_one_recording_created() {
    // Given: A session with a microphone that grants access
    let mut h = harness();

    // When: Recording for three ticks
    let id = h.record(3);

    // Then: The device was opened and closed once, recording is first
    let log = h.capture.lock().unwrap();
    assert_eq!(log.starts, 1);
    assert_eq!(log.stops, 1);
    let state = h.session.state();
    assert_eq!(state.recordings().len(), 1);
    assert_eq!(state.recordings()[0].id, id);
    assert_eq!(state.recordings()[0].duration_seconds, 3);
    assert!(!state.recordings()[0].audio.is_empty());
    assert_eq!(*state.capture(), CapturePhase::Idle);
}

/// WHAT: Reaching the capture limit stops the device and keeps the recording
/// WHY: Stored duration must describe the audio that was kept
#[test]
fn given_two_second_limit_when_ticking_past_it_then_capture_stopped_at_two() {
    // Given: A microphone that keeps at most two seconds
    let mut h = harness_with(FakeCapture::limited(2), FakeBackend::default());
    assert_eq!(h.session.state().capture_limit(), Some(2));

    // When: Ticking three times and then pressing stop
    h.session.start_capture();
    for _ in 0..3 {
        h.session.tick();
    }
    h.session.stop_capture();

    // Then: Stopped once, at two seconds, with a notice
    assert_eq!(h.capture.lock().unwrap().stops, 1);
    let state = h.session.state();
    assert_eq!(*state.capture(), CapturePhase::Idle);
    assert_eq!(state.recordings().len(), 1);
    assert_eq!(state.recordings()[0].duration_seconds, 2);
    assert_eq!(state.notice(), Some("Recording stopped at the 0:02 limit"));
}

/// WHAT: A refused microphone leaves the session idle with a notice
/// WHY: Permission failure is reported, not fatal
#[test]
fn given_denying_microphone_when_capture_started_then_idle_with_notice() {
    // Given: A microphone that refuses access
    let mut h = harness_with(FakeCapture::denying(), FakeBackend::default());

    // When: Starting and stopping
    h.session.start_capture();
    h.session.stop_capture();

    // Then: Idle, no recording, user asked to allow access
    let state = h.session.state();
    assert_eq!(*state.capture(), CapturePhase::Idle);
    assert!(state.recordings().is_empty());
    assert_eq!(state.notice(), Some("Please allow microphone access"));
    assert_eq!(h.capture.lock().unwrap().stops, 0);
}

/// WHAT: A second start while capturing does not reopen the microphone
/// WHY: Capture is single-slot
#[test]
fn given_capture_running_when_started_again_then_device_opened_once() {
    let mut h = harness();
    h.session.start_capture();

    h.session.start_capture();

    assert_eq!(h.capture.lock().unwrap().starts, 1);
    assert!(h.session.state().is_capturing());
}

/// WHAT: Pause keeps the device; resume plays the same device again
/// WHY: Devices are created lazily once and reused per recording
#[test]
fn given_playing_when_paused_and_resumed_then_same_device_reused() {
    // Given: A playing recording
    let mut h = harness();
    let id = h.record(2);
    h.session.toggle(id);
    assert_eq!(h.session.active_device_count(), 1);

    // When: Pausing then resuming
    h.session.toggle(id);
    assert_eq!(h.session.active_device_count(), 0);
    assert!(h.session.has_device(id));
    h.session.toggle(id);

    // Then: One device created, played twice
    let device = h.playback.lock().unwrap().device(id);
    assert_eq!(device.created, 1);
    assert_eq!(device.plays, 2);
    assert_eq!(device.pauses, 1);
    assert_eq!(h.session.state().playing_id(), Some(id));
}

/// WHAT: Playing another recording pauses the first device
/// WHY: At most one device produces audio at a time
#[test]
fn given_one_playing_when_another_toggled_then_single_active_device() {
    // Given: Two recordings, first one playing
    let mut h = harness();
    let first = h.record(1);
    let second = h.record(1);
    h.session.toggle(first);

    // When: Toggling the second
    h.session.toggle(second);

    // Then: Both devices exist, only the second is active
    assert_eq!(h.session.device_count(), 2);
    assert_eq!(h.session.active_device_count(), 1);
    let log = h.playback.lock().unwrap();
    assert!(log.device(first).paused);
    assert!(!log.device(second).paused);
}

/// WHAT: Deleting a recording releases its device
/// WHY: Deleted recordings must not keep audio resources alive
#[test]
fn given_playing_recording_when_deleted_then_device_released() {
    // Given: A playing recording
    let mut h = harness();
    let id = h.record(1);
    h.session.toggle(id);

    // When: Deleting it
    h.session.delete(id);

    // Then: No device, no selection, released in the backend
    assert!(!h.session.has_device(id));
    assert!(h.session.state().selection().is_none());
    assert!(h.playback.lock().unwrap().device(id).released);
}

/// WHAT: A device that cannot be created clears the selection with a notice
/// WHY: Decode failure is terminal for that attempt
#[test]
fn given_undecodable_clip_when_toggled_then_selection_cleared_with_notice() {
    // Given: A backend that cannot decode any clip
    let backend = FakeBackend {
        fail_create: true,
        ..FakeBackend::default()
    };
    let mut h = harness_with(FakeCapture::granting(), backend);
    let id = h.record(1);

    // When: Toggling the recording
    h.session.toggle(id);

    // Then: Nothing selected, no device kept, user told, recording kept
    let state = h.session.state();
    assert!(state.selection().is_none());
    assert!(state.notice().is_some_and(|n| n.starts_with("Could not decode")));
    assert_eq!(state.recordings().len(), 1);
    assert_eq!(h.session.device_count(), 0);
}

/// WHAT: End of clip reported by the device clears the selection
/// WHY: Device events flow back through the channel and are dispatched
#[test]
fn given_playing_when_device_reports_end_then_selection_cleared_after_pump() {
    // Given: A playing recording with progress reported
    let mut h = harness();
    let id = h.record(2);
    h.session.toggle(id);
    h.emit(id, DeviceEventKind::Progress(1.0));
    h.pump();
    assert_eq!(h.session.state().current_time(), 1.0);

    // When: The device reports end of clip
    h.emit(id, DeviceEventKind::Ended);
    h.pump();

    // Then: Nothing selected, progress back to zero, device kept for replay
    let state = h.session.state();
    assert!(state.selection().is_none());
    assert_eq!(state.current_time(), 0.0);
    assert!(h.session.has_device(id));
}

/// WHAT: Seek reaches the selected device with the absolute time
/// WHY: The 0-100 slider is resolved against the known duration
#[test]
fn given_paused_recording_when_seeking_then_device_moves_to_absolute_position() {
    // Given: A selected, paused 4-second recording
    let mut h = harness();
    let id = h.record(4);
    h.session.toggle(id);
    h.session.toggle(id);
    assert_eq!(
        h.session.state().selection().map(|s| s.status),
        Some(PlaybackStatus::Paused)
    );

    // When: Seeking to 75%
    h.session.seek(75.0);

    // Then: The device sits at 3 s
    assert_eq!(h.playback.lock().unwrap().device(id).position, 3.0);
    assert_eq!(h.session.state().current_time(), 3.0);
}

/// WHAT: Skip controls play the neighbouring recording
/// WHY: Skipping is a toggle on the adjacent entry
#[test]
fn given_oldest_selected_when_skip_previous_then_newer_plays_and_oldest_paused() {
    let mut h = harness();
    let oldest = h.record(1);
    let newest = h.record(1);
    h.session.toggle(oldest);

    h.session.skip_previous();

    assert_eq!(h.session.state().playing_id(), Some(newest));
    assert_eq!(h.session.active_device_count(), 1);

    h.session.skip_next();
    assert_eq!(h.session.state().playing_id(), Some(oldest));
}

/// WHAT: Cover loads inline outside a runtime and applies to the next recording
/// WHY: The cover is read through the image loader collaborator
#[test]
fn given_no_runtime_when_cover_attached_then_applied_to_next_recording() {
    // Given: A session with a label and a cover
    let mut h = harness();
    h.session.set_label("Morning");
    h.session.attach_cover_image("art.png");
    assert!(h.session.state().pending_cover().is_some());

    // When: Recording
    h.record(1);

    // Then: Label and cover are on the recording and no longer pending
    let recording = &h.session.state().recordings()[0];
    assert_eq!(recording.label, "Morning");
    assert!(
        recording
            .cover
            .as_ref()
            .is_some_and(|c| c.data_uri().contains("art.png"))
    );
    assert!(h.session.state().pending_cover().is_none());
}

/// WHAT: A rejected cover leaves no pending cover and sets a notice
/// WHY: Non-image files are rejected with a user-facing message
#[test]
fn given_text_file_when_cover_attached_then_rejected_with_notice() {
    let mut h = harness();

    h.session.attach_cover_image("notes.txt");

    let state = h.session.state();
    assert!(state.pending_cover().is_none());
    assert!(state.notice().is_some_and(|n| n.contains("cover")));
}

/// WHAT: Clearing the cover removes the pending cover
/// WHY: Users can retract cover art before recording
#[test]
fn given_pending_cover_when_cleared_then_next_recording_has_no_cover() {
    let mut h = harness();
    h.session.attach_cover_image("art.png");

    h.session.clear_cover_image();
    h.record(1);

    assert!(h.session.state().recordings()[0].cover.is_none());
}

/// WHAT: Under tokio the cover is read on a blocking thread and delivered as an event
/// WHY: Image reads must not block the driving task
#[tokio::test]
async fn given_runtime_when_cover_attached_then_loaded_event_arrives_on_channel() {
    // Given: A session inside a runtime
    let mut h = harness();

    // When: Attaching a cover
    h.session.attach_cover_image("art.png");
    assert!(h.session.state().pending_cover().is_none());

    // Then: The loaded event arrives and applies once dispatched
    let event = tokio::time::timeout(Duration::from_secs(5), h.events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(event, SessionEvent::CoverLoaded(_)));
    h.session.dispatch(event);
    assert!(h.session.state().pending_cover().is_some());
}

/// WHAT: Shutdown stops an active capture and releases every device
/// WHY: Leaving the session must free the microphone and outputs
#[test]
fn given_capture_and_devices_when_shutdown_then_everything_released() {
    // Given: Two devices and a running capture
    let mut h = harness();
    let first = h.record(1);
    let second = h.record(1);
    h.session.toggle(first);
    h.session.toggle(second);
    h.session.start_capture();

    // When: Shutting down
    h.session.shutdown();

    // Then: No devices remain and the microphone was stopped
    assert_eq!(h.session.device_count(), 0);
    let log = h.playback.lock().unwrap();
    assert!(log.device(first).released);
    assert!(log.device(second).released);
    assert_eq!(h.capture.lock().unwrap().stops, 3);
}
