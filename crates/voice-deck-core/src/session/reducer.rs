use crate::{
    device::{DeviceEvent, DeviceEventKind},
    model::{AudioClip, DEFAULT_LABEL, Recording, RecordingId, format_time},
    session::{CapturePhase, Effect, PlaybackStatus, Selection, SessionEvent, SessionState},
};

use std::mem;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Apply one event to the session and return the effects to run.
///
/// Pure apart from logging: time and ids arrive inside the events, devices
/// are only touched through the returned [`Effect`]s.
pub fn reduce(state: &mut SessionState, event: SessionEvent) -> Vec<Effect> {
    match event {
        SessionEvent::StartCapture { session_id } => start_capture(state, session_id),
        SessionEvent::CaptureStarted { session_id } => {
            if state.capture == (CapturePhase::Requesting { session_id }) {
                state.capture = CapturePhase::Capturing {
                    session_id,
                    elapsed_seconds: 0,
                    cover: state.pending_cover.clone(),
                    cover_replaced: false,
                };
                info!(session_id = %session_id, "Capture started");
            }
            Vec::new()
        }
        SessionEvent::CaptureFailed { session_id, reason } => {
            if state.capture == (CapturePhase::Requesting { session_id }) {
                state.capture = CapturePhase::Idle;
                warn!(session_id = %session_id, reason = %reason, "Capture could not start");
                state.notice = Some(reason);
            }
            Vec::new()
        }
        SessionEvent::CaptureTick => capture_tick(state),
        SessionEvent::StopCapture => stop_capture(state),
        SessionEvent::CaptureFinished {
            session_id,
            clip,
            created_at,
        } => finish_capture(state, session_id, clip, created_at),
        SessionEvent::CaptureAborted { session_id, reason } => {
            if matches!(state.capture, CapturePhase::Finishing { .. })
                && state.capture.session_id() == Some(session_id)
            {
                state.capture = CapturePhase::Idle;
                warn!(session_id = %session_id, reason = %reason, "Capture discarded");
                state.notice = Some(reason);
            }
            Vec::new()
        }

        SessionEvent::SetLabel(label) => {
            state.pending_label = label;
            Vec::new()
        }
        SessionEvent::LoadCover(path) => vec![Effect::LoadCover { path }],
        SessionEvent::CoverLoaded(cover) => {
            state.pending_cover = Some(cover);
            mark_cover_replaced(&mut state.capture);
            Vec::new()
        }
        SessionEvent::CoverFailed { reason } => {
            state.notice = Some(reason);
            Vec::new()
        }
        SessionEvent::ClearCover => {
            state.pending_cover = None;
            mark_cover_replaced(&mut state.capture);
            Vec::new()
        }

        SessionEvent::Toggle(id) => toggle(state, id),
        SessionEvent::PlaybackFailed { id, reason } => {
            warn!(recording_id = %id, reason = %reason, "Playback failed");
            if state.selection.is_some_and(|s| s.id == id) {
                state.selection = None;
                state.reset_progress();
            }
            state.notice = Some(reason);
            Vec::new()
        }
        SessionEvent::Seek(fraction) => seek(state, fraction),
        SessionEvent::SkipNext => match state.selected_index() {
            Some(idx) if idx + 1 < state.recordings.len() => {
                let next = state.recordings[idx + 1].id;
                toggle(state, next)
            }
            _ => Vec::new(),
        },
        SessionEvent::SkipPrevious => match state.selected_index() {
            Some(idx) if idx > 0 => {
                let previous = state.recordings[idx - 1].id;
                toggle(state, previous)
            }
            _ => Vec::new(),
        },
        SessionEvent::Device(event) => device_event(state, event),

        SessionEvent::Delete(id) => delete(state, id),

        SessionEvent::ToggleSidebar => {
            state.sidebar_open = !state.sidebar_open;
            Vec::new()
        }
        SessionEvent::OpenRecorder => {
            state.recorder_open = true;
            Vec::new()
        }
        SessionEvent::CloseRecorder => {
            state.recorder_open = false;
            Vec::new()
        }
        SessionEvent::DismissNotice => {
            state.notice = None;
            Vec::new()
        }
    }
}

fn start_capture(state: &mut SessionState, session_id: Uuid) -> Vec<Effect> {
    if state.capture != CapturePhase::Idle {
        debug!(session_id = %session_id, "Capture slot busy, start rejected");
        state.notice = Some("A recording is already in progress".to_string());
        return Vec::new();
    }

    state.capture = CapturePhase::Requesting { session_id };
    vec![Effect::BeginCapture { session_id }]
}

fn capture_tick(state: &mut SessionState) -> Vec<Effect> {
    let CapturePhase::Capturing {
        session_id,
        elapsed_seconds,
        ..
    } = &mut state.capture
    else {
        return Vec::new();
    };

    *elapsed_seconds += 1;
    let (session_id, elapsed) = (*session_id, *elapsed_seconds);

    match state.capture_limit {
        Some(limit) if elapsed >= limit => {
            info!(session_id = %session_id, limit_seconds = limit, "Capture limit reached");
            state.notice = Some(format!(
                "Recording stopped at the {} limit",
                format_time(f64::from(limit))
            ));
            stop_capture(state)
        }
        _ => Vec::new(),
    }
}

fn stop_capture(state: &mut SessionState) -> Vec<Effect> {
    match mem::take(&mut state.capture) {
        CapturePhase::Capturing {
            session_id,
            elapsed_seconds,
            cover,
            cover_replaced,
        } => {
            state.capture = CapturePhase::Finishing {
                session_id,
                elapsed_seconds,
                cover,
                cover_replaced,
            };
            vec![Effect::FinishCapture { session_id }]
        }
        other => {
            debug!("Stop requested while not capturing");
            state.capture = other;
            Vec::new()
        }
    }
}

fn finish_capture(
    state: &mut SessionState,
    session_id: Uuid,
    clip: AudioClip,
    created_at: DateTime<Local>,
) -> Vec<Effect> {
    let (elapsed_seconds, cover, cover_replaced) = match mem::take(&mut state.capture) {
        CapturePhase::Finishing {
            session_id: finishing,
            elapsed_seconds,
            cover,
            cover_replaced,
        } if finishing == session_id => (elapsed_seconds, cover, cover_replaced),
        other => {
            warn!(session_id = %session_id, "Clip arrived for a capture that is not finishing");
            state.capture = other;
            return Vec::new();
        }
    };

    let id = unique_id(state, RecordingId(created_at.timestamp_millis()));
    let label = match state.pending_label.trim() {
        "" => DEFAULT_LABEL.to_string(),
        label => label.to_string(),
    };

    info!(
        session_id = %session_id,
        recording_id = %id,
        duration_seconds = elapsed_seconds,
        clip_bytes = clip.len(),
        "Recording created"
    );

    state.recordings.insert(
        0,
        Recording {
            id,
            audio: clip,
            label,
            created_at,
            duration_seconds: elapsed_seconds,
            cover,
        },
    );

    state.pending_label.clear();
    if !cover_replaced {
        state.pending_cover = None;
    }
    state.recorder_open = false;

    Vec::new()
}

fn unique_id(state: &SessionState, candidate: RecordingId) -> RecordingId {
    if state.recording(candidate).is_none() {
        return candidate;
    }

    let max = state
        .recordings
        .iter()
        .map(|r| r.id.0)
        .max()
        .unwrap_or(candidate.0);
    RecordingId(max + 1)
}

fn mark_cover_replaced(capture: &mut CapturePhase) {
    if let CapturePhase::Capturing { cover_replaced, .. }
    | CapturePhase::Finishing { cover_replaced, .. } = capture
    {
        *cover_replaced = true;
    }
}

fn toggle(state: &mut SessionState, id: RecordingId) -> Vec<Effect> {
    let Some(recording) = state.recording(id) else {
        debug!(recording_id = %id, "Toggle for unknown recording ignored");
        return Vec::new();
    };
    let clip = recording.audio.clone();
    let captured_duration = f64::from(recording.duration_seconds);

    let current = state.selection;
    match current {
        Some(Selection {
            id: selected,
            status: PlaybackStatus::Playing,
        }) if selected == id => {
            state.selection = Some(Selection {
                id,
                status: PlaybackStatus::Paused,
            });
            vec![Effect::Pause { id }]
        }
        selection => {
            if selection.map(|s| s.id) != Some(id) {
                state.current_time = 0.0;
                state.duration = captured_duration;
            }
            state.selection = Some(Selection {
                id,
                status: PlaybackStatus::Playing,
            });
            vec![Effect::PauseOthers { keep: id }, Effect::Play { id, clip }]
        }
    }
}

fn seek(state: &mut SessionState, fraction: f64) -> Vec<Effect> {
    let Some(selection) = state.selection else {
        return Vec::new();
    };
    if fraction.is_nan() {
        return Vec::new();
    }

    let seconds = fraction.clamp(0.0, 100.0) / 100.0 * state.duration;
    state.current_time = seconds;
    vec![Effect::Seek {
        id: selection.id,
        seconds,
    }]
}

fn device_event(state: &mut SessionState, event: DeviceEvent) -> Vec<Effect> {
    let DeviceEvent { id, kind } = event;
    let selected = state.selection.is_some_and(|s| s.id == id);

    match kind {
        DeviceEventKind::Progress(seconds) if selected => {
            state.current_time = seconds;
        }
        DeviceEventKind::DurationKnown(seconds) if selected => {
            if seconds.is_finite() && seconds > 0.0 {
                state.duration = seconds;
            }
        }
        DeviceEventKind::Ended if selected => {
            debug!(recording_id = %id, "Playback ended");
            state.selection = None;
            state.reset_progress();
        }
        DeviceEventKind::Error(reason) => {
            warn!(recording_id = %id, reason = %reason, "Playback device error");
            if selected {
                state.selection = None;
                state.reset_progress();
                state.notice = Some(format!("Could not decode: {}", reason));
            }
        }
        _ => {}
    }

    Vec::new()
}

fn delete(state: &mut SessionState, id: RecordingId) -> Vec<Effect> {
    let Some(idx) = state.index_of(id) else {
        debug!(recording_id = %id, "Delete for unknown recording ignored");
        return Vec::new();
    };

    state.recordings.remove(idx);
    if state.selection.is_some_and(|s| s.id == id) {
        state.selection = None;
        state.reset_progress();
    }

    info!(recording_id = %id, "Recording deleted");
    vec![Effect::Release { id }]
}
