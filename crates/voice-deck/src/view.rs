//! Plain-text rendering of the session for the terminal.

use voice_deck_core::{
    AudioDeviceInfo, CapturePhase, PlaybackStatus, Recording, SessionState, format_time,
};

use std::fmt::Write as _;

/// Width of the progress bar in characters.
pub(crate) const PROGRESS_WIDTH: usize = 20;

pub(crate) const HELP: &str = "\
Commands:
  record            start recording
  stop              stop recording and keep it
  label <text>      label for the next recording
  cover <path>      cover image for the next recording
  uncover           drop the pending cover
  play [n]          play recording n, or resume
  pause             pause playback
  next | prev       play the next or previous recording
  seek <0-100>      jump to a percentage of the current recording
  delete <n>        delete recording n
  list              show recordings
  sidebar           show or hide the recording list
  new | close       open or close the new-recording panel
  devices           list audio devices
  help              this text
  quit              leave";

/// Full screen: recorder panel, list (when the sidebar is open) and transport.
pub(crate) fn render(state: &SessionState) -> String {
    let mut out = String::new();

    if state.recorder_open() || !matches!(state.capture(), CapturePhase::Idle) {
        out.push_str(&render_recorder(state));
        out.push('\n');
    }
    if state.sidebar_open() {
        out.push_str(&render_list(state));
        out.push('\n');
    }
    out.push_str(&render_transport(state));
    out
}

/// Recording list, newest first, numbered from 1.
pub(crate) fn render_list(state: &SessionState) -> String {
    let mut out = String::from("Recordings\n");

    if state.recordings().is_empty() {
        out.push_str("  (none yet, type `record`)\n");
        return out;
    }

    let selected = state.selection();
    for (idx, recording) in state.recordings().iter().enumerate() {
        let marker = match selected {
            Some(s) if s.id == recording.id && s.status == PlaybackStatus::Playing => '>',
            Some(s) if s.id == recording.id => '=',
            _ => ' ',
        };
        let _ = writeln!(
            out,
            "{} {:>2}. {}  {}  {}{}",
            marker,
            idx + 1,
            recording.label,
            format_time(f64::from(recording.duration_seconds)),
            recording.created_at_display(),
            cover_tag(recording),
        );
    }
    out
}

/// Now-playing line with progress bar and skip availability.
pub(crate) fn render_transport(state: &SessionState) -> String {
    let Some(recording) = state.now_playing() else {
        return "Nothing playing\n".to_string();
    };

    let status = match state.selection().map(|s| s.status) {
        Some(PlaybackStatus::Playing) => "Playing",
        _ => "Paused",
    };
    let prev = if state.can_skip_previous() { "<<" } else { "  " };
    let next = if state.can_skip_next() { ">>" } else { "  " };

    format!(
        "{}: {}{}\n{} [{}] {} / {} {}\n",
        status,
        recording.label,
        cover_tag(recording),
        prev,
        progress_bar(state.progress_percent()),
        format_time(state.current_time()),
        format_time(state.duration()),
        next,
    )
}

fn render_recorder(state: &SessionState) -> String {
    let label = match state.pending_label().trim() {
        "" => "(untitled)",
        label => label,
    };
    let cover = state
        .pending_cover()
        .and_then(|c| c.mime_type())
        .unwrap_or("none");

    let status = match state.capture() {
        CapturePhase::Idle => "ready, type `record`".to_string(),
        CapturePhase::Requesting { .. } => "waiting for microphone".to_string(),
        CapturePhase::Capturing { .. } => {
            format!("recording {}", format_time(f64::from(state.capture_seconds())))
        }
        CapturePhase::Finishing { .. } => "saving".to_string(),
    };

    format!(
        "New recording\n  label: {}\n  cover: {}\n  status: {}\n",
        label, cover, status
    )
}

/// Input and output devices, default marked with `*`.
pub(crate) fn render_devices(inputs: &[AudioDeviceInfo], outputs: &[AudioDeviceInfo]) -> String {
    let mut out = String::new();
    for (title, devices) in [("Input devices", inputs), ("Output devices", outputs)] {
        let _ = writeln!(out, "{}", title);
        if devices.is_empty() {
            out.push_str("  (none)\n");
        }
        for device in devices {
            let mark = if device.is_default { '*' } else { ' ' };
            let _ = writeln!(out, "{} {}", mark, device.name);
        }
    }
    out
}

pub(crate) fn progress_bar(percent: f64) -> String {
    let filled = if percent.is_finite() {
        ((percent.clamp(0.0, 100.0) / 100.0) * PROGRESS_WIDTH as f64).round() as usize
    } else {
        0
    };
    format!("{}{}", "#".repeat(filled), "-".repeat(PROGRESS_WIDTH - filled))
}

fn cover_tag(recording: &Recording) -> &'static str {
    if recording.cover.is_some() { " [cover]" } else { "" }
}
