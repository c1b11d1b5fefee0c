use crate::{
    device::{CaptureDevice, DeviceEventSink, ImageLoader, PlaybackBackend, PlaybackDevice},
    model::{AudioClip, RecordingId},
    session::{Effect, SessionEvent, SessionState, reduce},
};

use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Local;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Owns the session state, the capture device and one playback device per
/// recording.
///
/// Every change goes through [`dispatch`](Self::dispatch). Asynchronous
/// outcomes (device progress, end of clip, cover image reads) arrive on the
/// receiver returned by [`new`](Self::new) and must be dispatched back by
/// whoever drives the controller.
///
/// # Thread Safety
///
/// Not thread-safe. Drive it from a single task; devices report from their
/// own threads through the event channel only.
pub struct SessionController<C, B, L>
where
    C: CaptureDevice,
    B: PlaybackBackend,
    L: ImageLoader,
{
    state: SessionState,
    capture: C,
    backend: B,
    loader: Arc<L>,
    devices: HashMap<RecordingId, B::Device>,
    events_tx: UnboundedSender<SessionEvent>,
}

impl<C, B, L> SessionController<C, B, L>
where
    C: CaptureDevice,
    B: PlaybackBackend,
    L: ImageLoader,
{
    /// Create a controller and the receiver for its asynchronous events.
    pub fn new(capture: C, backend: B, loader: L) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let state = match capture.max_seconds() {
            Some(seconds) => SessionState::with_capture_limit(seconds),
            None => SessionState::default(),
        };

        let controller = Self {
            state,
            capture,
            backend,
            loader: Arc::new(loader),
            devices: HashMap::new(),
            events_tx,
        };

        (controller, events_rx)
    }

    /// Current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of live playback devices.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Whether a playback device exists for `id`.
    pub fn has_device(&self, id: RecordingId) -> bool {
        self.devices.contains_key(&id)
    }

    /// Number of devices currently producing audio.
    pub fn active_device_count(&self) -> usize {
        self.devices.values().filter(|d| !d.is_paused()).count()
    }

    /// Sender for injecting events from outside, e.g. a capture ticker.
    pub fn event_sender(&self) -> UnboundedSender<SessionEvent> {
        self.events_tx.clone()
    }

    /// Apply an event and run the effects it produces, including the effects
    /// of any follow-up events those effects report synchronously.
    pub fn dispatch(&mut self, event: SessionEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            for effect in reduce(&mut self.state, event) {
                if let Some(follow_up) = self.run(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// Start recording.
    pub fn start_capture(&mut self) {
        self.dispatch(SessionEvent::StartCapture {
            session_id: Uuid::new_v4(),
        });
    }

    /// Stop recording and add the new recording to the collection.
    pub fn stop_capture(&mut self) {
        self.dispatch(SessionEvent::StopCapture);
    }

    /// Count one elapsed second of capture.
    pub fn tick(&mut self) {
        self.dispatch(SessionEvent::CaptureTick);
    }

    /// Play or pause a recording.
    pub fn toggle(&mut self, id: RecordingId) {
        self.dispatch(SessionEvent::Toggle(id));
    }

    /// Seek the selected recording, `0..=100` of its duration.
    pub fn seek(&mut self, fraction: f64) {
        self.dispatch(SessionEvent::Seek(fraction));
    }

    /// Play the next entry in collection order.
    pub fn skip_next(&mut self) {
        self.dispatch(SessionEvent::SkipNext);
    }

    /// Play the previous entry in collection order.
    pub fn skip_previous(&mut self) {
        self.dispatch(SessionEvent::SkipPrevious);
    }

    /// Delete a recording and release its device.
    pub fn delete(&mut self, id: RecordingId) {
        self.dispatch(SessionEvent::Delete(id));
    }

    /// Set the label for the next recording.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.dispatch(SessionEvent::SetLabel(label.into()));
    }

    /// Read an image file as the next recording's cover.
    pub fn attach_cover_image(&mut self, path: impl Into<PathBuf>) {
        self.dispatch(SessionEvent::LoadCover(path.into()));
    }

    /// Drop the pending cover.
    pub fn clear_cover_image(&mut self) {
        self.dispatch(SessionEvent::ClearCover);
    }

    /// Stop everything and release all devices.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) {
        if self.capture.is_active() {
            match self.capture.stop() {
                Ok(clip) => debug!(clip_bytes = clip.len(), "Discarded in-flight capture"),
                Err(e) => warn!(error = ?e, "Failed to stop capture on shutdown"),
            }
        }

        for (id, mut device) in self.devices.drain() {
            device.pause();
            debug!(recording_id = %id, "Playback device released");
        }

        info!("Session shut down");
    }

    fn run(&mut self, effect: Effect) -> Option<SessionEvent> {
        match effect {
            Effect::BeginCapture { session_id } => self.begin_capture(session_id),
            Effect::FinishCapture { session_id } => self.finish_capture(session_id),
            Effect::LoadCover { path } => self.load_cover(path),
            Effect::PauseOthers { keep } => {
                for (id, device) in self.devices.iter_mut() {
                    if *id != keep && !device.is_paused() {
                        device.pause();
                        debug!(recording_id = %id, "Paused for single playback");
                    }
                }
                None
            }
            Effect::Play { id, clip } => self.play(id, &clip),
            Effect::Pause { id } => {
                if let Some(device) = self.devices.get_mut(&id) {
                    device.pause();
                }
                None
            }
            Effect::Seek { id, seconds } => {
                if let Some(device) = self.devices.get_mut(&id) {
                    device.seek(seconds);
                }
                None
            }
            Effect::Release { id } => {
                if let Some(mut device) = self.devices.remove(&id) {
                    device.pause();
                    debug!(recording_id = %id, "Playback device released");
                }
                None
            }
        }
    }

    #[instrument(skip(self))]
    fn begin_capture(&mut self, session_id: Uuid) -> Option<SessionEvent> {
        match self.capture.start() {
            Ok(()) => Some(SessionEvent::CaptureStarted { session_id }),
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to start capture");
                Some(SessionEvent::CaptureFailed {
                    session_id,
                    reason: e.user_message(),
                })
            }
        }
    }

    #[instrument(skip(self))]
    fn finish_capture(&mut self, session_id: Uuid) -> Option<SessionEvent> {
        match self.capture.stop() {
            Ok(clip) => Some(SessionEvent::CaptureFinished {
                session_id,
                clip,
                created_at: Local::now(),
            }),
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to finish capture");
                Some(SessionEvent::CaptureAborted {
                    session_id,
                    reason: e.user_message(),
                })
            }
        }
    }

    #[instrument(skip(self, clip), fields(recording_id = %id))]
    fn play(&mut self, id: RecordingId, clip: &AudioClip) -> Option<SessionEvent> {
        if !self.devices.contains_key(&id) {
            let sink = DeviceEventSink::new(id, self.events_tx.clone());
            match self.backend.create(id, clip, sink) {
                Ok(device) => {
                    debug!("Playback device created");
                    self.devices.insert(id, device);
                }
                Err(e) => {
                    error!(error = ?e, "Failed to create playback device");
                    return Some(SessionEvent::PlaybackFailed {
                        id,
                        reason: e.user_message(),
                    });
                }
            }
        }

        let device = self.devices.get_mut(&id)?;
        match device.play() {
            Ok(()) => None,
            Err(e) => {
                error!(error = ?e, "Failed to start playback");
                Some(SessionEvent::PlaybackFailed {
                    id,
                    reason: e.user_message(),
                })
            }
        }
    }

    fn load_cover(&self, path: PathBuf) -> Option<SessionEvent> {
        let loader = Arc::clone(&self.loader);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let events_tx = self.events_tx.clone();
                handle.spawn_blocking(move || {
                    let event = cover_event(loader.as_ref(), &path);
                    if events_tx.send(event).is_err() {
                        debug!("Session gone, cover result dropped");
                    }
                });
                None
            }
            // Outside a runtime the read happens inline.
            Err(_) => Some(cover_event(loader.as_ref(), &path)),
        }
    }
}

impl<C, B, L> Drop for SessionController<C, B, L>
where
    C: CaptureDevice,
    B: PlaybackBackend,
    L: ImageLoader,
{
    fn drop(&mut self) {
        if self.capture.is_active() || !self.devices.is_empty() {
            self.shutdown();
        }
    }
}

fn cover_event<L: ImageLoader + ?Sized>(loader: &L, path: &Path) -> SessionEvent {
    match loader.load(path) {
        Ok(cover) => SessionEvent::CoverLoaded(cover),
        Err(e) => {
            warn!(path = ?path, error = ?e, "Cover image rejected");
            SessionEvent::CoverFailed {
                reason: e.user_message(),
            }
        }
    }
}
