use crate::{AppCommand, AppError, AppResult, view};

use voice_deck_core::{
    AudioDeviceInfo, CaptureDevice, CoreResult, ImageLoader, PlaybackBackend, PlaybackStatus,
    RecordingId, SessionController, SessionEvent, list_input_devices, list_output_devices,
};

use std::time::Duration;

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::{mpsc, watch},
    time::{Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, instrument, warn};

const CAPTURE_TICK: Duration = Duration::from_secs(1);

/// Input and output devices, in that order.
pub(crate) type DeviceListing = (Vec<AudioDeviceInfo>, Vec<AudioDeviceInfo>);

/// Enumerates audio devices for the `devices` command.
pub(crate) type DeviceLister = fn() -> CoreResult<DeviceListing>;

/// Devices of the default cpal host.
pub(crate) fn host_devices() -> CoreResult<DeviceListing> {
    Ok((list_input_devices()?, list_output_devices()?))
}

/// Main application state.
///
/// Owns the session controller and drives it from terminal commands, device
/// events and the one-second capture ticker. Everything runs on one task;
/// the controller is never shared.
pub struct App<C, B, L, W>
where
    C: CaptureDevice,
    B: PlaybackBackend,
    L: ImageLoader,
    W: AsyncWrite + Unpin,
{
    pub(crate) session: SessionController<C, B, L>,
    pub(crate) session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    pub(crate) command_rx: mpsc::Receiver<AppResult<AppCommand>>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) out: W,
    pub(crate) list_devices: DeviceLister,
}

/// What a device event changed that is worth redrawing for.
///
/// Position is in whole seconds, the resolution of the transport line.
#[derive(Debug, PartialEq)]
pub(crate) struct Visible {
    selection: Option<(RecordingId, bool)>,
    position_seconds: u64,
    notice: bool,
    cover: bool,
}

impl<C, B, L, W> App<C, B, L, W>
where
    C: CaptureDevice,
    B: PlaybackBackend,
    L: ImageLoader,
    W: AsyncWrite + Unpin,
{
    /// Run the main application event loop.
    ///
    /// The session is shut down and the shutdown signal sent however the
    /// loop ends, including on a terminal write error.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Voice-deck starting");

        let result = self.event_loop().await;

        self.session.shutdown();
        let _ = self.shutdown_tx.send(true);
        let flushed = self.out.flush().await;
        info!("Voice-deck shut down successfully");

        result?;
        flushed?;
        Ok(())
    }

    async fn event_loop(&mut self) -> AppResult<()> {
        // The recording list starts visible on a terminal.
        self.session.dispatch(SessionEvent::ToggleSidebar);
        self.write(view::HELP).await?;
        self.write("\n\n").await?;
        self.redraw().await?;

        let mut ticker: Option<Interval> = None;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!("Input closed, shutting down");
                        return Ok(());
                    };
                    match cmd {
                        Ok(AppCommand::Quit) => {
                            info!("Quit requested");
                            return Ok(());
                        }
                        Ok(cmd) => self.handle_command(cmd).await?,
                        Err(e) => {
                            debug!(error = ?e, "Rejected command");
                            self.write(&format!("{}\n", e.user_message())).await?;
                        }
                    }
                    sync_ticker(&mut ticker, self.session.state().is_capturing());
                }

                Some(event) = self.session_rx.recv() => {
                    let before = self.visible();
                    self.session.dispatch(event);
                    sync_ticker(&mut ticker, self.session.state().is_capturing());
                    if self.visible() != before {
                        self.redraw().await?;
                    }
                }

                _ = next_tick(&mut ticker) => {
                    self.session.tick();
                    debug!(
                        elapsed_seconds = self.session.state().capture_seconds(),
                        "Capture tick"
                    );
                    // The capture limit stops the recording from a tick.
                    if !self.session.state().is_capturing() {
                        sync_ticker(&mut ticker, false);
                        self.redraw().await?;
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Apply one terminal command and redraw.
    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, cmd: AppCommand) -> AppResult<()> {
        match cmd {
            AppCommand::Record => self.session.start_capture(),
            AppCommand::Stop => self.session.stop_capture(),
            AppCommand::Label(label) => self.session.set_label(label),
            AppCommand::Cover(path) => self.session.attach_cover_image(path),
            AppCommand::Uncover => self.session.clear_cover_image(),
            AppCommand::Play(position) => self.play(position).await?,
            AppCommand::Pause => {
                if let Some(id) = self.session.state().playing_id() {
                    self.session.toggle(id);
                }
            }
            AppCommand::Next => self.session.skip_next(),
            AppCommand::Previous => self.session.skip_previous(),
            AppCommand::Seek(percent) => self.session.seek(percent),
            AppCommand::Delete(position) => {
                if let Some(id) = self.resolve(position).await? {
                    self.session.delete(id);
                }
            }
            AppCommand::List => {
                let list = view::render_list(self.session.state());
                return self.write(&list).await;
            }
            AppCommand::Sidebar => self.session.dispatch(SessionEvent::ToggleSidebar),
            AppCommand::New => self.session.dispatch(SessionEvent::OpenRecorder),
            AppCommand::Close => self.session.dispatch(SessionEvent::CloseRecorder),
            AppCommand::Devices => {
                let text = match (self.list_devices)() {
                    Ok((inputs, outputs)) => view::render_devices(&inputs, &outputs),
                    Err(e) => {
                        let e = AppError::from(e);
                        warn!(error = ?e, "Device listing failed");
                        format!("{}\n", e.user_message())
                    }
                };
                return self.write(&text).await;
            }
            AppCommand::Help => return self.write(&format!("{}\n", view::HELP)).await,
            AppCommand::Quit => {}
        }

        self.redraw().await
    }

    /// `play n` selects and plays recording n unless it is already playing;
    /// bare `play` resumes the selection or starts the newest recording.
    async fn play(&mut self, position: Option<usize>) -> AppResult<()> {
        let target = match position {
            Some(position) => self.resolve(position).await?,
            None => {
                let state = self.session.state();
                state
                    .selection()
                    .map(|s| s.id)
                    .or_else(|| state.recordings().first().map(|r| r.id))
            }
        };

        if let Some(id) = target {
            if self.session.state().playing_id() != Some(id) {
                self.session.toggle(id);
            }
        }
        Ok(())
    }

    /// Map a 1-based list position to a recording id, reporting misses.
    async fn resolve(&mut self, position: usize) -> AppResult<Option<RecordingId>> {
        let id = position
            .checked_sub(1)
            .and_then(|idx| self.session.state().recordings().get(idx))
            .map(|r| r.id);

        if id.is_none() {
            self.write(&format!("No recording #{}\n", position)).await?;
        }
        Ok(id)
    }

    async fn redraw(&mut self) -> AppResult<()> {
        let screen = view::render(self.session.state());
        self.write(&screen).await?;

        let notice = self.session.state().notice().map(|n| format!("! {}\n", n));
        if let Some(line) = notice {
            self.write(&line).await?;
            self.session.dispatch(SessionEvent::DismissNotice);
        }
        Ok(())
    }

    async fn write(&mut self, text: &str) -> AppResult<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    pub(crate) fn visible(&self) -> Visible {
        let state = self.session.state();
        Visible {
            selection: state
                .selection()
                .map(|s| (s.id, s.status == PlaybackStatus::Playing)),
            position_seconds: state.current_time().max(0.0) as u64,
            notice: state.notice().is_some(),
            cover: state.pending_cover().is_some(),
        }
    }
}

/// Start the ticker when capture begins and drop it when capture ends.
fn sync_ticker(ticker: &mut Option<Interval>, capturing: bool) {
    match (capturing, ticker.is_some()) {
        (true, false) => {
            let mut interval = tokio::time::interval_at(Instant::now() + CAPTURE_TICK, CAPTURE_TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticker = Some(interval);
        }
        (false, true) => *ticker = None,
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
