//! Voice-deck: record voice memos and play them back like a music library.

mod app;
mod app_command;
mod config;
mod error;
mod input_handler;
mod view;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    input_handler::InputHandler,
};

use crate::config::Config;

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use voice_deck_core::{FileImageLoader, MicrophoneCapture, SessionController, SpeakerBackend};

/// Application entry point.
fn main() {
    // Logging is configured from the file, so a load failure is reported
    // after the subscriber is up with the default filter.
    let loaded = Config::load();
    let filter = match &loaded {
        Ok(config) => config.logging.filter.clone(),
        Err(_) => config::DEFAULT_LOG_FILTER.to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let capture = MicrophoneCapture::new(
            config.audio.input_device.clone(),
            config.audio.max_recording_seconds,
        );
        let backend = SpeakerBackend::new(
            config.audio.output_device.clone(),
            config.playback.progress_interval_ms,
        );
        let (session, session_rx) = SessionController::new(capture, backend, FileImageLoader);

        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let input_handler = InputHandler::new(command_tx);
        let app = App {
            session,
            session_rx,
            command_rx,
            shutdown_tx,
            out: tokio::io::stdout(),
            list_devices: app::host_devices,
        };

        tokio::join!(
            async {
                if let Err(e) = input_handler.run(shutdown_rx).await {
                    error!(error = ?e, "Input handler error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });

    // A pending stdin read cannot be cancelled; do not wait on it.
    rt.shutdown_timeout(Duration::from_millis(100));
    info!("Exited");
}
