//! Terminal input reader.
//!
//! Reads stdin line by line, parses each line into an [`AppCommand`] and
//! forwards the result to the application loop. End of input is treated as
//! `quit`.

use crate::{AppCommand, AppResult};

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument, warn};

/// Forwards parsed terminal lines to the application loop.
pub struct InputHandler {
    command_tx: mpsc::Sender<AppResult<AppCommand>>,
}

impl InputHandler {
    /// Create a handler that sends parsed lines on `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppResult<AppCommand>>) -> Self {
        Self { command_tx }
    }

    /// Read from stdin until end of input or a shutdown signal.
    pub async fn run(&self, shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        self.run_with(BufReader::new(tokio::io::stdin()), shutdown_rx)
            .await
    }

    /// Read from `reader` until end of input or a shutdown signal.
    #[instrument(skip(self, reader, shutdown_rx))]
    pub async fn run_with<R>(
        &self,
        reader: R,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Input handler shutting down");
                    break;
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) if line.trim().is_empty() => continue,
                        Some(line) => {
                            let parsed = line.parse::<AppCommand>();
                            debug!(command = ?parsed.as_ref().ok(), "Command read");
                            if self.command_tx.send(parsed).await.is_err() {
                                debug!("Application loop gone, input handler stopping");
                                break;
                            }
                        }
                        None => {
                            info!("End of input");
                            if self.command_tx.send(Ok(AppCommand::Quit)).await.is_err() {
                                warn!("Failed to forward quit at end of input");
                            }
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
