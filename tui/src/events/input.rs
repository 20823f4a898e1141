use std::{sync::mpsc, time::Duration};

use ratatui::crossterm::event;
use tokio_util::sync::CancellationToken;

/// Upper bound on how long shutdown waits for this thread.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub fn watch_input_events(tx: mpsc::Sender<super::Event>, shutdown_signal: CancellationToken) {
    while !shutdown_signal.is_cancelled() {
        match event::poll(POLL_TIMEOUT) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(error) => {
                tracing::error!(%error, "polling terminal input failed");
                break;
            }
        }

        match event::read() {
            Ok(event::Event::Key(key_event)) => {
                // Main thread may already be gone during shutdown.
                if tx.send(super::Event::Input(key_event)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                tracing::error!(%error, "reading terminal input failed");
                break;
            }
        }
    }
}
