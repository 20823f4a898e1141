use std::{sync::mpsc::Sender, time::Duration};

use tokio_util::sync::CancellationToken;

use super::Event;

pub async fn start_ticking(transmitter: Sender<Event>, shutdown_signal: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if transmitter.send(Event::Tick).is_err() {
                    break;
                }
            }
            _ = shutdown_signal.cancelled() => break
        }
    }
}
