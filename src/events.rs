use crate::models::Repo;
use anyhow::Result;
use crossterm::event::{self, Event};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

/// Everything the UI loop reacts to.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Input(Event),
    /// One animation frame is due.
    Frame,
    /// Result of the repository fetch started by mount number `generation`.
    ReposLoaded { generation: u64, repos: Vec<Repo> },
}

pub struct EventHandler {
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Forward terminal input into the event channel from a blocking thread.
    /// The thread exits once this handler, and with it the receiver, is
    /// dropped.
    pub fn start_input(&self) {
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            loop {
                // Poll with a timeout so a closed channel is noticed promptly
                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => match event::read() {
                        Ok(event) => {
                            if tx.send(AppEvent::Input(event)).is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "failed to read terminal event");
                            break;
                        }
                    },
                    Ok(false) => {
                        if tx.is_closed() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "failed to poll terminal events");
                        break;
                    }
                }
            }
        });
    }

    pub async fn next(&mut self) -> Result<AppEvent> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("event channel closed"))
    }

    /// Pops an already queued event without waiting.
    pub fn try_next(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}

/// Schedules [`AppEvent::Frame`] at a fixed rate until stopped.
///
/// The task is aborted on [`stop`](Self::stop) and on drop, so no frame is
/// ever delivered for a torn-down animation.
pub struct FrameTicker {
    handle: Option<JoinHandle<()>>,
}

impl FrameTicker {
    pub fn start(tx: UnboundedSender<AppEvent>, fps: u32) -> Self {
        let period = Duration::from_millis(1000 / u64::from(fps.max(1)));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Frame).is_err() {
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticker_delivers_frames() {
        let mut events = EventHandler::new();
        let _ticker = FrameTicker::start(events.sender(), 100);

        let event = tokio::time::timeout(Duration::from_secs(2), events.next())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, AppEvent::Frame));
    }

    #[tokio::test]
    async fn test_stopped_ticker_sends_nothing() {
        let mut events = EventHandler::new();
        let mut ticker = FrameTicker::start(events.sender(), 100);
        ticker.stop();
        assert!(!ticker.is_running());

        tokio::time::sleep(Duration::from_millis(50)).await;
        // Drain anything sent before the abort landed
        while events.try_next().is_some() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(events.try_next().is_none());
    }
}
