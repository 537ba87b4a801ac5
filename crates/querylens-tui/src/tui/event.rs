use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Terminal events
#[derive(Clone, Debug)]
pub enum Event {
    /// Auto-refresh tick
    Tick,
    /// Key press event
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Error occurred
    Error(String),
}

/// Event handler managing terminal input
pub struct EventHandler {
    /// Event receiver
    receiver: mpsc::UnboundedReceiver<Event>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
}

impl EventHandler {
    /// Create a new event handler. Ticks are only sent when `tick_rate` is set.
    pub fn new(tick_rate: Option<Duration>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        {
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let mut reader = event::EventStream::new();
                let mut tick_interval = tick_rate.map(|rate| {
                    let mut interval = tokio::time::interval(rate);
                    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                    interval
                });
                // The first tick of an interval fires immediately
                if let Some(interval) = tick_interval.as_mut() {
                    interval.tick().await;
                }

                loop {
                    let tick = async {
                        match tick_interval.as_mut() {
                            Some(interval) => {
                                interval.tick().await;
                            }
                            None => futures::future::pending::<()>().await,
                        }
                    };
                    let crossterm_event = reader.next().fuse();

                    tokio::select! {
                        _ = cancel.cancelled() => break,

                        _ = tick => {
                            let _ = sender.send(Event::Tick);
                        }

                        maybe_event = crossterm_event => {
                            match maybe_event {
                                Some(Ok(CrosstermEvent::Key(key))) => {
                                    // Filter out release events (important for Windows)
                                    if key.kind == KeyEventKind::Press {
                                        let _ = sender.send(Event::Key(key));
                                    }
                                }
                                Some(Ok(CrosstermEvent::Resize(w, h))) => {
                                    let _ = sender.send(Event::Resize(w, h));
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    let _ = sender.send(Event::Error(e.to_string()));
                                }
                                None => break,
                            }
                        }
                    }
                }
            });
        }

        Self { receiver, cancel }
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Shutdown the event handler
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
