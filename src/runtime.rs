use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// What the session loop reacts to: a key press, a terminal resize, or the
/// periodic tick that polls the scheduler's deadlines.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where loop input comes from. The production source reads crossterm;
/// tests feed a channel directly.
pub trait AppEventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread and forwards the ones the
/// session loop cares about. The thread winds down once the receiving half
/// is dropped or the terminal read fails.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || Self::pump(tx));
        Self { rx }
    }

    fn pump(tx: Sender<AppEvent>) {
        while let Ok(raw) = event::read() {
            let translated = match raw {
                CtEvent::Key(key) => AppEvent::Key(key),
                CtEvent::Resize(_, _) => AppEvent::Resize,
                _ => continue,
            };
            if tx.send(translated).is_err() {
                break;
            }
        }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-backed source for driving the loop without a terminal.
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }

    /// A source together with the sending half that feeds it.
    pub fn pair() -> (Sender<AppEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls the next event for the session loop, waiting at most one tick
/// interval. A quiet interval yields `Tick`, which is what keeps the
/// scheduler's deadline polling going while the user does nothing.
pub struct Runner<E: AppEventSource> {
    events: E,
    tick_rate: Duration,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(events: E, tick_rate: Duration) -> Self {
        Self { events, tick_rate }
    }

    pub fn step(&self) -> AppEvent {
        match self.events.recv_timeout(self.tick_rate) {
            Ok(ev) => ev,
            // a disconnected source means no more input will ever arrive;
            // keep ticking so the breathing session itself stays alive
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}
