use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// What the typing loop reacts to: a key, a resize, or a quiet tick interval
#[derive(Clone, Debug)]
pub enum WpmEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where key and resize events come from
pub trait WpmEventSource: Send + 'static {
    /// Waits up to `timeout`; `Err(Timeout)` lets the loop run the session timer.
    fn recv_timeout(&self, timeout: Duration) -> Result<WpmEvent, RecvTimeoutError>;
}

/// Reads the terminal on a background thread and forwards keys and resizes
pub struct CrosstermEventSource {
    rx: Receiver<WpmEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(WpmEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(WpmEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("terminal event reader stopped: {}", e);
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl WpmEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<WpmEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Period of the session timer tick
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Ticks every `TICK_RATE_MS` in the app; shorter in tests
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Scripted keys fed over a channel, for driving a session without a terminal
pub struct TestEventSource {
    rx: Receiver<WpmEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<WpmEvent>) -> Self {
        Self { rx }
    }
}

impl WpmEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<WpmEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// One step of the typing loop: the next key or resize, else a Tick
pub struct Runner<E: WpmEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: WpmEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// A closed channel also yields Tick, so a scripted session keeps timing out
    pub fn step(&self) -> WpmEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => WpmEvent::Tick,
        }
    }
}

/// Time source for the session clock
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn advance_millis(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle(u64);

/// The session's periodic timer.
///
/// At most one handle is live: `arm` cancels the previous handle before
/// issuing a new one, and ticks are only honoured while a handle is armed.
#[derive(Debug, Default)]
pub struct TickTimer {
    current: Option<TimerHandle>,
    issued: u64,
}

impl TickTimer {
    pub fn arm(&mut self) -> TimerHandle {
        self.cancel();
        self.issued += 1;
        let handle = TimerHandle(self.issued);
        self.current = Some(handle);
        handle
    }

    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.current.take()
    }

    pub fn is_armed(&self) -> bool {
        self.current.is_some()
    }

    /// False for handles that were cancelled or replaced
    #[cfg(test)]
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.current == Some(handle)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        usize::from(self.current.is_some())
    }
}
