use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Animation frame; the speed timer is polled at this rate too
pub const FRAME: Duration = Duration::from_millis(50);

#[derive(Clone, Debug)]
pub enum ZenEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

pub trait EventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<ZenEvent, RecvTimeoutError>;
}

/// Events arriving over a channel, from the terminal reader or from a test.
pub struct ChannelEventSource {
    rx: Receiver<ZenEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<ZenEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<ZenEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Spawns the crossterm reader thread. Mouse, focus and paste events are dropped.
pub fn terminal_events() -> ChannelEventSource {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) => ZenEvent::Key(key),
            Ok(CtEvent::Resize(w, h)) => ZenEvent::Resize(w, h),
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("terminal event read failed: {}", e);
                break;
            }
        };
        if tx.send(evt).is_err() {
            break;
        }
    });

    ChannelEventSource::new(rx)
}

pub struct Runner<E: EventSource> {
    source: E,
    frame: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(source: E, frame: Duration) -> Self {
        Self { source, frame }
    }

    /// Next input, or `Tick` once a frame passes without any. A closed
    /// source keeps ticking so animations and pending replies still run.
    pub fn step(&self) -> ZenEvent {
        self.source
            .recv_timeout(self.frame)
            .unwrap_or(ZenEvent::Tick)
    }
}
