//! Audible key feedback.
//!
//! Cue selection is pure and happens before a keystroke reaches the session,
//! because the expected character moves once the key is applied. Playback runs
//! on a dedicated audio thread owned by [`TonePlayer`]; rodio's output stream
//! is not `Send`, so it is created on that thread and never leaves it. The
//! thread lives exactly as long as the player.

use std::time::Duration;

#[cfg(feature = "audio")]
use std::sync::mpsc;
#[cfg(feature = "audio")]
use std::thread;

use crate::session::KeyInput;

/// Which sound to play for a keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Cue {
    Key,
    Error,
    WordComplete,
}

/// A short sine tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub volume: f32,
}

impl Cue {
    pub fn tone(self) -> Tone {
        match self {
            // A4, quiet and short
            Cue::Key => Tone {
                frequency_hz: 440.0,
                duration: Duration::from_millis(100),
                volume: 0.1,
            },
            Cue::Error => Tone {
                frequency_hz: 220.0,
                duration: Duration::from_millis(150),
                volume: 0.1,
            },
            Cue::WordComplete => Tone {
                frequency_hz: 660.0,
                duration: Duration::from_millis(250),
                volume: 0.08,
            },
        }
    }
}

/// Picks the cue for `key` given the character expected before it is applied.
pub fn cue_for(key: KeyInput, expected: Option<char>) -> Option<Cue> {
    match key {
        KeyInput::DeleteBack => None,
        KeyInput::Char(c) if Some(c) == expected => Some(Cue::Key),
        KeyInput::Char(_) => Some(Cue::Error),
    }
}

/// Owns the audio output for the lifetime of the UI.
pub struct TonePlayer {
    enabled: bool,
    #[cfg(feature = "audio")]
    sender: Option<mpsc::SyncSender<Tone>>,
    #[cfg(feature = "audio")]
    worker: Option<thread::JoinHandle<()>>,
}

impl TonePlayer {
    #[cfg(feature = "audio")]
    pub fn new(enabled: bool) -> Self {
        // bounded so a burst of keys drops tones instead of queueing them
        let (tx, rx) = mpsc::sync_channel::<Tone>(16);

        let worker = thread::Builder::new()
            .name("zengarden-audio".to_string())
            .spawn(move || {
                let output = match rodio::OutputStream::try_default() {
                    Ok(output) => Some(output),
                    Err(e) => {
                        tracing::debug!("audio output unavailable: {}", e);
                        None
                    }
                };

                while let Ok(tone) = rx.recv() {
                    if let Some((ref _stream, ref handle)) = output {
                        if let Err(e) = play_tone(handle, tone) {
                            tracing::debug!("failed to play tone: {}", e);
                        }
                    }
                }
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("failed to spawn audio thread: {}", e);
                None
            }
        };

        Self {
            enabled,
            sender: worker.as_ref().map(|_| tx),
            worker,
        }
    }

    #[cfg(not(feature = "audio"))]
    pub fn new(enabled: bool) -> Self {
        tracing::debug!("built without audio support, tones are silent");
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Fire-and-forget. Never blocks the caller.
    pub fn play(&self, cue: Cue) {
        if !self.enabled {
            return;
        }

        self.dispatch(cue);
    }

    #[cfg(feature = "audio")]
    fn dispatch(&self, cue: Cue) {
        if let Some(ref sender) = self.sender {
            // full queue or dead worker: drop the tone
            let _ = sender.try_send(cue.tone());
        }
    }

    #[cfg(not(feature = "audio"))]
    fn dispatch(&self, cue: Cue) {
        tracing::trace!("cue {} (silent)", cue);
    }
}

#[cfg(feature = "audio")]
fn play_tone(handle: &rodio::OutputStreamHandle, tone: Tone) -> Result<(), rodio::PlayError> {
    use rodio::Source;

    let source = rodio::source::SineWave::new(tone.frequency_hz)
        .take_duration(tone.duration)
        .amplify(tone.volume);
    let sink = rodio::Sink::try_new(handle)?;
    sink.append(source);
    sink.detach();
    Ok(())
}

#[cfg(feature = "audio")]
impl Drop for TonePlayer {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for TonePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TonePlayer")
            .field("enabled", &self.enabled)
            .finish()
    }
}
