use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::analysis::{self, Analyzer, ReflectionReply};
use crate::config::Config;
use crate::feedback::{self, Cue, TonePlayer};
use crate::particles::ParticleField;
use crate::session::{KeyInput, Session, Status};
use crate::timer::SpeedTimer;

/// How long the leaf stays up after a completed word
pub const WORD_CUE_DURATION: Duration = Duration::from_millis(1500);

pub const SAMPLE_TEXT: &str = "the stones in the garden sit still while the water moves around them \
and the moss grows slowly over their backs in the quiet morning light";

/// State of the reflection panel shown after a finished session
#[derive(Debug, Clone, PartialEq)]
pub enum Reflection {
    Hidden,
    Loading,
    Ready(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Maps a terminal key to a session keystroke, dropping everything else.
pub fn key_input(key: &KeyEvent) -> Option<KeyInput> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Backspace => Some(KeyInput::DeleteBack),
        KeyCode::Char(c) if !c.is_control() => Some(KeyInput::Char(c)),
        _ => None,
    }
}

/// Owns the session and everything that reacts to it. Only
/// [`App::type_key_at`] feeds keystrokes into the session.
pub struct App {
    pub session: Session,
    pub config: Config,
    pub particles: ParticleField,
    pub reflection: Reflection,
    pub word_cue_until: Option<Instant>,
    tones: TonePlayer,
    speed_timer: SpeedTimer,
    analyzer: Arc<dyn Analyzer>,
    generation: u64,
    reflection_tx: Sender<ReflectionReply>,
    reflection_rx: Receiver<ReflectionReply>,
}

impl App {
    pub fn new(
        text: impl Into<String>,
        config: Config,
        analyzer: Arc<dyn Analyzer>,
        width: u16,
        height: u16,
    ) -> Self {
        let (reflection_tx, reflection_rx) = mpsc::channel();

        Self {
            session: Session::new(text),
            particles: ParticleField::new(config.particle_count, width, height),
            tones: TonePlayer::new(config.sound_enabled),
            config,
            reflection: Reflection::Hidden,
            word_cue_until: None,
            speed_timer: SpeedTimer::default(),
            analyzer,
            generation: 0,
            reflection_tx,
            reflection_rx,
        }
    }

    /// Replaces the session with a fresh one over `text`, or over the same
    /// passage when `None`. Any reflection still in flight becomes stale.
    pub fn reset(&mut self, text: Option<String>) {
        let text = text.unwrap_or_else(|| self.session.text().iter().collect());

        self.generation += 1;
        self.session = Session::new(text);
        self.speed_timer.disarm();
        self.reflection = Reflection::Hidden;
        self.word_cue_until = None;

        tracing::info!(generation = self.generation, "session reset");
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        self.handle_key_at(key, Instant::now())
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now: Instant) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::Continue;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Action::Quit,
                KeyCode::Char('s') => self.toggle_sound(),
                KeyCode::Char('f') => self.toggle_focus(),
                KeyCode::Char('g') => self.toggle_reflection_mode(),
                KeyCode::Char('t') => self.toggle_theme(),
                _ => {}
            }
            return Action::Continue;
        }

        if self.reflection != Reflection::Hidden {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.reflection = Reflection::Hidden;
            }
            return Action::Continue;
        }

        if key.code == KeyCode::Esc {
            self.reset(None);
            return Action::Continue;
        }

        if let Some(input) = key_input(&key) {
            self.type_key_at(input, now);
        }
        Action::Continue
    }

    /// Applies one keystroke and fires the cues and hooks that depend on it.
    pub fn type_key_at(&mut self, input: KeyInput, now: Instant) {
        if self.session.is_finished() {
            return;
        }

        // the expected char moves once the key is applied
        let cue = feedback::cue_for(input, self.session.expected_char());
        let previous_status = self.session.status();
        let previous_streak = self.session.streak();

        self.session.apply_at(input, now);

        if let Some(cue) = cue {
            self.tones.play(cue);
        }

        if self.session.streak() > previous_streak {
            self.word_cue_until = Some(now + WORD_CUE_DURATION);
            self.tones.play(Cue::WordComplete);
        }

        if previous_status == Status::Idle && self.session.status() != Status::Idle {
            tracing::debug!(generation = self.generation, "session started");
        }

        self.speed_timer.sync(self.session.is_active(), now);

        if previous_status != Status::Finished && self.session.is_finished() {
            self.on_finished();
        }
    }

    pub fn on_tick(&mut self) {
        self.on_tick_at(Instant::now());
    }

    pub fn on_tick_at(&mut self, now: Instant) {
        self.poll_reflections();

        self.speed_timer.sync(self.session.is_active(), now);
        if self.speed_timer.poll(now) {
            self.session.tick_at(now);
        }

        if let Some(until) = self.word_cue_until {
            if now >= until {
                self.word_cue_until = None;
                self.session.clear_word_completed();
            }
        }

        self.particles.step(self.session.wpm());
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.particles.resize(width, height);
    }

    /// Completion hook, runs once per session. The analyzer gets what the
    /// typist actually entered, mistakes included, not the passage.
    fn on_finished(&mut self) {
        let elapsed = match (self.session.started_at(), self.session.ended_at()) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        };
        tracing::info!(
            generation = self.generation,
            wpm = self.session.wpm(),
            accuracy = self.session.accuracy(),
            errors = self.session.errors(),
            elapsed_secs = elapsed.as_secs_f64(),
            "session finished"
        );

        if !self.config.reflection_enabled {
            return;
        }

        self.reflection = Reflection::Loading;
        tracing::info!(generation = self.generation, "requesting reflection");
        analysis::spawn_reflection(
            Arc::clone(&self.analyzer),
            self.session.typed_text(),
            self.generation,
            self.reflection_tx.clone(),
        );
    }

    /// Drains finished reflection requests, keeping only the current session's.
    pub fn poll_reflections(&mut self) {
        while let Ok(reply) = self.reflection_rx.try_recv() {
            if reply.generation != self.generation {
                tracing::debug!(
                    stale = reply.generation,
                    current = self.generation,
                    "discarding stale reflection"
                );
                continue;
            }
            if self.reflection != Reflection::Loading {
                // dismissed while loading
                continue;
            }

            let text = match reply.outcome {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("reflection failed: {}", e);
                    analysis::fallback_message(&e)
                }
            };
            self.reflection = Reflection::Ready(text);
        }
    }

    pub fn toggle_sound(&mut self) {
        self.config.sound_enabled = !self.config.sound_enabled;
        self.tones.set_enabled(self.config.sound_enabled);
        tracing::info!(enabled = self.config.sound_enabled, "sound toggled");
    }

    pub fn toggle_focus(&mut self) {
        self.config.focus_mode = !self.config.focus_mode;
        tracing::info!(enabled = self.config.focus_mode, "focus mode toggled");
    }

    pub fn toggle_reflection_mode(&mut self) {
        self.config.reflection_enabled = !self.config.reflection_enabled;
        tracing::info!(
            enabled = self.config.reflection_enabled,
            "reflection mode toggled"
        );
    }

    pub fn toggle_theme(&mut self) {
        self.config.theme = self.config.theme.toggled();
        tracing::info!(theme = %self.config.theme, "theme toggled");
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_speed_timer_armed(&self) -> bool {
        self.speed_timer.is_armed()
    }

    pub fn show_word_cue(&self) -> bool {
        self.session.word_completed()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("reflection", &self.reflection)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
