use std::time::Instant;

use crate::metrics;

/// Lifecycle of a single practice run
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    Idle,
    Active,
    Finished,
}

/// A keystroke the session understands. Anything else is filtered out by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    DeleteBack,
}

/// One attempt at typing a fixed passage, from idle through finished.
///
/// The session is plain data: it owns no timers, devices or threads. Every
/// mutation goes through [`Session::apply_at`] or [`Session::tick_at`], which
/// take the current instant so callers and tests control the clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    text: Vec<char>,
    typed: Vec<char>,
    cursor: usize,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    errors: u32,
    streak: u32,
    wpm: u32,
    accuracy: u32,
    status: Status,
    word_completed: bool,
}

/// Fresh idle session over `text`, discarding whatever came before.
pub fn reset(text: impl Into<String>) -> Session {
    Session::new(text)
}

/// Applies `key` at the current instant and hands the session back.
pub fn apply(mut session: Session, key: KeyInput) -> Session {
    session.apply(key);
    session
}

impl Session {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into().chars().collect(),
            typed: Vec::new(),
            cursor: 0,
            started_at: None,
            ended_at: None,
            errors: 0,
            streak: 0,
            wpm: 0,
            accuracy: 100,
            status: Status::Idle,
            word_completed: false,
        }
    }

    pub fn apply(&mut self, key: KeyInput) {
        self.apply_at(key, Instant::now());
    }

    pub fn apply_at(&mut self, key: KeyInput, now: Instant) {
        if self.status == Status::Finished {
            return;
        }

        let accepted = match key {
            KeyInput::DeleteBack => self.delete_back(),
            KeyInput::Char(c) => self.write(c),
        };
        if !accepted {
            return;
        }

        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.status = Status::Active;
        }

        if self.cursor == self.text.len() {
            self.status = Status::Finished;
            self.ended_at = Some(now);
        }

        self.refresh_metrics(now);
    }

    /// Periodic recomputation of speed so it decays while the typist pauses.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if self.status != Status::Active {
            return;
        }
        if let Some(started_at) = self.started_at {
            self.wpm = metrics::words_per_minute(started_at, self.cursor, now);
        }
    }

    /// Ends the word-complete display window.
    pub fn clear_word_completed(&mut self) {
        self.word_completed = false;
    }

    fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.typed.pop();
        self.cursor -= 1;
        true
    }

    fn write(&mut self, c: char) -> bool {
        let Some(expected) = self.expected_char() else {
            return false;
        };

        // a run of spaces would desync the word comparison below
        if expected == ' ' && self.typed.last() == Some(&' ') {
            return false;
        }

        let at_boundary = c == ' ' && expected == ' ';
        let word_matches =
            at_boundary && trailing_word(&self.text[..self.cursor]) == trailing_word(&self.typed);

        self.typed.push(c);
        self.cursor += 1;

        if c != expected {
            self.errors += 1;
            self.streak = 0;
        }

        if at_boundary {
            if word_matches {
                self.streak += 1;
                self.word_completed = true;
            } else {
                self.streak = 0;
            }
        }

        true
    }

    fn refresh_metrics(&mut self, now: Instant) {
        self.wpm = self
            .started_at
            .map_or(0, |started_at| metrics::words_per_minute(started_at, self.cursor, now));
        self.accuracy = metrics::accuracy(self.cursor, self.errors);
    }

    /// The character the typist should enter next, if any remain.
    pub fn expected_char(&self) -> Option<char> {
        self.text.get(self.cursor).copied()
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn typed_text(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<Instant> {
        self.ended_at
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn word_completed(&self) -> bool {
        self.word_completed
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }
}

/// Maximal run of non-space characters at the end of `chars`.
fn trailing_word(chars: &[char]) -> &[char] {
    let start = chars
        .iter()
        .rposition(|&c| c == ' ')
        .map_or(0, |idx| idx + 1);
    &chars[start..]
}
