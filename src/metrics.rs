use std::time::Instant;

/// Characters counted as one word when converting typed characters to wpm
pub const CHARS_PER_WORD: f64 = 5.0;

/// Words per minute since `started_at`, given `cursor` characters typed.
///
/// Elapsed time is measured in whole milliseconds; anything under one
/// millisecond reads as zero elapsed and yields 0.
pub fn words_per_minute(started_at: Instant, cursor: usize, now: Instant) -> u32 {
    let elapsed_ms = now.saturating_duration_since(started_at).as_millis();
    if elapsed_ms == 0 {
        return 0;
    }

    let minutes = elapsed_ms as f64 / 60_000.0;
    let words = cursor as f64 / CHARS_PER_WORD;

    (words / minutes).round() as u32
}

/// Percentage of typed characters that were not recorded as errors.
pub fn accuracy(cursor: usize, errors: u32) -> u32 {
    if cursor == 0 {
        return 100;
    }

    // errors outlive backspaced characters, so they can exceed cursor
    let correct = cursor.saturating_sub(errors as usize);

    ((correct as f64 / cursor as f64) * 100.0).round() as u32
}
