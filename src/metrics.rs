use serde::Serialize;

/// Characters counted as one word in every WPM figure.
pub const CHARS_PER_WORD: usize = 5;

/// Words per minute using the standard five-characters-per-word convention.
pub fn words_per_minute(chars: usize, elapsed_secs: f64) -> u32 {
    words_per_minute_with(chars, elapsed_secs, CHARS_PER_WORD)
}

/// Words per minute for an arbitrary word length.
///
/// Returns 0 when there is nothing to measure (no characters, no elapsed
/// time, or a zero word length) instead of dividing by zero.
pub fn words_per_minute_with(chars: usize, elapsed_secs: f64, chars_per_word: usize) -> u32 {
    if chars == 0 || chars_per_word == 0 || elapsed_secs.is_nan() || elapsed_secs <= 0.0 {
        return 0;
    }

    let words = chars as f64 / chars_per_word as f64;
    let minutes = elapsed_secs / 60.0;
    (words / minutes).round().max(0.0) as u32
}

/// Share of judged keystrokes that were correct, as a whole percentage.
pub fn accuracy_percent(correct: usize, typed: usize) -> u32 {
    if typed == 0 {
        return 0;
    }

    (100.0 * correct as f64 / typed as f64).round().max(0.0) as u32
}

/// Live WPM observed `t` seconds into a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WpmSample {
    pub t: f64,
    pub wpm: u32,
}

impl WpmSample {
    pub fn new(t: f64, wpm: u32) -> Self {
        Self { t, wpm }
    }
}

impl From<WpmSample> for (f64, f64) {
    fn from(s: WpmSample) -> Self {
        (s.t, s.wpm as f64)
    }
}

pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = data.iter().map(|v| (m - v) * (m - v)).sum::<f64>() / data.len() as f64;
    Some(variance.sqrt())
}

/// Spread of the sampled WPM values; lower is steadier typing.
pub fn consistency(samples: &[WpmSample]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let values: Vec<f64> = samples.iter().map(|s| s.wpm as f64).collect();
    std_dev(&values).unwrap_or(0.0)
}
