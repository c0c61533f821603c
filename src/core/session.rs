use super::constants::*;
use serde::{Deserialize, Serialize};

/// Practice mode the session runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Zen,
    Quote,
}

/// Cumulative counters for the active session. Grows monotonically until
/// reset; deletions never decrement (effort-tracking semantics, see
/// DESIGN.md).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypingStats {
    pub words: u32,
    pub chars: u32,
    pub start_ms: f64,
}

/// One recently typed character in the ghost log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostLogEntry {
    pub at_ms: f64,
    pub ch: char,
}

/// Snapshot emitted to stats consumers over the broadcast bus.
#[derive(Clone, Debug, PartialEq)]
pub struct StatsSnapshot {
    pub mode: Mode,
    pub words: u32,
    pub chars: u32,
    pub elapsed_ms: f64,
    pub wpm: u32,
}

type StatsCallback = Box<dyn FnMut(&StatsSnapshot)>;

/// Accumulates typed input for one session and keeps a time-windowed
/// transcript ("ghost log") for crash/navigation recovery.
///
/// Sessions move Idle -> Active -> Reset(-> Active); there is no finished
/// state, a session runs until it is reset. Exactly one engine instance owns
/// the ghost log and stats for a session.
pub struct SessionEngine {
    mode: Mode,
    stats: TypingStats,
    prev_value: String,
    word_base: usize,
    ghost: Vec<GhostLogEntry>,
    on_stats: Option<StatsCallback>,
    emit_interval_ms: f64,
    last_emit_ms: f64,
}

impl SessionEngine {
    pub fn new(mode: Mode, start_ms: f64) -> Self {
        Self {
            mode,
            stats: TypingStats {
                words: 0,
                chars: 0,
                start_ms,
            },
            prev_value: String::new(),
            word_base: 0,
            ghost: Vec::new(),
            on_stats: None,
            emit_interval_ms: STATS_EMIT_INTERVAL_MS,
            last_emit_ms: f64::NEG_INFINITY,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn stats(&self) -> &TypingStats {
        &self.stats
    }

    /// Register the consumer callback for throttled stats snapshots.
    pub fn set_stats_callback(&mut self, cb: impl FnMut(&StatsSnapshot) + 'static) {
        self.on_stats = Some(Box::new(cb));
    }

    pub fn set_emit_interval(&mut self, interval_ms: f64) {
        self.emit_interval_ms = interval_ms;
    }

    /// Ingest the full current text of the active input and fold the delta
    /// from the previously recorded value into the session counters.
    ///
    /// A word is counted once its first character arrives, so the word base
    /// never double-counts the word still being typed. Both deltas are
    /// non-negative by construction: backspacing shrinks neither counter.
    pub fn process_input(&mut self, new_value: &str, now_ms: f64) {
        let prev_chars = self.prev_value.chars().count();
        let new_chars = new_value.chars().count();
        let char_delta = new_chars.saturating_sub(prev_chars);

        if char_delta > 0 {
            for ch in new_value.chars().skip(prev_chars) {
                self.append_ghost(ch, now_ms);
            }
        }

        let word_count = new_value.split_whitespace().count();
        let word_delta = word_count.saturating_sub(self.word_base);
        self.word_base = self.word_base.max(word_count);

        self.prev_value = new_value.to_string();
        self.update_stats(char_delta as u32, word_delta as u32, now_ms);
    }

    /// Merge deltas into the cumulative counters and emit a snapshot if the
    /// emit interval has elapsed since the last one.
    pub fn update_stats(&mut self, char_delta: u32, word_delta: u32, now_ms: f64) {
        self.stats.chars += char_delta;
        self.stats.words += word_delta;
        if self.on_stats.is_some() && now_ms - self.last_emit_ms >= self.emit_interval_ms {
            let snap = self.snapshot(now_ms);
            if let Some(cb) = &mut self.on_stats {
                cb(&snap);
            }
            self.last_emit_ms = now_ms;
        }
    }

    pub fn snapshot(&self, now_ms: f64) -> StatsSnapshot {
        let elapsed_ms = (now_ms - self.stats.start_ms).max(0.0);
        let wpm = if elapsed_ms <= 0.0 {
            0
        } else {
            (self.stats.words as f64 / (elapsed_ms / 60_000.0)).round() as u32
        };
        StatsSnapshot {
            mode: self.mode,
            words: self.stats.words,
            chars: self.stats.chars,
            elapsed_ms,
            wpm,
        }
    }

    fn append_ghost(&mut self, ch: char, now_ms: f64) {
        self.ghost.push(GhostLogEntry { at_ms: now_ms, ch });
        // eager eviction on every append, sliding wall-clock window
        let cutoff = now_ms - GHOST_RETENTION_MS;
        self.ghost.retain(|e| e.at_ms >= cutoff);
    }

    /// Concatenate every logged character within the trailing window, in
    /// arrival order. Repeated calls without new input return identical
    /// output.
    pub fn ghost_recovery(&self, window_minutes: f64, now_ms: f64) -> String {
        let cutoff = now_ms - window_minutes * 60_000.0;
        self.ghost
            .iter()
            .filter(|e| e.at_ms >= cutoff)
            .map(|e| e.ch)
            .collect()
    }

    pub fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    /// Reinitialize stats, ghost log and delta bases to a fresh start time.
    /// Idempotent; holds no timers to leak, all waiting in this engine is
    /// timestamp comparison.
    pub fn reset(&mut self, now_ms: f64) {
        self.stats = TypingStats {
            words: 0,
            chars: 0,
            start_ms: now_ms,
        };
        self.prev_value.clear();
        self.word_base = 0;
        self.ghost.clear();
        self.last_emit_ms = f64::NEG_INFINITY;
    }
}

/// Accuracy of typed text against a quote target, by position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuoteAccuracy {
    pub correct: u32,
    pub typed: u32,
    pub accuracy_pct: f32,
}

/// Compare typed text against the quote target position by position. Empty
/// input reads as 100% so the display does not open on a failure.
pub fn quote_accuracy(target: &str, typed: &str) -> QuoteAccuracy {
    let typed_count = typed.chars().count() as u32;
    if typed_count == 0 {
        return QuoteAccuracy {
            correct: 0,
            typed: 0,
            accuracy_pct: 100.0,
        };
    }
    let correct = target
        .chars()
        .zip(typed.chars())
        .filter(|(a, b)| a == b)
        .count() as u32;
    QuoteAccuracy {
        correct,
        typed: typed_count,
        accuracy_pct: correct as f32 / typed_count as f32 * 100.0,
    }
}
