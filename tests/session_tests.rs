// Host-side tests for the typing session engine.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod engine {
    pub mod constants {
        include!("../src/core/constants.rs");
    }
    pub mod session {
        include!("../src/core/session.rs");
    }
}

use engine::session::{quote_accuracy, Mode, SessionEngine};
use std::cell::RefCell;
use std::rc::Rc;

/// Feed the full text character by character, as input events would.
fn type_text(engine: &mut SessionEngine, text: &str, start_ms: f64, spacing_ms: f64) -> f64 {
    let mut now = start_ms;
    let chars: Vec<char> = text.chars().collect();
    for i in 1..=chars.len() {
        let value: String = chars[..i].iter().collect();
        engine.process_input(&value, now);
        now += spacing_ms;
    }
    now
}

#[test]
fn hello_world_counts_eleven_chars_two_words() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    type_text(&mut engine, "hello world", 0.0, 100.0);
    assert_eq!(engine.stats().chars, 11);
    assert_eq!(engine.stats().words, 2);
}

#[test]
fn word_counts_once_its_first_character_arrives() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    engine.process_input("hello", 0.0);
    assert_eq!(engine.stats().words, 1);
    engine.process_input("hello ", 1.0);
    assert_eq!(engine.stats().words, 1);
    engine.process_input("hello w", 2.0);
    assert_eq!(engine.stats().words, 2);
}

#[test]
fn deletions_never_decrement_counters() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    type_text(&mut engine, "hello world", 0.0, 100.0);
    let ghost_before = engine.ghost_len();

    engine.process_input("hello", 2000.0);
    assert_eq!(engine.stats().chars, 11);
    assert_eq!(engine.stats().words, 2);
    // deletions are not logged either
    assert_eq!(engine.ghost_len(), ghost_before);
}

#[test]
fn multi_byte_characters_count_as_one() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    engine.process_input("héllo", 0.0);
    assert_eq!(engine.stats().chars, 5);
    engine.process_input("héllo🦀", 1.0);
    assert_eq!(engine.stats().chars, 6);
}

#[test]
fn wpm_is_words_per_minute_rounded() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    engine.update_stats(250, 50, 60_000.0);
    let snap = engine.snapshot(60_000.0);
    assert_eq!(snap.wpm, 50);
    assert_eq!(snap.elapsed_ms, 60_000.0);
}

#[test]
fn zero_elapsed_yields_zero_wpm() {
    let engine = SessionEngine::new(Mode::Zen, 5000.0);
    let snap = engine.snapshot(5000.0);
    assert_eq!(snap.wpm, 0);
}

#[test]
fn stats_emission_is_throttled_to_the_interval() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    let emitted: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = emitted.clone();
    engine.set_stats_callback(move |snap| sink.borrow_mut().push(snap.chars));

    engine.update_stats(1, 0, 0.0); // first emission is immediate
    engine.update_stats(1, 0, 500.0); // inside the interval, suppressed
    engine.update_stats(1, 0, 1000.0);
    engine.update_stats(1, 0, 1500.0);
    engine.update_stats(1, 0, 2000.0);

    assert_eq!(*emitted.borrow(), vec![1, 3, 5]);
}

#[test]
fn ghost_log_prunes_entries_older_than_five_minutes() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    engine.process_input("a", 0.0);
    engine.process_input("ab", 1000.0);
    // this append prunes the entry at t=0 (outside the 5 minute window)
    engine.process_input("abc", 301_000.0);

    assert_eq!(engine.ghost_len(), 2);
    assert_eq!(engine.ghost_recovery(5.0, 301_000.0), "bc");
}

#[test]
fn ghost_recovery_preserves_arrival_order_and_is_idempotent() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    type_text(&mut engine, "zen", 0.0, 50.0);

    let first = engine.ghost_recovery(5.0, 200.0);
    let second = engine.ghost_recovery(5.0, 200.0);
    assert_eq!(first, "zen");
    assert_eq!(first, second);
}

#[test]
fn ghost_recovery_window_is_configurable() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    engine.process_input("a", 0.0);
    engine.process_input("ab", 90_000.0);

    assert_eq!(engine.ghost_recovery(5.0, 100_000.0), "ab");
    assert_eq!(engine.ghost_recovery(1.0, 100_000.0), "b");
}

#[test]
fn reset_clears_stats_ghost_and_bases() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    let now = type_text(&mut engine, "hello world", 0.0, 100.0);

    engine.reset(now);
    assert_eq!(engine.stats().chars, 0);
    assert_eq!(engine.stats().words, 0);
    assert_eq!(engine.stats().start_ms, now);
    assert_eq!(engine.ghost_recovery(5.0, now), "");

    // idempotent
    engine.reset(now);
    assert_eq!(engine.stats().chars, 0);

    // the word base restarts too: retyping counts from scratch
    engine.process_input("hi", now + 100.0);
    assert_eq!(engine.stats().chars, 2);
    assert_eq!(engine.stats().words, 1);
}

#[test]
fn snapshot_carries_the_active_mode() {
    let mut engine = SessionEngine::new(Mode::Zen, 0.0);
    assert_eq!(engine.snapshot(1.0).mode, Mode::Zen);
    engine.set_mode(Mode::Quote);
    assert_eq!(engine.snapshot(2.0).mode, Mode::Quote);
}

#[test]
fn quote_accuracy_on_exact_prefix() {
    let acc = quote_accuracy("hello world", "hello");
    assert_eq!(acc.correct, 5);
    assert_eq!(acc.typed, 5);
    assert!((acc.accuracy_pct - 100.0).abs() < f32::EPSILON);
}

#[test]
fn quote_accuracy_counts_mismatches_by_position() {
    let acc = quote_accuracy("hello", "hxllo");
    assert_eq!(acc.correct, 4);
    assert_eq!(acc.typed, 5);
    assert!((acc.accuracy_pct - 80.0).abs() < 0.01);
}

#[test]
fn quote_accuracy_empty_input_reads_as_full() {
    let acc = quote_accuracy("hello", "");
    assert_eq!(acc.correct, 0);
    assert_eq!(acc.typed, 0);
    assert!((acc.accuracy_pct - 100.0).abs() < f32::EPSILON);
}

#[test]
fn quote_accuracy_overrun_counts_against_typed() {
    let acc = quote_accuracy("hi", "hiii");
    assert_eq!(acc.correct, 2);
    assert_eq!(acc.typed, 4);
    assert!((acc.accuracy_pct - 50.0).abs() < 0.01);
}
