use crate::core::{Signal, SignalBus, SignalKind, StatsMetric, StatsSnapshot};
use crate::core::settings::Settings;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

fn set_hidden(document: &web::Document, element_id: &str, hidden: bool) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let cl = el.class_list();
        if hidden {
            _ = cl.add_1("hidden");
        } else {
            _ = cl.remove_1("hidden");
        }
    }
}

pub fn format_metric(metric: StatsMetric, snap: &StatsSnapshot) -> String {
    match metric {
        StatsMetric::Wpm => format!("{} wpm", snap.wpm),
        StatsMetric::Words => format!("{} words", snap.words),
        StatsMetric::Chars => format!("{} chars", snap.chars),
    }
}

/// Stats bar surface. Reads the persisted record once on mount for initial
/// state, then relies entirely on broadcast signals; it never polls.
pub fn mount_stats_bar(document: &web::Document, bus: &mut SignalBus, initial: &Settings) {
    set_hidden(document, "stats-bar", !initial.show_stats_bar);

    // metric selection is settings-derived and may change after mount
    let metric = Rc::new(RefCell::new(initial.stats_metric));

    {
        let document = document.clone();
        let metric = metric.clone();
        bus.subscribe(SignalKind::TypingStats, move |signal| {
            if let Signal::TypingStats(snap) = signal {
                if let Some(el) = document.get_element_by_id("stats-bar-value") {
                    el.set_text_content(Some(&format_metric(*metric.borrow(), snap)));
                }
            }
        });
    }

    {
        let document = document.clone();
        bus.subscribe(SignalKind::SettingsChanged, move |signal| {
            if let Signal::SettingsChanged(settings) = signal {
                *metric.borrow_mut() = settings.stats_metric;
                set_hidden(&document, "stats-bar", !settings.show_stats_bar);
            }
        });
    }
}
