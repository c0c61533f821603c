#![cfg(target_arch = "wasm32")]

pub mod core;
mod dom;
mod events;
mod frame;
mod overlay;

use crate::core::drafts::{ArchiveEntry, DraftArchive, DraftSnapshot, ARCHIVE_KEY, ARCHIVE_SYNC_KEY};
use crate::core::{
    BackoffPolicy, FrameGovernor, KeyValueStore, ParticleSet, SessionEngine, SettingsStore, Signal,
    SignalBus, SignalKind,
};
use frame::Clock;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

const DRAFT_SNAPSHOT_INTERVAL_MS: i32 = 30_000;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("zentype starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id("zen-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #zen-canvas"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let textarea: web::HtmlTextAreaElement = document
        .get_element_by_id("zen-input")
        .ok_or_else(|| anyhow::anyhow!("missing #zen-input"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    dom::wire_canvas_resize(&canvas);
    let ctx = canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .ok_or_else(|| anyhow::anyhow!("no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let clock = Clock::new();
    let bus = Rc::new(RefCell::new(SignalBus::new()));
    let shared_store = dom::SharedStore::new();

    let settings_store = Rc::new(RefCell::new(SettingsStore::load(
        Box::new(shared_store.clone()),
        bus.clone(),
    )));
    let initial = settings_store.borrow().current().clone();

    // The frame loop reads this snapshot; the broadcast fan-out keeps it
    // current. Each incoming record replaces the snapshot wholesale.
    let settings_snapshot = Rc::new(RefCell::new(initial.clone()));
    {
        let snap = settings_snapshot.clone();
        bus.borrow_mut()
            .subscribe(SignalKind::SettingsChanged, move |signal| {
                if let Signal::SettingsChanged(settings) = signal {
                    *snap.borrow_mut() = settings.clone();
                }
            });
    }

    let session = Rc::new(RefCell::new(SessionEngine::new(
        initial.mode,
        clock.now_ms(),
    )));
    {
        let bus_tx = bus.clone();
        session.borrow_mut().set_stats_callback(move |snap| {
            bus_tx.borrow().publish(&Signal::TypingStats(snap.clone()));
        });
    }
    {
        let session_mode = session.clone();
        bus.borrow_mut()
            .subscribe(SignalKind::SettingsChanged, move |signal| {
                if let Signal::SettingsChanged(settings) = signal {
                    session_mode.borrow_mut().set_mode(settings.mode);
                }
            });
    }

    overlay::mount_stats_bar(&document, &mut bus.borrow_mut(), &initial);

    // Draft archive: load, run the one-way archive sync, then snapshot the
    // input periodically.
    let drafts = Rc::new(RefCell::new(DraftArchive::load(&shared_store)));
    {
        let mut store = shared_store.clone();
        sync_archive(&mut store, &mut drafts.borrow_mut());
    }
    {
        let drafts_timer = drafts.clone();
        let mut store = shared_store.clone();
        let source = textarea.clone();
        let last_body = RefCell::new(String::new());
        let closure = Closure::wrap(Box::new(move || {
            let body = source.value();
            if body.trim().is_empty() || *last_body.borrow() == body {
                return;
            }
            last_body.borrow_mut().clone_from(&body);
            let at_ms = js_sys::Date::now();
            let mut archive = drafts_timer.borrow_mut();
            archive.push(DraftSnapshot {
                id: format!("draft-{}", at_ms as u64),
                body,
                at_ms,
                is_restore_point: false,
            });
            if let Err(err) = archive.persist_with_retry(&mut store, BackoffPolicy::default()) {
                log::warn!("[drafts] snapshot persist failed: {err}");
            }
        }) as Box<dyn FnMut()>);
        _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            DRAFT_SNAPSHOT_INTERVAL_MS,
        );
        closure.forget();
    }

    events::wire_typing_input(events::TypingWiring {
        textarea: textarea.clone(),
        session: session.clone(),
        clock,
    });
    events::wire_settings_controls(&document, settings_store.clone());

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        clock,
        governor: FrameGovernor::new(),
        particles: ParticleSet::new(initial.theme, 42),
        settings: settings_snapshot.clone(),
        canvas: canvas.clone(),
        ctx,
        last_instant: Instant::now(),
    }));
    events::wire_session_controls(events::SessionControls {
        document: document.clone(),
        textarea,
        session,
        frame_ctx: frame_ctx.clone(),
        clock,
    });

    frame::start_loop(frame_ctx);
    Ok(())
}

/// One-directional archive -> draft materialization, guarded by a last-sync
/// watermark so already-processed entries are skipped on the next boot.
fn sync_archive(store: &mut dom::SharedStore, drafts: &mut DraftArchive) {
    let Some(json) = store.get(ARCHIVE_KEY) else {
        return;
    };
    let entries: Vec<ArchiveEntry> = match serde_json::from_str(&json) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("[drafts] malformed archive list: {err}");
            return;
        }
    };
    let last_sync = store
        .get(ARCHIVE_SYNC_KEY)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let touched = drafts.sync_from_archive(&entries, last_sync);
    if touched > 0 {
        if let Err(err) = drafts.persist_with_retry(store, BackoffPolicy::default()) {
            log::warn!("[drafts] sync persist failed: {err}");
        }
    }
    let watermark = entries.iter().fold(last_sync, |acc, e| acc.max(e.ended_ms));
    if watermark > last_sync {
        _ = store.set(ARCHIVE_SYNC_KEY, &watermark.to_string());
    }
}
