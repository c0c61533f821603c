use crate::core::{Mode, SessionEngine, SettingsPatch, SettingsStore, Theme};
use crate::core::settings::Profile;
use crate::dom;
use crate::frame::{Clock, FrameContext};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Everything the typing input surface needs; constructed explicitly in
/// `init` and moved into the listeners, no ambient singletons.
pub struct TypingWiring {
    pub textarea: web::HtmlTextAreaElement,
    pub session: Rc<RefCell<SessionEngine>>,
    pub clock: Clock,
}

pub fn wire_typing_input(wiring: TypingWiring) {
    let TypingWiring {
        textarea,
        session,
        clock,
    } = wiring;
    let source = textarea.clone();
    let closure = Closure::wrap(Box::new(move || {
        let value = source.value();
        session.borrow_mut().process_input(&value, clock.now_ms());
    }) as Box<dyn FnMut()>);
    _ = textarea.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub struct SessionControls {
    pub document: web::Document,
    pub textarea: web::HtmlTextAreaElement,
    pub session: Rc<RefCell<SessionEngine>>,
    pub frame_ctx: Rc<RefCell<FrameContext>>,
    pub clock: Clock,
}

fn perform_reset(controls: &SessionControls) {
    let now_ms = controls.clock.now_ms();
    controls.session.borrow_mut().reset(now_ms);
    controls.frame_ctx.borrow_mut().reset();
    controls.textarea.set_value("");
    log::info!("[session] reset");
}

/// Reset button, ghost-recovery button and the Escape shortcut.
pub fn wire_session_controls(controls: SessionControls) {
    let document = controls.document.clone();

    {
        let textarea = controls.textarea.clone();
        let session = controls.session.clone();
        let clock = controls.clock;
        dom::add_click_listener(&document, "ghost-restore", move || {
            let recovered = session.borrow().ghost_recovery(5.0, clock.now_ms());
            if recovered.is_empty() {
                log::info!("[session] nothing to recover");
            } else {
                textarea.set_value(&recovered);
            }
        });
    }

    let reset_controls = SessionControls {
        document: controls.document.clone(),
        textarea: controls.textarea.clone(),
        session: controls.session.clone(),
        frame_ctx: controls.frame_ctx.clone(),
        clock: controls.clock,
    };
    dom::add_click_listener(&document, "reset-session", move || {
        perform_reset(&reset_controls);
    });

    let keydown_closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if ev.key() == "Escape" {
            perform_reset(&controls);
        }
    }) as Box<dyn FnMut(web::KeyboardEvent)>);
    _ = document
        .add_event_listener_with_callback("keydown", keydown_closure.as_ref().unchecked_ref());
    keydown_closure.forget();
}

fn theme_for_value(value: &str) -> Option<Theme> {
    match value {
        "forest" => Some(Theme::Forest),
        "ocean" => Some(Theme::Ocean),
        "cosmic" => Some(Theme::Cosmic),
        "void" => Some(Theme::Void),
        _ => None,
    }
}

fn mode_for_value(value: &str) -> Option<Mode> {
    match value {
        "zen" => Some(Mode::Zen),
        "quote" => Some(Mode::Quote),
        _ => None,
    }
}

fn profile_for_value(value: &str) -> Option<Profile> {
    match value {
        "focus" => Some(Profile::Focus),
        "ambient" => Some(Profile::Ambient),
        "minimal" => Some(Profile::Minimal),
        _ => None,
    }
}

/// Settings panel controls. Every change funnels through
/// `SettingsStore::apply_patch`, which persists and broadcasts the full
/// merged record.
pub fn wire_settings_controls(document: &web::Document, store: Rc<RefCell<SettingsStore>>) {
    if let Some(el) = document.get_element_by_id("theme-select") {
        if let Ok(select) = el.dyn_into::<web::HtmlSelectElement>() {
            let store = store.clone();
            let select_read = select.clone();
            let closure = Closure::wrap(Box::new(move || {
                if let Some(theme) = theme_for_value(&select_read.value()) {
                    store.borrow_mut().apply_patch(
                        SettingsPatch {
                            theme: Some(theme),
                            ..Default::default()
                        },
                        true,
                    );
                }
            }) as Box<dyn FnMut()>);
            _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    if let Some(el) = document.get_element_by_id("mode-select") {
        if let Ok(select) = el.dyn_into::<web::HtmlSelectElement>() {
            let store = store.clone();
            let select_read = select.clone();
            let closure = Closure::wrap(Box::new(move || {
                if let Some(mode) = mode_for_value(&select_read.value()) {
                    store.borrow_mut().apply_patch(
                        SettingsPatch {
                            mode: Some(mode),
                            ..Default::default()
                        },
                        true,
                    );
                }
            }) as Box<dyn FnMut()>);
            _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    if let Some(el) = document.get_element_by_id("profile-select") {
        if let Ok(select) = el.dyn_into::<web::HtmlSelectElement>() {
            let store = store.clone();
            let select_read = select.clone();
            let closure = Closure::wrap(Box::new(move || {
                if let Some(profile) = profile_for_value(&select_read.value()) {
                    store.borrow_mut().apply_patch(
                        SettingsPatch {
                            profile: Some(profile),
                            ..Default::default()
                        },
                        true,
                    );
                }
            }) as Box<dyn FnMut()>);
            _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    wire_toggle(document, "reduced-motion", store.clone(), |checked| {
        SettingsPatch {
            reduced_motion: Some(checked),
            ..Default::default()
        }
    });
    wire_toggle(document, "low-power", store.clone(), |checked| SettingsPatch {
        low_power: Some(checked),
        ..Default::default()
    });
    wire_toggle(document, "show-stats-bar", store, |checked| SettingsPatch {
        show_stats_bar: Some(checked),
        ..Default::default()
    });
}

fn wire_toggle(
    document: &web::Document,
    element_id: &str,
    store: Rc<RefCell<SettingsStore>>,
    patch_for: impl Fn(bool) -> SettingsPatch + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        if let Ok(input) = el.dyn_into::<web::HtmlInputElement>() {
            let input_read = input.clone();
            let closure = Closure::wrap(Box::new(move || {
                store
                    .borrow_mut()
                    .apply_patch(patch_for(input_read.checked()), true);
            }) as Box<dyn FnMut()>);
            _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}
