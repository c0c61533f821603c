use crate::core::store::{CoreError, KeyValueStore};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

pub fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

/// localStorage-backed key-value store that degrades to in-memory operation
/// when storage is unavailable (private browsing, storage disabled) or a
/// write is rejected. Nothing here ever throws toward the caller.
pub struct BrowserStore {
    storage: Option<web::Storage>,
    memory: HashMap<String, String>,
}

impl BrowserStore {
    pub fn new() -> Self {
        let storage = web::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("[store] localStorage unavailable, staying in memory");
        }
        Self {
            storage,
            memory: HashMap::new(),
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        if let Some(storage) = &self.storage {
            if let Ok(Some(value)) = storage.get_item(key) {
                return Some(value);
            }
        }
        self.memory.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, value).is_ok() {
                return Ok(());
            }
            log::warn!("[store] write rejected for {key:?}, keeping in memory");
        }
        self.memory.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = &self.storage {
            _ = storage.remove_item(key);
        }
        self.memory.remove(key);
    }
}

/// Cheap handle so the settings store and the draft archive can share one
/// browser store from single-threaded callbacks.
#[derive(Clone)]
pub struct SharedStore(Rc<RefCell<BrowserStore>>);

impl SharedStore {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(BrowserStore::new())))
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.0.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) {
        self.0.borrow_mut().remove(key)
    }
}
