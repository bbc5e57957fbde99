use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Browser timer cleared on drop.
pub struct Timer {
    id: i32,
    repeating: bool,
    _callback: Closure<dyn FnMut()>,
}

impl Timer {
    pub fn interval(ms: i32, f: impl FnMut() + 'static) -> Option<Self> {
        Self::start(ms, true, Closure::wrap(Box::new(f) as Box<dyn FnMut()>))
    }

    pub fn timeout(ms: i32, f: impl FnOnce() + 'static) -> Option<Self> {
        Self::start(ms, false, Closure::once(f))
    }

    fn start(ms: i32, repeating: bool, callback: Closure<dyn FnMut()>) -> Option<Self> {
        let window = web_sys::window()?;
        let f = callback.as_ref().unchecked_ref();
        let id = if repeating {
            window.set_interval_with_callback_and_timeout_and_arguments_0(f, ms)
        } else {
            window.set_timeout_with_callback_and_timeout_and_arguments_0(f, ms)
        }
        .ok()?;
        Some(Self {
            id,
            repeating,
            _callback: callback,
        })
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            if self.repeating {
                window.clear_interval_with_handle(self.id);
            } else {
                window.clear_timeout_with_handle(self.id);
            }
        }
    }
}
