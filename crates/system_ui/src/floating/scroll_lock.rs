//! Document-wide background scroll lock shared by every modal surface.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::*;
use overlay_engine::{ScrollLockCounter, ScrollLockTarget};

use super::dom;

thread_local! {
    static SCROLL_LOCK: RefCell<ScrollLockCounter> = RefCell::new(ScrollLockCounter::default());
}

/// The document body. A missing body reads as unstyled and ignores writes, so lock depth is
/// still tracked before the document is ready and in native builds.
struct DocumentBody(Option<web_sys::HtmlElement>);

impl DocumentBody {
    fn current() -> Self {
        Self(dom::body().ok())
    }

    fn property(&self, name: &str) -> String {
        self.0
            .as_ref()
            .and_then(|body| body.style().get_property_value(name).ok())
            .unwrap_or_default()
    }

    fn write(&self, name: &str, value: &str) {
        let Some(body) = self.0.as_ref() else {
            return;
        };
        let style = body.style();
        let result = if value.is_empty() {
            style.remove_property(name).map(|_| ())
        } else {
            style.set_property(name, value)
        };
        if let Err(err) = result {
            logging::warn!("scroll lock could not write `{name}`: {err:?}");
        }
    }
}

impl ScrollLockTarget for DocumentBody {
    fn overflow(&self) -> String {
        self.property("overflow")
    }

    fn padding_right(&self) -> String {
        self.property("padding-right")
    }

    fn scrollbar_width(&self) -> f64 {
        let Ok(window) = dom::window() else {
            return 0.0;
        };
        let inner = window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let client = window
            .document()
            .and_then(|document| document.document_element())
            .map(|root| f64::from(root.client_width()))
            .unwrap_or(inner);
        (inner - client).max(0.0)
    }

    fn apply(&self, overflow: &str, padding_right: &str) {
        self.write("overflow", overflow);
        self.write("padding-right", padding_right);
    }
}

/// Takes one scroll lock. The body is hidden and its scrollbar gap compensated on the first lock.
pub fn lock_scroll() {
    let body = DocumentBody::current();
    SCROLL_LOCK.with(|counter| {
        counter.borrow_mut().lock(&body);
    });
}

/// Releases one scroll lock. The saved body styles come back with the last release; releasing
/// with nothing held is ignored.
pub fn unlock_scroll() {
    let body = DocumentBody::current();
    SCROLL_LOCK.with(|counter| {
        counter.borrow_mut().unlock(&body);
    });
}

/// Number of scroll locks currently held.
pub fn scroll_lock_depth() -> usize {
    SCROLL_LOCK.with(|counter| counter.borrow().depth())
}

/// Forgets every held lock without touching the document. Intended for test isolation.
pub fn reset_scroll_lock() {
    SCROLL_LOCK.with(|counter| counter.borrow_mut().reset());
}

/// Holds a scroll lock while `enabled` is `true` and releases it when disabled or disposed.
pub fn use_scroll_lock(enabled: Signal<bool>) {
    let held = Rc::new(Cell::new(false));

    create_effect({
        let held = held.clone();
        move |_| {
            let wanted = enabled.get();
            if wanted && !held.get() {
                lock_scroll();
                held.set(true);
            } else if !wanted && held.get() {
                unlock_scroll();
                held.set(false);
            }
        }
    });

    on_cleanup(move || {
        if held.replace(false) {
            unlock_scroll();
        }
    });
}
