//! Outside-press and Escape dismissal for open overlays.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::*;
use overlay_engine::{
    is_escape_key, pointer_may_dismiss, DismissPolicy, DismissReason, OverlayId, OverlayLayer,
    OverlayStack, PointerKind,
};
use wasm_bindgen::JsCast;

use super::dom::{self, listen_or_warn, ElementRef, EventSubscription, ListenOptions};

thread_local! {
    static OPEN_OVERLAYS: RefCell<OverlayStack<Vec<ElementRef>>> =
        RefCell::new(OverlayStack::default());
}

/// Number of overlays currently registered for dismissal.
pub fn open_overlay_count() -> usize {
    OPEN_OVERLAYS.with(|stack| stack.borrow().len())
}

/// Drops every dismissal registration. Intended for test isolation.
pub fn reset_overlay_stack() {
    OPEN_OVERLAYS.with(|stack| stack.borrow_mut().clear());
}

fn register(layer: OverlayLayer, protected: Vec<ElementRef>) -> OverlayId {
    OPEN_OVERLAYS.with(|stack| stack.borrow_mut().push_layer(layer, protected))
}

fn unregister(id: OverlayId) {
    OPEN_OVERLAYS.with(|stack| {
        stack.borrow_mut().remove(id);
    });
}

fn is_topmost(id: OverlayId) -> bool {
    OPEN_OVERLAYS.with(|stack| stack.borrow().is_topmost(id))
}

/// Whether `event` landed inside this overlay or any layer opened after it.
fn event_inside(id: OverlayId, event: &web_sys::Event) -> bool {
    let protected: Vec<web_sys::Element> = OPEN_OVERLAYS.with(|stack| {
        stack
            .borrow()
            .from_entry(id)
            .flatten()
            .filter_map(ElementRef::get)
            .collect()
    });
    protected
        .iter()
        .any(|element| dom::event_within(element, event))
}

#[derive(Clone)]
/// Inputs for [`use_dismiss`].
pub struct UseDismissOptions {
    /// Whether the overlay is open. Listeners only exist while this is `true`.
    pub open: Signal<bool>,
    /// Elements a press may land on without dismissing (trigger, portaled panel, ...).
    pub protected: Vec<ElementRef>,
    /// Called with the reason when the overlay should close.
    pub on_dismiss: Callback<DismissReason>,
    /// Enabled dismissal channels.
    pub policy: DismissPolicy,
    /// Stacking layer. Hover and focus hints register as [`OverlayLayer::Passive`].
    pub layer: OverlayLayer,
}

impl UseDismissOptions {
    /// Options with both pointer and Escape dismissal enabled.
    pub fn new(
        open: Signal<bool>,
        protected: Vec<ElementRef>,
        on_dismiss: Callback<DismissReason>,
    ) -> Self {
        Self {
            open,
            protected,
            on_dismiss,
            policy: DismissPolicy::default(),
            layer: OverlayLayer::Layer,
        }
    }

    /// Registers as a passive hint: no outside-press dismissal, never shields or outranks the
    /// overlays below it, and Escape hides it without consuming the key.
    pub fn passive(mut self) -> Self {
        self.policy.on_pointer_down = false;
        self.layer = OverlayLayer::Passive;
        self
    }

    /// Enables or disables dismissal on outside pointer presses.
    pub fn dismiss_on_pointer_down(mut self, enabled: bool) -> Self {
        self.policy.on_pointer_down = enabled;
        self
    }

    /// Enables or disables dismissal on Escape.
    pub fn dismiss_on_escape(mut self, enabled: bool) -> Self {
        self.policy.on_escape = enabled;
        self
    }
}

struct DismissRegistration {
    id: OverlayId,
    listeners: Vec<EventSubscription>,
}

impl DismissRegistration {
    fn open(
        protected: Vec<ElementRef>,
        on_dismiss: Callback<DismissReason>,
        policy: DismissPolicy,
        layer: OverlayLayer,
    ) -> Self {
        let id = register(layer, protected);
        let passive = layer == OverlayLayer::Passive;
        let mut listeners = Vec::new();

        if policy.on_pointer_down {
            if let Ok(document) = dom::document() {
                listeners.extend(listen_or_warn(
                    document.as_ref(),
                    "pointerdown",
                    ListenOptions::CAPTURE,
                    move |event| {
                        if let Some(pointer) = event.dyn_ref::<web_sys::PointerEvent>() {
                            let kind = PointerKind::from_dom(&pointer.pointer_type());
                            if !pointer_may_dismiss(kind, pointer.button()) {
                                return;
                            }
                        }
                        if !event_inside(id, &event) {
                            on_dismiss.call(DismissReason::OutsidePointer);
                        }
                    },
                ));
            }
        }

        if policy.on_escape {
            if let Ok(window) = dom::window() {
                listeners.extend(listen_or_warn(
                    window.as_ref(),
                    "keydown",
                    ListenOptions::BUBBLE,
                    move |event| {
                        let Some(key) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                            return;
                        };
                        if !is_escape_key(&key.key()) || !is_topmost(id) {
                            return;
                        }
                        if !passive {
                            if key.default_prevented() {
                                return;
                            }
                            key.prevent_default();
                        }
                        on_dismiss.call(DismissReason::Escape);
                    },
                ));
            }
        }

        Self { id, listeners }
    }

    fn close(mut self) {
        for mut listener in self.listeners.drain(..) {
            listener.remove();
        }
        unregister(self.id);
    }
}

/// Calls `on_dismiss` when a pointer press lands outside every protected element, or when
/// Escape is pressed while this is the most recently opened overlay.
///
/// Presses inside overlays opened later (nested menus, confirm dialogs) count as inside. Escape
/// events already marked handled by an inner handler are ignored. Secondary mouse presses never
/// dismiss.
pub fn use_dismiss(options: UseDismissOptions) {
    let UseDismissOptions {
        open,
        protected,
        on_dismiss,
        policy,
        layer,
    } = options;
    let registration = Rc::new(RefCell::new(None::<DismissRegistration>));

    let release = {
        let registration = registration.clone();
        move || {
            let current = registration.borrow_mut().take();
            if let Some(current) = current {
                current.close();
            }
        }
    };

    create_effect({
        let release = release.clone();
        move |_| {
            let is_open = open.get();
            release();
            if is_open && policy.listens() {
                let opened =
                    DismissRegistration::open(protected.clone(), on_dismiss, policy, layer);
                *registration.borrow_mut() = Some(opened);
            }
        }
    });
    on_cleanup(release);
}
