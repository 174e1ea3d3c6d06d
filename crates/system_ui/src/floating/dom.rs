//! DOM access shared by the floating hooks: element handles, listener lifetimes, measurement,
//! and animation-frame scheduling.
//!
//! Everything funnels through [`window`], which reports [`DomError::WindowUnavailable`] off
//! `wasm32`, so hooks degrade to no-ops in native builds and tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use leptos::html::ElementDescriptor;
use leptos::leptos_dom::helpers::AnimationFrameRequestHandle;
use leptos::{logging, NodeRef};
use overlay_engine::{FrameCoalescer, Rect, Size, Viewport};
use thiserror::Error;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failures while touching the browser DOM.
pub enum DomError {
    /// No `window` (native build or worker context).
    #[error("window unavailable")]
    WindowUnavailable,
    /// The window has no document.
    #[error("document unavailable")]
    DocumentUnavailable,
    /// The document has no body yet.
    #[error("document body unavailable")]
    BodyUnavailable,
    /// A DOM call threw.
    #[error("{context} failed: {message}")]
    Js {
        /// Operation that failed.
        context: &'static str,
        /// Debug rendering of the thrown value.
        message: String,
    },
}

impl DomError {
    pub(crate) fn js(context: &'static str, err: JsValue) -> Self {
        Self::Js {
            context,
            message: format!("{err:?}"),
        }
    }
}

pub(crate) fn window() -> Result<web_sys::Window, DomError> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window().ok_or(DomError::WindowUnavailable)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Err(DomError::WindowUnavailable)
    }
}

pub(crate) fn document() -> Result<web_sys::Document, DomError> {
    window()?.document().ok_or(DomError::DocumentUnavailable)
}

pub(crate) fn body() -> Result<web_sys::HtmlElement, DomError> {
    document()?.body().ok_or(DomError::BodyUnavailable)
}

#[derive(Clone)]
/// Lazily resolved handle to an element that may not be mounted yet.
///
/// Hooks resolve the handle every time they need the element, so a ref that is still empty
/// (before mount, or after the overlay unmounts) simply makes the operation a no-op.
pub struct ElementRef(Rc<dyn Fn() -> Option<web_sys::Element>>);

impl ElementRef {
    /// Wraps a resolver.
    pub fn new(resolve: impl Fn() -> Option<web_sys::Element> + 'static) -> Self {
        Self(Rc::new(resolve))
    }

    /// A handle that never resolves.
    pub fn empty() -> Self {
        Self::new(|| None)
    }

    /// Resolves the element, `None` while unmounted.
    pub fn get(&self) -> Option<web_sys::Element> {
        (self.0)()
    }

    /// Resolves the element as an [`web_sys::HtmlElement`].
    pub fn html(&self) -> Option<web_sys::HtmlElement> {
        self.get()
            .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok())
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("mounted", &self.get().is_some())
            .finish()
    }
}

impl From<web_sys::Element> for ElementRef {
    fn from(element: web_sys::Element) -> Self {
        Self::new(move || Some(element.clone()))
    }
}

impl<T> From<NodeRef<T>> for ElementRef
where
    T: ElementDescriptor + Clone + 'static,
{
    fn from(node_ref: NodeRef<T>) -> Self {
        Self::new(move || node_element(node_ref))
    }
}

#[cfg(target_arch = "wasm32")]
fn node_element<T>(node_ref: NodeRef<T>) -> Option<web_sys::Element>
where
    T: ElementDescriptor + Clone + 'static,
{
    node_ref.get_untracked().map(|element| {
        let element = element.into_any();
        let html: &web_sys::HtmlElement = &element;
        html.clone().unchecked_into::<web_sys::Element>()
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn node_element<T>(node_ref: NodeRef<T>) -> Option<web_sys::Element>
where
    T: ElementDescriptor + Clone + 'static,
{
    let _ = node_ref;
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// `addEventListener` options used by the floating hooks.
pub(crate) struct ListenOptions {
    pub(crate) capture: bool,
    pub(crate) passive: bool,
}

impl ListenOptions {
    pub(crate) const BUBBLE: Self = Self {
        capture: false,
        passive: false,
    };
    pub(crate) const PASSIVE: Self = Self {
        capture: false,
        passive: true,
    };
    pub(crate) const CAPTURE: Self = Self {
        capture: true,
        passive: false,
    };
    pub(crate) const CAPTURE_PASSIVE: Self = Self {
        capture: true,
        passive: true,
    };
}

/// A registered DOM listener that unregisters itself on [`EventSubscription::remove`] or drop.
///
/// The callback is handed to the JS garbage collector, so removing the listener from inside its
/// own invocation is safe.
pub(crate) struct EventSubscription {
    target: web_sys::EventTarget,
    event: &'static str,
    capture: bool,
    function: Option<js_sys::Function>,
}

impl EventSubscription {
    pub(crate) fn listen(
        target: &web_sys::EventTarget,
        event: &'static str,
        options: ListenOptions,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, DomError> {
        let function = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(handler))
            .into_js_value()
            .unchecked_into::<js_sys::Function>();
        let listener_options = web_sys::AddEventListenerOptions::new();
        listener_options.set_capture(options.capture);
        listener_options.set_passive(options.passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                &function,
                &listener_options,
            )
            .map_err(|err| DomError::js("addEventListener", err))?;

        Ok(Self {
            target: target.clone(),
            event,
            capture: options.capture,
            function: Some(function),
        })
    }

    pub(crate) fn remove(&mut self) {
        let Some(function) = self.function.take() else {
            return;
        };
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.event,
            &function,
            self.capture,
        );
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Registers a listener, logging instead of failing.
pub(crate) fn listen_or_warn(
    target: &web_sys::EventTarget,
    event: &'static str,
    options: ListenOptions,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Option<EventSubscription> {
    match EventSubscription::listen(target, event, options, handler) {
        Ok(subscription) => Some(subscription),
        Err(err) => {
            logging::warn!("floating listener `{event}` registration failed: {err}");
            None
        }
    }
}

/// `ResizeObserver` wrapper that disconnects on drop.
pub(crate) struct SizeObserver {
    observer: Option<web_sys::ResizeObserver>,
}

impl SizeObserver {
    pub(crate) fn new(mut on_resize: impl FnMut() + 'static) -> Result<Self, DomError> {
        let function = Closure::<dyn FnMut(js_sys::Array)>::wrap(Box::new(move |_| on_resize()))
            .into_js_value()
            .unchecked_into::<js_sys::Function>();
        let observer = web_sys::ResizeObserver::new(&function)
            .map_err(|err| DomError::js("ResizeObserver", err))?;
        Ok(Self {
            observer: Some(observer),
        })
    }

    pub(crate) fn observe(&self, element: &web_sys::Element) {
        if let Some(observer) = self.observer.as_ref() {
            observer.observe(element);
        }
    }

    pub(crate) fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl Drop for SizeObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Bounding box of `element` in viewport coordinates.
pub(crate) fn measure_rect(element: &web_sys::Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.top(), rect.left(), rect.width(), rect.height())
}

/// Rendered size of `element`; unmeasurable sizes are left for the solver to estimate.
pub(crate) fn measure_size(element: &web_sys::Element) -> Size {
    let rect = element.get_bounding_client_rect();
    Size::new(rect.width(), rect.height())
}

/// Layout viewport size (`innerWidth`/`innerHeight`).
pub(crate) fn viewport() -> Result<Viewport, DomError> {
    let window = window()?;
    let read = |value: Result<JsValue, JsValue>, context: &'static str| {
        value
            .map_err(|err| DomError::js(context, err))
            .map(|value| value.as_f64().unwrap_or(0.0))
    };
    Ok(Viewport::new(
        read(window.inner_width(), "innerWidth")?,
        read(window.inner_height(), "innerHeight")?,
    ))
}

/// Whether `event` happened inside `element`, checking the composed path first (shadow roots
/// and retargeted events) and plain containment second.
pub(crate) fn event_within(element: &web_sys::Element, event: &web_sys::Event) -> bool {
    let element_value: &JsValue = element.as_ref();
    if event
        .composed_path()
        .iter()
        .any(|entry| js_sys::Object::is(&entry, element_value))
    {
        return true;
    }
    event
        .target()
        .and_then(|target| target.dyn_into::<web_sys::Node>().ok())
        .is_some_and(|node| element.contains(Some(&node)))
}

/// Currently focused element.
pub(crate) fn active_element() -> Option<web_sys::Element> {
    document().ok().and_then(|document| document.active_element())
}

/// Focuses `element` when it is an HTML element, ignoring browser focus errors.
pub(crate) fn focus_element(element: &web_sys::Element) -> bool {
    match element.dyn_ref::<web_sys::HtmlElement>() {
        Some(html) => {
            let _ = html.focus();
            true
        }
        None => false,
    }
}

/// Runs `f` on the next animation frame, after pending DOM updates have been painted.
pub(crate) fn after_paint(f: impl FnOnce() + 'static) {
    if window().is_ok() {
        leptos::request_animation_frame(f);
    }
}

#[derive(Clone)]
/// Animation-frame coalescing for passive recomputes: any number of [`FrameScheduler::schedule`]
/// calls between two frames run the job once.
pub(crate) struct FrameScheduler {
    state: Rc<RefCell<FrameCoalescer>>,
    handle: Rc<RefCell<Option<AnimationFrameRequestHandle>>>,
    job: Rc<dyn Fn()>,
}

impl FrameScheduler {
    pub(crate) fn new(job: impl Fn() + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(FrameCoalescer::default())),
            handle: Rc::new(RefCell::new(None)),
            job: Rc::new(job),
        }
    }

    pub(crate) fn activate(&self) {
        self.state.borrow_mut().activate();
    }

    pub(crate) fn schedule(&self) {
        if !self.state.borrow_mut().request() {
            return;
        }
        if window().is_err() {
            self.state.borrow_mut().abandon();
            return;
        }
        let scheduler = self.clone();
        match leptos::request_animation_frame_with_handle(move || scheduler.run_frame()) {
            Ok(handle) => *self.handle.borrow_mut() = Some(handle),
            Err(err) => {
                self.state.borrow_mut().abandon();
                logging::warn!("floating frame request failed: {err:?}");
            }
        }
    }

    fn run_frame(&self) {
        self.handle.borrow_mut().take();
        let should_run = self.state.borrow_mut().fire();
        if should_run {
            (self.job)();
        }
    }

    /// Stops scheduling and cancels any in-flight frame. Safe to call repeatedly.
    pub(crate) fn deactivate(&self) {
        self.state.borrow_mut().deactivate();
        if let Some(handle) = self.handle.borrow_mut().take() {
            handle.cancel();
        }
    }
}
