//! Reactive viewport size and media-query signals.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use leptos::*;

use super::dom::{self, listen_or_warn, EventSubscription, FrameScheduler, ListenOptions};

/// Viewport used before a window is available.
pub const FALLBACK_VIEWPORT: ViewportSize = ViewportSize {
    width: 1024.0,
    height: 768.0,
};

/// Query matched by [`use_is_compact_viewport`].
pub const COMPACT_VIEWPORT_QUERY: &str = "(max-width: 640px)";

/// Query matched by [`use_prefers_reduced_motion`].
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Layout viewport dimensions in CSS pixels.
pub struct ViewportSize {
    /// `innerWidth`.
    pub width: f64,
    /// `innerHeight`.
    pub height: f64,
}

fn read_viewport() -> ViewportSize {
    dom::viewport()
        .map(|viewport| ViewportSize {
            width: viewport.width,
            height: viewport.height,
        })
        .unwrap_or(FALLBACK_VIEWPORT)
}

/// Tracks the window size, updated at most once per animation frame on resize or rotation.
pub fn use_viewport_size() -> Signal<ViewportSize> {
    let size = create_rw_signal(read_viewport());
    let frames = FrameScheduler::new(move || {
        let next = read_viewport();
        if size.get_untracked() != next {
            size.set(next);
        }
    });
    frames.activate();

    let mut listeners = Vec::new();
    if let Ok(window) = dom::window() {
        for event in ["resize", "orientationchange"] {
            let frames = frames.clone();
            listeners.extend(listen_or_warn(
                window.as_ref(),
                event,
                ListenOptions::PASSIVE,
                move |_| frames.schedule(),
            ));
        }
    }

    on_cleanup(move || {
        frames.deactivate();
        drop(listeners);
    });
    size.into()
}

thread_local! {
    static MEDIA_QUERY_CACHE: RefCell<HashMap<String, bool>> = RefCell::new(HashMap::new());
}

/// Last known result of `query`, if any hook has evaluated it.
pub fn cached_media_query(query: &str) -> Option<bool> {
    MEDIA_QUERY_CACHE.with(|cache| cache.borrow().get(query).copied())
}

/// Clears every cached media-query result. Intended for test isolation.
pub fn reset_media_query_cache() {
    MEDIA_QUERY_CACHE.with(|cache| cache.borrow_mut().clear());
}

fn remember(query: &str, matches: bool) {
    MEDIA_QUERY_CACHE.with(|cache| {
        cache.borrow_mut().insert(query.to_string(), matches);
    });
}

fn match_media(query: &str) -> Option<web_sys::MediaQueryList> {
    let window = dom::window().ok()?;
    match window.match_media(query) {
        Ok(list) => list,
        Err(err) => {
            let err = dom::DomError::js("matchMedia", err);
            logging::warn!("media query `{query}` unavailable: {err}");
            None
        }
    }
}

/// Whether `query` currently matches, following `change` events.
///
/// Without `matchMedia` the last cached result is used, falling back to `false`.
pub fn use_media_query(query: &'static str) -> Signal<bool> {
    let list = match_media(query);
    let initial = list
        .as_ref()
        .map(web_sys::MediaQueryList::matches)
        .or_else(|| cached_media_query(query))
        .unwrap_or(false);
    remember(query, initial);

    let matches = create_rw_signal(initial);
    let subscription: Rc<RefCell<Option<EventSubscription>>> = Rc::new(RefCell::new(None));

    if let Some(list) = list {
        let source = list.clone();
        *subscription.borrow_mut() = listen_or_warn(
            list.as_ref(),
            "change",
            ListenOptions::BUBBLE,
            move |_| {
                let next = source.matches();
                remember(query, next);
                matches.set(next);
            },
        );
    }

    on_cleanup(move || {
        subscription.borrow_mut().take();
    });
    matches.into()
}

/// `true` when the user asked the OS to reduce motion.
pub fn use_prefers_reduced_motion() -> Signal<bool> {
    use_media_query(REDUCED_MOTION_QUERY)
}

/// `true` on phone-sized viewports.
pub fn use_is_compact_viewport() -> Signal<bool> {
    use_media_query(COMPACT_VIEWPORT_QUERY)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn viewport_falls_back_without_window() {
        assert_eq!(read_viewport(), FALLBACK_VIEWPORT);
    }

    #[test]
    fn media_query_uses_cached_result_without_match_media() {
        let runtime = create_runtime();
        reset_media_query_cache();
        assert_eq!(cached_media_query(COMPACT_VIEWPORT_QUERY), None);

        remember(COMPACT_VIEWPORT_QUERY, true);
        let compact = use_is_compact_viewport();
        assert!(compact.get_untracked());
        assert!(!use_prefers_reduced_motion().get_untracked());
        assert_eq!(cached_media_query(REDUCED_MOTION_QUERY), Some(false));

        reset_media_query_cache();
        assert_eq!(cached_media_query(COMPACT_VIEWPORT_QUERY), None);
        runtime.dispose();
    }
}
