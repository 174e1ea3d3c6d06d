//! Browser bindings for floating overlays: placement, dismissal, focus, scroll lock, and
//! viewport reactivity.
//!
//! Geometry and state machines live in `overlay_engine`; this module only measures the DOM,
//! owns listener lifetimes, and exposes the results as Leptos signals.

mod dismiss;
mod dom;
mod focus;
mod position;
mod scroll_lock;
mod viewport;

pub use dismiss::{open_overlay_count, reset_overlay_stack, use_dismiss, UseDismissOptions};
pub use dom::{DomError, ElementRef};
pub use focus::{
    focus_first, focus_first_menu_item, focusable_elements, handle_roving_keydown, trap_tab,
    MENU_ITEM_SELECTOR,
};
pub use position::{use_position, UsePositionOptions, UsePositionReturn, UNPLACED_STYLE};
pub use scroll_lock::{
    lock_scroll, reset_scroll_lock, scroll_lock_depth, unlock_scroll, use_scroll_lock,
};
pub use viewport::{
    cached_media_query, reset_media_query_cache, use_is_compact_viewport, use_media_query,
    use_prefers_reduced_motion, use_viewport_size, ViewportSize, COMPACT_VIEWPORT_QUERY,
    FALLBACK_VIEWPORT, REDUCED_MOTION_QUERY,
};

pub(crate) use dom::{active_element, after_paint, focus_element};
