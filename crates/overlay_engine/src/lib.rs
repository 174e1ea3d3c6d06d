//! Framework-agnostic core of the floating overlay engine.
//!
//! Everything here is pure state or geometry: placement solving, animation-frame coalescing,
//! scroll-lock reference counting, focus ordering, and the open-overlay dismissal stack. The
//! `system_ui` crate binds these to the DOM through Leptos and `web-sys`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod dismiss;
pub mod focus;
pub mod frame;
pub mod geometry;
pub mod scroll_lock;
pub mod trigger;

pub use dismiss::{
    is_escape_key, pointer_may_dismiss, DismissPolicy, DismissReason, OverlayId, OverlayLayer,
    OverlayStack, PointerKind,
};
pub use focus::{next_focus_index, roving_index, FocusCandidate, TabDirection, FOCUSABLE_SELECTOR};
pub use frame::FrameCoalescer;
pub use geometry::{
    compute_position, Align, PlacementError, PlacementRequest, Rect, ResolvedPlacement, Side,
    Size, Viewport, DEFAULT_OFFSET, VIEWPORT_PADDING,
};
pub use scroll_lock::{ScrollLockCounter, ScrollLockTarget, SavedBodyStyle};
pub use trigger::{PopupKind, TriggerAria};
