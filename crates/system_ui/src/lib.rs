//! Floating overlay primitives for Leptos applications.
//!
//! The crate binds the framework-agnostic `overlay_engine` to the browser DOM: reactive
//! placement, outside-press and Escape dismissal, focus trapping, background scroll lock, and
//! viewport signals. The components in [`prelude`] are built on those hooks and emit the stable
//! `data-ui-*` DOM contract consumed by the shared CSS layers.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod floating;
mod primitives;

pub use floating::{
    use_dismiss, use_is_compact_viewport, use_media_query, use_position,
    use_prefers_reduced_motion, use_scroll_lock, use_viewport_size, DomError, ElementRef,
    UseDismissOptions, UsePositionOptions, UsePositionReturn, ViewportSize,
};
pub use overlay_engine::{
    Align, DismissReason, PlacementRequest, PopupKind, ResolvedPlacement, Side, TriggerAria,
};
pub use primitives::{
    filter_options, Combobox, ComboboxOption, Drawer, DrawerEdge, DropdownMenu, MenuItem,
    MenuSeparator, MenuSurface, Popover, Tooltip,
};

/// Convenience imports for application crates consuming the overlay primitives.
pub mod prelude {
    pub use crate::{
        use_dismiss, use_is_compact_viewport, use_position, use_prefers_reduced_motion,
        use_scroll_lock, Align, Combobox, ComboboxOption, Drawer, DrawerEdge, DropdownMenu,
        ElementRef, MenuItem, MenuSeparator, MenuSurface, Popover, Side, Tooltip,
        UseDismissOptions, UsePositionOptions,
    };
}
