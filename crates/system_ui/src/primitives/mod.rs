//! Floating overlay primitives: menus, popovers, tooltips, combobox, and drawer.

use std::cell::Cell;

use leptos::*;

use crate::floating::{focus_element, ElementRef};

mod combobox;
mod drawer;
mod overlays;

pub use combobox::{filter_options, Combobox, ComboboxOption};
pub use drawer::{Drawer, DrawerEdge};
pub use overlays::{DropdownMenu, MenuItem, MenuSeparator, MenuSurface, Popover, Tooltip};

thread_local! {
    static NEXT_OVERLAY_ID: Cell<u64> = const { Cell::new(1) };
}

/// Unique DOM id for an overlay element, e.g. `ui-popover-3`.
pub(crate) fn next_overlay_dom_id(prefix: &str) -> String {
    let id = NEXT_OVERLAY_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    format!("ui-{prefix}-{id}")
}

pub(crate) fn merge_layout_class(base: &'static str, layout_class: Option<&'static str>) -> String {
    match layout_class {
        Some(layout_class) if !layout_class.is_empty() => format!("{base} {layout_class}"),
        _ => base.to_string(),
    }
}

pub(crate) fn bool_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// `data-ui-motion` token for the current reduced-motion preference.
pub(crate) fn motion_token(reduced: bool) -> &'static str {
    if reduced {
        "reduced"
    } else {
        "full"
    }
}

/// Moves focus back to a stored element (normally the trigger) if it is still mounted.
pub(crate) fn restore_focus(target: StoredValue<ElementRef>) {
    if let Some(element) = target.with_value(ElementRef::get) {
        focus_element(&element);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn overlay_ids_are_unique_and_prefixed() {
        let first = next_overlay_dom_id("menu");
        let second = next_overlay_dom_id("menu");
        assert!(first.starts_with("ui-menu-"));
        assert_ne!(first, second);
    }

    #[test]
    fn layout_class_is_appended_when_present() {
        assert_eq!(merge_layout_class("ui-drawer", None), "ui-drawer");
        assert_eq!(merge_layout_class("ui-drawer", Some("")), "ui-drawer");
        assert_eq!(
            merge_layout_class("ui-drawer", Some("settings-drawer")),
            "ui-drawer settings-drawer"
        );
    }

    #[test]
    fn tokens_render_attribute_values() {
        assert_eq!(bool_token(true), "true");
        assert_eq!(bool_token(false), "false");
        assert_eq!(motion_token(true), "reduced");
        assert_eq!(motion_token(false), "full");
    }
}
