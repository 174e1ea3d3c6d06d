//! Focus enumeration, initial focus, and Tab trapping for floating containers.

use overlay_engine::{next_focus_index, roving_index, FocusCandidate, TabDirection, FOCUSABLE_SELECTOR};
use wasm_bindgen::JsCast;

use super::dom;

/// Selector for menu items handled by roving arrow navigation.
pub const MENU_ITEM_SELECTOR: &str =
    r#"[role="menuitem"], [role="menuitemcheckbox"], [role="menuitemradio"]"#;

fn candidate(container: &web_sys::Element, element: &web_sys::HtmlElement) -> FocusCandidate {
    let rect = element.get_bounding_client_rect();
    let aria_hidden = element
        .closest(r#"[aria-hidden="true"]"#)
        .ok()
        .flatten()
        .is_some_and(|hidden| container.contains(Some(&hidden)));
    FocusCandidate {
        disabled: element.has_attribute("disabled")
            || element.get_attribute("aria-disabled").as_deref() == Some("true"),
        aria_hidden,
        tab_index: element
            .get_attribute("tabindex")
            .and_then(|value| value.trim().parse().ok()),
        width: rect.width(),
        height: rect.height(),
    }
}

fn matching_elements(container: &web_sys::Element, selector: &str) -> Vec<web_sys::HtmlElement> {
    let Ok(nodes) = container.query_selector_all(selector) else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for index in 0..nodes.length() {
        let Some(node) = nodes.item(index) else {
            continue;
        };
        let Ok(item) = node.dyn_into::<web_sys::HtmlElement>() else {
            continue;
        };
        if candidate(container, &item).is_focusable() {
            items.push(item);
        }
    }
    items
}

/// Interactive descendants of `container` that Tab may land on, in DOM order.
///
/// Disabled, `aria-hidden`, `tabindex="-1"`, and zero-size elements are skipped.
pub fn focusable_elements(container: &web_sys::Element) -> Vec<web_sys::HtmlElement> {
    matching_elements(container, FOCUSABLE_SELECTOR)
}

fn active_index(items: &[web_sys::HtmlElement]) -> Option<usize> {
    let active = dom::active_element()?;
    let active: &web_sys::Node = &active;
    items.iter().position(|item| item.is_same_node(Some(active)))
}

/// Focuses the first focusable descendant of `container`, or `fallback` when there is none.
///
/// Returns whether anything received focus.
pub fn focus_first(container: &web_sys::Element, fallback: Option<&web_sys::Element>) -> bool {
    if let Some(first) = focusable_elements(container).first() {
        let _ = first.focus();
        return true;
    }
    fallback.is_some_and(dom::focus_element)
}

/// Keeps Tab and Shift+Tab cycling inside `container`.
///
/// The focusable list is rebuilt on every keystroke because overlay content may change between
/// presses. Returns `true` when the key was handled; other keys are left untouched.
pub fn trap_tab(event: &web_sys::KeyboardEvent, container: &web_sys::Element) -> bool {
    if event.key() != "Tab" || event.alt_key() || event.ctrl_key() || event.meta_key() {
        return false;
    }

    event.prevent_default();
    let items = focusable_elements(container);
    let direction = TabDirection::from_shift(event.shift_key());
    if let Some(next) = next_focus_index(items.len(), active_index(&items), direction) {
        let _ = items[next].focus();
    }
    true
}

/// Handles ArrowUp/ArrowDown/Home/End over the menu items inside `container`.
///
/// Returns `true` (and stops the event) when the key moved focus.
pub fn handle_roving_keydown(event: &web_sys::KeyboardEvent, container: &web_sys::Element) -> bool {
    let items = matching_elements(container, MENU_ITEM_SELECTOR);
    let current = active_index(&items);
    let target = match event.key().as_str() {
        "ArrowDown" => roving_index(items.len(), current, 1),
        "ArrowUp" => roving_index(items.len(), current, -1),
        "Home" => (!items.is_empty()).then_some(0),
        "End" => items.len().checked_sub(1),
        _ => return false,
    };
    let Some(target) = target else {
        return false;
    };

    let _ = items[target].focus();
    event.prevent_default();
    event.stop_propagation();
    true
}

/// Focuses the first enabled menu item inside `container`.
pub fn focus_first_menu_item(container: &web_sys::Element) -> bool {
    match matching_elements(container, MENU_ITEM_SELECTOR).first() {
        Some(first) => {
            let _ = first.focus();
            true
        }
        None => false,
    }
}
