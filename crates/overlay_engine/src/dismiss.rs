//! Dismissal policy and the stack of open overlays.
//!
//! Overlays register on open and unregister on close. Escape only closes the most recently
//! opened layer, and a press that lands inside a layer opened later (for example a nested menu
//! portaled elsewhere in the document) does not count as outside for the ones below it.
//! Passive entries such as hover tooltips never shield or outrank a layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Why an overlay asked to close.
pub enum DismissReason {
    /// Pointer pressed outside every protected element.
    OutsidePointer,
    /// Escape key.
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Input device reported by a pointer event.
pub enum PointerKind {
    /// Mouse or trackpad.
    Mouse,
    /// Pen or stylus.
    Pen,
    /// Touch contact.
    Touch,
    /// Any other or missing pointer type.
    Unknown,
}

impl PointerKind {
    /// Maps a DOM `pointerType` string.
    pub fn from_dom(value: &str) -> Self {
        match value {
            "mouse" => Self::Mouse,
            "pen" => Self::Pen,
            "touch" => Self::Touch,
            _ => Self::Unknown,
        }
    }
}

/// DOM `button` value of the secondary (usually right) mouse button.
pub const SECONDARY_BUTTON: i16 = 2;

/// Whether a pointer press may dismiss. Secondary mouse presses never do.
pub fn pointer_may_dismiss(kind: PointerKind, button: i16) -> bool {
    !(kind == PointerKind::Mouse && button == SECONDARY_BUTTON)
}

/// Whether a DOM `key` value is Escape.
pub fn is_escape_key(key: &str) -> bool {
    matches!(key, "Escape" | "Esc")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which dismissal channels an overlay listens to.
pub struct DismissPolicy {
    /// Close on pointer presses outside the protected elements.
    pub on_pointer_down: bool,
    /// Close on Escape.
    pub on_escape: bool,
}

impl Default for DismissPolicy {
    fn default() -> Self {
        Self {
            on_pointer_down: true,
            on_escape: true,
        }
    }
}

impl DismissPolicy {
    /// Whether any listener is needed at all.
    pub fn listens(&self) -> bool {
        self.on_pointer_down || self.on_escape
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle for one registration in an [`OverlayStack`].
pub struct OverlayId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How an entry takes part in stacking.
pub enum OverlayLayer {
    /// Dismissable overlay (menu, popover, drawer). Shields the layers opened before it and
    /// takes Escape from them.
    #[default]
    Layer,
    /// Hover or focus hint (tooltip). Reacts to Escape while it is the latest entry but never
    /// shields or outranks a layer.
    Passive,
}

#[derive(Debug, Clone)]
struct StackEntry<T> {
    id: OverlayId,
    layer: OverlayLayer,
    payload: T,
}

#[derive(Debug, Clone)]
/// Open overlays ordered from first to most recently opened.
pub struct OverlayStack<T> {
    next_id: u64,
    entries: Vec<StackEntry<T>>,
}

impl<T> Default for OverlayStack<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

impl<T> OverlayStack<T> {
    /// Registers a newly opened dismissable overlay on top of the stack.
    pub fn push(&mut self, payload: T) -> OverlayId {
        self.push_layer(OverlayLayer::Layer, payload)
    }

    /// Registers a newly opened overlay with an explicit [`OverlayLayer`].
    pub fn push_layer(&mut self, layer: OverlayLayer, payload: T) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.entries.push(StackEntry { id, layer, payload });
        id
    }

    fn position(&self, id: OverlayId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Unregisters an overlay wherever it sits. Returns its payload, or `None` when it was
    /// already removed.
    pub fn remove(&mut self, id: OverlayId) -> Option<T> {
        let index = self.position(id)?;
        Some(self.entries.remove(index).payload)
    }

    /// Whether `id` should handle Escape.
    ///
    /// A layer is topmost when no layer was opened after it; passive entries above it do not
    /// count. A passive entry is topmost only while it is the latest entry of all.
    pub fn is_topmost(&self, id: OverlayId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        match self.entries[index].layer {
            OverlayLayer::Passive => index + 1 == self.entries.len(),
            OverlayLayer::Layer => self.entries[index + 1..]
                .iter()
                .all(|entry| entry.layer == OverlayLayer::Passive),
        }
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: OverlayId) -> bool {
        self.position(id).is_some()
    }

    /// Stacking layer of `id`.
    pub fn layer(&self, id: OverlayId) -> Option<OverlayLayer> {
        self.position(id).map(|index| self.entries[index].layer)
    }

    /// Payload for `id`.
    pub fn get(&self, id: OverlayId) -> Option<&T> {
        self.position(id).map(|index| &self.entries[index].payload)
    }

    /// Replaces the payload for `id`. Returns `false` when `id` is not registered.
    pub fn replace(&mut self, id: OverlayId, payload: T) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.payload = payload;
                true
            }
            None => false,
        }
    }

    /// Payloads of `id` and every layer opened after it, in opening order. Passive entries
    /// opened later are skipped. Empty when `id` is not registered.
    pub fn from_entry(&self, id: OverlayId) -> impl Iterator<Item = &T> {
        let start = self.position(id).unwrap_or(self.entries.len());
        self.entries[start..]
            .iter()
            .enumerate()
            .filter(|(offset, entry)| *offset == 0 || entry.layer == OverlayLayer::Layer)
            .map(|(_, entry)| &entry.payload)
    }

    /// Number of open overlays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no overlay is open.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn only_the_latest_overlay_is_topmost() {
        let mut stack = OverlayStack::default();
        let drawer = stack.push("drawer");
        let confirm = stack.push("confirm");

        assert!(stack.is_topmost(confirm));
        assert!(!stack.is_topmost(drawer));

        assert_eq!(stack.remove(confirm), Some("confirm"));
        assert!(stack.is_topmost(drawer));
        assert_eq!(stack.remove(confirm), None, "double removal is harmless");
    }

    #[test]
    fn out_of_order_close_keeps_remaining_order() {
        let mut stack = OverlayStack::default();
        let first = stack.push(1);
        let second = stack.push(2);
        let third = stack.push(3);

        stack.remove(second);
        assert_eq!(stack.from_entry(first).copied().collect::<Vec<_>>(), vec![1, 3]);
        assert!(stack.is_topmost(third));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn from_entry_includes_nested_overlays_only() {
        let mut stack = OverlayStack::default();
        let outer = stack.push("outer");
        let inner = stack.push("inner");

        assert_eq!(
            stack.from_entry(outer).copied().collect::<Vec<_>>(),
            vec!["outer", "inner"]
        );
        assert_eq!(stack.from_entry(inner).copied().collect::<Vec<_>>(), vec!["inner"]);
        stack.clear();
        assert_eq!(stack.from_entry(outer).count(), 0);
        assert!(stack.is_empty());
    }

    #[test]
    fn hover_hint_neither_shields_nor_outranks_an_open_menu() {
        let mut stack = OverlayStack::default();
        let menu = stack.push("menu");
        let tooltip = stack.push_layer(OverlayLayer::Passive, "tooltip");

        assert_eq!(stack.from_entry(menu).copied().collect::<Vec<_>>(), vec!["menu"]);
        assert_eq!(stack.from_entry(tooltip).copied().collect::<Vec<_>>(), vec!["tooltip"]);
        assert!(stack.is_topmost(menu), "menu still takes Escape");
        assert!(stack.is_topmost(tooltip), "latest hint hides on Escape too");
        assert_eq!(stack.layer(tooltip), Some(OverlayLayer::Passive));

        let submenu = stack.push("submenu");
        assert!(!stack.is_topmost(menu));
        assert!(!stack.is_topmost(tooltip));
        assert_eq!(
            stack.from_entry(menu).copied().collect::<Vec<_>>(),
            vec!["menu", "submenu"]
        );
        stack.remove(submenu);
        assert!(stack.is_topmost(menu));
    }

    #[test]
    fn replace_updates_registered_payloads_only() {
        let mut stack = OverlayStack::default();
        let id = stack.push(vec![1]);
        assert!(stack.replace(id, vec![1, 2]));
        assert_eq!(stack.get(id), Some(&vec![1, 2]));
        stack.remove(id);
        assert!(!stack.replace(id, vec![3]));
        assert!(!stack.contains(id));
    }

    #[test]
    fn secondary_mouse_presses_never_dismiss() {
        assert!(!pointer_may_dismiss(PointerKind::from_dom("mouse"), SECONDARY_BUTTON));
        assert!(pointer_may_dismiss(PointerKind::Mouse, 0));
        assert!(pointer_may_dismiss(PointerKind::Touch, SECONDARY_BUTTON));
        assert_eq!(PointerKind::from_dom(""), PointerKind::Unknown);
    }

    #[test]
    fn escape_key_aliases_and_policy_defaults() {
        assert!(is_escape_key("Escape"));
        assert!(is_escape_key("Esc"));
        assert!(!is_escape_key("Enter"));
        assert!(DismissPolicy::default().listens());
        assert!(!DismissPolicy {
            on_pointer_down: false,
            on_escape: false,
        }
        .listens());
    }
}
