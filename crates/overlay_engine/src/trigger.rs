//! ARIA contract between a floating overlay and the trigger element its caller owns.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of floating content a trigger controls.
pub enum PopupKind {
    /// Non-modal panel (popover, drawer).
    Dialog,
    /// Action menu.
    Menu,
    /// Option list (combobox).
    Listbox,
    /// Descriptive tooltip.
    Tooltip,
}

impl PopupKind {
    /// Value for `aria-haspopup`, `None` for tooltips.
    pub fn haspopup_token(self) -> Option<&'static str> {
        match self {
            Self::Dialog => Some("dialog"),
            Self::Menu => Some("menu"),
            Self::Listbox => Some("listbox"),
            Self::Tooltip => None,
        }
    }

    /// ARIA role for the overlay element.
    pub fn overlay_role(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::Menu => "menu",
            Self::Listbox => "listbox",
            Self::Tooltip => "tooltip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Attributes a caller applies to its own trigger node.
pub struct TriggerAria {
    /// Overlay kind.
    pub kind: PopupKind,
    /// DOM id of the overlay element.
    pub overlay_id: String,
    /// Whether the overlay is currently open.
    pub expanded: bool,
}

impl TriggerAria {
    /// Contract for a trigger controlling `overlay_id`.
    pub fn new(kind: PopupKind, overlay_id: impl Into<String>, expanded: bool) -> Self {
        Self {
            kind,
            overlay_id: overlay_id.into(),
            expanded,
        }
    }

    /// `aria-expanded` value, absent for tooltips.
    pub fn aria_expanded(&self) -> Option<&'static str> {
        self.kind
            .haspopup_token()
            .map(|_| if self.expanded { "true" } else { "false" })
    }

    /// `aria-controls` value while open, absent for tooltips.
    pub fn aria_controls(&self) -> Option<String> {
        (self.kind != PopupKind::Tooltip && self.expanded).then(|| self.overlay_id.clone())
    }

    /// `aria-describedby` value for an open tooltip.
    pub fn aria_describedby(&self) -> Option<String> {
        (self.kind == PopupKind::Tooltip && self.expanded).then(|| self.overlay_id.clone())
    }

    /// All attributes as name/value pairs, skipping absent ones.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = Vec::new();
        if let Some(token) = self.kind.haspopup_token() {
            attrs.push(("aria-haspopup", token.to_string()));
        }
        if let Some(expanded) = self.aria_expanded() {
            attrs.push(("aria-expanded", expanded.to_string()));
        }
        if let Some(controls) = self.aria_controls() {
            attrs.push(("aria-controls", controls));
        }
        if let Some(described) = self.aria_describedby() {
            attrs.push(("aria-describedby", described));
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn menu_trigger_reports_expanded_state_and_controls() {
        let open = TriggerAria::new(PopupKind::Menu, "file-menu", true);
        assert_eq!(
            open.attributes(),
            vec![
                ("aria-haspopup", "menu".to_string()),
                ("aria-expanded", "true".to_string()),
                ("aria-controls", "file-menu".to_string()),
            ]
        );

        let closed = TriggerAria::new(PopupKind::Menu, "file-menu", false);
        assert_eq!(closed.aria_controls(), None);
        assert_eq!(closed.aria_expanded(), Some("false"));
    }

    #[test]
    fn tooltip_trigger_is_described_only_while_open() {
        let open = TriggerAria::new(PopupKind::Tooltip, "tip-1", true);
        assert_eq!(
            open.attributes(),
            vec![("aria-describedby", "tip-1".to_string())]
        );
        assert!(TriggerAria::new(PopupKind::Tooltip, "tip-1", false)
            .attributes()
            .is_empty());
        assert_eq!(PopupKind::Listbox.overlay_role(), "listbox");
    }
}
