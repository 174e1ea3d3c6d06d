//! Focus-order rules shared by the focus trap and roving menus.

/// Selector for elements that can take keyboard focus. Matches are filtered further by
/// [`FocusCandidate::is_focusable`].
pub const FOCUSABLE_SELECTOR: &str = concat!(
    "a[href], area[href], button, input:not([type=\"hidden\"]), select, textarea, ",
    "iframe, summary, [tabindex], [contenteditable=\"true\"], [contenteditable=\"\"]"
);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// Facts read from one selector match.
pub struct FocusCandidate {
    /// Carries `disabled` or `aria-disabled="true"`.
    pub disabled: bool,
    /// Hidden from assistive tech, on itself or an ancestor inside the scope.
    pub aria_hidden: bool,
    /// Explicit `tabindex` value, when present.
    pub tab_index: Option<i32>,
    /// Rendered width in px.
    pub width: f64,
    /// Rendered height in px.
    pub height: f64,
}

impl FocusCandidate {
    /// Whether Tab may land on this element.
    pub fn is_focusable(&self) -> bool {
        !self.disabled
            && !self.aria_hidden
            && self.tab_index.map_or(true, |index| index >= 0)
            && (self.width > 0.0 || self.height > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Direction of a Tab keystroke.
pub enum TabDirection {
    /// Tab.
    Forward,
    /// Shift+Tab.
    Backward,
}

impl TabDirection {
    /// Direction for a Tab keystroke with the given Shift state.
    pub fn from_shift(shift: bool) -> Self {
        if shift {
            Self::Backward
        } else {
            Self::Forward
        }
    }
}

/// Index to focus next in a list of `len` focusables, wrapping at both ends.
///
/// `current` is the index of the active element, or `None` when focus is outside the list, in
/// which case Tab enters at the first element and Shift+Tab at the last.
pub fn next_focus_index(len: usize, current: Option<usize>, direction: TabDirection) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let last = len - 1;
    let next = match (current.filter(|index| *index < len), direction) {
        (None, TabDirection::Forward) => 0,
        (None, TabDirection::Backward) => last,
        (Some(index), TabDirection::Forward) => {
            if index == last {
                0
            } else {
                index + 1
            }
        }
        (Some(index), TabDirection::Backward) => {
            if index == 0 {
                last
            } else {
                index - 1
            }
        }
    };
    Some(next)
}

/// Index for roving arrow navigation: `delta` steps from `current` with wraparound.
pub fn roving_index(len: usize, current: Option<usize>, delta: i32) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let Some(current) = current.filter(|index| *index < len) else {
        return Some(if delta < 0 { len - 1 } else { 0 });
    };
    let len = len as i64;
    Some((current as i64 + i64::from(delta)).rem_euclid(len) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible() -> FocusCandidate {
        FocusCandidate {
            width: 80.0,
            height: 24.0,
            ..FocusCandidate::default()
        }
    }

    #[test]
    fn candidate_filter_rejects_disabled_hidden_and_collapsed() {
        assert!(visible().is_focusable());
        assert!(!FocusCandidate {
            disabled: true,
            ..visible()
        }
        .is_focusable());
        assert!(!FocusCandidate {
            aria_hidden: true,
            ..visible()
        }
        .is_focusable());
        assert!(!FocusCandidate {
            tab_index: Some(-1),
            ..visible()
        }
        .is_focusable());
        assert!(FocusCandidate {
            tab_index: Some(0),
            ..visible()
        }
        .is_focusable());
        assert!(!FocusCandidate::default().is_focusable());
    }

    #[test]
    fn enabled_candidates_survive_in_order() {
        let candidates = [
            (1, visible()),
            (2, FocusCandidate { disabled: true, ..visible() }),
            (3, visible()),
            (4, FocusCandidate { disabled: true, ..visible() }),
            (5, visible()),
        ];
        let ids: Vec<_> = candidates
            .iter()
            .filter(|(_, candidate)| candidate.is_focusable())
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn tab_wraps_in_both_directions() {
        assert_eq!(next_focus_index(3, Some(2), TabDirection::Forward), Some(0));
        assert_eq!(next_focus_index(3, Some(0), TabDirection::Backward), Some(2));
        assert_eq!(next_focus_index(3, Some(1), TabDirection::Forward), Some(2));
        assert_eq!(next_focus_index(3, Some(1), TabDirection::Backward), Some(0));
        assert_eq!(next_focus_index(1, Some(0), TabDirection::Forward), Some(0));
    }

    #[test]
    fn focus_outside_the_scope_enters_at_an_edge() {
        assert_eq!(next_focus_index(4, None, TabDirection::Forward), Some(0));
        assert_eq!(next_focus_index(4, None, TabDirection::Backward), Some(3));
        assert_eq!(next_focus_index(4, Some(9), TabDirection::Forward), Some(0));
        assert_eq!(next_focus_index(0, None, TabDirection::Forward), None);
        assert_eq!(TabDirection::from_shift(true), TabDirection::Backward);
    }

    #[test]
    fn roving_index_wraps() {
        assert_eq!(roving_index(3, Some(2), 1), Some(0));
        assert_eq!(roving_index(3, Some(0), -1), Some(2));
        assert_eq!(roving_index(3, None, -1), Some(2));
        assert_eq!(roving_index(3, None, 1), Some(0));
        assert_eq!(roving_index(0, Some(0), 1), None);
    }
}
