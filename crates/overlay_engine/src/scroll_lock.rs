//! Reference-counted background scroll suppression.
//!
//! [`ScrollLockCounter`] is generic over a [`ScrollLockTarget`] so the DOM body and test fakes
//! share one state machine. The target is only touched on the 0→1 and 1→0 transitions.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Inline body styles captured when the first lock is taken.
pub struct SavedBodyStyle {
    /// Previous inline `overflow` value (possibly empty).
    pub overflow: String,
    /// Previous inline `padding-right` value (possibly empty).
    pub padding_right: String,
}

/// The element whose scrolling is suppressed, normally the document body.
pub trait ScrollLockTarget {
    /// Current inline `overflow`.
    fn overflow(&self) -> String;
    /// Current inline `padding-right`.
    fn padding_right(&self) -> String;
    /// Width of the visible vertical scrollbar in px, `0` when there is none.
    fn scrollbar_width(&self) -> f64;
    /// Writes inline `overflow` and `padding-right`.
    fn apply(&self, overflow: &str, padding_right: &str);
}

/// Parses a CSS pixel length such as `"12px"` or `"12"`. Empty or unparsable values read as `0`.
pub fn parse_px(value: &str) -> f64 {
    plain_px(value).unwrap_or(0.0)
}

/// Plain pixel length (`"12px"`, `"12"`, or empty as `0`). `None` for other units and
/// expressions.
fn plain_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|px| px.is_finite())
}

/// Padding that compensates for the scrollbar disappearing under `overflow: hidden`.
///
/// Pixel paddings are summed; any other length is kept through `calc()`.
pub fn compensated_padding(saved_padding_right: &str, scrollbar_width: f64) -> Option<String> {
    if !scrollbar_width.is_finite() || scrollbar_width <= 0.0 {
        return None;
    }
    Some(match plain_px(saved_padding_right) {
        Some(px) => format!("{}px", px + scrollbar_width),
        None => format!("calc({} + {scrollbar_width}px)", saved_padding_right.trim()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Lock depth plus the styles to restore when the last lock is released.
pub struct ScrollLockCounter {
    depth: usize,
    saved: Option<SavedBodyStyle>,
}

impl ScrollLockCounter {
    /// Number of locks currently held.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the target is currently locked.
    pub fn is_locked(&self) -> bool {
        self.depth > 0
    }

    /// Styles saved by the outermost lock.
    pub fn saved(&self) -> Option<&SavedBodyStyle> {
        self.saved.as_ref()
    }

    /// Takes a lock. Returns `true` when this call locked the target.
    pub fn lock(&mut self, target: &impl ScrollLockTarget) -> bool {
        self.depth += 1;
        if self.depth > 1 {
            return false;
        }

        let saved = SavedBodyStyle {
            overflow: target.overflow(),
            padding_right: target.padding_right(),
        };
        let padding = compensated_padding(&saved.padding_right, target.scrollbar_width())
            .unwrap_or_else(|| saved.padding_right.clone());
        target.apply("hidden", &padding);
        self.saved = Some(saved);
        true
    }

    /// Releases a lock. Returns `true` when this call restored the target. Releasing with no
    /// lock held is ignored.
    pub fn unlock(&mut self, target: &impl ScrollLockTarget) -> bool {
        match self.depth {
            0 => false,
            1 => {
                self.depth = 0;
                if let Some(saved) = self.saved.take() {
                    target.apply(&saved.overflow, &saved.padding_right);
                }
                true
            }
            _ => {
                self.depth -= 1;
                false
            }
        }
    }

    /// Forgets all locks and saved styles without touching any target.
    pub fn reset(&mut self) {
        self.depth = 0;
        self.saved = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    struct FakeBody {
        overflow: RefCell<String>,
        padding_right: RefCell<String>,
        scrollbar: f64,
        writes: RefCell<usize>,
    }

    impl FakeBody {
        fn new(overflow: &str, padding_right: &str, scrollbar: f64) -> Self {
            Self {
                overflow: RefCell::new(overflow.to_string()),
                padding_right: RefCell::new(padding_right.to_string()),
                scrollbar,
                writes: RefCell::new(0),
            }
        }

        fn styles(&self) -> (String, String) {
            (
                self.overflow.borrow().clone(),
                self.padding_right.borrow().clone(),
            )
        }
    }

    impl ScrollLockTarget for FakeBody {
        fn overflow(&self) -> String {
            self.overflow.borrow().clone()
        }

        fn padding_right(&self) -> String {
            self.padding_right.borrow().clone()
        }

        fn scrollbar_width(&self) -> f64 {
            self.scrollbar
        }

        fn apply(&self, overflow: &str, padding_right: &str) {
            *self.overflow.borrow_mut() = overflow.to_string();
            *self.padding_right.borrow_mut() = padding_right.to_string();
            *self.writes.borrow_mut() += 1;
        }
    }

    #[test]
    fn nested_locks_restore_only_on_last_unlock() {
        let body = FakeBody::new("auto", "4px", 15.0);
        let mut counter = ScrollLockCounter::default();

        assert!(counter.lock(&body));
        assert!(!counter.lock(&body));
        assert_eq!(body.styles(), ("hidden".to_string(), "19px".to_string()));

        assert!(!counter.unlock(&body));
        assert!(counter.is_locked());
        assert_eq!(body.styles(), ("hidden".to_string(), "19px".to_string()));

        assert!(counter.unlock(&body));
        assert_eq!(body.styles(), ("auto".to_string(), "4px".to_string()));
        assert_eq!(*body.writes.borrow(), 2, "only the 0↔1 transitions write");
    }

    #[test]
    fn inner_overlay_closing_first_keeps_outer_lock() {
        let body = FakeBody::new("", "", 0.0);
        let mut counter = ScrollLockCounter::default();

        counter.lock(&body); // drawer
        counter.lock(&body); // confirm dialog inside the drawer
        counter.unlock(&body); // dialog closes first
        assert_eq!(body.styles(), ("hidden".to_string(), String::new()));
        counter.unlock(&body);
        assert_eq!(body.styles(), (String::new(), String::new()));
    }

    #[test]
    fn unlock_without_lock_never_goes_negative() {
        let body = FakeBody::new("scroll", "", 12.0);
        let mut counter = ScrollLockCounter::default();

        assert!(!counter.unlock(&body));
        assert_eq!(counter.depth(), 0);
        assert_eq!(*body.writes.borrow(), 0);

        assert!(counter.lock(&body));
        assert_eq!(counter.depth(), 1);
        assert_eq!(
            counter.saved(),
            Some(&SavedBodyStyle {
                overflow: "scroll".to_string(),
                padding_right: String::new(),
            })
        );
    }

    #[test]
    fn reset_forgets_state_without_writing() {
        let body = FakeBody::new("auto", "", 10.0);
        let mut counter = ScrollLockCounter::default();
        counter.lock(&body);
        counter.reset();
        assert_eq!(counter, ScrollLockCounter::default());
        assert_eq!(*body.writes.borrow(), 1);
    }

    #[test]
    fn padding_helpers_handle_units_and_empty_values() {
        assert_eq!(parse_px(""), 0.0);
        assert_eq!(parse_px(" 12.5px "), 12.5);
        assert_eq!(parse_px("1rem"), 0.0);
        assert_eq!(compensated_padding("", 17.0), Some("17px".to_string()));
        assert_eq!(compensated_padding("3px", 0.0), None);
    }

    #[test]
    fn relative_padding_survives_compensation() {
        assert_eq!(
            compensated_padding("1rem", 15.0),
            Some("calc(1rem + 15px)".to_string())
        );

        let body = FakeBody::new("auto", "2em", 12.0);
        let mut counter = ScrollLockCounter::default();
        counter.lock(&body);
        assert_eq!(
            body.styles(),
            ("hidden".to_string(), "calc(2em + 12px)".to_string())
        );
        counter.unlock(&body);
        assert_eq!(body.styles(), ("auto".to_string(), "2em".to_string()));
    }
}
