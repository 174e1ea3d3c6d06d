//! Reactive placement for an overlay anchored to a trigger.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::*;
use overlay_engine::{compute_position, PlacementRequest, ResolvedPlacement, Side, Size};

use super::dom::{
    self, listen_or_warn, ElementRef, EventSubscription, FrameScheduler, ListenOptions,
    SizeObserver,
};

/// Style applied before the first placement so the overlay never flashes at the origin.
pub const UNPLACED_STYLE: &str = "position:fixed;top:0px;left:0px;visibility:hidden;";

#[derive(Debug, Clone)]
/// Inputs for [`use_position`].
pub struct UsePositionOptions {
    /// Anchor element.
    pub trigger: ElementRef,
    /// Floating element being placed.
    pub overlay: ElementRef,
    /// Placement preferences.
    pub request: PlacementRequest,
    /// Whether placement is live. No listener exists while this is `false`.
    pub enabled: Signal<bool>,
}

#[derive(Clone, Copy)]
/// Output of [`use_position`].
pub struct UsePositionReturn {
    /// Inline style for the overlay element.
    pub style: Signal<String>,
    /// Side actually used after flipping, for carets and transform origins.
    pub actual_side: Signal<Side>,
    /// Latest solver output, `None` until the first measurement.
    pub placement: Signal<Option<ResolvedPlacement>>,
    /// Synchronous recompute, for use right after the overlay mounts.
    pub update: Callback<()>,
}

/// Measures trigger, overlay, and viewport and runs the solver. `None` when the trigger is not
/// mounted or there is no window.
fn measure_placement(
    trigger: &ElementRef,
    overlay: &ElementRef,
    request: &PlacementRequest,
) -> Option<ResolvedPlacement> {
    let trigger = trigger.get()?;
    let viewport = dom::viewport().ok()?;
    let overlay_size = overlay
        .get()
        .map(|element| dom::measure_size(&element))
        .unwrap_or_else(Size::estimate);
    Some(compute_position(
        dom::measure_rect(&trigger),
        overlay_size,
        viewport,
        request,
    ))
}

#[derive(Default)]
struct PositionListeners {
    events: Vec<EventSubscription>,
    observer: Option<SizeObserver>,
    trigger_observed: bool,
    overlay_observed: bool,
}

impl PositionListeners {
    fn attach(&mut self, frames: &FrameScheduler) {
        let Ok(window) = dom::window() else {
            return;
        };
        let signal = |frames: &FrameScheduler| {
            let frames = frames.clone();
            move |_: web_sys::Event| frames.schedule()
        };

        let targets: [(&web_sys::EventTarget, &'static str, ListenOptions); 2] = [
            (window.as_ref(), "resize", ListenOptions::PASSIVE),
            (window.as_ref(), "orientationchange", ListenOptions::PASSIVE),
        ];
        for (target, event, options) in targets {
            self.events
                .extend(listen_or_warn(target, event, options, signal(frames)));
        }

        // Capture phase sees scrolls of any nested container, not just the document.
        if let Ok(document) = dom::document() {
            self.events.extend(listen_or_warn(
                document.as_ref(),
                "scroll",
                ListenOptions::CAPTURE_PASSIVE,
                signal(frames),
            ));
        }

        if let Some(visual) = window.visual_viewport() {
            for event in ["resize", "scroll"] {
                self.events.extend(listen_or_warn(
                    visual.as_ref(),
                    event,
                    ListenOptions::PASSIVE,
                    signal(frames),
                ));
            }
        }

        let frames = frames.clone();
        match SizeObserver::new(move || frames.schedule()) {
            Ok(observer) => self.observer = Some(observer),
            Err(err) => logging::warn!("overlay size observer unavailable: {err}"),
        }
    }

    /// Starts observing elements that were not mounted when listeners were attached.
    fn observe_mounted(&mut self, trigger: &ElementRef, overlay: &ElementRef) {
        let Some(observer) = self.observer.as_ref() else {
            return;
        };
        if !self.trigger_observed {
            if let Some(element) = trigger.get() {
                observer.observe(&element);
                self.trigger_observed = true;
            }
        }
        if !self.overlay_observed {
            if let Some(element) = overlay.get() {
                observer.observe(&element);
                self.overlay_observed = true;
            }
        }
    }

    fn detach(&mut self) {
        for mut subscription in self.events.drain(..) {
            subscription.remove();
        }
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
        }
        self.trigger_observed = false;
        self.overlay_observed = false;
    }
}

/// Keeps an overlay placed next to its trigger while `enabled` is true.
///
/// Placement is recomputed synchronously when the overlay becomes enabled, then once per
/// animation frame whenever the window resizes or rotates, any ancestor scrolls, the visual
/// viewport changes (mobile keyboard, pinch zoom), or the trigger or overlay changes size.
pub fn use_position(options: UsePositionOptions) -> UsePositionReturn {
    let UsePositionOptions {
        trigger,
        overlay,
        request,
        enabled,
    } = options;

    let placement = create_rw_signal(None::<ResolvedPlacement>);
    let listeners = Rc::new(RefCell::new(PositionListeners::default()));

    let recompute = {
        let trigger = trigger.clone();
        let overlay = overlay.clone();
        Rc::new(move || {
            let Some(next) = measure_placement(&trigger, &overlay, &request) else {
                return;
            };
            if placement.get_untracked() != Some(next) {
                placement.set(Some(next));
            }
        })
    };

    let frames = {
        let recompute = recompute.clone();
        let listeners = listeners.clone();
        let trigger = trigger.clone();
        let overlay = overlay.clone();
        FrameScheduler::new(move || {
            listeners.borrow_mut().observe_mounted(&trigger, &overlay);
            recompute();
        })
    };

    let teardown = {
        let listeners = listeners.clone();
        let frames = frames.clone();
        move || {
            frames.deactivate();
            listeners.borrow_mut().detach();
        }
    };

    create_effect({
        let teardown = teardown.clone();
        let recompute = recompute.clone();
        move |_| {
            let is_enabled = enabled.get();
            teardown();
            if !is_enabled {
                return;
            }

            recompute();
            frames.activate();
            {
                let mut listeners = listeners.borrow_mut();
                listeners.attach(&frames);
                listeners.observe_mounted(&trigger, &overlay);
            }
            // The overlay may only get its real size after this paint.
            frames.schedule();
        }
    });
    on_cleanup(teardown);

    let update = Callback::new(move |()| recompute());
    let style = Signal::derive(move || {
        placement
            .get()
            .map(|placed| placed.to_css())
            .unwrap_or_else(|| UNPLACED_STYLE.to_string())
    });
    let actual_side = Signal::derive(move || {
        placement
            .get()
            .map(|placed| placed.actual_side)
            .unwrap_or(request.side)
    });

    UsePositionReturn {
        style,
        actual_side,
        placement: placement.into(),
        update,
    }
}

#[cfg(test)]
mod tests {
    use overlay_engine::{Align, PlacementRequest};

    use super::*;

    #[test]
    fn placement_requires_a_mounted_trigger() {
        let request = PlacementRequest::new(Side::Top, Align::Center);
        assert_eq!(
            measure_placement(&ElementRef::empty(), &ElementRef::empty(), &request),
            None
        );
    }

    #[test]
    fn detached_listeners_can_be_detached_again() {
        let mut listeners = PositionListeners::default();
        listeners.detach();
        listeners.observe_mounted(&ElementRef::empty(), &ElementRef::empty());
        listeners.detach();
        assert!(listeners.events.is_empty());
        assert!(!listeners.trigger_observed && !listeners.overlay_observed);
    }

    #[test]
    fn unplaced_style_hides_the_overlay() {
        assert!(UNPLACED_STYLE.contains("visibility:hidden"));
        assert!(UNPLACED_STYLE.starts_with("position:fixed;"));
    }
}
