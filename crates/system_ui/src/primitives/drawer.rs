use leptos::ev::KeyboardEvent;
use overlay_engine::DismissReason;

use super::*;
use crate::floating::{
    active_element, after_paint, focus_first, trap_tab, use_dismiss, use_is_compact_viewport,
    use_prefers_reduced_motion, use_scroll_lock, UseDismissOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Viewport edge a [`Drawer`] slides in from.
pub enum DrawerEdge {
    /// Left edge.
    Left,
    /// Right edge.
    #[default]
    Right,
    /// Bottom edge (sheet).
    Bottom,
}

impl DrawerEdge {
    pub(crate) fn token(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }

    /// Side drawers become bottom sheets on compact viewports.
    pub(crate) fn for_viewport(self, compact: bool) -> Self {
        if compact {
            Self::Bottom
        } else {
            self
        }
    }
}

#[component]
/// Modal panel anchored to a viewport edge.
///
/// While open the page behind it cannot scroll, Tab stays inside the panel, and a press on the
/// backdrop or Escape closes it. Focus moves into the panel on open and back to the previously
/// focused element on close.
pub fn Drawer(
    /// Open state, owned by the caller.
    open: RwSignal<bool>,
    /// Accessible name of the dialog.
    #[prop(into)]
    label: String,
    #[prop(optional)] edge: DrawerEdge,
    #[prop(optional)] layout_class: Option<&'static str>,
    children: ChildrenFn,
) -> impl IntoView {
    let drawer_id = store_value(next_overlay_dom_id("drawer"));
    let label = store_value(label);
    let children = store_value(children);
    let panel_ref = create_node_ref::<html::Div>();
    let panel_el = store_value(ElementRef::from(panel_ref));
    let previous_focus = store_value(None::<web_sys::Element>);
    let compact = use_is_compact_viewport();
    let reduced_motion = use_prefers_reduced_motion();

    use_scroll_lock(open.into());
    use_dismiss(UseDismissOptions::new(
        open.into(),
        vec![panel_el.get_value()],
        Callback::new(move |_: DismissReason| open.set(false)),
    ));

    create_effect(move |was_open: Option<bool>| {
        let is_open = open.get();
        if is_open && was_open != Some(true) {
            previous_focus.set_value(active_element());
            after_paint(move || {
                if let Some(panel) = panel_el.with_value(ElementRef::get) {
                    focus_first(&panel, Some(&panel));
                }
            });
        } else if !is_open && was_open == Some(true) {
            if let Some(previous) = previous_focus.get_value() {
                focus_element(&previous);
            }
            previous_focus.set_value(None);
        }
        is_open
    });

    view! {
        <Show when=move || open.get()>
            <Portal>
                <div
                    class="ui-drawer-backdrop"
                    aria-hidden="true"
                    data-ui-primitive="true"
                    data-ui-kind="drawer-backdrop"
                ></div>
                <div
                    class=merge_layout_class("ui-drawer", layout_class)
                    id=drawer_id.get_value()
                    role="dialog"
                    aria-modal="true"
                    aria-label=label.get_value()
                    tabindex="-1"
                    node_ref=panel_ref
                    data-ui-primitive="true"
                    data-ui-kind="drawer"
                    data-ui-edge=move || edge.for_viewport(compact.get()).token()
                    data-ui-motion=move || motion_token(reduced_motion.get())
                    on:keydown=move |ev: KeyboardEvent| {
                        if let Some(panel) = panel_el.with_value(ElementRef::get) {
                            trap_tab(&ev, &panel);
                        }
                    }
                >
                    {children.with_value(|children| children())}
                </div>
            </Portal>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn side_drawers_collapse_to_sheets_on_compact_viewports() {
        assert_eq!(DrawerEdge::default(), DrawerEdge::Right);
        assert_eq!(DrawerEdge::Left.for_viewport(true), DrawerEdge::Bottom);
        assert_eq!(DrawerEdge::Left.for_viewport(false), DrawerEdge::Left);
        assert_eq!(DrawerEdge::Bottom.for_viewport(false).token(), "bottom");
    }
}
