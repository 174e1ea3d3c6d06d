use leptos::ev::{KeyboardEvent, MouseEvent};
use overlay_engine::{Align, DismissReason, PlacementRequest, PopupKind, Side, TriggerAria};

use super::*;
use crate::floating::{
    after_paint, focus_first, focus_first_menu_item, handle_roving_keydown, trap_tab,
    use_dismiss, use_position, UseDismissOptions, UsePositionOptions,
};

#[derive(Clone, Copy)]
struct MenuContext {
    close: Callback<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuKeyOutcome {
    Ignore,
    CloseToTrigger,
}

/// What a key left over after roving navigation does to an open menu.
fn menu_key_outcome(key: &str) -> MenuKeyOutcome {
    match key {
        "Tab" => MenuKeyOutcome::CloseToTrigger,
        _ => MenuKeyOutcome::Ignore,
    }
}

#[component]
/// Shared overlay surface for menus and popups.
pub fn MenuSurface(
    #[prop(optional)] layout_class: Option<&'static str>,
    #[prop(optional, into)] id: Option<String>,
    #[prop(optional, into)] role: Option<String>,
    #[prop(optional, into)] aria_label: Option<String>,
    #[prop(optional, into)] style: MaybeSignal<String>,
    #[prop(optional, into)] side: Option<Signal<Side>>,
    #[prop(optional)] node_ref: NodeRef<html::Div>,
    #[prop(optional)] on_keydown: Option<Callback<KeyboardEvent>>,
    children: Children,
) -> impl IntoView {
    view! {
        <div
            class=merge_layout_class("ui-menu-surface", layout_class)
            id=id
            role=role
            aria-label=aria_label
            style=move || style.get()
            tabindex="-1"
            node_ref=node_ref
            data-ui-primitive="true"
            data-ui-kind="menu-surface"
            data-ui-side=move || side.map(|side| side.get().token().to_string())
            on:keydown=move |ev: KeyboardEvent| {
                if let Some(on_keydown) = on_keydown.as_ref() {
                    on_keydown.call(ev);
                }
            }
        >
            {children()}
        </div>
    }
}

#[component]
/// Menu item. Activating it runs `on_select` and closes the enclosing [`DropdownMenu`].
pub fn MenuItem(
    #[prop(optional)] layout_class: Option<&'static str>,
    #[prop(optional, into)] id: Option<String>,
    #[prop(optional, into)] aria_checked: Option<String>,
    #[prop(optional, into)] disabled: MaybeSignal<bool>,
    #[prop(optional, into)] selected: MaybeSignal<bool>,
    #[prop(optional)] on_select: Option<Callback<MouseEvent>>,
    children: Children,
) -> impl IntoView {
    let menu = use_context::<MenuContext>();
    let role = if aria_checked.is_some() {
        "menuitemcheckbox"
    } else {
        "menuitem"
    };

    view! {
        <button
            type="button"
            class=merge_layout_class("ui-menu-item", layout_class)
            id=id
            role=role
            aria-checked=aria_checked
            aria-disabled=move || bool_token(disabled.get())
            disabled=move || disabled.get()
            data-ui-primitive="true"
            data-ui-kind="menu-item"
            data-ui-selected=move || bool_token(selected.get())
            on:click=move |ev: MouseEvent| {
                if disabled.get_untracked() {
                    return;
                }
                if let Some(on_select) = on_select.as_ref() {
                    on_select.call(ev);
                }
                if let Some(menu) = menu {
                    menu.close.call(());
                }
            }
        >
            {children()}
        </button>
    }
}

#[component]
/// Shared overlay menu separator.
pub fn MenuSeparator(#[prop(optional)] layout_class: Option<&'static str>) -> impl IntoView {
    view! {
        <div
            class=merge_layout_class("ui-menu-separator", layout_class)
            role="separator"
            aria-hidden="true"
            data-ui-primitive="true"
            data-ui-kind="menu-separator"
        ></div>
    }
}

#[component]
/// Button that opens a positioned `role="menu"` surface of [`MenuItem`]s.
///
/// ArrowUp/ArrowDown/Home/End move between items, activating an item or pressing Escape closes
/// the menu and returns focus to the button, and an outside press closes it in place.
pub fn DropdownMenu(
    /// Content of the trigger button.
    #[prop(into)]
    trigger: ViewFn,
    /// Accessible name of the menu surface.
    #[prop(into)]
    label: String,
    #[prop(optional)] open: Option<RwSignal<bool>>,
    #[prop(optional)] side: Side,
    #[prop(optional)] align: Align,
    #[prop(optional)] layout_class: Option<&'static str>,
    children: ChildrenFn,
) -> impl IntoView {
    let open = open.unwrap_or_else(|| create_rw_signal(false));
    let menu_id = store_value(next_overlay_dom_id("menu"));
    let label = store_value(label);
    let children = store_value(children);
    let trigger_ref = create_node_ref::<html::Button>();
    let menu_ref = create_node_ref::<html::Div>();
    let trigger_el = store_value(ElementRef::from(trigger_ref));
    let menu_el = store_value(ElementRef::from(menu_ref));

    let position = use_position(UsePositionOptions {
        trigger: trigger_el.get_value(),
        overlay: menu_el.get_value(),
        request: PlacementRequest::new(side, align),
        enabled: open.into(),
    });
    use_dismiss(UseDismissOptions::new(
        open.into(),
        vec![trigger_el.get_value(), menu_el.get_value()],
        Callback::new(move |reason: DismissReason| {
            open.set(false);
            if reason == DismissReason::Escape {
                restore_focus(trigger_el);
            }
        }),
    ));

    let close = Callback::new(move |()| {
        open.set(false);
        restore_focus(trigger_el);
    });
    provide_context(MenuContext { close });

    create_effect(move |_| {
        if !open.get() {
            return;
        }
        after_paint(move || {
            position.update.call(());
            if let Some(menu) = menu_el.with_value(ElementRef::get) {
                if !focus_first_menu_item(&menu) {
                    focus_element(&menu);
                }
            }
        });
    });

    let on_menu_keydown = Callback::new(move |ev: KeyboardEvent| {
        let Some(menu) = menu_el.with_value(ElementRef::get) else {
            return;
        };
        if handle_roving_keydown(&ev, &menu) {
            return;
        }
        // Tab keeps its default action, which now starts from the trigger.
        if menu_key_outcome(&ev.key()) == MenuKeyOutcome::CloseToTrigger {
            close.call(());
        }
    });

    let aria = move || TriggerAria::new(PopupKind::Menu, menu_id.get_value(), open.get());

    view! {
        <button
            type="button"
            class=merge_layout_class("ui-menu-trigger", layout_class)
            node_ref=trigger_ref
            aria-haspopup="menu"
            aria-expanded=move || aria().aria_expanded().map(str::to_string)
            aria-controls=move || aria().aria_controls()
            data-ui-primitive="true"
            data-ui-kind="menu-trigger"
            on:click=move |_| open.update(|open| *open = !*open)
            on:keydown=move |ev: KeyboardEvent| {
                if ev.key() == "ArrowDown" && !open.get_untracked() {
                    ev.prevent_default();
                    open.set(true);
                }
            }
        >
            {trigger.run()}
        </button>
        <Show when=move || open.get()>
            <Portal>
                <MenuSurface
                    id=menu_id.get_value()
                    role=PopupKind::Menu.overlay_role()
                    aria_label=label.get_value()
                    style=position.style
                    side=position.actual_side
                    node_ref=menu_ref
                    on_keydown=on_menu_keydown
                >
                    {children.with_value(|children| children())}
                </MenuSurface>
            </Portal>
        </Show>
    }
}

#[component]
/// Click-toggled, non-modal dialog panel anchored to its trigger button.
///
/// The first focusable element inside the panel receives focus on open and Tab cycles inside the
/// panel. Escape closes and returns focus to the trigger; an outside press closes in place.
pub fn Popover(
    /// Content of the trigger button.
    #[prop(into)]
    trigger: ViewFn,
    #[prop(optional, into)] aria_label: Option<String>,
    #[prop(optional)] open: Option<RwSignal<bool>>,
    #[prop(optional)] side: Side,
    #[prop(optional)] align: Align,
    /// Give the panel the trigger's width.
    #[prop(optional)]
    match_trigger_width: bool,
    #[prop(optional)] layout_class: Option<&'static str>,
    children: ChildrenFn,
) -> impl IntoView {
    let open = open.unwrap_or_else(|| create_rw_signal(false));
    let panel_id = store_value(next_overlay_dom_id("popover"));
    let aria_label = store_value(aria_label);
    let children = store_value(children);
    let trigger_ref = create_node_ref::<html::Button>();
    let panel_ref = create_node_ref::<html::Div>();
    let trigger_el = store_value(ElementRef::from(trigger_ref));
    let panel_el = store_value(ElementRef::from(panel_ref));

    let position = use_position(UsePositionOptions {
        trigger: trigger_el.get_value(),
        overlay: panel_el.get_value(),
        request: PlacementRequest::new(side, align).with_trigger_width(match_trigger_width),
        enabled: open.into(),
    });
    use_dismiss(UseDismissOptions::new(
        open.into(),
        vec![trigger_el.get_value(), panel_el.get_value()],
        Callback::new(move |reason: DismissReason| {
            open.set(false);
            if reason == DismissReason::Escape {
                restore_focus(trigger_el);
            }
        }),
    ));

    create_effect(move |_| {
        if !open.get() {
            return;
        }
        after_paint(move || {
            position.update.call(());
            if let Some(panel) = panel_el.with_value(ElementRef::get) {
                focus_first(&panel, Some(&panel));
            }
        });
    });

    let aria = move || TriggerAria::new(PopupKind::Dialog, panel_id.get_value(), open.get());

    view! {
        <button
            type="button"
            class=merge_layout_class("ui-popover-trigger", layout_class)
            node_ref=trigger_ref
            aria-haspopup="dialog"
            aria-expanded=move || aria().aria_expanded().map(str::to_string)
            aria-controls=move || aria().aria_controls()
            data-ui-primitive="true"
            data-ui-kind="popover-trigger"
            on:click=move |_| open.update(|open| *open = !*open)
        >
            {trigger.run()}
        </button>
        <Show when=move || open.get()>
            <Portal>
                <div
                    class="ui-popover"
                    id=panel_id.get_value()
                    role=PopupKind::Dialog.overlay_role()
                    aria-label=aria_label.get_value()
                    tabindex="-1"
                    style=move || position.style.get()
                    node_ref=panel_ref
                    data-ui-primitive="true"
                    data-ui-kind="popover"
                    data-ui-side=move || position.actual_side.get().token()
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

#[component]
/// Descriptive text shown next to its children on hover or keyboard focus.
///
/// The wrapper carries `aria-describedby` while the tooltip is visible. Escape hides it; pointer
/// presses elsewhere are ignored.
pub fn Tooltip(
    /// Tooltip body.
    #[prop(into)]
    content: ViewFn,
    /// Preferred side, above the trigger when unset.
    #[prop(optional)]
    side: Option<Side>,
    #[prop(optional)] align: Option<Align>,
    #[prop(optional)] layout_class: Option<&'static str>,
    children: Children,
) -> impl IntoView {
    let open = create_rw_signal(false);
    let tooltip_id = store_value(next_overlay_dom_id("tooltip"));
    let content = store_value(content);
    let trigger_ref = create_node_ref::<html::Span>();
    let tooltip_ref = create_node_ref::<html::Div>();
    let trigger_el = ElementRef::from(trigger_ref);
    let tooltip_el = ElementRef::from(tooltip_ref);

    let position = use_position(UsePositionOptions {
        trigger: trigger_el.clone(),
        overlay: tooltip_el.clone(),
        request: PlacementRequest::new(side.unwrap_or(Side::Top), align.unwrap_or(Align::Center)),
        enabled: open.into(),
    });
    use_dismiss(
        UseDismissOptions::new(
            open.into(),
            vec![trigger_el, tooltip_el],
            Callback::new(move |_: DismissReason| open.set(false)),
        )
        .passive(),
    );

    let aria = move || TriggerAria::new(PopupKind::Tooltip, tooltip_id.get_value(), open.get());

    view! {
        <span
            class=merge_layout_class("ui-tooltip-trigger", layout_class)
            node_ref=trigger_ref
            aria-describedby=move || aria().aria_describedby()
            data-ui-primitive="true"
            data-ui-kind="tooltip-trigger"
            on:pointerenter=move |_| open.set(true)
            on:pointerleave=move |_| open.set(false)
            on:focusin=move |_| open.set(true)
            on:focusout=move |_| open.set(false)
        >
            {children()}
        </span>
        <Show when=move || open.get()>
            <Portal>
                <div
                    class="ui-tooltip"
                    id=tooltip_id.get_value()
                    role=PopupKind::Tooltip.overlay_role()
                    style=move || position.style.get()
                    node_ref=tooltip_ref
                    data-ui-primitive="true"
                    data-ui-kind="tooltip"
                    data-ui-side=move || position.actual_side.get().token()
                >
                    {content.with_value(ViewFn::run)}
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
    fn tab_closes_menu_back_to_its_trigger() {
        assert_eq!(menu_key_outcome("Tab"), MenuKeyOutcome::CloseToTrigger);
        assert_eq!(menu_key_outcome("a"), MenuKeyOutcome::Ignore);
        assert_eq!(menu_key_outcome("Enter"), MenuKeyOutcome::Ignore);
    }
}
