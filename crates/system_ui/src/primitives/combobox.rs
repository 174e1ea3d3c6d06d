use leptos::ev::KeyboardEvent;
use overlay_engine::{roving_index, Align, DismissReason, PlacementRequest, PopupKind, Side, TriggerAria};

use super::*;
use crate::floating::{use_dismiss, use_position, UseDismissOptions, UsePositionOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One selectable entry of a [`Combobox`].
pub struct ComboboxOption {
    /// Value reported on selection.
    pub value: String,
    /// Text shown in the list and written into the input on selection.
    pub label: String,
}

impl ComboboxOption {
    /// Creates an option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Options whose label contains `query`, ignoring case. A blank query keeps every option.
pub fn filter_options(options: &[ComboboxOption], query: &str) -> Vec<ComboboxOption> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return options.to_vec();
    }
    options
        .iter()
        .filter(|option| option.label.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

fn option_dom_id(listbox_id: &str, index: usize) -> String {
    format!("{listbox_id}-option-{index}")
}

#[component]
/// Text input with a filtered `role="listbox"` popup as wide as the input.
///
/// Typing filters by case-insensitive substring, ArrowUp/ArrowDown move the active option,
/// Enter selects it, and Escape or an outside press closes the list.
pub fn Combobox(
    /// Full option set before filtering.
    #[prop(into)]
    options: MaybeSignal<Vec<ComboboxOption>>,
    /// Accessible name of the input.
    #[prop(into)]
    label: String,
    /// Selected value, if the caller wants to own it.
    #[prop(optional)]
    value: Option<RwSignal<Option<String>>>,
    #[prop(optional)] on_select: Option<Callback<ComboboxOption>>,
    #[prop(optional, into)] placeholder: Option<String>,
    #[prop(optional)] layout_class: Option<&'static str>,
) -> impl IntoView {
    let value = value.unwrap_or_else(|| create_rw_signal(None));
    let query = create_rw_signal(String::new());
    let open = create_rw_signal(false);
    let active = create_rw_signal(None::<usize>);
    let listbox_id = store_value(next_overlay_dom_id("listbox"));
    let input_ref = create_node_ref::<html::Input>();
    let listbox_ref = create_node_ref::<html::Ul>();
    let input_el = ElementRef::from(input_ref);
    let listbox_el = ElementRef::from(listbox_ref);

    let filtered = create_memo(move |_| filter_options(&options.get(), &query.get()));

    let position = use_position(UsePositionOptions {
        trigger: input_el.clone(),
        overlay: listbox_el.clone(),
        request: PlacementRequest::new(Side::Bottom, Align::Start).with_trigger_width(true),
        enabled: open.into(),
    });
    use_dismiss(UseDismissOptions::new(
        open.into(),
        vec![input_el, listbox_el],
        Callback::new(move |_: DismissReason| open.set(false)),
    ));

    let select = move |option: ComboboxOption| {
        query.set(option.label.clone());
        value.set(Some(option.value.clone()));
        open.set(false);
        active.set(None);
        if let Some(on_select) = on_select.as_ref() {
            on_select.call(option);
        }
    };

    let step = move |delta: i32| {
        let len = filtered.with_untracked(Vec::len);
        active.set(roving_index(len, active.get_untracked(), delta));
        open.set(true);
    };

    let on_keydown = move |ev: KeyboardEvent| match ev.key().as_str() {
        "ArrowDown" => {
            ev.prevent_default();
            step(1);
        }
        "ArrowUp" => {
            ev.prevent_default();
            step(-1);
        }
        "Enter" => {
            if !open.get_untracked() {
                return;
            }
            let chosen = active
                .get_untracked()
                .and_then(|index| filtered.with_untracked(|items| items.get(index).cloned()));
            if let Some(option) = chosen {
                ev.prevent_default();
                select(option);
            }
        }
        "Tab" => open.set(false),
        _ => {}
    };

    let aria = move || TriggerAria::new(PopupKind::Listbox, listbox_id.get_value(), open.get());
    let active_descendant = move || {
        if !open.get() {
            return None;
        }
        let len = filtered.with(Vec::len);
        active
            .get()
            .filter(|index| *index < len)
            .map(|index| listbox_id.with_value(|id| option_dom_id(id, index)))
    };

    view! {
        <input
            type="text"
            class=merge_layout_class("ui-combobox", layout_class)
            role="combobox"
            aria-label=label
            aria-autocomplete="list"
            aria-haspopup="listbox"
            aria-expanded=move || aria().aria_expanded().map(str::to_string)
            aria-controls=move || aria().aria_controls()
            aria-activedescendant=active_descendant
            placeholder=placeholder
            autocomplete="off"
            node_ref=input_ref
            prop:value=move || query.get()
            data-ui-primitive="true"
            data-ui-kind="combobox"
            on:input=move |ev| {
                query.set(event_target_value(&ev));
                active.set(None);
                open.set(true);
            }
            on:click=move |_| open.set(true)
            on:keydown=on_keydown
        />
        <Show when=move || open.get()>
            <Portal>
                <ul
                    class="ui-combobox-listbox"
                    id=listbox_id.get_value()
                    role=PopupKind::Listbox.overlay_role()
                    style=move || position.style.get()
                    node_ref=listbox_ref
                    data-ui-primitive="true"
                    data-ui-kind="combobox-listbox"
                    data-ui-side=move || position.actual_side.get().token()
                >
                    <For
                        each={move || filtered.get().into_iter().enumerate().collect::<Vec<_>>()}
                        key=|(index, option)| (*index, option.value.clone())
                        let:entry
                    >
                        {
                            let (index, option) = entry;
                            let label = option.label.clone();
                            let is_active = move || active.get() == Some(index);
                            let is_selected = {
                                let option_value = option.value.clone();
                                move || value.get().as_deref() == Some(option_value.as_str())
                            };
                            view! {
                                <li
                                    class="ui-combobox-option"
                                    id=listbox_id.with_value(|id| option_dom_id(id, index))
                                    role="option"
                                    aria-selected=move || bool_token(is_selected())
                                    data-ui-active=move || bool_token(is_active())
                                    on:pointerdown=move |ev| ev.prevent_default()
                                    on:pointerenter=move |_| active.set(Some(index))
                                    on:click=move |_| select(option.clone())
                                >
                                    {label}
                                </li>
                            }
                        }
                    </For>
                    <Show when=move || filtered.with(Vec::is_empty)>
                        <li class="ui-combobox-empty" role="presentation">
                            "No matches"
                        </li>
                    </Show>
                </ul>
            </Portal>
        </Show>
    }
}
