use leptos::prelude::*;
use web_sys::{KeyboardEvent, MouseEvent};

const PANEL_STYLE: &str = "position: absolute; top: 10px; z-index: 1000;";
const BUTTON_STYLE: &str = "width: 36px; height: 36px; border-radius: 4px; border: 1px solid #ccc; \
	background-color: white; cursor: pointer; display: flex; align-items: center; \
	justify-content: center; font-size: 18px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);";

/// Zoom in / zoom out / reset buttons in the top-left corner.
#[component]
pub fn ZoomControls(
	/// "+" button.
	on_zoom_in: Callback<()>,
	/// Minus button.
	on_zoom_out: Callback<()>,
	/// Reset button.
	on_reset: Callback<()>,
	/// Text of the zoom-in button.
	#[prop(default = "+")]
	zoom_in_label: &'static str,
	/// Text of the zoom-out button.
	#[prop(default = "\u{2212}")]
	zoom_out_label: &'static str,
) -> impl IntoView {
	// Clicks must not reach the container, where they would start a pan.
	let stop = |ev: MouseEvent| ev.stop_propagation();
	view! {
		<div
			class="org-chart-zoom"
			style=format!("{PANEL_STYLE} left: 10px; display: flex; flex-direction: column; gap: 8px;")
			on:mousedown=stop
		>
			<button style=BUTTON_STYLE title="Zoom In" on:click=move |_| on_zoom_in.run(())>
				{zoom_in_label}
			</button>
			<button style=BUTTON_STYLE title="Zoom Out" on:click=move |_| on_zoom_out.run(())>
				{zoom_out_label}
			</button>
			<button style=BUTTON_STYLE title="Reset View" on:click=move |_| on_reset.run(())>
				"\u{27F2}"
			</button>
		</div>
	}
}

/// Moves a suggestion cursor one step; `None` means "nothing selected".
fn step(selected: Option<usize>, len: usize, down: bool) -> Option<usize> {
	match (selected, down) {
		(_, _) if len == 0 => None,
		(None, true) => Some(0),
		(Some(i), true) => Some((i + 1).min(len - 1)),
		(None, false) | (Some(0), false) => None,
		(Some(i), false) => Some(i - 1),
	}
}

/// Search box with a suggestion dropdown in the top-right corner.
///
/// Enter (or picking a suggestion) runs `on_search`; clearing the box runs
/// it with an empty query so the chart can reset.
#[component]
pub fn SearchBar(
	/// Runs with the submitted query, or an empty one when the box is cleared.
	on_search: Callback<String>,
	/// Suggestions for the text typed so far.
	suggest: Callback<String, Vec<String>>,
	/// Input placeholder.
	#[prop(default = "Search...")]
	placeholder: &'static str,
) -> impl IntoView {
	let value = RwSignal::new(String::new());
	let open = RwSignal::new(false);
	let selected = RwSignal::new(None::<usize>);
	let input_ref = NodeRef::<leptos::html::Input>::new();
	let items = Memo::new(move |_| suggest.run(value.get()));

	let choose = move |text: String| {
		value.set(text.clone());
		open.set(false);
		selected.set(None);
		if let Some(input) = input_ref.get_untracked() {
			let _ = input.blur();
		}
		on_search.run(text);
	};

	let on_keydown = move |ev: KeyboardEvent| {
		let list = items.get_untracked();
		let showing = open.get_untracked() && !list.is_empty();
		match ev.key().as_str() {
			"ArrowDown" if showing => {
				ev.prevent_default();
				selected.update(|s| *s = step(*s, list.len(), true));
			}
			"ArrowUp" if showing => {
				ev.prevent_default();
				selected.update(|s| *s = step(*s, list.len(), false));
			}
			"Enter" => {
				ev.prevent_default();
				let pick = if showing {
					selected
						.get_untracked()
						.and_then(|i| list.get(i).cloned())
						.or_else(|| list.first().cloned())
				} else {
					None
				};
				choose(pick.unwrap_or_else(|| value.get_untracked()));
			}
			"Escape" => {
				ev.prevent_default();
				open.set(false);
				selected.set(None);
			}
			_ => {}
		}
	};

	let dropdown = move || {
		let list = items.get();
		(open.get() && !list.is_empty()).then(|| {
			let rows = list
				.into_iter()
				.enumerate()
				.map(|(i, text)| {
					let label = text.clone();
					let row_style = move || {
						format!(
							"padding: 10px 12px; cursor: pointer; font-size: 14px; \
							 border-bottom: 1px solid #f0f0f0; background-color: {};",
							if selected.get() == Some(i) { "#f0f0f0" } else { "white" }
						)
					};
					view! {
						<div
							style=row_style
							// mousedown keeps focus in the input until the choice is made
							on:mousedown=move |ev: MouseEvent| ev.prevent_default()
							on:mouseenter=move |_| selected.set(Some(i))
							on:click=move |_| choose(text.clone())
						>
							{label}
						</div>
					}
				})
				.collect_view();
			view! {
				<div style="position: absolute; top: 100%; right: 0; margin-top: 4px; background-color: white; \
					border: 1px solid #ccc; border-radius: 4px; box-shadow: 0 4px 8px rgba(0,0,0,0.15); \
					max-height: 300px; overflow-y: auto; width: 200px; z-index: 1001;">
					{rows}
				</div>
			}
		})
	};

	view! {
		<div
			class="org-chart-search"
			style=format!("{PANEL_STYLE} right: 10px;")
			on:mousedown=|ev: MouseEvent| ev.stop_propagation()
			on:wheel=|ev: web_sys::WheelEvent| ev.stop_propagation()
		>
			<input
				node_ref=input_ref
				type="text"
				placeholder=placeholder
				prop:value=move || value.get()
				on:input=move |ev| {
					let text = event_target_value(&ev);
					let blank = text.trim().is_empty();
					value.set(text);
					selected.set(None);
					open.set(!blank);
					if blank {
						on_search.run(String::new());
					}
				}
				on:keydown=on_keydown
				on:focus=move |_| open.set(!value.get_untracked().trim().is_empty())
				on:blur=move |_| {
					open.set(false);
					selected.set(None);
				}
				style="padding: 8px 12px; border-radius: 4px; border: 1px solid #ccc; font-size: 14px; \
					width: 200px; box-shadow: 0 2px 4px rgba(0,0,0,0.1);"
			/>
			{dropdown}
		</div>
	}
}
