use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{MouseEvent, WheelEvent, Window};

use super::card::NodeCard;
use super::controls::{SearchBar, ZoomControls};
use super::render;
use super::search::DEFAULT_SUGGESTIONS;
use super::state::{ChartFrame, OrgChartState};
use super::types::{ChartConfig, OrgNode};
use super::viewport::ViewTransform;

const FALLBACK_WIDTH: f64 = 800.0;
const FALLBACK_HEIGHT: f64 = 700.0;
/// Longest step fed to the animation, so a backgrounded tab does not jump.
const MAX_FRAME_MS: f64 = 100.0;

fn container_size(container: &web_sys::HtmlDivElement) -> (f64, f64) {
	let (w, h) = (container.client_width(), container.client_height());
	(
		if w > 0 { w as f64 } else { FALLBACK_WIDTH },
		if h > 0 { h as f64 } else { FALLBACK_HEIGHT },
	)
}

fn local_point(container: &web_sys::HtmlDivElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = container.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Collapsible, pannable org chart.
///
/// Cards are positioned DOM nodes and links an SVG layer; both sit in one
/// overlay that carries the pan/zoom transform. Replacing `data` with a
/// different record rebuilds the chart from scratch.
#[component]
pub fn OrgChart(
	/// Root record; `None` draws an empty chart.
	#[prop(into)]
	data: Signal<Option<Arc<OrgNode>>>,
	/// Theme, field mapping and search toggle. Read once, at mount.
	#[prop(optional)]
	config: ChartConfig,
	/// Runs with the clicked card's record, after it has been toggled.
	#[prop(optional, into)]
	on_node_click: Option<Callback<Arc<OrgNode>>>,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let chart = StoredValue::new(None::<OrgChartState>);
	let frame = RwSignal::new(ChartFrame::default());
	let transform = RwSignal::new(ViewTransform::default());
	// Bumped whenever the chart is rebuilt from new data.
	let revision = RwSignal::new(0u64);
	let suppress_click = StoredValue::new(false);
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_listener = StoredValue::new_local(None::<Closure<dyn FnMut()>>);

	on_cleanup(move || {
		let listener = resize_listener.try_update_value(Option::take).flatten();
		if let (Some(window), Some(cb)) = (web_sys::window(), listener) {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	});

	let theme_value = config.theme.clone();
	let theme = Signal::derive(move || theme_value.clone());
	let fields_value = config.fields.clone();
	let fields = Signal::derive(move || fields_value.clone());
	let searchable = config.searchable;
	let search_field = config.fields.title.clone();
	let links_theme = config.theme.links.clone();
	let container_style = format!(
		"position: relative; overflow: hidden; width: {}; height: {}; background-color: {}; \
		 cursor: grab; user-select: none;",
		config.theme.container.width, config.theme.container.height, config.theme.container.background_color
	);

	// Pushes whatever the state has produced into the signals the view reads.
	let publish = move || {
		let update = chart
			.try_update_value(|c| c.as_mut().map(|c| (c.take_frame(), c.transform())))
			.flatten();
		if let Some((next, t)) = update {
			if let Some(next) = next {
				frame.set(next);
			}
			transform.set(t);
		}
	};

	let animate_init = animate.clone();
	Effect::new(move |_| {
		let data = data.get();
		let Some(container) = container_ref.get() else {
			return;
		};
		let (w, h) = container_size(&container);
		let (created, rebuilt) = chart
			.try_update_value(|c| {
				if let Some(state) = c.as_mut() {
					state.resize(w, h);
					(false, state.set_data(data))
				} else {
					*c = Some(OrgChartState::new(data, config.clone(), w, h));
					(true, true)
				}
			})
			.unwrap_or((false, false));
		publish();
		if rebuilt {
			revision.update(|r| *r += 1);
		}
		if !created {
			return;
		}
		let Some(window) = web_sys::window() else {
			return;
		};

		let container_resize = container.clone();
		resize_listener.set_value(Some(Closure::new(move || {
			let (w, h) = container_size(&container_resize);
			chart.update_value(|c| {
				if let Some(c) = c.as_mut() {
					c.resize(w, h);
				}
			});
		})));
		resize_listener.with_value(|cb| {
			if let Some(cb) = cb {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		});

		let animate_inner = animate_init.clone();
		let mut last: Option<f64> = None;
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = last.map_or(0.0, |prev| (now - prev).clamp(0.0, MAX_FRAME_MS));
			last = Some(now);
			let Some(moved) = chart.try_update_value(|c| c.as_mut().map(|c| (c.tick(dt), c.transform())))
			else {
				// The chart was disposed; let the loop die.
				return;
			};
			if let Some((true, t)) = moved {
				transform.set(t);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.map(|w: Window| w.request_animation_frame(cb.as_ref().unchecked_ref()));
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let on_mousedown = move |ev: MouseEvent| {
		let Some(container) = container_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&container, &ev);
		suppress_click.set_value(false);
		chart.update_value(|c| {
			if let Some(c) = c.as_mut() {
				c.begin_pan(x, y);
			}
		});
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some(container) = container_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&container, &ev);
		let moved = chart
			.try_update_value(|c| c.as_mut().and_then(|c| c.drag_to(x, y).then(|| c.transform())))
			.flatten();
		if let Some(t) = moved {
			transform.set(t);
		}
	};

	let end_pan = move || {
		let dragged = chart
			.try_update_value(|c| c.as_mut().is_some_and(|c| c.end_pan()))
			.unwrap_or(false);
		if dragged {
			suppress_click.set_value(true);
		}
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(container) = container_ref.get_untracked() else {
			return;
		};
		let (x, y) = local_point(&container, &ev);
		let zoomed = chart
			.try_update_value(|c| {
				c.as_mut().map(|c| {
					c.wheel(x, y, ev.delta_y());
					c.transform()
				})
			})
			.flatten();
		if let Some(t) = zoomed {
			transform.set(t);
		}
	};

	let on_zoom_in = Callback::new(move |_| {
		chart.update_value(|c| {
			if let Some(c) = c.as_mut() {
				c.zoom_in();
			}
		})
	});
	let on_zoom_out = Callback::new(move |_| {
		chart.update_value(|c| {
			if let Some(c) = c.as_mut() {
				c.zoom_out();
			}
		})
	});
	let on_reset = Callback::new(move |_| {
		chart.update_value(|c| {
			if let Some(c) = c.as_mut() {
				c.reset_to_initial();
			}
		})
	});
	let on_search = Callback::new(move |query: String| {
		chart.update_value(|c| {
			if let Some(c) = c.as_mut() {
				c.search(&query, &search_field);
			}
		});
		publish();
	});
	let suggest = Callback::new(move |query: String| {
		// Lets the search box's memo refresh when the data is swapped.
		revision.track();
		chart
			.try_with_value(|c| {
				c.as_ref()
					.map(|c| c.suggestions(&query, DEFAULT_SUGGESTIONS))
					.unwrap_or_default()
			})
			.unwrap_or_default()
	});

	let links = move || {
		let (stroke, width) = (links_theme.stroke_color.clone(), links_theme.stroke_width.to_string());
		frame.with(|f| {
			f.links
				.iter()
				.map(|link| {
					view! {
						<path
							d=render::path_data(&link.points)
							stroke=stroke.clone()
							stroke-width=width.clone()
							fill="none"
							stroke-linecap="round"
							stroke-linejoin="round"
						/>
					}
				})
				.collect_view()
		})
	};

	let cards = move || {
		frame
			.get()
			.nodes
			.into_iter()
			.map(|node| {
				let id = node.id;
				let data = Arc::clone(&node.data);
				let position = render::card_position(&node);
				let on_toggle = Callback::new(move |_| {
					if suppress_click.get_value() {
						suppress_click.set_value(false);
						return;
					}
					chart.update_value(|c| {
						if let Some(c) = c.as_mut() {
							c.toggle_node(id);
						}
					});
					publish();
					if let Some(cb) = on_node_click {
						cb.run(Arc::clone(&data));
					}
				});
				view! {
					<div style=position>
						<NodeCard node=node theme=theme fields=fields on_toggle=on_toggle />
					</div>
				}
			})
			.collect_view()
	};

	view! {
		<div
			node_ref=container_ref
			class="org-chart-container"
			style=container_style
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=move |_| end_pan()
			on:mouseleave=move |_| end_pan()
			on:wheel=on_wheel
		>
			<div
				class="org-chart-overlay"
				style=move || {
					format!(
						"position: absolute; top: 0; left: 0; transform-origin: 0 0; transform: {};",
						render::overlay_transform(&transform.get()),
					)
				}
			>
				<svg
					class="org-chart-links"
					style="position: absolute; top: 0; left: 0; width: 1px; height: 1px; overflow: visible; pointer-events: none;"
				>
					{links}
				</svg>
				{cards}
			</div>
			<ZoomControls on_zoom_in=on_zoom_in on_zoom_out=on_zoom_out on_reset=on_reset />
			{searchable.then(|| view! { <SearchBar on_search=on_search suggest=suggest /> })}
		</div>
	}
}
