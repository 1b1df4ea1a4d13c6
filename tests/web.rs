//! Browser-only checks; run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use std::sync::Arc;

use leptos::prelude::*;
use leptos_org_chart::{OrgChart, OrgNode};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn host() -> web_sys::HtmlElement {
	let document = web_sys::window().unwrap().document().unwrap();
	let host: web_sys::HtmlElement = document.create_element("div").unwrap().unchecked_into();
	document.body().unwrap().append_child(&host).unwrap();
	host
}

#[wasm_bindgen_test]
async fn window_resize_after_unmount_is_harmless() {
	let data = OrgNode::from_json(r#"{ "name": "CEO", "children": [{ "name": "CTO" }] }"#).unwrap();
	let parent = host();
	let handle = leptos::mount::mount_to(parent.clone(), move || {
		let data = Signal::derive(move || Some(Arc::clone(&data)));
		view! { <OrgChart data=data /> }
	});
	leptos::task::tick().await;
	leptos::task::tick().await;
	assert!(parent.query_selector(".org-chart-container").unwrap().is_some());

	drop(handle);
	leptos::task::tick().await;
	let window = web_sys::window().unwrap();
	let resize = web_sys::Event::new("resize").unwrap();
	assert!(window.dispatch_event(&resize).unwrap());
	assert_eq!(parent.query_selector_all(".org-chart-card").unwrap().length(), 0);
}
