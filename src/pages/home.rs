use std::sync::Arc;

use leptos::prelude::*;
use serde_json::{Value, json};

use crate::components::org_chart::{ChartConfig, ChartError, OrgChart, OrgNode, Theme};

fn avatar_url(name: &str) -> String {
	format!(
		"https://ui-avatars.com/api/?name={}&size=128&background=random&color=fff&bold=true",
		name.replace(' ', "+")
	)
}

fn person(name: &str, role: &str, children: Vec<Value>) -> Value {
	let mut node = json!({ "name": name, "role": role, "photo": avatar_url(name) });
	if !children.is_empty() {
		node["children"] = Value::Array(children);
	}
	node
}

/// Sample organisation for the playground.
fn sample_org() -> Result<Arc<OrgNode>, ChartError> {
	OrgNode::from_value(person("Sarah Johnson", "Chief Executive Officer", vec![
		person("Michael Chen", "Chief Technology Officer", vec![
			person("Emily Rodriguez", "VP of Engineering", vec![
				person("David Kim", "Senior Engineering Manager", vec![
					person("Alex Thompson", "Lead Software Engineer", vec![]),
					person("Jessica Martinez", "Lead Software Engineer", vec![]),
					person("Ryan O'Brien", "Senior Software Engineer", vec![]),
				]),
				person("Lisa Wang", "Engineering Manager", vec![
					person("James Wilson", "Software Engineer", vec![]),
					person("Maria Garcia", "Software Engineer", vec![]),
				]),
			]),
			person("Priya Patel", "Director of Infrastructure", vec![
				person("Tom Becker", "Site Reliability Engineer", vec![]),
			]),
		]),
		person("Amanda Perera", "Chief Financial Officer", vec![
			person("Nuwan Silva", "Finance Manager", vec![]),
			person("Kasun Fernando", "Accountant", vec![]),
		]),
		person("Ruwan Jayasinghe", "Chief Operating Officer", vec![
			person("Grace Okafor", "Head of People", vec![]),
		]),
	]))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let selected = RwSignal::new(None::<Arc<OrgNode>>);
	let mut config = ChartConfig::default();
	config.theme = Theme {
		container: crate::components::org_chart::theme::ContainerTheme {
			width: "100vw".into(),
			height: "100vh".into(),
			..Default::default()
		},
		..Theme::default()
	};

	let chart = move || {
		sample_org().map(|org| {
			let data = Signal::derive(move || Some(Arc::clone(&org)));
			view! {
				<OrgChart
					data=data
					config=config.clone()
					on_node_click=Callback::new(move |node: Arc<OrgNode>| selected.set(Some(node)))
				/>
			}
		})
	};

	let details = move || {
		selected.get().map(|node| {
			let field = |name: &str| {
				let value = node.field(name);
				if value.is_empty() { "N/A".to_string() } else { value.into_owned() }
			};
			let reports = match node.children.len() {
				0 => "No".to_string(),
				n => format!("Yes ({n})"),
			};
			view! {
				<aside class="info-panel">
					<div class="info-panel-header">
						<h2>"Node Details"</h2>
						<button
							class="close-button"
							aria-label="Close panel"
							on:click=move |_| selected.set(None)
						>
							"\u{00D7}"
						</button>
					</div>
					<div class="info-panel-content">
						<p>"Name: "{field("name")}</p>
						<p>"Role: "{field("role")}</p>
						<p>"Has Children: "{reports}</p>
					</div>
				</aside>
			}
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="app-container">
				<div class="chart-container">{chart}</div>
				{details}
			</div>
		</ErrorBoundary>
	}
}
