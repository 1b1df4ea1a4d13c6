use leptos::prelude::*;
use web_sys::MouseEvent;

use super::hierarchy::NodeState;
use super::render;
use super::state::VisibleNode;
use super::theme::Theme;
use super::types::{FieldMapping, OrgNode};

/// Text shown on a card, pulled out of the record through the field mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct CardContent {
	/// Text from the title field.
	pub title: String,
	/// Text from the subtitle field.
	pub subtitle: String,
	/// Photo URL, `None` when the field is blank.
	pub photo: Option<String>,
	/// Fallback shown instead of the photo.
	pub initials: String,
}

impl CardContent {
	/// Reads `data` through `fields`.
	pub fn from_record(data: &OrgNode, fields: &FieldMapping) -> Self {
		let title = data.field(&fields.title).into_owned();
		let photo = data.field(&fields.photo);
		let photo = (!photo.trim().is_empty()).then(|| photo.into_owned());
		Self {
			initials: initials(&title),
			subtitle: data.field(&fields.subtitle).into_owned(),
			photo,
			title,
		}
	}
}

/// Up to two uppercased initials from the whitespace-separated words of `title`.
pub fn initials(title: &str) -> String {
	title
		.split_whitespace()
		.filter_map(|word| word.chars().next())
		.flat_map(char::to_uppercase)
		.take(2)
		.collect()
}

/// One person card. Falls back to initials when there is no photo or it fails to load.
#[component]
pub fn NodeCard(
	/// The card to draw.
	node: VisibleNode,
	/// Styling.
	#[prop(into)]
	theme: Signal<Theme>,
	/// Which record fields to show.
	#[prop(into)]
	fields: Signal<FieldMapping>,
	/// Runs on click.
	on_toggle: Callback<()>,
) -> impl IntoView {
	let content = CardContent::from_record(&node.data, &fields.get_untracked());
	let (image_failed, set_image_failed) = signal(false);
	let (hovered, set_hovered) = signal(false);
	let highlighted = node.highlighted;
	let expanded = match node.state {
		NodeState::Expanded => Some("true"),
		NodeState::Collapsed => Some("false"),
		NodeState::Leaf => None,
	};

	let style = move || {
		theme.with(|theme| {
			let mut style = render::card_style(theme, highlighted);
			if hovered.get() {
				style.push_str(&format!(
					" transform: scale(1.05); box-shadow: {};",
					theme.node_card.box_shadow_hover
				));
			}
			style
		})
	};

	let avatar_style = move || {
		theme.with(|t| {
			format!(
				"width: {0}px; height: {0}px; border-radius: {1}; margin: 0 auto {2}px auto; \
				 object-fit: cover; background-color: {3};",
				t.avatar.size, t.avatar.border_radius, t.avatar.margin_bottom, t.avatar.background_color
			)
		})
	};
	let initials_style = move || {
		theme.with(|t| {
			format!(
				"width: {0}px; height: {0}px; border-radius: {1}; margin: 0 auto {2}px auto; \
				 display: flex; align-items: center; justify-content: center; \
				 background-color: {3}; color: {4}; font-size: {5}px; font-weight: {6};",
				t.avatar.size,
				t.avatar.border_radius,
				t.avatar.margin_bottom,
				t.initials.background_color,
				t.initials.color,
				t.initials.font_size,
				t.initials.font_weight
			)
		})
	};
	let name_style = move || {
		theme.with(|t| {
			let s = &t.text.name;
			format!(
				"font-size: {}px; font-weight: {}; color: {}; margin-bottom: {}px; opacity: {};",
				s.font_size, s.font_weight, s.color, s.margin_bottom, s.opacity
			)
		})
	};
	let role_style = move || {
		theme.with(|t| {
			let s = &t.text.role;
			format!(
				"font-size: {}px; font-weight: {}; color: {}; opacity: {};",
				s.font_size, s.font_weight, s.color, s.opacity
			)
		})
	};

	let CardContent {
		title,
		subtitle,
		photo,
		initials,
	} = content;
	let alt = title.clone();
	let avatar = move || match (&photo, image_failed.get()) {
		(Some(src), false) => view! {
			<img
				src=src.clone()
				alt=alt.clone()
				style=avatar_style
				on:error=move |_| set_image_failed.set(true)
			/>
		}
		.into_any(),
		_ => view! { <div style=initials_style>{initials.clone()}</div> }.into_any(),
	};

	view! {
		<div
			class="org-chart-card"
			role="button"
			aria-expanded=expanded
			style=style
			on:click=move |ev: MouseEvent| {
				ev.stop_propagation();
				on_toggle.run(());
			}
			on:mouseenter=move |_| set_hovered.set(true)
			on:mouseleave=move |_| set_hovered.set(false)
		>
			{avatar}
			<div style=name_style>{title}</div>
			<div style=role_style>{subtitle}</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn initials_take_first_two_words() {
		assert_eq!(initials("sarah jane johnson"), "SJ");
		assert_eq!(initials("  Ruwan "), "R");
		assert_eq!(initials(""), "");
	}

	#[test]
	fn content_follows_field_mapping() {
		let data = OrgNode::from_value(json!({ "label": "Kasun Perera", "dept": "Eng", "avatar": "" }))
			.unwrap();
		let fields = FieldMapping {
			title: "label".into(),
			subtitle: "dept".into(),
			photo: "avatar".into(),
			id: None,
		};
		let content = CardContent::from_record(&data, &fields);
		assert_eq!(content.title, "Kasun Perera");
		assert_eq!(content.subtitle, "Eng");
		assert_eq!(content.photo, None);
		assert_eq!(content.initials, "KP");
	}

	#[test]
	fn missing_title_field_reads_empty() {
		let data = OrgNode::from_value(json!({ "name": "A" })).unwrap();
		let fields = FieldMapping {
			title: "nope".into(),
			..FieldMapping::default()
		};
		let content = CardContent::from_record(&data, &fields);
		assert_eq!(content.title, "");
		assert_eq!(content.initials, "");
	}
}
