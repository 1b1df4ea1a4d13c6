//! Theme configuration.
//!
//! Only `node_card.width`/`height`, `links.vertical_spacing` and the
//! `layout` spacings affect geometry; the rest is handed to the DOM layer.

use serde::{Deserialize, Serialize};

use super::types::ChartError;

/// Card box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeCardTheme {
	/// Card width in pixels; also the layout footprint.
	pub width: f64,
	/// Card height in pixels; also the layout footprint.
	pub height: f64,
	/// Inner padding in pixels.
	pub padding: f64,
	/// Corner radius in pixels.
	pub border_radius: f64,
	/// CSS background.
	pub background_color: String,
	/// CSS shadow at rest.
	pub box_shadow: String,
	/// CSS shadow while hovered.
	pub box_shadow_hover: String,
	/// CSS font stack.
	pub font_family: String,
}

impl Default for NodeCardTheme {
	fn default() -> Self {
		Self {
			width: 140.0,
			height: 140.0,
			padding: 12.0,
			border_radius: 12.0,
			background_color: "white".into(),
			box_shadow: "0 2px 8px rgba(0,0,0,0.15)".into(),
			box_shadow_hover: "0 4px 12px rgba(0,0,0,0.2)".into(),
			font_family: "sans-serif".into(),
		}
	}
}

/// Photo circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarTheme {
	/// Diameter in pixels.
	pub size: f64,
	/// CSS radius, e.g. `"50%"`.
	pub border_radius: String,
	/// Shown behind a loading photo.
	pub background_color: String,
	/// Gap below the avatar in pixels.
	pub margin_bottom: f64,
}

impl Default for AvatarTheme {
	fn default() -> Self {
		Self {
			size: 60.0,
			border_radius: "50%".into(),
			background_color: "#e0e0e0".into(),
			margin_bottom: 8.0,
		}
	}
}

/// Placeholder drawn when there is no usable photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialsTheme {
	/// CSS background.
	pub background_color: String,
	/// Text colour.
	pub color: String,
	/// Font size in pixels.
	pub font_size: f64,
	/// CSS font weight.
	pub font_weight: String,
}

impl Default for InitialsTheme {
	fn default() -> Self {
		Self {
			background_color: "#1976d2".into(),
			color: "white".into(),
			font_size: 20.0,
			font_weight: "bold".into(),
		}
	}
}

/// One line of card text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
	/// Font size in pixels.
	pub font_size: f64,
	/// CSS font weight.
	pub font_weight: String,
	/// Text colour.
	pub color: String,
	/// Gap below the line in pixels.
	pub margin_bottom: f64,
	/// 0 to 1.
	pub opacity: f64,
}

impl Default for TextStyle {
	fn default() -> Self {
		Self {
			font_size: 14.0,
			font_weight: "600".into(),
			color: "inherit".into(),
			margin_bottom: 4.0,
			opacity: 1.0,
		}
	}
}

/// Card text lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextTheme {
	/// Title line.
	pub name: TextStyle,
	/// Subtitle line.
	pub role: TextStyle,
}

impl Default for TextTheme {
	fn default() -> Self {
		Self {
			name: TextStyle::default(),
			role: TextStyle {
				font_size: 12.0,
				font_weight: "normal".into(),
				margin_bottom: 0.0,
				opacity: 0.7,
				..TextStyle::default()
			},
		}
	}
}

/// Connector lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksTheme {
	/// Stroke colour.
	pub stroke_color: String,
	/// Stroke width in pixels.
	pub stroke_width: f64,
	/// Elbow offset of the L-shaped connector, below the parent and above the child.
	pub vertical_spacing: f64,
}

impl Default for LinksTheme {
	fn default() -> Self {
		Self {
			stroke_color: "#999".into(),
			stroke_width: 2.0,
			vertical_spacing: 40.0,
		}
	}
}

/// Border drawn around a search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightTheme {
	/// Border colour.
	pub border_color: String,
	/// Border width in pixels.
	pub border_width: f64,
}

impl Default for HighlightTheme {
	fn default() -> Self {
		Self {
			border_color: "#1976d2".into(),
			border_width: 3.0,
		}
	}
}

/// Outer chart box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerTheme {
	/// CSS background.
	pub background_color: String,
	/// CSS width, e.g. `"800px"` or `"100vw"`.
	pub width: String,
	/// CSS height, e.g. `"700px"` or `"100vh"`.
	pub height: String,
}

impl Default for ContainerTheme {
	fn default() -> Self {
		Self {
			background_color: "#f8f9fa".into(),
			width: "800px".into(),
			height: "700px".into(),
		}
	}
}

/// Tree spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTheme {
	/// Distance between depth levels.
	pub vertical_spacing: f64,
	/// Distance between neighbouring siblings.
	pub horizontal_spacing: f64,
}

impl Default for LayoutTheme {
	fn default() -> Self {
		Self {
			vertical_spacing: 250.0,
			horizontal_spacing: 200.0,
		}
	}
}

/// Complete chart theme. Any subset may be given in JSON; the rest keeps its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
	/// Card box.
	pub node_card: NodeCardTheme,
	/// Photo circle.
	pub avatar: AvatarTheme,
	/// Photo placeholder.
	pub initials: InitialsTheme,
	/// Card text.
	pub text: TextTheme,
	/// Connectors.
	pub links: LinksTheme,
	/// Search highlight.
	pub highlight: HighlightTheme,
	/// Outer box.
	pub container: ContainerTheme,
	/// Tree spacing.
	pub layout: LayoutTheme,
}

impl Theme {
	/// Parses a partial theme; every missing key keeps its default.
	pub fn from_json(json: &str) -> Result<Self, ChartError> {
		Ok(serde_json::from_str(json)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_override_merges_onto_defaults() {
		let theme = Theme::from_json(
			r#"{ "container": { "width": "100vw" }, "layout": { "horizontal_spacing": 180 } }"#,
		)
		.unwrap();
		assert_eq!(theme.container.width, "100vw");
		assert_eq!(theme.container.height, "700px");
		assert_eq!(theme.layout.horizontal_spacing, 180.0);
		assert_eq!(theme.layout.vertical_spacing, 250.0);
		assert_eq!(theme.node_card, NodeCardTheme::default());
	}

	#[test]
	fn role_text_is_dimmed_by_default() {
		let theme = Theme::default();
		assert_eq!(theme.text.role.font_size, 12.0);
		assert!(theme.text.role.opacity < theme.text.name.opacity);
	}
}
