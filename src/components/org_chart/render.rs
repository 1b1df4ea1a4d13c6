//! String formatting for the DOM/SVG layer.

use super::state::VisibleNode;
use super::theme::Theme;
use super::viewport::ViewTransform;

/// CSS `transform` for the overlay holding cards and links.
pub fn overlay_transform(t: &ViewTransform) -> String {
	format!("translate({}px, {}px) scale({})", t.x, t.y, t.k)
}

/// SVG path data for a polyline.
pub fn path_data(points: &[(f64, f64)]) -> String {
	let mut d = String::new();
	for (i, (x, y)) in points.iter().enumerate() {
		if i > 0 {
			d.push(' ');
		}
		d.push(if i == 0 { 'M' } else { 'L' });
		d.push_str(&format!("{x},{y}"));
	}
	d
}

/// Absolute placement of one card inside the overlay.
pub fn card_position(node: &VisibleNode) -> String {
	format!("position: absolute; left: {}px; top: {}px; pointer-events: auto;", node.x, node.y)
}

/// Inline style for the card box itself.
pub fn card_style(theme: &Theme, highlighted: bool) -> String {
	let card = &theme.node_card;
	let border = if highlighted {
		format!(
			"{}px solid {}",
			theme.highlight.border_width, theme.highlight.border_color
		)
	} else {
		"none".to_string()
	};
	format!(
		"width: {}px; min-height: {}px; padding: {}px; border-radius: {}px; background: {}; \
		 box-shadow: {}; font-family: {}; border: {}; box-sizing: border-box; cursor: pointer; \
		 text-align: center; transition: transform 0.2s, box-shadow 0.2s;",
		card.width,
		card.height,
		card.padding,
		card.border_radius,
		card.background_color,
		card.box_shadow,
		card.font_family,
		border,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transform_string_carries_all_three_components() {
		let t = ViewTransform {
			x: 12.5,
			y: -3.0,
			k: 0.75,
		};
		assert_eq!(overlay_transform(&t), "translate(12.5px, -3px) scale(0.75)");
	}

	#[test]
	fn path_data_is_move_then_lines() {
		let d = path_data(&[(70.0, 140.0), (70.0, 180.0), (270.0, 180.0)]);
		assert_eq!(d, "M70,140 L70,180 L270,180");
		assert_eq!(path_data(&[]), "");
	}

	#[test]
	fn highlight_adds_a_border() {
		let theme = Theme::default();
		assert!(card_style(&theme, true).contains("3px solid #1976d2"));
		assert!(card_style(&theme, false).contains("border: none"));
	}
}
