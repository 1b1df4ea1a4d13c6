//! Fixed-size top-down tree layout.
//!
//! Horizontal placement runs in sibling-slot units: neighbouring siblings sit
//! one slot apart, nodes from different parents at least two. Each parent is
//! centred over its first and last child. Depth maps straight to `y`.

use super::hierarchy::{Hierarchy, NodeId};
use super::theme::Theme;

const SIBLING_GAP: f64 = 1.0;
const COUSIN_GAP: f64 = 2.0;

/// Smallest tree extent used when fitting, so tiny trees never blow up the scale.
pub const MIN_EXTENT: f64 = 200.0;

/// Footprint of one card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardSize {
	/// Card width.
	pub width: f64,
	/// Card height.
	pub height: f64,
}

impl CardSize {
	/// Card size from `theme.node_card`.
	pub fn from_theme(theme: &Theme) -> Self {
		Self {
			width: theme.node_card.width,
			height: theme.node_card.height,
		}
	}

	/// Centre of a card whose top-left corner is at `(x, y)`.
	pub fn center(&self, (x, y): (f64, f64)) -> (f64, f64) {
		(x + self.width / 2.0, y + self.height / 2.0)
	}
}

/// Axis-aligned box around every visible card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Leftmost card edge.
	pub left: f64,
	/// Rightmost card edge.
	pub right: f64,
	/// Top card edge.
	pub top: f64,
	/// Bottom card edge.
	pub bottom: f64,
}

impl Bounds {
	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.right - self.left
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.bottom - self.top
	}

	/// Horizontal midpoint.
	pub fn center_x(&self) -> f64 {
		(self.left + self.right) / 2.0
	}
}

/// A parent to child edge of the visible tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
	/// Parent.
	pub source: NodeId,
	/// Child.
	pub target: NodeId,
}

/// Result of one layout pass. Positions themselves live on the hierarchy nodes.
#[derive(Clone, Debug, Default)]
pub struct LayoutPass {
	/// Visible nodes, breadth first.
	pub nodes: Vec<NodeId>,
	/// One link per visible non-root node, in `nodes` order.
	pub links: Vec<Link>,
	/// Card-inclusive box, `None` when nothing is visible.
	pub bounds: Option<Bounds>,
}

/// Layout parameters, usually taken from the theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeLayout {
	/// Distance between neighbouring slots on one level.
	pub sibling_spacing: f64,
	/// Distance between depth levels.
	pub level_spacing: f64,
	/// Card footprint used for bounds.
	pub card: CardSize,
}

impl TreeLayout {
	/// Spacings and card size from `theme`.
	pub fn from_theme(theme: &Theme) -> Self {
		Self {
			sibling_spacing: theme.layout.horizontal_spacing,
			level_spacing: theme.layout.vertical_spacing,
			card: CardSize::from_theme(theme),
		}
	}

	/// Positions every visible node of `hierarchy`, always starting from the root.
	pub fn apply(&self, hierarchy: &mut Hierarchy) -> LayoutPass {
		let order = hierarchy.visible();
		if order.is_empty() {
			return LayoutPass::default();
		}

		let slots = self.slots(hierarchy, &order);

		let mut placed = vec![false; hierarchy.len()];
		let mut links = Vec::with_capacity(order.len().saturating_sub(1));
		for &id in &order {
			let Some(node) = hierarchy.get(id) else {
				continue;
			};
			let parent = node.parent;
			let (prev_x, prev_y, was_placed) = (node.x, node.y, node.placed);
			// Newly revealed nodes grow out of their parent's previous spot.
			let (x0, y0) = match parent {
				Some(p) if !was_placed => hierarchy
					.get(p)
					.map(|p| (p.x0, p.y0))
					.unwrap_or((prev_x, prev_y)),
				_ => (prev_x, prev_y),
			};
			let depth = node.depth;
			if let Some(node) = hierarchy.get_mut(id) {
				node.x0 = x0;
				node.y0 = y0;
				node.x = slots[id.index()] * self.sibling_spacing;
				node.y = depth as f64 * self.level_spacing;
			}
			placed[id.index()] = true;
			if let Some(parent) = parent {
				links.push(Link {
					source: parent,
					target: id,
				});
			}
		}
		hierarchy.mark_placed(&placed);

		let bounds = self.bounds(hierarchy, &order);
		LayoutPass {
			nodes: order,
			links,
			bounds,
		}
	}

	/// Horizontal slot of every visible node, root at 0.
	fn slots(&self, hierarchy: &Hierarchy, order: &[NodeId]) -> Vec<f64> {
		let n = hierarchy.len();
		// Per node: offset from its parent, and (left, right) extent per relative depth.
		let mut offset = vec![0.0; n];
		let mut contours: Vec<Vec<(f64, f64)>> = vec![Vec::new(); n];

		for &id in order.iter().rev() {
			let children = hierarchy
				.get(id)
				.and_then(|node| node.visible_children())
				.unwrap_or(&[]);
			if children.is_empty() {
				contours[id.index()] = vec![(0.0, 0.0)];
				continue;
			}

			let mut positions = Vec::with_capacity(children.len());
			let mut merged: Vec<(f64, f64)> = Vec::new();
			for &child in children {
				let contour = std::mem::take(&mut contours[child.index()]);
				let shift = if merged.is_empty() {
					0.0
				} else {
					merged
						.iter()
						.zip(&contour)
						.enumerate()
						.map(|(depth, (placed, next))| {
							let gap = if depth == 0 { SIBLING_GAP } else { COUSIN_GAP };
							placed.1 - next.0 + gap
						})
						.fold(f64::NEG_INFINITY, f64::max)
				};
				for (depth, &(l, r)) in contour.iter().enumerate() {
					let (l, r) = (l + shift, r + shift);
					match merged.get_mut(depth) {
						Some(level) => *level = (level.0.min(l), level.1.max(r)),
						None => merged.push((l, r)),
					}
				}
				positions.push(shift);
			}

			let mid = (positions[0] + positions[positions.len() - 1]) / 2.0;
			for (&child, &pos) in children.iter().zip(&positions) {
				offset[child.index()] = pos - mid;
			}
			let mut own = Vec::with_capacity(merged.len() + 1);
			own.push((0.0, 0.0));
			own.extend(merged.into_iter().map(|(l, r)| (l - mid, r - mid)));
			contours[id.index()] = own;
		}

		let mut slots = vec![0.0; n];
		for &id in order {
			if let Some(parent) = hierarchy.get(id).and_then(|node| node.parent) {
				slots[id.index()] = slots[parent.index()] + offset[id.index()];
			}
		}
		slots
	}

	fn bounds(&self, hierarchy: &Hierarchy, order: &[NodeId]) -> Option<Bounds> {
		let mut iter = order.iter().filter_map(|id| hierarchy.get(*id));
		let first = iter.next()?;
		let mut b = Bounds {
			left: first.x,
			right: first.x,
			top: first.y,
			bottom: first.y,
		};
		for node in iter {
			b.left = b.left.min(node.x);
			b.right = b.right.max(node.x);
			b.top = b.top.min(node.y);
			b.bottom = b.bottom.max(node.y);
		}
		b.right += self.card.width;
		b.bottom += self.card.height;
		Some(b)
	}
}

/// The orthogonal connector between a parent card at `source` and a child
/// card at `target` (both top-left corners): bottom-centre of the parent,
/// down by `v`, across, down to `v` above the child, then to its top-centre.
pub fn connector(
	source: (f64, f64),
	target: (f64, f64),
	card: CardSize,
	v: f64,
) -> [(f64, f64); 5] {
	let (sx, sy) = (source.0 + card.width / 2.0, source.1 + card.height);
	let (tx, ty) = (target.0 + card.width / 2.0, target.1);
	[
		(sx, sy),
		(sx, sy + v),
		(tx, sy + v),
		(tx, ty - v),
		(tx, ty),
	]
}
