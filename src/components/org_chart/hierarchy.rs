//! The full tree of org records plus the collapsed/expanded projection over it.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Each node keeps a
//! single ordered child list and an `expanded` flag; the visible/hidden split
//! is derived from the flag rather than stored twice.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use log::{debug, warn};

use super::types::OrgNode;

/// Source of [`Hierarchy`] generations; zero is left to the empty default.
static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

/// Handle to a node inside one [`Hierarchy`].
///
/// Carries the generation of the hierarchy that issued it, so a handle kept
/// across a rebuild resolves to nothing instead of to an unrelated node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize, pub(crate) u32);

impl NodeId {
	/// Arena slot, stable for the lifetime of the issuing hierarchy.
	pub fn index(self) -> usize {
		self.0
	}
}

/// Projection state of a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
	/// No children at all.
	Leaf,
	/// Has children, currently hidden.
	Collapsed,
	/// Has children, currently shown.
	Expanded,
}

/// One node of the arena.
#[derive(Clone, Debug)]
pub struct HierarchyNode {
	/// The caller's record this node was built from.
	pub data: Arc<OrgNode>,
	/// `None` for the root.
	pub parent: Option<NodeId>,
	/// Root is 0.
	pub depth: usize,
	children: Vec<NodeId>,
	expanded: bool,
	/// Top-left corner of the card from the latest layout pass.
	pub x: f64,
	/// See `x`.
	pub y: f64,
	/// Position from the layout pass before the latest one.
	pub x0: f64,
	/// See `x0`.
	pub y0: f64,
	pub(crate) placed: bool,
}

impl HierarchyNode {
	/// Derived from the child list and the expansion flag.
	pub fn state(&self) -> NodeState {
		match (self.children.is_empty(), self.expanded) {
			(true, _) => NodeState::Leaf,
			(false, true) => NodeState::Expanded,
			(false, false) => NodeState::Collapsed,
		}
	}

	/// All children regardless of projection state.
	pub fn children(&self) -> &[NodeId] {
		&self.children
	}

	/// Children currently rendered, `None` when collapsed or a leaf.
	pub fn visible_children(&self) -> Option<&[NodeId]> {
		(self.state() == NodeState::Expanded).then_some(self.children.as_slice())
	}

	/// Children stashed away by a collapse, `None` when expanded or a leaf.
	pub fn hidden_children(&self) -> Option<&[NodeId]> {
		(self.state() == NodeState::Collapsed).then_some(self.children.as_slice())
	}
}

/// Every node of one data tree, in pre-order, with its projection state.
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
	nodes: Vec<HierarchyNode>,
	by_key: HashMap<String, NodeId>,
	generation: u32,
}

impl Hierarchy {
	/// Builds the tree from `root` in its initial state: root expanded one
	/// level, everything below collapsed. `None` yields an empty hierarchy.
	pub fn build(root: Option<&Arc<OrgNode>>, key_field: Option<&str>) -> Self {
		let mut hierarchy = Self {
			generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
			..Self::default()
		};
		let Some(root) = root else {
			return hierarchy;
		};

		let mut stack = vec![(Arc::clone(root), None::<NodeId>, 0usize)];
		while let Some((data, parent, depth)) = stack.pop() {
			let id = NodeId(hierarchy.nodes.len(), hierarchy.generation);
			if let Some(key_field) = key_field {
				let key = data.field(key_field);
				if !key.is_empty() {
					if hierarchy.by_key.insert(key.to_string(), id).is_some() {
						warn!("duplicate node key {key:?}; the later node wins");
					}
				}
			}
			// Reversed so pops come out in child order.
			for child in data.children.iter().rev() {
				stack.push((Arc::clone(child), Some(id), depth + 1));
			}
			hierarchy.nodes.push(HierarchyNode {
				data,
				parent,
				depth,
				children: Vec::new(),
				expanded: true,
				x: 0.0,
				y: 0.0,
				x0: 0.0,
				y0: 0.0,
				placed: false,
			});
			if let Some(parent) = parent {
				hierarchy.nodes[parent.0].children.push(id);
			}
		}

		if let Some(root) = hierarchy.root() {
			let first_level = hierarchy.nodes[root.0].children.clone();
			for child in first_level {
				hierarchy.collapse_subtree(child);
			}
		}
		hierarchy
	}

	/// First node in pre-order; `None` when built without data.
	pub fn root(&self) -> Option<NodeId> {
		(!self.nodes.is_empty()).then_some(NodeId(0, self.generation))
	}

	/// Node count, hidden ones included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when built without data.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The node behind `id`, or `None` when the handle came from another
	/// hierarchy (typically one replaced by a rebuild).
	pub fn get(&self, id: NodeId) -> Option<&HierarchyNode> {
		if id.1 != self.generation {
			return None;
		}
		self.nodes.get(id.0)
	}

	pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut HierarchyNode> {
		if id.1 != self.generation {
			return None;
		}
		self.nodes.get_mut(id.0)
	}

	/// Records which nodes took part in the latest layout pass.
	pub(crate) fn mark_placed(&mut self, placed: &[bool]) {
		for (node, &placed) in self.nodes.iter_mut().zip(placed) {
			node.placed = placed;
		}
	}

	/// State of `id`, or `None` for a stale handle.
	pub fn state(&self, id: NodeId) -> Option<NodeState> {
		self.get(id).map(HierarchyNode::state)
	}

	/// Collapses `id` and every node of its visible subtree. A no-op on
	/// collapsed nodes and leaves.
	pub fn collapse_subtree(&mut self, id: NodeId) {
		let mut stack = vec![id];
		while let Some(current) = stack.pop() {
			let Some(node) = self.get_mut(current) else {
				continue;
			};
			if node.state() != NodeState::Expanded {
				continue;
			}
			node.expanded = false;
			stack.extend(node.children.iter().copied());
		}
	}

	/// Flips a node between expanded and collapsed. Collapsing forgets the
	/// expansion state of every descendant; expanding reveals one level only.
	/// Returns the new state, or `None` for a stale handle.
	pub fn toggle(&mut self, id: NodeId) -> Option<NodeState> {
		let state = self.state(id)?;
		match state {
			NodeState::Leaf => {}
			NodeState::Expanded => self.collapse_subtree(id),
			NodeState::Collapsed => self.nodes[id.0].expanded = true,
		}
		let next = self.state(id);
		debug!("toggled node {} from {state:?} to {next:?}", id.0);
		next
	}

	/// Expands every collapsed ancestor of `id`, leaving `id` itself untouched.
	/// Returns how many ancestors were opened.
	pub fn expand_path(&mut self, id: NodeId) -> usize {
		let mut opened = 0;
		let mut current = self.get(id).and_then(|n| n.parent);
		while let Some(ancestor) = current {
			let node = &mut self.nodes[ancestor.0];
			if node.state() == NodeState::Collapsed {
				node.expanded = true;
				opened += 1;
			}
			current = node.parent;
		}
		opened
	}

	/// Ancestors of `id` from its parent up to the root.
	pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		std::iter::successors(self.get(id).and_then(|n| n.parent), move |a| {
			self.get(*a).and_then(|n| n.parent)
		})
	}

	/// True when every ancestor of `id` is expanded.
	pub fn is_visible(&self, id: NodeId) -> bool {
		self.get(id).is_some()
			&& self
				.ancestors(id)
				.all(|a| self.state(a) == Some(NodeState::Expanded))
	}

	/// Depth-first pre-order over the whole tree, visible children before
	/// hidden ones at every branch.
	pub fn preorder(&self) -> Vec<NodeId> {
		let mut out = Vec::with_capacity(self.nodes.len());
		let mut stack: Vec<NodeId> = self.root().into_iter().collect();
		while let Some(id) = stack.pop() {
			out.push(id);
			stack.extend(self.nodes[id.0].children.iter().rev().copied());
		}
		out
	}

	/// Visible nodes in breadth-first order, root first.
	pub fn visible(&self) -> Vec<NodeId> {
		let mut out: Vec<NodeId> = self.root().into_iter().collect();
		let mut i = 0;
		while i < out.len() {
			if let Some(children) = self.nodes[out[i].0].visible_children() {
				out.extend_from_slice(children);
			}
			i += 1;
		}
		out
	}

	/// Finds the node built from exactly this record (pointer identity).
	pub fn find_by_data(&self, data: &Arc<OrgNode>) -> Option<NodeId> {
		self.preorder()
			.into_iter()
			.find(|id| Arc::ptr_eq(&self.nodes[id.0].data, data))
	}

	/// Finds a node by the configured key field.
	pub fn find_by_key(&self, key: &str) -> Option<NodeId> {
		self.by_key.get(key).copied()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn sample() -> Arc<OrgNode> {
		OrgNode::from_value(json!({
			"name": "CEO",
			"children": [
				{ "name": "CTO", "children": [
					{ "name": "Engineer", "children": [{ "name": "Intern" }] },
					{ "name": "QA" }
				] },
				{ "name": "CFO" }
			]
		}))
		.unwrap()
	}

	fn id_of(h: &Hierarchy, name: &str) -> NodeId {
		h.preorder()
			.into_iter()
			.find(|id| h.get(*id).unwrap().data.field("name") == name)
			.unwrap()
	}

	#[test]
	fn starts_with_root_expanded_one_level() {
		let h = Hierarchy::build(Some(&sample()), None);
		let root = h.root().unwrap();
		assert_eq!(h.state(root), Some(NodeState::Expanded));
		assert_eq!(h.get(root).unwrap().visible_children().unwrap().len(), 2);
		let cto = id_of(&h, "CTO");
		assert_eq!(h.state(cto), Some(NodeState::Collapsed));
		assert!(h.get(cto).unwrap().visible_children().is_none());
		assert_eq!(h.get(cto).unwrap().hidden_children().unwrap().len(), 2);
		assert_eq!(h.state(id_of(&h, "Engineer")), Some(NodeState::Collapsed));
		assert_eq!(h.state(id_of(&h, "CFO")), Some(NodeState::Leaf));
		let names: Vec<_> = h
			.visible()
			.into_iter()
			.map(|id| h.get(id).unwrap().data.field("name").into_owned())
			.collect();
		assert_eq!(names, ["CEO", "CTO", "CFO"]);
	}

	#[test]
	fn empty_input_builds_nothing() {
		let h = Hierarchy::build(None, None);
		assert!(h.is_empty());
		assert!(h.root().is_none());
		assert!(h.visible().is_empty());
	}

	#[test]
	fn collapsing_twice_is_a_noop() {
		let mut h = Hierarchy::build(Some(&sample()), None);
		let cto = id_of(&h, "CTO");
		h.collapse_subtree(cto);
		let before: Vec<_> = h.preorder().into_iter().map(|id| h.state(id)).collect();
		h.collapse_subtree(cto);
		let after: Vec<_> = h.preorder().into_iter().map(|id| h.state(id)).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn toggle_round_trip_restores_children_but_forgets_depth() {
		let mut h = Hierarchy::build(Some(&sample()), None);
		let cto = id_of(&h, "CTO");
		let engineer = id_of(&h, "Engineer");
		h.toggle(cto);
		h.toggle(engineer);
		assert_eq!(h.state(engineer), Some(NodeState::Expanded));
		let children = h.get(cto).unwrap().visible_children().unwrap().to_vec();

		assert_eq!(h.toggle(cto), Some(NodeState::Collapsed));
		assert_eq!(h.toggle(cto), Some(NodeState::Expanded));
		assert_eq!(h.get(cto).unwrap().visible_children().unwrap(), children);
		assert_eq!(h.state(engineer), Some(NodeState::Collapsed));
	}

	#[test]
	fn toggling_a_leaf_changes_nothing() {
		let mut h = Hierarchy::build(Some(&sample()), None);
		let cfo = id_of(&h, "CFO");
		assert_eq!(h.toggle(cfo), Some(NodeState::Leaf));
		assert_eq!(h.toggle(NodeId(999, h.generation)), None);
	}

	#[test]
	fn handles_do_not_cross_rebuilds() {
		let first = Hierarchy::build(Some(&sample()), None);
		let mut second = Hierarchy::build(Some(&sample()), None);
		let cto = id_of(&first, "CTO");
		assert_eq!(cto.index(), id_of(&second, "CTO").index());
		assert!(second.get(cto).is_none());
		assert_eq!(second.toggle(cto), None);
		assert_eq!(second.expand_path(cto), 0);
		assert!(!second.is_visible(cto));
		assert_eq!(second.state(id_of(&second, "CTO")), Some(NodeState::Collapsed));
	}

	#[test]
	fn expand_path_opens_ancestors_only() {
		let mut h = Hierarchy::build(Some(&sample()), None);
		let intern = id_of(&h, "Intern");
		assert!(!h.is_visible(intern));
		assert_eq!(h.expand_path(intern), 2);
		assert!(h.is_visible(intern));
		assert_eq!(h.state(id_of(&h, "CTO")), Some(NodeState::Expanded));
		assert_eq!(h.state(id_of(&h, "Engineer")), Some(NodeState::Expanded));

		let engineer = id_of(&h, "Engineer");
		h.toggle(engineer);
		h.expand_path(engineer);
		assert_eq!(h.state(engineer), Some(NodeState::Collapsed));
	}

	#[test]
	fn finds_nodes_by_reference_not_by_value() {
		let root = sample();
		let h = Hierarchy::build(Some(&root), None);
		let cfo = Arc::clone(&root.children[1]);
		assert_eq!(h.find_by_data(&cfo), Some(id_of(&h, "CFO")));

		let lookalike = Arc::new((*cfo).clone());
		assert_eq!(h.find_by_data(&lookalike), None);
	}

	#[test]
	fn indexes_by_key_field() {
		let root = OrgNode::from_value(json!({
			"id": "1", "name": "A", "children": [{ "id": "2", "name": "B" }]
		}))
		.unwrap();
		let h = Hierarchy::build(Some(&root), Some("id"));
		let b = h.find_by_key("2").unwrap();
		assert_eq!(h.get(b).unwrap().data.field("name"), "B");
		assert_eq!(h.get(b).unwrap().depth, 1);
		assert!(h.find_by_key("3").is_none());
	}
}
