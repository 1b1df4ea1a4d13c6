use std::sync::Arc;

use log::{debug, info, warn};

use super::hierarchy::{Hierarchy, NodeId, NodeState};
use super::layout::{self, CardSize, LayoutPass, TreeLayout};
use super::search::{self, PanPoll, PanScheduler};
use super::types::{ChartConfig, OrgNode};
use super::viewport::{ViewTransform, Viewport};

/// Pointer travel, in screen pixels, after which a press counts as a drag.
const DRAG_THRESHOLD: f64 = 3.0;
/// Wheel delta to log2 zoom factor.
const WHEEL_SENSITIVITY: f64 = 0.002;

/// A visible card as handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleNode {
	/// Handle into the current hierarchy.
	pub id: NodeId,
	/// The caller's record.
	pub data: Arc<OrgNode>,
	/// Top-left corner, world units.
	pub x: f64,
	/// See `x`.
	pub y: f64,
	/// Position before the latest layout pass.
	pub x0: f64,
	/// See `x0`.
	pub y0: f64,
	/// Root is 0.
	pub depth: usize,
	/// Drives the expand/collapse affordance.
	pub state: NodeState,
	/// Set on the latest search hit.
	pub highlighted: bool,
}

/// A parent/child connector, already resolved to its five points.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleLink {
	/// Parent.
	pub source: NodeId,
	/// Child.
	pub target: NodeId,
	/// Polyline from the parent's bottom centre to the child's top centre.
	pub points: [(f64, f64); 5],
}

/// Everything needed to draw the current visible projection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartFrame {
	/// Bumped on every layout pass; a renderer reports it back once drawn.
	pub epoch: u64,
	/// Visible cards, breadth first.
	pub nodes: Vec<VisibleNode>,
	/// One per visible non-root card.
	pub links: Vec<VisibleLink>,
}

/// Pointer pan in progress, in container coordinates.
#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	moved: bool,
	last_x: f64,
	last_y: f64,
	travel: f64,
}

/// One chart instance: the hierarchy, its layout, the view and the pending
/// search pan.
pub struct OrgChartState {
	data: Option<Arc<OrgNode>>,
	config: ChartConfig,
	hierarchy: Hierarchy,
	tree: TreeLayout,
	pass: LayoutPass,
	viewport: Viewport,
	pans: PanScheduler,
	highlighted: Option<NodeId>,
	layout_epoch: u64,
	published_epoch: u64,
	committed_epoch: u64,
	pan: PanState,
}

impl OrgChartState {
	/// Builds the initial projection of `data` and fits it into a `width` by `height` container.
	pub fn new(data: Option<Arc<OrgNode>>, config: ChartConfig, width: f64, height: f64) -> Self {
		let tree = TreeLayout::from_theme(&config.theme);
		let mut state = Self {
			data: None,
			hierarchy: Hierarchy::default(),
			tree,
			pass: LayoutPass::default(),
			viewport: Viewport::new(width, height),
			pans: PanScheduler::default(),
			highlighted: None,
			layout_epoch: 0,
			published_epoch: 0,
			committed_epoch: 0,
			pan: PanState::default(),
			config,
		};
		state.rebuild(data);
		state
	}

	/// Replaces the root record. Nothing happens when `data` is the very
	/// same record already shown; otherwise the chart starts over.
	pub fn set_data(&mut self, data: Option<Arc<OrgNode>>) -> bool {
		let same = match (&self.data, &data) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			(None, None) => true,
			_ => false,
		};
		if same {
			return false;
		}
		self.rebuild(data);
		true
	}

	fn rebuild(&mut self, data: Option<Arc<OrgNode>>) {
		self.hierarchy = Hierarchy::build(data.as_ref(), self.config.fields.id.as_deref());
		self.data = data;
		self.highlighted = None;
		self.pans.cancel();
		self.viewport.clear_initial();
		info!("org chart rebuilt with {} nodes", self.hierarchy.len());
		self.relayout();
	}

	fn relayout(&mut self) {
		self.pass = self.tree.apply(&mut self.hierarchy);
		self.layout_epoch += 1;
		if !self.pass.nodes.is_empty() {
			self.viewport.fit_initial(self.pass.bounds);
		}
	}

	/// Configuration the chart was built with.
	pub fn config(&self) -> &ChartConfig {
		&self.config
	}

	/// The full tree, hidden nodes included.
	pub fn hierarchy(&self) -> &Hierarchy {
		&self.hierarchy
	}

	/// The latest layout pass.
	pub fn layout(&self) -> &LayoutPass {
		&self.pass
	}

	/// Current overlay transform.
	pub fn transform(&self) -> ViewTransform {
		self.viewport.transform()
	}

	/// Transform recorded at the first layout, `None` until there is data.
	pub fn initial_transform(&self) -> Option<ViewTransform> {
		self.viewport.initial()
	}

	/// Node marked by the latest successful search.
	pub fn highlighted(&self) -> Option<NodeId> {
		self.highlighted
	}

	/// Bumped on every layout pass.
	pub fn layout_epoch(&self) -> u64 {
		self.layout_epoch
	}

	/// Updates the container size used for centring; never re-fits.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
	}

	/// Expands or collapses a card and lays the whole tree out again.
	pub fn toggle_node(&mut self, id: NodeId) -> Option<NodeState> {
		let Some(next) = self.hierarchy.toggle(id) else {
			warn!("toggle ignored: node {} is not part of this chart", id.index());
			return None;
		};
		self.relayout();
		Some(next)
	}

	/// Same as [`Self::toggle_node`], addressed by the caller's record.
	pub fn toggle_data(&mut self, data: &Arc<OrgNode>) -> Option<NodeState> {
		let id = self.hierarchy.find_by_data(data)?;
		self.toggle_node(id)
	}

	/// Animated zoom in by one step, about the current origin.
	pub fn zoom_in(&mut self) {
		self.viewport.zoom_in();
	}

	/// Animated zoom out by one step.
	pub fn zoom_out(&mut self) {
		self.viewport.zoom_out();
	}

	/// Animates back to the initial transform.
	pub fn reset_to_initial(&mut self) {
		self.viewport.reset_to_initial();
	}

	/// Centres the card of a visible node. Returns `false` when it has no
	/// position on screen.
	pub fn pan_to_node(&mut self, id: NodeId) -> bool {
		if !self.hierarchy.is_visible(id) {
			return false;
		}
		let Some(node) = self.hierarchy.get(id) else {
			return false;
		};
		let center = CardSize::from_theme(&self.config.theme).center((node.x, node.y));
		self.viewport.pan_to(center);
		true
	}

	/// Same as [`Self::pan_to_node`], addressed by the caller's record.
	pub fn pan_to_data(&mut self, data: &Arc<OrgNode>) -> bool {
		match self.hierarchy.find_by_data(data) {
			Some(id) => self.pan_to_node(id),
			None => false,
		}
	}

	/// Node whose configured key field (`fields.id`) equals `key`.
	pub fn node_for_key(&self, key: &str) -> Option<NodeId> {
		self.hierarchy.find_by_key(key)
	}

	/// Toggles the node with this key; `None` when no key field is
	/// configured or nothing carries the key.
	pub fn toggle_key(&mut self, key: &str) -> Option<NodeState> {
		let Some(id) = self.node_for_key(key) else {
			warn!("toggle ignored: no node with key {key:?}");
			return None;
		};
		self.toggle_node(id)
	}

	/// Centres the visible node with this key.
	pub fn pan_to_key(&mut self, key: &str) -> bool {
		match self.node_for_key(key) {
			Some(id) => self.pan_to_node(id),
			None => false,
		}
	}

	/// Looks `query` up in `field` across every node, collapsed or not.
	/// A hit opens its ancestors and schedules a pan for after the next
	/// render; a blank query or a miss resets the view.
	pub fn search(&mut self, query: &str, field: &str) -> Option<Arc<OrgNode>> {
		self.pans.begin_query();
		let Some(id) = search::find(&self.hierarchy, query, field) else {
			debug!("search {query:?} on {field:?}: no match");
			self.highlighted = None;
			self.viewport.reset_to_initial();
			return None;
		};
		let opened = self.hierarchy.expand_path(id);
		self.highlighted = Some(id);
		self.relayout();
		self.pans.schedule(id, self.layout_epoch);
		debug!(
			"search {query:?} on {field:?}: node {} ({opened} ancestors opened)",
			id.index()
		);
		self.hierarchy.get(id).map(|node| Arc::clone(&node.data))
	}

	/// Title suggestions for a partial query.
	pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
		search::suggestions(&self.hierarchy, query, &self.config.fields.title, limit)
	}

	/// Resolves the current projection into drawable nodes and links.
	pub fn frame(&self) -> ChartFrame {
		let card = CardSize::from_theme(&self.config.theme);
		let v = self.config.theme.links.vertical_spacing;
		let nodes = self
			.pass
			.nodes
			.iter()
			.filter_map(|&id| {
				let node = self.hierarchy.get(id)?;
				Some(VisibleNode {
					id,
					data: Arc::clone(&node.data),
					x: node.x,
					y: node.y,
					x0: node.x0,
					y0: node.y0,
					depth: node.depth,
					state: node.state(),
					highlighted: self.highlighted == Some(id),
				})
			})
			.collect();
		let links = self
			.pass
			.links
			.iter()
			.filter_map(|link| {
				let source = self.hierarchy.get(link.source)?;
				let target = self.hierarchy.get(link.target)?;
				Some(VisibleLink {
					source: link.source,
					target: link.target,
					points: layout::connector((source.x, source.y), (target.x, target.y), card, v),
				})
			})
			.collect();
		ChartFrame {
			epoch: self.layout_epoch,
			nodes,
			links,
		}
	}

	/// The frame, if a layout pass ran since the last one handed out.
	pub fn take_frame(&mut self) -> Option<ChartFrame> {
		if self.published_epoch == self.layout_epoch {
			return None;
		}
		self.published_epoch = self.layout_epoch;
		Some(self.frame())
	}

	/// Called by the renderer once everything published up to `epoch` is on screen.
	pub fn mark_rendered(&mut self, epoch: u64) {
		self.committed_epoch = self.committed_epoch.max(epoch.min(self.layout_epoch));
	}

	/// One animation frame: commits what was published before it, runs a
	/// due search pan, then advances the view transition. Returns whether
	/// the transform changed.
	pub fn tick(&mut self, dt_ms: f64) -> bool {
		self.mark_rendered(self.published_epoch);
		let hierarchy = &self.hierarchy;
		match self.pans.poll(self.committed_epoch, dt_ms, |id| hierarchy.is_visible(id)) {
			PanPoll::Ready(id) => {
				self.pan_to_node(id);
			}
			PanPoll::Expired(id) => {
				warn!("gave up panning to node {}: it never became visible", id.index());
			}
			PanPoll::Idle | PanPoll::Waiting => {}
		}
		self.viewport.tick(dt_ms)
	}

	/// True while a transition runs or a search pan is pending.
	pub fn is_animating(&self) -> bool {
		self.viewport.is_animating() || self.pans.is_pending()
	}

	/// Starts a pointer pan at `(x, y)`, stopping any running transition.
	pub fn begin_pan(&mut self, x: f64, y: f64) {
		self.viewport.interrupt();
		self.pan = PanState {
			active: true,
			moved: false,
			last_x: x,
			last_y: y,
			travel: 0.0,
		};
	}

	/// Follows the pointer while a pan is active. Returns whether the view moved.
	pub fn drag_to(&mut self, x: f64, y: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		let (dx, dy) = (x - self.pan.last_x, y - self.pan.last_y);
		self.pan.last_x = x;
		self.pan.last_y = y;
		self.pan.travel += (dx * dx + dy * dy).sqrt();
		if self.pan.travel > DRAG_THRESHOLD {
			self.pan.moved = true;
		}
		self.viewport.pan_by(dx, dy);
		true
	}

	/// Ends the pan. Returns whether it was a real drag, in which case the
	/// click that follows should be ignored.
	pub fn end_pan(&mut self) -> bool {
		let moved = self.pan.active && self.pan.moved;
		self.pan.active = false;
		moved
	}

	/// Wheel zoom about the pointer.
	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = 2f64.powf(-delta_y * WHEEL_SENSITIVITY);
		self.viewport.zoom_at((x, y), factor);
	}
}
