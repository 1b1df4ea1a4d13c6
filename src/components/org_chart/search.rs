//! Exact-match search over the whole hierarchy and the deferred pan that
//! follows a hit.

use log::debug;

use super::hierarchy::{Hierarchy, NodeId};

/// Field consulted when the searched field is empty on a node.
pub const FALLBACK_FIELD: &str = "name";
pub const DEFAULT_SUGGESTIONS: usize = 10;

const PAN_RETRY_DELAY_MS: f64 = 100.0;
const PAN_MAX_ATTEMPTS: u32 = 3;

fn normalize(text: &str) -> String {
	text.trim().to_lowercase()
}

/// First node in pre-order (visible subtrees before collapsed ones) whose
/// `field` equals `query`, ignoring case and surrounding whitespace.
pub fn find(hierarchy: &Hierarchy, query: &str, field: &str) -> Option<NodeId> {
	let query = normalize(query);
	if query.is_empty() {
		return None;
	}
	hierarchy.preorder().into_iter().find(|&id| {
		let Some(node) = hierarchy.get(id) else {
			return false;
		};
		let mut value = node.data.field(field);
		if value.trim().is_empty() {
			value = node.data.field(FALLBACK_FIELD);
		}
		normalize(&value) == query
	})
}

/// Distinct `field` values containing `query` (case-insensitive), pre-order,
/// at most `limit` of them.
pub fn suggestions(hierarchy: &Hierarchy, query: &str, field: &str, limit: usize) -> Vec<String> {
	let query = normalize(query);
	if query.is_empty() {
		return Vec::new();
	}
	let mut out: Vec<String> = Vec::new();
	for id in hierarchy.preorder() {
		if out.len() >= limit {
			break;
		}
		let Some(node) = hierarchy.get(id) else {
			continue;
		};
		let value = node.data.field(field);
		let value = value.trim();
		if !value.is_empty() && value.to_lowercase().contains(&query) && !out.iter().any(|s| s == value) {
			out.push(value.to_string());
		}
	}
	out
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScheduledPan {
	target: NodeId,
	/// Layout epoch that must be on screen before the pan may run.
	after_epoch: u64,
	attempts: u32,
	wait_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanPoll {
	Idle,
	Waiting,
	Ready(NodeId),
	Expired(NodeId),
}

/// Holds at most one pending search pan; a newer search replaces it.
#[derive(Clone, Debug, Default)]
pub struct PanScheduler {
	pending: Option<ScheduledPan>,
	query_seq: u64,
}

impl PanScheduler {
	/// Starts a new query, discarding whatever the previous one left pending.
	pub fn begin_query(&mut self) -> u64 {
		self.pending = None;
		self.query_seq += 1;
		self.query_seq
	}

	pub fn schedule(&mut self, target: NodeId, after_epoch: u64) {
		debug!(
			"query {} schedules pan to node {} after layout {after_epoch}",
			self.query_seq,
			target.index()
		);
		self.pending = Some(ScheduledPan {
			target,
			after_epoch,
			attempts: 0,
			wait_ms: 0.0,
		});
	}

	pub fn cancel(&mut self) {
		self.pending = None;
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	/// Checks the pending pan once the renderer has committed
	/// `committed_epoch`. `ready` says whether the target has a position on
	/// screen; when it does not, the pan retries a few times before expiring.
	pub fn poll(&mut self, committed_epoch: u64, dt_ms: f64, ready: impl Fn(NodeId) -> bool) -> PanPoll {
		let Some(pending) = self.pending.as_mut() else {
			return PanPoll::Idle;
		};
		if committed_epoch < pending.after_epoch {
			return PanPoll::Waiting;
		}
		if pending.wait_ms > 0.0 {
			pending.wait_ms -= dt_ms;
			return PanPoll::Waiting;
		}
		let target = pending.target;
		if ready(target) {
			self.pending = None;
			return PanPoll::Ready(target);
		}
		pending.attempts += 1;
		if pending.attempts >= PAN_MAX_ATTEMPTS {
			self.pending = None;
			return PanPoll::Expired(target);
		}
		pending.wait_ms = PAN_RETRY_DELAY_MS;
		PanPoll::Waiting
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use serde_json::json;

	use super::*;
	use crate::components::org_chart::types::OrgNode;

	fn sample() -> Hierarchy {
		let root: Arc<OrgNode> = OrgNode::from_value(json!({
			"name": "Sarah Johnson",
			"role": "CEO",
			"children": [
				{ "name": "Sarah Johnson-Smith", "role": "CTO", "children": [
					{ "name": "Dana Lee", "role": "Engineer" }
				] },
				{ "name": "Dana Lee", "role": "Analyst" },
				{ "title": "", "name": "Fallback Person", "role": "Intern" }
			]
		}))
		.unwrap();
		Hierarchy::build(Some(&root), None)
	}

	fn role(h: &Hierarchy, id: NodeId) -> String {
		h.get(id).unwrap().data.field("role").into_owned()
	}

	#[test]
	fn matches_whole_value_ignoring_case() {
		let h = sample();
		let hit = find(&h, "  sarah johnson ", "name").unwrap();
		assert_eq!(role(&h, hit), "CEO");
		let hit = find(&h, "SARAH JOHNSON-SMITH", "name").unwrap();
		assert_eq!(role(&h, hit), "CTO");
		assert!(find(&h, "sarah", "name").is_none());
	}

	#[test]
	fn first_preorder_match_wins() {
		let h = sample();
		let hit = find(&h, "dana lee", "name").unwrap();
		assert_eq!(role(&h, hit), "Engineer");
	}

	#[test]
	fn searches_collapsed_nodes() {
		let h = sample();
		let hit = find(&h, "engineer", "role").unwrap();
		assert!(!h.is_visible(hit));
	}

	#[test]
	fn blank_queries_match_nothing() {
		let h = sample();
		assert!(find(&h, "", "name").is_none());
		assert!(find(&h, "   ", "name").is_none());
	}

	#[test]
	fn empty_field_falls_back_to_name() {
		let h = sample();
		let hit = find(&h, "fallback person", "title").unwrap();
		assert_eq!(role(&h, hit), "Intern");
	}

	#[test]
	fn suggestions_are_distinct_and_capped() {
		let h = sample();
		assert_eq!(suggestions(&h, "dana", "name", 10), ["Dana Lee"]);
		assert_eq!(
			suggestions(&h, "SARAH", "name", 10),
			["Sarah Johnson", "Sarah Johnson-Smith"]
		);
		assert_eq!(suggestions(&h, "a", "name", 2).len(), 2);
		assert!(suggestions(&h, " ", "name", 10).is_empty());
	}

	#[test]
	fn pan_waits_for_the_layout_to_be_committed() {
		let mut s = PanScheduler::default();
		s.begin_query();
		s.schedule(NodeId(3, 0), 2);
		assert_eq!(s.poll(1, 16.0, |_| true), PanPoll::Waiting);
		assert_eq!(s.poll(2, 16.0, |_| true), PanPoll::Ready(NodeId(3, 0)));
		assert_eq!(s.poll(2, 16.0, |_| true), PanPoll::Idle);
	}

	#[test]
	fn pan_retries_then_expires() {
		let mut s = PanScheduler::default();
		s.begin_query();
		s.schedule(NodeId(1, 0), 0);
		let mut polls = Vec::new();
		for _ in 0..40 {
			let poll = s.poll(0, 16.0, |_| false);
			polls.push(poll);
			if poll != PanPoll::Waiting {
				break;
			}
		}
		assert_eq!(polls.last(), Some(&PanPoll::Expired(NodeId(1, 0))));
		assert!(polls.len() > PAN_MAX_ATTEMPTS as usize);
		assert!(!s.is_pending());
	}

	#[test]
	fn retry_succeeds_once_position_shows_up() {
		let mut s = PanScheduler::default();
		s.schedule(NodeId(1, 0), 0);
		assert_eq!(s.poll(0, 16.0, |_| false), PanPoll::Waiting);
		let mut result = PanPoll::Waiting;
		for _ in 0..20 {
			result = s.poll(0, 16.0, |_| true);
			if result != PanPoll::Waiting {
				break;
			}
		}
		assert_eq!(result, PanPoll::Ready(NodeId(1, 0)));
	}

	#[test]
	fn newer_query_discards_stale_pan() {
		let mut s = PanScheduler::default();
		s.begin_query();
		s.schedule(NodeId(1, 0), 1);
		let second = s.begin_query();
		assert_eq!(second, 2);
		assert_eq!(s.poll(5, 16.0, |_| true), PanPoll::Idle);
	}
}
