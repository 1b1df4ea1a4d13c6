//! Pan/zoom state: the overlay transform, its fitted starting point, and
//! the animated transitions between transforms.

use log::info;

use super::layout::{Bounds, MIN_EXTENT};

/// Smallest allowed scale.
pub const MIN_SCALE: f64 = 0.2;
/// Largest allowed scale.
pub const MAX_SCALE: f64 = 3.0;
/// Scale factor of one zoom button press.
pub const ZOOM_STEP: f64 = 1.2;
/// Length of a zoom transition.
pub const ZOOM_DURATION_MS: f64 = 300.0;
/// Length of a pan or reset transition.
pub const PAN_DURATION_MS: f64 = 750.0;

const FIT_RATIO: f64 = 0.8;
const TOP_MARGIN: f64 = 50.0;

/// Translate then scale, applied with the origin at the container's top-left.
/// Always read and written as a whole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translate in pixels.
	pub x: f64,
	/// Vertical translate in pixels.
	pub y: f64,
	/// Scale.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Container pixel to world coordinates.
	pub fn screen_to_world(&self, (sx, sy): (f64, f64)) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// World coordinates to container pixel.
	pub fn world_to_screen(&self, (wx, wy): (f64, f64)) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		Self {
			x: self.x + (to.x - self.x) * t,
			y: self.y + (to.y - self.y) * t,
			k: self.k + (to.k - self.k) * t,
		}
	}
}

fn clamp_scale(k: f64) -> f64 {
	k.clamp(MIN_SCALE, MAX_SCALE)
}

fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

impl Transition {
	fn current(&self) -> ViewTransform {
		let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
		self.from.lerp(&self.to, ease_cubic_in_out(t))
	}

	fn done(&self) -> bool {
		self.elapsed >= self.duration
	}
}

/// The live transform plus the container it is fitted to.
#[derive(Clone, Debug)]
pub(crate) struct Viewport {
	transform: ViewTransform,
	initial: Option<ViewTransform>,
	transition: Option<Transition>,
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform::default(),
			initial: None,
			transition: None,
			width,
			height,
		}
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn initial(&self) -> Option<ViewTransform> {
		self.initial
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Frames `bounds` in the container the first time it is called; later
	/// calls return `false` and leave the user's view alone.
	pub fn fit_initial(&mut self, bounds: Option<Bounds>) -> bool {
		if self.initial.is_some() {
			return false;
		}
		let fitted = self.fit(bounds);
		info!(
			"initial fit: translate ({:.1}, {:.1}) scale {:.3}",
			fitted.x, fitted.y, fitted.k
		);
		self.initial = Some(fitted);
		self.transform = fitted;
		self.transition = None;
		true
	}

	/// Forgets the stored fit so the next layout re-frames the tree.
	pub fn clear_initial(&mut self) {
		self.initial = None;
	}

	fn fit(&self, bounds: Option<Bounds>) -> ViewTransform {
		let (center_x, top, width, height) = match bounds {
			Some(b) => (b.center_x(), b.top, b.width(), b.height()),
			None => (0.0, 0.0, 0.0, 0.0),
		};
		let k = (self.width * FIT_RATIO / width.max(MIN_EXTENT))
			.min(self.height * FIT_RATIO / height.max(MIN_EXTENT))
			.min(1.0);
		ViewTransform {
			x: self.width / 2.0 - center_x * k,
			y: TOP_MARGIN - top * k,
			k,
		}
	}

	pub fn zoom_in(&mut self) {
		self.zoom_by(ZOOM_STEP);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_by(1.0 / ZOOM_STEP);
	}

	/// Rescales about the current pan origin; translate is kept as is.
	fn zoom_by(&mut self, factor: f64) {
		let current = self.transform;
		let target = ViewTransform {
			k: clamp_scale(current.k * factor),
			..current
		};
		self.animate_to(target, ZOOM_DURATION_MS);
	}

	/// Moves so `world` lands in the middle of the container, at the current scale.
	pub fn pan_to(&mut self, world: (f64, f64)) {
		let k = self.transform.k;
		let target = ViewTransform {
			x: self.width / 2.0 - world.0 * k,
			y: self.height / 2.0 - world.1 * k,
			k,
		};
		self.animate_to(target, PAN_DURATION_MS);
	}

	pub fn reset_to_initial(&mut self) {
		if let Some(initial) = self.initial {
			self.animate_to(initial, PAN_DURATION_MS);
		}
	}

	/// Starts a transition from wherever the view is now, replacing any
	/// transition already running.
	pub fn animate_to(&mut self, target: ViewTransform, duration_ms: f64) {
		let target = ViewTransform {
			k: clamp_scale(target.k),
			..target
		};
		if duration_ms <= 0.0 {
			self.transition = None;
			self.transform = target;
			return;
		}
		self.transition = Some(Transition {
			from: self.transform,
			to: target,
			elapsed: 0.0,
			duration: duration_ms,
		});
	}

	/// Advances the running transition. Returns whether the transform moved.
	pub fn tick(&mut self, dt_ms: f64) -> bool {
		let Some(transition) = self.transition.as_mut() else {
			return false;
		};
		transition.elapsed += dt_ms.max(0.0);
		let next = if transition.done() {
			let to = transition.to;
			self.transition = None;
			to
		} else {
			transition.current()
		};
		let moved = next != self.transform;
		self.transform = next;
		moved
	}

	/// Drops any running transition, keeping the transform where it is.
	pub fn interrupt(&mut self) {
		self.transition = None;
	}

	/// Gesture pan: shifts the view by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.interrupt();
		self.transform.x += dx;
		self.transform.y += dy;
	}

	/// Gesture zoom about a screen point, which stays under the cursor.
	pub fn zoom_at(&mut self, point: (f64, f64), factor: f64) {
		self.interrupt();
		let t = self.transform;
		let k = clamp_scale(t.k * factor);
		let ratio = k / t.k;
		self.transform = ViewTransform {
			x: point.0 - (point.0 - t.x) * ratio,
			y: point.1 - (point.1 - t.y) * ratio,
			k,
		};
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f64 = 1e-9;

	fn settle(viewport: &mut Viewport) {
		viewport.tick(10_000.0);
	}

	fn bounds(left: f64, right: f64, top: f64, bottom: f64) -> Bounds {
		Bounds {
			left,
			right,
			top,
			bottom,
		}
	}

	#[test]
	fn fits_small_tree_at_natural_size() {
		let mut v = Viewport::new(800.0, 700.0);
		assert!(v.fit_initial(Some(bounds(-100.0, 240.0, 0.0, 390.0))));
		let t = v.transform();
		assert_eq!(t.k, 1.0);
		assert!((t.x - (400.0 - 70.0)).abs() < EPS);
		assert!((t.y - 50.0).abs() < EPS);
	}

	#[test]
	fn fits_wide_tree_by_shrinking() {
		let mut v = Viewport::new(800.0, 700.0);
		v.fit_initial(Some(bounds(0.0, 1600.0, 0.0, 400.0)));
		let t = v.transform();
		assert!((t.k - 0.4).abs() < EPS);
		assert!((t.x - (400.0 - 800.0 * 0.4)).abs() < EPS);
	}

	#[test]
	fn fit_with_nothing_to_show_stays_finite() {
		let mut v = Viewport::new(800.0, 700.0);
		v.fit_initial(None);
		let t = v.transform();
		assert!(t.x.is_finite() && t.y.is_finite() && t.k.is_finite());
		assert_eq!(t.k, 1.0);
	}

	#[test]
	fn only_the_first_fit_counts() {
		let mut v = Viewport::new(800.0, 700.0);
		v.fit_initial(Some(bounds(0.0, 140.0, 0.0, 140.0)));
		v.pan_by(30.0, -12.0);
		let panned = v.transform();
		assert!(!v.fit_initial(Some(bounds(0.0, 5000.0, 0.0, 5000.0))));
		assert_eq!(v.transform(), panned);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut v = Viewport::new(800.0, 700.0);
		for _ in 0..20 {
			v.zoom_in();
			settle(&mut v);
			assert!(v.transform().k <= MAX_SCALE);
		}
		assert!((v.transform().k - MAX_SCALE).abs() < EPS);
		for _ in 0..40 {
			v.zoom_out();
			settle(&mut v);
			assert!(v.transform().k >= MIN_SCALE);
		}
		assert!((v.transform().k - MIN_SCALE).abs() < EPS);
	}

	#[test]
	fn zoom_keeps_translate() {
		let mut v = Viewport::new(800.0, 700.0);
		v.pan_by(120.0, 40.0);
		v.zoom_in();
		settle(&mut v);
		let t = v.transform();
		assert_eq!((t.x, t.y), (120.0, 40.0));
		assert!((t.k - 1.2).abs() < EPS);
	}

	#[test]
	fn zoom_animates_over_its_duration() {
		let mut v = Viewport::new(800.0, 700.0);
		v.zoom_in();
		assert!(v.tick(150.0));
		let mid = v.transform().k;
		assert!(mid > 1.0 && mid < 1.2);
		assert!(v.is_animating());
		v.tick(150.0);
		assert!(!v.is_animating());
		assert!((v.transform().k - 1.2).abs() < EPS);
	}

	#[test]
	fn pan_centres_point_at_current_scale() {
		let mut v = Viewport::new(800.0, 600.0);
		v.zoom_out();
		settle(&mut v);
		let k = v.transform().k;
		v.pan_to((500.0, 320.0));
		settle(&mut v);
		let t = v.transform();
		assert_eq!(t.k, k);
		let (sx, sy) = t.world_to_screen((500.0, 320.0));
		assert!((sx - 400.0).abs() < EPS && (sy - 300.0).abs() < EPS);
	}

	#[test]
	fn reset_returns_to_the_fitted_transform() {
		let mut v = Viewport::new(800.0, 700.0);
		v.fit_initial(Some(bounds(-300.0, 440.0, 0.0, 890.0)));
		let initial = v.transform();
		v.zoom_in();
		v.tick(100.0);
		v.pan_by(-50.0, 80.0);
		v.zoom_at((10.0, 10.0), 2.0);
		v.pan_to((1000.0, 1000.0));
		v.tick(200.0);
		v.reset_to_initial();
		settle(&mut v);
		let t = v.transform();
		assert!((t.x - initial.x).abs() < EPS);
		assert!((t.y - initial.y).abs() < EPS);
		assert!((t.k - initial.k).abs() < EPS);
	}

	#[test]
	fn later_transition_overrides_earlier() {
		let mut v = Viewport::new(800.0, 700.0);
		v.pan_to((1000.0, 0.0));
		v.tick(100.0);
		v.pan_to((0.0, 0.0));
		settle(&mut v);
		assert_eq!(v.transform(), ViewTransform {
			x: 400.0,
			y: 350.0,
			k: 1.0
		});
	}

	#[test]
	fn gestures_cancel_transitions() {
		let mut v = Viewport::new(800.0, 700.0);
		v.pan_to((1000.0, 1000.0));
		v.tick(100.0);
		v.pan_by(5.0, 5.0);
		assert!(!v.is_animating());
		let held = v.transform();
		assert!(!v.tick(500.0));
		assert_eq!(v.transform(), held);
	}

	#[test]
	fn wheel_zoom_keeps_point_under_cursor() {
		let mut v = Viewport::new(800.0, 700.0);
		v.pan_by(100.0, 50.0);
		let before = v.transform().screen_to_world((300.0, 200.0));
		v.zoom_at((300.0, 200.0), 1.5);
		let after = v.transform().screen_to_world((300.0, 200.0));
		assert!((before.0 - after.0).abs() < EPS && (before.1 - after.1).abs() < EPS);
		v.zoom_at((300.0, 200.0), 100.0);
		assert_eq!(v.transform().k, MAX_SCALE);
	}
}
