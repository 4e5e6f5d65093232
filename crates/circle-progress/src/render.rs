//! Render orchestration.
//!
//! A render pass reads a [`Scene`] (a snapshot of the committed properties)
//! and either paints once or starts an animation from the last painted value
//! to the new one.

use std::sync::{Arc, Weak};

use circle_progress_core::logging::{span_names, targets};
use circle_progress_core::{PerfSpan, Runtime};
use parking_lot::Mutex;

use crate::animator::{AnimationHandle, Animator};
use crate::geometry::{Point, make_sector_path, polar_to_cartesian};
use crate::label::{Label, format_label};
use crate::number::{format_number, round_half_up};
use crate::props::{Animation, TextFormat};
use crate::surface::Surface;

/// Centre of the 100x100 view box.
const CENTER: f64 = 50.0;

/// How a render pass painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// Label only, with the indeterminate text.
    Indeterminate,
    /// Arc and label painted synchronously.
    Immediate,
    /// An animation towards the new value was started.
    Animated,
}

/// The committed properties a render pass works from.
#[derive(Debug, Clone)]
pub(crate) struct Scene {
    pub value: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub start_angle: f64,
    pub anticlockwise: bool,
    pub indeterminate_text: String,
    pub text_format: TextFormat,
    pub animation: Animation,
    pub animation_duration: f64,
}

impl Scene {
    /// Sweep in degrees for `value`. An empty range has no sweep.
    pub fn sweep(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        ((value - self.min) / range * 360.0).clamp(0.0, 360.0)
    }

    /// Arc start in drawing angles: zero points at 12 o'clock.
    pub fn arc_start(&self) -> f64 {
        self.start_angle - 90.0
    }

    fn clockwise(&self) -> bool {
        !self.anticlockwise
    }
}

/// The shapes of one widget on its surface.
pub(crate) struct Graph<S: Surface> {
    pub paper: S,
    circle: S::Node,
    sector: S::Node,
    label: Label<S::Node>,
    /// The value currently painted.
    pub value: f64,
}

impl<S: Surface> Graph<S> {
    /// Decorate the root and create the track, the value arc and the label.
    pub fn new(mut paper: S, format: &TextFormat) -> Self {
        let thickness = format.thickness();
        let radius = CENTER - thickness / 2.0;
        let stroke = format_number(thickness);
        let r = format_number(radius);
        let empty = make_sector_path(CENTER, CENTER, radius, 0.0, 0.0, true).to_string();
        let root = paper.root();

        paper.set_attribute(root, "class", "circle-progress");
        paper.set_attribute(root, "part", "svg");
        paper.set_attribute(root, "role", "progressbar");

        let circle = paper.create_element("circle");
        for (name, value) in [
            ("class", "circle-progress-circle"),
            ("part", "circle"),
            ("cx", "50"),
            ("cy", "50"),
            ("r", r.as_str()),
            ("fill", "none"),
            ("stroke", "#ddd"),
            ("stroke-width", stroke.as_str()),
        ] {
            paper.set_attribute(circle, name, value);
        }
        paper.append_child(root, circle);

        let sector = paper.create_element("path");
        for (name, value) in [
            ("d", empty.as_str()),
            ("class", "circle-progress-value"),
            ("part", "value"),
            ("fill", "none"),
            ("stroke", "#00E699"),
            ("stroke-width", stroke.as_str()),
        ] {
            paper.set_attribute(sector, name, value);
        }
        paper.append_child(root, sector);

        let text = paper.create_element("text");
        for (name, value) in [
            ("class", "circle-progress-text"),
            ("part", "text"),
            ("x", "50"),
            ("y", "50"),
            ("font", "16px Arial, sans-serif"),
            ("text-anchor", "middle"),
            ("fill", "#999"),
        ] {
            paper.set_attribute(text, name, value);
        }
        paper.append_child(root, text);

        let mut label = Label::new(text);
        label.rebuild(&mut paper, format);

        Self {
            paper,
            circle,
            sector,
            label,
            value: 0.0,
        }
    }

    /// Usable radius: half the view box net of the wider stroke.
    pub fn radius(&self) -> f64 {
        let stroke = self
            .paper
            .stroke_width(self.circle)
            .max(self.paper.stroke_width(self.sector));
        CENTER - stroke / 2.0
    }

    /// The `<text>` element holding the label.
    pub fn text_node(&self) -> S::Node {
        self.label.text()
    }

    /// The value arc.
    pub fn arc_node(&self) -> S::Node {
        self.sector
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        let stroke = format_number(thickness);
        self.paper.set_attribute(self.sector, "stroke-width", &stroke);
        self.paper.set_attribute(self.circle, "stroke-width", &stroke);
    }

    pub fn rebuild_label(&mut self, format: &TextFormat) {
        self.label.rebuild(&mut self.paper, format);
    }

    /// Set or remove an attribute on the root element.
    pub fn set_root_attribute(&mut self, name: &str, value: Option<&str>) {
        let root = self.paper.root();
        match value {
            Some(value) => self.paper.set_attribute(root, name, value),
            None => self.paper.remove_attribute(root, name),
        }
    }

    /// Paint the arc at `value` and the label showing `shown`.
    fn paint(&mut self, scene: &Scene, value: f64, shown: f64) {
        let radius = self.radius();
        let start = scene.arc_start();
        let sweep = scene.sweep(value);
        let path = make_sector_path(CENTER, CENTER, radius, start, sweep, scene.clockwise());

        self.paper.set_attribute(self.circle, "r", &format_number(radius));
        self.paper.set_attribute(self.sector, "d", &path.to_string());

        let middle = if scene.clockwise() {
            start + sweep / 2.0
        } else {
            start - sweep / 2.0
        };
        let content = format_label(
            &scene.text_format,
            Some(shown),
            scene.max,
            &scene.indeterminate_text,
        );
        let anchor = self.anchor(scene, middle, radius);
        self.label.update(&mut self.paper, &content, anchor);
    }

    fn paint_indeterminate(&mut self, scene: &Scene) {
        let radius = self.radius();
        let content = format_label(&scene.text_format, None, scene.max, &scene.indeterminate_text);
        let anchor = self.anchor(scene, scene.arc_start(), radius);
        self.label.update(&mut self.paper, &content, anchor);
    }

    fn anchor(&self, scene: &Scene, angle: f64, radius: f64) -> Option<Point> {
        matches!(scene.text_format, TextFormat::ValueOnCircle).then(|| {
            let offset = polar_to_cartesian(radius, angle);
            Point::new(CENTER + offset.x, CENTER + offset.y)
        })
    }
}

/// Whether an animation sample has landed on the target.
fn reached(sample: f64, target: f64) -> bool {
    (sample - target).abs() <= f64::EPSILON * 4.0 * target.abs().max(1.0)
}

/// Run one render pass.
///
/// Any in-flight animation is cancelled first. The graph lock is held only
/// while painting, so animation ticks never contend with the widget state.
#[tracing::instrument(skip_all, target = "circle_progress::render", level = "trace")]
pub(crate) fn render_pass<S: Surface>(
    graph: &Arc<Mutex<Graph<S>>>,
    runtime: &Runtime,
    scene: Scene,
    animation: &mut Option<AnimationHandle>,
) -> RenderKind {
    let _perf = PerfSpan::new(span_names::RENDER);
    if let Some(previous) = animation.take() {
        previous.cancel();
    }

    let Some(target) = scene.value else {
        graph.lock().paint_indeterminate(&scene);
        tracing::trace!(target: targets::RENDER, "painted indeterminate");
        return RenderKind::Indeterminate;
    };

    let mut g = graph.lock();
    let from = g.value;
    let curve = match scene.animation.curve() {
        Some(curve) if from != target => curve,
        _ => {
            g.paint(&scene, target, target);
            g.value = target;
            tracing::trace!(target: targets::RENDER, value = target, "painted");
            return RenderKind::Immediate;
        }
    };
    drop(g);

    let duration = scene.animation_duration;
    let percent = matches!(scene.text_format, TextFormat::Percent);
    let weak: Weak<Mutex<Graph<S>>> = Arc::downgrade(graph);
    let on_tick = move |sample: f64| {
        let Some(graph) = weak.upgrade() else {
            return;
        };
        let mut g = graph.lock();
        if reached(sample, target) {
            g.paint(&scene, target, target);
            g.value = target;
        } else {
            // Percent labels round on their own scale.
            let shown = if percent { sample } else { round_half_up(sample) };
            g.paint(&scene, sample, shown);
            g.value = sample;
        }
    };

    tracing::debug!(target: targets::RENDER, from, to = target, duration, "animating");
    *animation = Some(Animator::start(
        runtime,
        curve,
        from,
        target - from,
        duration,
        on_tick,
    ));
    RenderKind::Animated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::surface::SvgDocument;
    use circle_progress_core::ManualClock;
    use std::time::Duration;

    fn scene() -> Scene {
        Scene {
            value: Some(0.0),
            min: 0.0,
            max: 10.0,
            start_angle: 0.0,
            anticlockwise: false,
            indeterminate_text: "?".into(),
            text_format: TextFormat::Value,
            animation: Animation::None,
            animation_duration: 600.0,
        }
    }

    fn graph(format: &TextFormat) -> Arc<Mutex<Graph<SvgDocument>>> {
        Arc::new(Mutex::new(Graph::new(SvgDocument::default(), format)))
    }

    fn label_text(graph: &Arc<Mutex<Graph<SvgDocument>>>) -> String {
        let g = graph.lock();
        g.paper.text_content(g.label.text())
    }

    #[test]
    fn test_sweep() {
        let s = scene();
        assert_eq!(s.sweep(0.0), 0.0);
        assert_eq!(s.sweep(5.0), 180.0);
        assert_eq!(s.sweep(20.0), 360.0);
        assert_eq!(s.sweep(-1.0), 0.0);

        let flat = Scene {
            min: 3.0,
            max: 3.0,
            ..scene()
        };
        assert_eq!(flat.sweep(3.0), 0.0);
    }

    #[test]
    fn test_sweep_is_monotonic() {
        let s = scene();
        let sweeps: Vec<f64> = (0..=100).map(|i| s.sweep(f64::from(i) / 10.0)).collect();
        assert!(sweeps.windows(2).all(|w| w[0] <= w[1]));
        assert!(sweeps.iter().all(|a| (0.0..=360.0).contains(a)));
    }

    #[test]
    fn test_initial_graph() {
        let graph = graph(&TextFormat::ValueOnCircle);
        let g = graph.lock();
        assert_eq!(g.radius(), 42.0);
        let root = g.paper.root();
        assert_eq!(g.paper.attribute(root, "role"), Some("progressbar"));
        assert_eq!(g.paper.attribute(g.circle, "stroke"), Some("#ddd"));
        assert_eq!(g.paper.attribute(g.sector, "stroke"), Some("#00E699"));
    }

    #[test]
    fn test_thickness_changes_radius() {
        let graph = graph(&TextFormat::Horizontal);
        let mut g = graph.lock();
        assert_eq!(g.radius(), 46.0);
        g.set_thickness(16.0);
        assert_eq!(g.radius(), 42.0);
    }

    #[test]
    fn test_immediate_pass() {
        let runtime = Runtime::new();
        let graph = graph(&TextFormat::Value);
        let mut animation = None;
        let s = Scene {
            value: Some(5.0),
            ..scene()
        };
        assert_eq!(render_pass(&graph, &runtime, s, &mut animation), RenderKind::Immediate);
        assert!(animation.is_none());
        assert_eq!(graph.lock().value, 5.0);
        assert_eq!(label_text(&graph), "5");

        let g = graph.lock();
        let d = g.paper.attribute(g.sector, "d").unwrap_or_default().to_string();
        assert!(d.starts_with("M 50 4 A 46 46 0 0 1 "), "{d}");
    }

    #[test]
    fn test_indeterminate_pass() {
        let runtime = Runtime::new();
        let graph = graph(&TextFormat::Percent);
        let s = Scene {
            value: None,
            text_format: TextFormat::Percent,
            ..scene()
        };
        assert_eq!(
            render_pass(&graph, &runtime, s, &mut None),
            RenderKind::Indeterminate
        );
        assert_eq!(label_text(&graph), "?%");
    }

    #[test]
    fn test_animated_pass_lands_on_target() {
        let clock = Arc::new(ManualClock::new());
        let runtime = Runtime::builder().clock(clock.clone()).build();
        let graph = graph(&TextFormat::Value);
        let mut animation = None;
        let s = Scene {
            value: Some(10.0),
            animation: Animation::Easing(Easing::Linear),
            animation_duration: 1000.0,
            ..scene()
        };
        assert_eq!(render_pass(&graph, &runtime, s, &mut animation), RenderKind::Animated);

        clock.advance(Duration::from_millis(250));
        runtime.present_frame();
        assert_eq!(label_text(&graph), "3");
        assert_eq!(graph.lock().value, 2.5);

        clock.advance(Duration::from_millis(1000));
        runtime.present_frame();
        assert_eq!(label_text(&graph), "10");
        assert_eq!(graph.lock().value, 10.0);
        assert!(animation.is_some_and(|a| a.is_finished()));
    }

    #[test]
    fn test_new_pass_cancels_animation() {
        let clock = Arc::new(ManualClock::new());
        let runtime = Runtime::builder().clock(clock.clone()).build();
        let graph = graph(&TextFormat::Value);
        let mut animation = None;
        let animated = Scene {
            value: Some(10.0),
            animation: Animation::Easing(Easing::Linear),
            ..scene()
        };
        render_pass(&graph, &runtime, animated, &mut animation);
        let first = animation.clone();

        let s = Scene {
            value: Some(4.0),
            ..scene()
        };
        render_pass(&graph, &runtime, s, &mut animation);
        assert!(first.is_some_and(|a| a.is_cancelled()));
        assert_eq!(runtime.pending_frames(), 0);
        assert_eq!(label_text(&graph), "4");
    }

    #[test]
    fn test_reached() {
        assert!(reached(0.1 + (0.3 - 0.1), 0.3));
        assert!(!reached(9.99, 10.0));
    }
}
