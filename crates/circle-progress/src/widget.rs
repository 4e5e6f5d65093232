//! The circular progress widget.
//!
//! # Write path
//!
//! Every write (typed setters, the bulk accessor, construction options and
//! host attribute changes) is validated synchronously and then queued into a
//! pending batch. The batch is flushed once, by a microtask posted on the
//! [`Runtime`], or earlier by any read. A flush resolves the `min`/`max`
//! bounds, clamps `value`, commits the changes in queue order, mirrors them
//! onto the attributes and runs one render pass if anything changed.
//!
//! # Locking
//!
//! Widget state sits behind one mutex and the shapes behind another, so
//! animation ticks only touch the shapes. Signals are emitted after the
//! state lock is released, so slots may call back into the widget.

use std::fmt;
use std::sync::{Arc, Weak};

use circle_progress_core::logging::{span_names, targets};
use circle_progress_core::{PerfSpan, Runtime, Signal, TaskId};
use parking_lot::Mutex;

use crate::animator::AnimationHandle;
use crate::attributes::{self, AttributeChange, HostAttributes, attribute_to_raw};
use crate::batch::{Origin, PendingBatch};
use crate::error::{OptionsError, Result, ValidationError};
use crate::options::Options;
use crate::props::{Animation, PropKey, PropValue, RawValue, State, TextFormat, validate};
use crate::render::{Graph, RenderKind, Scene, render_pass};
use crate::surface::{Surface, SvgDocument};

/// Something to tell observers once the state lock is released.
enum Event {
    Attribute(AttributeChange),
    Rendered(RenderKind),
}

struct Shared<S: Surface> {
    inner: Mutex<Inner<S>>,
    attribute_changed: Signal<AttributeChange>,
    rendered: Signal<RenderKind>,
}

struct Inner<S: Surface> {
    runtime: Runtime,
    state: State,
    batch: PendingBatch,
    flush_task: Option<TaskId>,
    attributes: HostAttributes,
    graph: Arc<Mutex<Graph<S>>>,
    animation: Option<AnimationHandle>,
    events: Vec<Event>,
    this: Weak<Shared<S>>,
}

/// A circular progress indicator.
///
/// # Example
///
/// ```
/// use circle_progress::{CircleProgress, Options};
/// use circle_progress_core::Runtime;
///
/// let runtime = Runtime::new();
/// let progress = CircleProgress::new(
///     &runtime,
///     Options::new()
///         .with_max(20.0)
///         .with_value(5.0)
///         .with_text_format("percent".parse()?)
///         .without_animation(),
/// )?;
/// assert_eq!(progress.label_text(), "25%");
///
/// progress.set_value(10)?;
/// assert_eq!(progress.value(), Some(10.0));
/// # Ok::<(), circle_progress::ValidationError>(())
/// ```
pub struct CircleProgress<S: Surface = SvgDocument> {
    shared: Arc<Shared<S>>,
}

static_assertions::assert_impl_all!(CircleProgress: Send, Sync);

impl CircleProgress<SvgDocument> {
    /// Create a widget drawing into a new 100x100 [`SvgDocument`].
    pub fn new(runtime: &Runtime, options: Options) -> Result<Self> {
        Self::with_surface(runtime, SvgDocument::default(), options)
    }

    /// Create a widget from a JSON options document.
    pub fn from_json(runtime: &Runtime, json: &str) -> std::result::Result<Self, OptionsError> {
        let options = Options::from_json(json)?;
        Ok(Self::new(runtime, options)?)
    }

    /// The label as plain text.
    pub fn label_text(&self) -> String {
        self.with_graph(|graph| graph.paper.text_content(graph.text_node()))
    }

    /// The path data of the value arc.
    pub fn arc_path(&self) -> Option<String> {
        self.with_graph(|graph| {
            graph
                .paper
                .attribute(graph.arc_node(), "d")
                .map(str::to_string)
        })
    }

    /// An attribute of the rendering root (for example `aria-valuenow`).
    pub fn root_attribute(&self, name: &str) -> Option<String> {
        self.with_graph(|graph| {
            graph
                .paper
                .attribute(graph.paper.root(), name)
                .map(str::to_string)
        })
    }

    /// The rendering as SVG markup.
    pub fn markup(&self) -> String {
        self.with_graph(|graph| graph.paper.to_markup())
    }
}

impl<S: Surface> CircleProgress<S> {
    /// Create a widget drawing into `surface`.
    ///
    /// Options are applied in a fixed order (bounds before the value), the
    /// first render happens synchronously, and nothing is mirrored onto the
    /// host attributes.
    pub fn with_surface(runtime: &Runtime, surface: S, options: Options) -> Result<Self> {
        let writes = options
            .into_writes()
            .into_iter()
            .map(|(key, raw)| validate(key, raw).map(|value| (key, value)))
            .collect::<Result<Vec<_>>>()?;

        let state = State::default();
        let graph = Graph::new(surface, &state.text_format.get());
        let shared = Arc::new_cyclic(|this| Shared {
            inner: Mutex::new(Inner {
                runtime: runtime.clone(),
                state,
                batch: PendingBatch::default(),
                flush_task: None,
                attributes: HostAttributes::default(),
                graph: Arc::new(Mutex::new(graph)),
                animation: None,
                events: Vec::new(),
                this: this.clone(),
            }),
            attribute_changed: Signal::new(),
            rendered: Signal::new(),
        });

        {
            let mut inner = shared.inner.lock();
            for (key, value) in writes {
                inner.batch.queue(key, value, Origin::Construction);
            }
            inner.flush_without_render();
            inner.sync_aria();
            inner.render();
            inner.events.clear();
        }

        tracing::debug!(target: targets::RECONCILE, "circle progress created");
        Ok(Self { shared })
    }

    /// The attribute names mirrored onto properties.
    pub fn observed_attributes() -> impl Iterator<Item = &'static str> {
        attributes::observed_attributes()
    }

    /// The runtime this widget schedules on.
    pub fn runtime(&self) -> Runtime {
        self.shared.inner.lock().runtime.clone()
    }

    /// Emitted for every host attribute mutation, including reflected ones.
    pub fn attribute_changed(&self) -> &Signal<AttributeChange> {
        &self.shared.attribute_changed
    }

    /// Emitted after every render pass.
    pub fn rendered(&self) -> &Signal<RenderKind> {
        &self.shared.rendered
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Validate and queue a write to `key`.
    pub fn set_property(&self, key: PropKey, raw: impl Into<RawValue>) -> Result<()> {
        let value = validated(key, raw.into())?;
        self.shared.with(|inner| inner.queue(key, value, Origin::Property));
        Ok(())
    }

    /// Read a property, flushing pending writes first.
    pub fn property(&self, key: PropKey) -> PropValue {
        self.read(|state| state.get(key))
    }

    /// The current value; `None` when indeterminate.
    pub fn value(&self) -> Option<f64> {
        self.read(|state| state.value.get())
    }

    /// Set the value. Strings are parsed; `None` is rejected as
    /// non-finite, like any other input that does not parse to a number.
    pub fn set_value(&self, value: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::Value, value)
    }

    pub fn min(&self) -> f64 {
        self.read(|state| state.min.get())
    }

    pub fn set_min(&self, min: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::Min, min)
    }

    pub fn max(&self) -> f64 {
        self.read(|state| state.max.get())
    }

    pub fn set_max(&self, max: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::Max, max)
    }

    /// Rotation of the arc's zero point, in degrees from 12 o'clock.
    pub fn start_angle(&self) -> f64 {
        self.read(|state| state.start_angle.get())
    }

    /// Values outside `[0, 360]` are clamped.
    pub fn set_start_angle(&self, degrees: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::StartAngle, degrees)
    }

    pub fn anticlockwise(&self) -> bool {
        self.read(|state| state.anticlockwise.get())
    }

    pub fn set_anticlockwise(&self, anticlockwise: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::Anticlockwise, anticlockwise)
    }

    pub fn unconstrained(&self) -> bool {
        self.read(|state| state.unconstrained.get())
    }

    pub fn set_unconstrained(&self, unconstrained: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::Unconstrained, unconstrained)
    }

    pub fn indeterminate_text(&self) -> String {
        self.read(|state| state.indeterminate_text.get())
    }

    pub fn set_indeterminate_text(&self, text: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::IndeterminateText, text)
    }

    pub fn text_format(&self) -> TextFormat {
        self.read(|state| state.text_format.get())
    }

    pub fn set_text_format(&self, format: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::TextFormat, format)
    }

    pub fn animation(&self) -> Animation {
        self.read(|state| state.animation.get())
    }

    pub fn set_animation(&self, animation: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::Animation, animation)
    }

    /// Animation duration in milliseconds.
    pub fn animation_duration(&self) -> f64 {
        self.read(|state| state.animation_duration.get())
    }

    /// Negative durations are clamped to zero.
    pub fn set_animation_duration(&self, ms: impl Into<RawValue>) -> Result<()> {
        self.set_property(PropKey::AnimationDuration, ms)
    }

    /// Whether the widget has no value to show.
    pub fn is_indeterminate(&self) -> bool {
        self.value().is_none()
    }

    // =========================================================================
    // Bulk accessor
    // =========================================================================

    /// Read a property by name.
    pub fn attr(&self, name: &str) -> Result<PropValue> {
        let key = PropKey::from_name(name).ok_or_else(|| ValidationError::unknown_property(name))?;
        Ok(self.property(key))
    }

    /// Write a property by name.
    pub fn set_attr(&self, name: &str, raw: impl Into<RawValue>) -> Result<()> {
        let key = PropKey::from_name(name).ok_or_else(|| ValidationError::unknown_property(name))?;
        self.set_property(key, raw)
    }

    /// Write several properties at once.
    ///
    /// Every pair is validated before any is queued, so either all writes
    /// land in the same batch or none do.
    pub fn set_attrs<I, K, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        let writes = pairs
            .into_iter()
            .map(|(name, raw)| {
                let name = name.as_ref();
                let key = PropKey::from_name(name)
                    .ok_or_else(|| ValidationError::unknown_property(name))?;
                validated(key, raw.into()).map(|value| (key, value))
            })
            .collect::<Result<Vec<_>>>()?;

        self.shared.with(|inner| {
            for (key, value) in writes {
                inner.queue(key, value, Origin::Property);
            }
        });
        Ok(())
    }

    /// Write several properties from JSON: an object, or a list of
    /// `[name, value]` pairs.
    pub fn set_attrs_json(&self, json: &serde_json::Value) -> Result<()> {
        self.set_attrs(json_pairs(json)?)
    }

    // =========================================================================
    // Host attributes
    // =========================================================================

    /// Set a host attribute, as a document would.
    ///
    /// Mirrored attributes are validated first; a rejected value leaves the
    /// attribute untouched.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        let validated = match PropKey::from_attribute(name) {
            Some(key) => Some((key, validated(key, attribute_to_raw(key, Some(value)))?)),
            None => None,
        };
        self.shared.with(|inner| {
            let change = inner.attributes.set(name, value.to_string());
            inner.attribute_changed(change, validated);
        });
        Ok(())
    }

    /// Remove a host attribute.
    ///
    /// Removing a boolean attribute turns its property off. The other
    /// mirrored properties have no value to fall back to, so removing them
    /// fails and the attribute stays.
    pub fn remove_attribute(&self, name: &str) -> Result<()> {
        let key = PropKey::from_attribute(name);
        self.shared.with(|inner| -> Result<()> {
            if inner.attributes.get(name).is_none() {
                return Ok(());
            }
            let validated = match key {
                Some(key) => Some((key, validated(key, attribute_to_raw(key, None))?)),
                None => None,
            };
            if let Some(change) = inner.attributes.remove(name) {
                inner.attribute_changed(change, validated);
            }
            Ok(())
        })
    }

    /// Read a host attribute, flushing pending writes first.
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.shared.with(|inner| {
            inner.flush();
            inner.attributes.get(name).map(str::to_string)
        })
    }

    /// All host attributes in insertion order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.shared.with(|inner| {
            inner.flush();
            inner
                .attributes
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        })
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Apply pending writes now instead of waiting for the flush microtask.
    pub fn flush(&self) {
        self.shared.with(Inner::flush);
    }

    /// Whether writes are waiting for a flush.
    pub fn has_pending_changes(&self) -> bool {
        !self.shared.inner.lock().batch.is_empty()
    }

    /// The value currently painted. Trails [`value`](Self::value) while an
    /// animation is running.
    pub fn rendered_value(&self) -> f64 {
        self.with_graph(|graph| graph.value)
    }

    /// Whether an animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.shared.with(|inner| {
            inner.flush();
            inner.animation.as_ref().is_some_and(AnimationHandle::is_active)
        })
    }

    /// The arc radius, net of the stroke width.
    pub fn radius(&self) -> f64 {
        self.with_graph(Graph::radius)
    }

    /// Inspect the drawing surface.
    pub fn with_paper<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.with_graph(|graph| f(&graph.paper))
    }

    fn with_graph<R>(&self, f: impl FnOnce(&Graph<S>) -> R) -> R {
        let graph = self.shared.with(|inner| {
            inner.flush();
            inner.graph.clone()
        });
        let graph = graph.lock();
        f(&graph)
    }

    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        self.shared.with(|inner| {
            inner.flush();
            f(&inner.state)
        })
    }
}

impl<S: Surface> fmt::Debug for CircleProgress<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("CircleProgress")
            .field("state", &inner.state)
            .field("pending", &inner.batch.len())
            .finish()
    }
}

fn validated(key: PropKey, raw: RawValue) -> Result<PropValue> {
    validate(key, raw).inspect_err(|err| {
        tracing::debug!(target: targets::RECONCILE, property = key.name(), %err, "rejected write");
    })
}

fn json_pairs(json: &serde_json::Value) -> Result<Vec<(String, RawValue)>> {
    use serde_json::Value;

    match json {
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| RawValue::try_from(value).map(|raw| (name.clone(), raw)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.as_array().map(Vec::as_slice) {
                Some([Value::String(name), value]) => {
                    RawValue::try_from(value).map(|raw| (name.clone(), raw))
                }
                _ => Err(ValidationError::wrong_argument(format!(
                    "expected a [name, value] pair, got {item}"
                ))),
            })
            .collect(),
        other => Err(ValidationError::wrong_argument(format!(
            "expected an object or a list of pairs, got {other}"
        ))),
    }
}

// =============================================================================
// Shared state
// =============================================================================

impl<S: Surface> Shared<S> {
    /// Run `f` under the state lock, then deliver the events it produced.
    fn with<R>(&self, f: impl FnOnce(&mut Inner<S>) -> R) -> R {
        let (result, events) = {
            let mut inner = self.inner.lock();
            let result = f(&mut inner);
            (result, std::mem::take(&mut inner.events))
        };
        for event in events {
            match event {
                Event::Attribute(change) => self.attribute_changed.emit(change),
                Event::Rendered(kind) => self.rendered.emit(kind),
            }
        }
        result
    }
}

impl<S: Surface> Inner<S> {
    /// Queue a validated write and make sure a flush is scheduled.
    fn queue(&mut self, key: PropKey, value: PropValue, origin: Origin) {
        tracing::trace!(target: targets::RECONCILE, property = key.name(), ?origin, "queued");
        self.batch.queue(key, value, origin);
        if self.flush_task.is_none() {
            let this = self.this.clone();
            self.flush_task = Some(self.runtime.post_microtask(move || {
                if let Some(shared) = this.upgrade() {
                    shared.with(|inner| {
                        inner.flush_task = None;
                        inner.flush();
                    });
                }
            }));
        }
    }

    /// Apply the pending batch and render if anything changed.
    fn flush(&mut self) {
        if self.flush_without_render() {
            self.render();
        }
    }

    /// Apply the pending batch. Returns `true` if any property changed.
    #[tracing::instrument(skip_all, target = "circle_progress::reconcile", level = "trace")]
    fn flush_without_render(&mut self) -> bool {
        if let Some(task) = self.flush_task.take() {
            self.runtime.cancel_microtask(task);
        }
        if self.batch.is_empty() {
            return false;
        }
        let _perf = PerfSpan::new(span_names::FLUSH);

        let mut batch = std::mem::take(&mut self.batch);
        batch.resolve_constraints(&self.state);

        let mut changed = false;
        let mut bounds_changed = false;
        for entry in batch.into_entries() {
            if self.apply(entry.key, entry.value, entry.origin) {
                changed = true;
                bounds_changed |= matches!(
                    entry.key,
                    PropKey::Min | PropKey::Max | PropKey::Unconstrained
                );
            }
        }

        if bounds_changed
            && !self.state.unconstrained.get()
            && let Some(value) = self.state.value.get()
        {
            let clamped = value.max(self.state.min.get()).min(self.state.max.get());
            if clamped != value {
                tracing::trace!(target: targets::RECONCILE, value, clamped, "re-clamping value");
                self.apply(PropKey::Value, PropValue::Number(clamped), Origin::Property);
            }
        }

        tracing::trace!(target: targets::RECONCILE, changed, "flushed");
        changed
    }

    /// Commit one write and run its side effects. Returns `true` if the
    /// property changed.
    fn apply(&mut self, key: PropKey, value: PropValue, origin: Origin) -> bool {
        if !self.state.commit(key, value.clone()) {
            return false;
        }

        if let Some(aria) = key.aria_attribute() {
            let text = value.to_attribute();
            self.graph.lock().set_root_attribute(aria, text.as_deref());
        }
        if key == PropKey::TextFormat {
            let format = self.state.text_format.get();
            let mut graph = self.graph.lock();
            graph.rebuild_label(&format);
            graph.set_thickness(format.thickness());
        }
        if origin.reflects()
            && let Some(change) = self.attributes.reflect(key, &value)
        {
            self.attribute_changed(change, None);
        }
        true
    }

    /// The attribute-changed notification. Self-induced changes consume an
    /// armed count and stop here; external ones queue their property.
    fn attribute_changed(&mut self, change: AttributeChange, validated: Option<(PropKey, PropValue)>) {
        self.events.push(Event::Attribute(change));
        if self.attributes.consume() {
            return;
        }
        if let Some((key, value)) = validated {
            self.queue(key, value, Origin::Attribute);
        }
    }

    /// Write all three ARIA attributes from the committed state.
    fn sync_aria(&mut self) {
        let mut graph = self.graph.lock();
        for key in [PropKey::Value, PropKey::Min, PropKey::Max] {
            if let Some(aria) = key.aria_attribute() {
                let text = self.state.get(key).to_attribute();
                graph.set_root_attribute(aria, text.as_deref());
            }
        }
    }

    fn render(&mut self) {
        let scene = self.scene();
        let kind = render_pass(&self.graph, &self.runtime, scene, &mut self.animation);
        self.events.push(Event::Rendered(kind));
    }

    fn scene(&self) -> Scene {
        let state = &self.state;
        Scene {
            value: state.value.get(),
            min: state.min.get(),
            max: state.max.get(),
            start_angle: state.start_angle.get(),
            anticlockwise: state.anticlockwise.get(),
            indeterminate_text: state.indeterminate_text.get(),
            text_format: state.text_format.get(),
            animation: state.animation.get(),
            animation_duration: state.animation_duration.get(),
        }
    }
}

impl<S: Surface> Drop for Inner<S> {
    fn drop(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.cancel();
        }
        if let Some(task) = self.flush_task.take() {
            self.runtime.cancel_microtask(task);
        }
    }
}
