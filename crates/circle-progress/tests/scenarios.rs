//! End-to-end behaviour of the progress widget: clamping, validation,
//! labels and animation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use circle_progress::{
    Animation, CircleProgress, Easing, EasingFn, Formatter, ManualClock, Options, RenderKind,
    Runtime, TextFormat, ValidationError,
};
use parking_lot::Mutex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn manual() -> (Runtime, Arc<ManualClock>) {
    init_tracing();
    let clock = Arc::new(ManualClock::new());
    let runtime = Runtime::builder().clock(clock.clone()).build();
    (runtime, clock)
}

/// Advance the clock in 16ms frames, running a turn after each.
fn pump(runtime: &Runtime, clock: &ManualClock, ms: u64) {
    let mut elapsed = 0;
    while elapsed < ms {
        let step = (ms - elapsed).min(16);
        clock.advance(Duration::from_millis(step));
        runtime.turn();
        elapsed += step;
    }
}

fn still(runtime: &Runtime, options: Options) -> CircleProgress {
    CircleProgress::new(runtime, options.without_animation()).unwrap()
}

#[test]
fn test_string_values_are_coerced() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_min(0.0).with_max(10.0).with_value(5.0));
    assert_eq!(progress.value(), Some(5.0));

    progress.set_value("6").unwrap();
    assert_eq!(progress.value(), Some(6.0));

    progress.set_value(" 7.5px").unwrap();
    assert_eq!(progress.value(), Some(7.5));
}

#[test]
fn test_value_is_clamped_into_bounds() {
    let (runtime, _clock) = manual();
    let progress = still(
        &runtime,
        Options::new()
            .with_min(2.0)
            .with_max(10.0)
            .with_unconstrained(false)
            .with_value(-2.0),
    );
    assert_eq!(progress.value(), Some(2.0));

    progress.set_value(20).unwrap();
    assert_eq!(progress.value(), Some(10.0));

    progress.set_max(8).unwrap();
    assert_eq!(progress.value(), Some(8.0));
    assert_eq!(progress.get_attribute("value").as_deref(), Some("8"));
    assert_eq!(progress.root_attribute("aria-valuenow").as_deref(), Some("8"));
}

#[test]
fn test_clamp_law() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new());
    for (a, b) in [(0.0, 1.0), (-5.0, 5.0), (3.0, 3.0), (10.0, 250.0)] {
        progress.set_min(a).unwrap();
        progress.set_max(b).unwrap();
        progress.flush();
        for x in [a - 100.0, a, (a + b) / 2.0, b, b + 100.0] {
            progress.set_value(x).unwrap();
            assert_eq!(progress.value(), Some(x.clamp(a, b)), "min {a} max {b} value {x}");
        }
    }
}

#[test]
fn test_unconstrained_value_escapes_bounds() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_max(10.0).with_unconstrained(true));
    progress.set_value(15).unwrap();
    assert_eq!(progress.value(), Some(15.0));
    assert_eq!(progress.label_text(), "15/10");

    progress.set_unconstrained(false).unwrap();
    assert_eq!(progress.value(), Some(10.0));
}

#[test]
fn test_non_finite_write_is_rejected() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_value(0.5));

    let err = progress.set_value(f64::NAN).unwrap_err();
    assert_eq!(err, ValidationError::NonFinite { property: "value" });
    assert!(err.to_string().contains("non-finite"));

    assert!(progress.set_value(f64::INFINITY).is_err());
    assert!(progress.set_max("lots").is_err());
    assert!(progress.set_min("").is_err());

    assert!(!progress.has_pending_changes());
    assert_eq!(progress.value(), Some(0.5));
    assert_eq!(progress.max(), 1.0);
    assert_eq!(progress.get_attribute("value"), None);
}

#[test]
fn test_illegal_identifiers_are_rejected() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new());

    assert!(matches!(
        progress.set_text_format("diagonal"),
        Err(ValidationError::IllegalTextFormat { .. })
    ));
    assert!(matches!(
        progress.set_animation("bounce"),
        Err(ValidationError::IllegalEasing { .. })
    ));
    assert!(matches!(
        progress.set_animation(3),
        Err(ValidationError::AnimationType { got: "number" })
    ));
    assert_eq!(progress.text_format(), TextFormat::Horizontal);
    assert_eq!(progress.animation(), Animation::None);
}

#[test]
fn test_percent_label() {
    let (runtime, _clock) = manual();
    let progress = still(
        &runtime,
        Options::new()
            .with_text_format(TextFormat::Percent)
            .with_max(20.0)
            .with_value(5.0),
    );
    assert_eq!(progress.label_text(), "25%");

    let pending = still(&runtime, Options::new().with_text_format(TextFormat::Percent));
    assert_eq!(pending.label_text(), "?%");
}

#[test]
fn test_clearing_value_is_rejected() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_value(0.5));

    assert!(matches!(
        progress.set_value(None::<f64>),
        Err(ValidationError::NonFinite { property: "value" })
    ));
    assert!(matches!(
        progress.set_attrs_json(&serde_json::json!({ "value": null })),
        Err(ValidationError::NonFinite { property: "value" })
    ));
    assert_eq!(progress.value(), Some(0.5));
    assert!(!progress.is_indeterminate());
    assert!(!progress.has_pending_changes());
}

#[test]
fn test_percent_label_after_animation() {
    let (runtime, clock) = manual();
    let progress = CircleProgress::new(
        &runtime,
        Options::new()
            .with_text_format(TextFormat::Percent)
            .with_max(20.0)
            .with_value(5.0),
    )
    .unwrap();
    assert!(progress.is_animating());

    pump(&runtime, &clock, 700);
    assert!(!progress.is_animating());
    assert_eq!(progress.label_text(), "25%");
}

#[test]
fn test_disabled_animation_paints_immediately() {
    let (runtime, _clock) = manual();
    let progress = CircleProgress::new(
        &runtime,
        Options::new()
            .with_animation(Animation::None)
            .with_text_format(TextFormat::Value)
            .with_max(10.0)
            .with_value(0.0),
    )
    .unwrap();

    let kinds = Arc::new(Mutex::new(Vec::new()));
    let k = kinds.clone();
    progress.rendered().connect(move |kind| k.lock().push(*kind));

    progress.set_value(10).unwrap();
    runtime.run_microtasks();
    assert_eq!(progress.label_text(), "10");
    assert_eq!(runtime.pending_frames(), 0);
    assert_eq!(*kinds.lock(), vec![RenderKind::Immediate]);
}

#[test]
fn test_linear_animation_passes_through_midpoint() {
    let (runtime, clock) = manual();
    let progress = CircleProgress::new(
        &runtime,
        Options::new()
            .with_animation(Easing::Linear)
            .with_animation_duration(1000.0)
            .with_text_format(TextFormat::Value)
            .with_max(10.0)
            .with_value(0.0),
    )
    .unwrap();

    progress.set_value(10).unwrap();
    runtime.turn();
    assert_eq!(progress.label_text(), "0");

    clock.advance(Duration::from_millis(100));
    runtime.turn();
    let shown: f64 = progress.label_text().parse().unwrap();
    assert!(shown > 0.0 && shown < 10.0, "{shown}");
    assert_eq!(progress.rendered_value(), 1.0);

    pump(&runtime, &clock, 1000);
    assert_eq!(progress.label_text(), "10");
    assert_eq!(progress.rendered_value(), 10.0);
    assert!(!progress.is_animating());
    assert_eq!(runtime.pending_frames(), 0);
}

#[test]
fn test_retarget_starts_from_painted_value() {
    let (runtime, clock) = manual();
    let progress = CircleProgress::new(
        &runtime,
        Options::new()
            .with_animation(Easing::Linear)
            .with_animation_duration(1000.0)
            .with_text_format(TextFormat::Value)
            .with_max(10.0)
            .with_value(0.0),
    )
    .unwrap();

    progress.set_value(10).unwrap();
    runtime.turn();
    clock.advance(Duration::from_millis(500));
    runtime.turn();
    assert_eq!(progress.rendered_value(), 5.0);

    progress.set_value(0).unwrap();
    runtime.turn();
    assert_eq!(progress.label_text(), "5");

    clock.advance(Duration::from_millis(250));
    runtime.turn();
    assert_eq!(progress.rendered_value(), 3.75);

    pump(&runtime, &clock, 1000);
    assert_eq!(progress.label_text(), "0");
}

#[test]
fn test_custom_easing() {
    let (runtime, clock) = manual();
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let progress = CircleProgress::new(
        &runtime,
        Options::new()
            .with_easing_fn(move |_elapsed, start, delta, _duration| {
                c.fetch_add(1, Ordering::SeqCst);
                start + delta / 2.0
            })
            .with_animation_duration(100.0)
            .with_text_format(TextFormat::Value)
            .with_max(8.0)
            .with_value(0.0),
    )
    .unwrap();

    progress.set_value(8).unwrap();
    runtime.turn();
    assert_eq!(progress.label_text(), "4");
    assert!(calls.load(Ordering::SeqCst) >= 1);

    pump(&runtime, &clock, 200);
    assert_eq!(progress.label_text(), "8");
    assert!(matches!(progress.animation(), Animation::Custom(_)));
}

#[test]
fn test_animation_can_be_swapped_mid_flight() {
    let (runtime, clock) = manual();
    let progress = CircleProgress::new(
        &runtime,
        Options::new()
            .with_animation(Easing::EaseInQuadr)
            .with_text_format(TextFormat::Value)
            .with_max(10.0)
            .with_value(0.0),
    )
    .unwrap();

    progress.set_value(10).unwrap();
    runtime.turn();
    clock.advance(Duration::from_millis(100));
    runtime.turn();
    assert!(progress.is_animating());

    progress.set_animation(EasingFn::new(|_, start, delta, _| start + delta)).unwrap();
    progress.set_animation("none").unwrap();
    runtime.turn();
    assert!(!progress.is_animating());
    assert_eq!(progress.label_text(), "10");
}

#[test]
fn test_custom_formatter_receives_value_and_max() {
    let (runtime, _clock) = manual();
    let progress = still(
        &runtime,
        Options::new()
            .with_formatter(|value, max| match (value, max) {
                (Some(v), Some(m)) => format!("{v} of {m}"),
                (None, Some(m)) => format!("? of {m}"),
                _ => String::from("-"),
            })
            .with_max(4.0),
    );
    assert_eq!(progress.label_text(), "? of 4");

    progress.set_value(3).unwrap();
    assert_eq!(progress.label_text(), "3 of 4");
    assert_eq!(progress.get_attribute("text-format"), None);
}

#[test]
fn test_formatter_set_after_construction() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_value(1.0));
    progress
        .set_text_format(Formatter::new(|value, _| format!("[{}]", value.unwrap_or(0.0))))
        .unwrap();
    assert_eq!(progress.label_text(), "[1]");
    assert!(matches!(progress.text_format(), TextFormat::Custom(_)));
}

#[test]
fn test_indeterminate_text() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_indeterminate_text("n/a"));
    assert!(progress.is_indeterminate());
    assert_eq!(progress.label_text(), "n/a/1");

    progress.set_text_format("value").unwrap();
    assert_eq!(progress.label_text(), "n/a");

    progress.set_indeterminate_text(42).unwrap();
    assert_eq!(progress.label_text(), "42");
}

#[test]
fn test_vertical_and_value_on_circle_layouts() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_text_format(TextFormat::Vertical).with_value(0.5));
    assert_eq!(progress.label_text(), "0.5___1");
    assert_eq!(progress.radius(), 46.0);

    progress.set_text_format("valueOnCircle").unwrap();
    assert_eq!(progress.radius(), 42.0);
    assert_eq!(progress.label_text(), "0.51");
    progress.with_paper(|paper| {
        let value = paper.find_by_class("circle-progress-text-value").unwrap();
        // Half of a half turn from 12 o'clock lands at 3 o'clock.
        assert_eq!(paper.attribute(value, "x"), Some("92"));
        assert_eq!(paper.attribute(value, "y"), Some("50"));
    });
}

#[test]
fn test_arc_direction() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_value(0.25));
    let arc = progress.arc_path().unwrap();
    assert!(arc.starts_with("M 50 4 A 46 46 0 0 1 "), "{arc}");

    progress.set_anticlockwise(true).unwrap();
    let arc = progress.arc_path().unwrap();
    assert!(arc.starts_with("M 50 4 A 46 46 0 0 0 "), "{arc}");

    progress.set_value(0.75).unwrap();
    let arc = progress.arc_path().unwrap();
    assert!(arc.starts_with("M 50 4 A 46 46 0 1 0 "), "{arc}");
}

#[test]
fn test_start_angle_is_clamped() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new());
    progress.set_start_angle(400).unwrap();
    assert_eq!(progress.start_angle(), 360.0);
    progress.set_start_angle(-10).unwrap();
    assert_eq!(progress.start_angle(), 0.0);

    progress.set_animation_duration(-5).unwrap();
    assert_eq!(progress.animation_duration(), 0.0);
}

#[test]
fn test_markup_contains_shapes() {
    let (runtime, _clock) = manual();
    let progress = still(&runtime, Options::new().with_value(0.5));
    let markup = progress.markup();
    assert!(markup.starts_with("<svg "));
    assert!(markup.contains("class=\"circle-progress\""));
    assert!(markup.contains("role=\"progressbar\""));
    assert!(markup.contains("<circle class=\"circle-progress-circle\""));
    assert!(markup.contains("class=\"circle-progress-value\""));
    assert!(markup.contains("aria-valuenow=\"0.5\""));
}

#[test]
fn test_from_json() {
    let (runtime, _clock) = manual();
    let progress = CircleProgress::from_json(
        &runtime,
        r#"{"max": 4, "value": 1, "animation": "none", "textFormat": "percent"}"#,
    )
    .unwrap();
    assert_eq!(progress.label_text(), "25%");

    assert!(CircleProgress::from_json(&runtime, r#"{"value": "lots"}"#).is_err());
    assert!(CircleProgress::from_json(&runtime, r#"{"shape": "square"}"#).is_err());
}

#[test]
fn test_widgets_share_a_runtime_independently() {
    let (runtime, clock) = manual();
    let options = || {
        Options::new()
            .with_animation(Easing::Linear)
            .with_animation_duration(100.0)
            .with_text_format(TextFormat::Value)
            .with_max(10.0)
            .with_value(0.0)
    };
    let a = CircleProgress::new(&runtime, options()).unwrap();
    let b = CircleProgress::new(&runtime, options()).unwrap();

    a.set_value(10).unwrap();
    b.set_value(4).unwrap();
    runtime.turn();
    assert_eq!(runtime.pending_frames(), 2);

    drop(b);
    assert_eq!(runtime.pending_frames(), 1);

    pump(&runtime, &clock, 200);
    assert_eq!(a.label_text(), "10");
}
