//! The text label inside the circle.

use crate::geometry::Point;
use crate::number::{format_number, round_half_up};
use crate::props::TextFormat;
use crate::surface::Surface;

/// What the label shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelContent {
    /// One text run for the whole label.
    Whole(String),
    /// Separate value and max runs (the two-part layouts).
    Split { value: String, max: String },
}

/// Format the label for `value` (or the indeterminate text when `None`).
pub fn format_label(
    format: &TextFormat,
    value: Option<f64>,
    max: f64,
    indeterminate_text: &str,
) -> LabelContent {
    let value_text = || value.map_or_else(|| indeterminate_text.to_string(), format_number);
    match format {
        TextFormat::Custom(f) => LabelContent::Whole(f.format(value, Some(max))),
        TextFormat::Value => LabelContent::Whole(value_text()),
        TextFormat::Percent => {
            let percent = value.map_or_else(
                || indeterminate_text.to_string(),
                |v| format_number(round_half_up(v / max * 100.0)),
            );
            LabelContent::Whole(format!("{percent}%"))
        }
        TextFormat::None => LabelContent::Whole(String::new()),
        TextFormat::Horizontal | TextFormat::Vertical | TextFormat::ValueOnCircle => {
            LabelContent::Split {
                value: value_text(),
                max: format_number(max),
            }
        }
    }
}

/// The `<text>` element and the runs of the current layout.
pub(crate) struct Label<N> {
    text: N,
    value: Option<N>,
    max: Option<N>,
}

impl<N: Copy> Label<N> {
    pub fn new(text: N) -> Self {
        Self {
            text,
            value: None,
            max: None,
        }
    }

    pub fn text(&self) -> N {
        self.text
    }

    /// Discard the current runs and build the structure for `format`.
    pub fn rebuild<S>(&mut self, surface: &mut S, format: &TextFormat)
    where
        S: Surface<Node = N>,
    {
        surface.set_text_content(self.text, "");
        self.value = None;
        self.max = None;

        match format {
            TextFormat::ValueOnCircle => {
                self.value = Some(self.span(
                    surface,
                    "value",
                    &[
                        ("x", "0"),
                        ("y", "0"),
                        ("dy", "0.4em"),
                        ("font-size", "12"),
                        ("fill", "#fff"),
                    ],
                ));
                self.max = Some(self.span(
                    surface,
                    "max",
                    &[
                        ("x", "50"),
                        ("y", "50"),
                        ("font-size", "22"),
                        ("font-weight", "bold"),
                        ("fill", "#ddd"),
                    ],
                ));
            }
            TextFormat::Horizontal => {
                self.value = Some(self.span(surface, "value", &[]));
                let separator = self.span(surface, "separator", &[]);
                surface.set_text_content(separator, "/");
                self.max = Some(self.span(surface, "max", &[]));
            }
            TextFormat::Vertical => {
                self.value = Some(self.span(surface, "value", &[("x", "50"), ("dy", "-0.2em")]));
                let separator = self.span(
                    surface,
                    "separator",
                    &[
                        ("x", "50"),
                        ("dy", "0.1em"),
                        ("font-family", "Arial, sans-serif"),
                    ],
                );
                surface.set_text_content(separator, "___");
                self.max = Some(self.span(surface, "max", &[("x", "50"), ("dy", "1.2em")]));
            }
            TextFormat::Percent | TextFormat::Value | TextFormat::None | TextFormat::Custom(_) => {}
        }

        let baseline = if matches!(format, TextFormat::Vertical) {
            "text-after-edge"
        } else {
            "central"
        };
        surface.set_attribute(self.text, "dominant-baseline", baseline);
    }

    fn span<S>(&self, surface: &mut S, part: &str, attributes: &[(&str, &str)]) -> N
    where
        S: Surface<Node = N>,
    {
        let span = surface.create_element("tspan");
        surface.set_attribute(span, "class", &format!("circle-progress-text-{part}"));
        surface.set_attribute(span, "part", &format!("text-{part}"));
        for (name, value) in attributes {
            surface.set_attribute(span, name, value);
        }
        surface.append_child(self.text, span);
        span
    }

    /// Write `content` into the label. `anchor`, when given, moves the value
    /// run (used by the on-circle layout).
    pub fn update<S>(&self, surface: &mut S, content: &LabelContent, anchor: Option<Point>)
    where
        S: Surface<Node = N>,
    {
        match (content, self.value, self.max) {
            (LabelContent::Split { value, max }, Some(value_span), Some(max_span)) => {
                surface.set_text_content(value_span, value);
                surface.set_text_content(max_span, max);
                if let Some(point) = anchor {
                    surface.set_attribute(value_span, "x", &format_number(point.x));
                    surface.set_attribute(value_span, "y", &format_number(point.y));
                }
            }
            (LabelContent::Whole(text), _, _) => surface.set_text_content(self.text, text),
            // The layout and the content disagree only if the label was not
            // rebuilt after a format change.
            (LabelContent::Split { value, max }, _, _) => {
                surface.set_text_content(self.text, &format!("{value}/{max}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::Formatter;
    use crate::surface::SvgDocument;

    fn label(format: &TextFormat) -> (SvgDocument, Label<crate::surface::NodeId>) {
        let mut doc = SvgDocument::default();
        let text = doc.create_element("text");
        let root = doc.root();
        doc.append_child(root, text);
        let mut label = Label::new(text);
        label.rebuild(&mut doc, format);
        (doc, label)
    }

    #[test]
    fn test_percent() {
        assert_eq!(
            format_label(&TextFormat::Percent, Some(5.0), 20.0, "?"),
            LabelContent::Whole("25%".into())
        );
        assert_eq!(
            format_label(&TextFormat::Percent, None, 20.0, "?"),
            LabelContent::Whole("?%".into())
        );
    }

    #[test]
    fn test_value_and_none() {
        assert_eq!(
            format_label(&TextFormat::Value, Some(0.25), 1.0, "?"),
            LabelContent::Whole("0.25".into())
        );
        assert_eq!(
            format_label(&TextFormat::Value, None, 1.0, "n/a"),
            LabelContent::Whole("n/a".into())
        );
        assert_eq!(
            format_label(&TextFormat::None, Some(1.0), 1.0, "?"),
            LabelContent::Whole(String::new())
        );
    }

    #[test]
    fn test_custom_formatter_gets_value_and_max() {
        let format = TextFormat::Custom(Formatter::new(|value, max| {
            format!("{:?} of {:?}", value, max)
        }));
        assert_eq!(
            format_label(&format, Some(3.0), 4.0, "?"),
            LabelContent::Whole("Some(3.0) of Some(4.0)".into())
        );
    }

    #[test]
    fn test_horizontal_layout() {
        let (mut doc, label) = label(&TextFormat::Horizontal);
        let content = format_label(&TextFormat::Horizontal, Some(3.0), 10.0, "?");
        label.update(&mut doc, &content, None);
        assert_eq!(doc.text_content(label.text()), "3/10");
        assert_eq!(doc.attribute(label.text(), "dominant-baseline"), Some("central"));
    }

    #[test]
    fn test_vertical_layout() {
        let (mut doc, label) = label(&TextFormat::Vertical);
        let content = format_label(&TextFormat::Vertical, None, 1.0, "?");
        label.update(&mut doc, &content, None);
        assert_eq!(doc.text_content(label.text()), "?___1");
        assert_eq!(
            doc.attribute(label.text(), "dominant-baseline"),
            Some("text-after-edge")
        );
    }

    #[test]
    fn test_value_on_circle_anchor() {
        let (mut doc, label) = label(&TextFormat::ValueOnCircle);
        let content = format_label(&TextFormat::ValueOnCircle, Some(1.0), 2.0, "?");
        label.update(&mut doc, &content, Some(Point::new(92.0, 50.0)));
        let value = doc.find_by_class("circle-progress-text-value").unwrap();
        assert_eq!(doc.attribute(value, "x"), Some("92"));
        assert_eq!(doc.attribute(value, "y"), Some("50"));
        assert_eq!(doc.text_content(value), "1");
    }

    #[test]
    fn test_rebuild_discards_runs() {
        let (mut doc, mut label) = label(&TextFormat::Horizontal);
        assert_eq!(doc.children(label.text()).len(), 3);
        label.rebuild(&mut doc, &TextFormat::Percent);
        assert!(doc.children(label.text()).is_empty());
        label.update(
            &mut doc,
            &format_label(&TextFormat::Percent, Some(0.5), 1.0, "?"),
            None,
        );
        assert_eq!(doc.text_content(label.text()), "50%");
    }
}
