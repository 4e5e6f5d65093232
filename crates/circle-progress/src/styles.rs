//! Default stylesheet for hosts that render the markup in a document.
//!
//! The shapes already carry their paint as presentation attributes, so the
//! stylesheet is optional. Selectors match the `class` names the widget
//! writes and the `text-format` host attribute.

/// CSS for the widget's host element and shapes.
pub const STYLES: &str = r#":host(:not([hidden])) {
	display: inline-block;
}

.circle-progress-circle {
	fill: none;
	stroke: #ddd;
}

.circle-progress-value {
	fill: none;
	stroke: #00E699;
}

.circle-progress-text {
	font: 16px Arial, sans-serif;
	text-anchor: middle;
	fill: #999;
}

:host([text-format="valueOnCircle"]) .circle-progress-text-value {
	font-size: 12px;
	fill: #fff;
}

:host([text-format="valueOnCircle"]) .circle-progress-text-max {
	font-size: 22px;
	font-weight: bold;
	fill: #ddd;
}

:host([text-format="vertical"]) .circle-progress-text-separator {
	font-family: Arial, sans-serif !important;
}
"#;
