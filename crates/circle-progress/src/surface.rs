//! The drawing surface the widget renders into.
//!
//! [`Surface`] is the narrow contract the renderer needs from a document
//! tree. [`SvgDocument`] is an in-memory implementation that can serialise
//! itself to SVG markup.

use std::borrow::Cow;
use std::fmt;
use std::io;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use slotmap::{SlotMap, new_key_type};

use crate::number::{format_number, parse_float};

/// A document tree the widget can draw into.
pub trait Surface: Send + 'static {
    /// Handle to an element.
    type Node: Copy + Eq + fmt::Debug + Send + 'static;

    /// The `<svg>` element shapes are appended to.
    fn root(&self) -> Self::Node;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    /// Replace all children of `node` with a single text run.
    fn set_text_content(&mut self, node: Self::Node, text: &str);

    /// The effective stroke width of `node`, `0` if it has none.
    fn stroke_width(&self, node: Self::Node) -> f64;
}

new_key_type! {
    /// An element of an [`SvgDocument`].
    pub struct NodeId;
}

#[derive(Debug)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }
}

/// An in-memory SVG document.
#[derive(Debug)]
pub struct SvgDocument {
    elements: SlotMap<NodeId, Element>,
    root: NodeId,
}

impl SvgDocument {
    /// Namespace written on the root element.
    pub const NAMESPACE: &'static str = "http://www.w3.org/2000/svg";

    /// Create a document whose root has the given size and a matching
    /// `viewBox`. Zero dimensions are left unset.
    pub fn new(width: f64, height: f64) -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(Element::new("svg"));
        let mut doc = Self { elements, root };

        doc.set_attribute(root, "xmlns", Self::NAMESPACE);
        doc.set_attribute(root, "version", "1.1");
        if width != 0.0 {
            doc.set_attribute(root, "width", &format_number(width));
        }
        if height != 0.0 {
            doc.set_attribute(root, "height", &format_number(height));
        }
        if width != 0.0 && height != 0.0 {
            let view_box = format!("0 0 {} {}", format_number(width), format_number(height));
            doc.set_attribute(root, "viewBox", &view_box);
        }
        doc
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.elements.get(node).map(|el| el.tag.as_str())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.elements
            .get(node)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.elements
            .get(node)
            .map_or(&[][..], |el| el.children.as_slice())
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(el) = self.elements.get(node) {
            out.push_str(&el.text);
            for child in &el.children {
                self.collect_text(*child, out);
            }
        }
    }

    /// The first element (depth first, from the root) with `class` among
    /// its classes.
    pub fn find_by_class(&self, class: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let el = self.elements.get(node)?;
            let matches = self
                .attribute(node, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class));
            if matches {
                return Some(node);
            }
            stack.extend(el.children.iter().rev());
        }
        None
    }

    /// Number of live elements, the root included.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Serialise the document.
    pub fn to_markup(&self) -> String {
        let mut out = Vec::new();
        // A Vec sink never fails.
        match self.write_markup(&mut out) {
            Ok(()) => String::from_utf8(out).unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    /// Serialise the document into `sink`.
    ///
    /// Characters XML 1.0 cannot carry are dropped from attribute values and
    /// text.
    pub fn write_markup<W: io::Write>(&self, sink: W) -> quick_xml::Result<()> {
        let mut writer = Writer::new(sink);
        self.write_element(self.root, &mut writer)
    }

    fn write_element<W: io::Write>(
        &self,
        node: NodeId,
        writer: &mut Writer<W>,
    ) -> quick_xml::Result<()> {
        let Some(el) = self.elements.get(node) else {
            return Ok(());
        };
        let mut start = BytesStart::new(el.tag.as_str());
        for (name, value) in &el.attributes {
            start.push_attribute((name.as_str(), xml_safe(value).as_ref()));
        }
        if el.text.is_empty() && el.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        if !el.text.is_empty() {
            writer.write_event(Event::Text(BytesText::new(&xml_safe(&el.text))))?;
        }
        for child in &el.children {
            self.write_element(*child, writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(el.tag.as_str())))?;
        Ok(())
    }

    fn drop_subtree(&mut self, node: NodeId) {
        if let Some(el) = self.elements.remove(node) {
            for child in el.children {
                self.drop_subtree(child);
            }
        }
    }
}

impl Default for SvgDocument {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

impl Surface for SvgDocument {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.elements.insert(Element::new(tag))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(el) = self.elements.get_mut(parent) {
            el.children.push(child);
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.elements.get_mut(node) else {
            return;
        };
        match el.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, current)) => *current = value.to_string(),
            None => el.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.elements.get_mut(node) {
            el.attributes.retain(|(n, _)| n != name);
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        let Some(el) = self.elements.get_mut(node) else {
            return;
        };
        let children = std::mem::take(&mut el.children);
        el.text = text.to_string();
        for child in children {
            self.drop_subtree(child);
        }
    }

    fn stroke_width(&self, node: NodeId) -> f64 {
        let width = self
            .attribute(node, "stroke-width")
            .map_or(f64::NAN, parse_float);
        if width.is_finite() { width } else { 0.0 }
    }
}

fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}
