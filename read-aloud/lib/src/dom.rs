//! Minimal element tree construction.
//!
//! [`el`] builds an [`Element`] from a tag, an optional attribute set and a
//! list of children. There is no diffing: every render rebuilds its tree.
//! Trees can be queried (attributes, text, form controls) and serialized to
//! HTML.
//!
//! ## Examples
//!
//! ```
//! use read_aloud::dom::el;
//!
//! let link = el("a", Some(&[("href", Some("https://example.com"))]), ["Example".into()]);
//! assert_eq!(link.to_html(), r#"<a href="https://example.com">Example</a>"#);
//! ```

use std::fmt::Write;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Tags that count as form controls.
const CONTROL_TAGS: &[&str] = &["button", "input", "select", "textarea"];

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Returns the element if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(element) => element.write_html(out),
            Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// A child argument to [`el`].
///
/// Strings become text nodes; [`Child::Skip`] and empty strings are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Node(Node),
    Text(String),
    Skip,
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Node(Node::Element(element))
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(child: Option<T>) -> Self {
        child.map_or(Child::Skip, Into::into)
    }
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the value of attribute `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if the attribute is present (boolean attributes).
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Sets an attribute, replacing any existing value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(attr, _)| *attr == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Removes an attribute if present.
    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(attr, _)| attr != name);
    }

    /// Appends a child node.
    pub fn append(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Inserts a child node before all others.
    pub fn prepend(&mut self, child: impl Into<Node>) {
        self.children.insert(0, child.into());
    }

    /// Replaces all children.
    pub fn replace_children(&mut self, children: Vec<Node>) {
        self.children = children;
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// All descendant elements in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        for child in self.child_elements() {
            found.push(child);
            found.extend(child.descendants());
        }
        found
    }

    /// The first descendant with `class` among its classes.
    pub fn find_by_class(&self, class: &str) -> Option<&Element> {
        self.descendants().into_iter().find(|e| {
            e.attr("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
        })
    }

    /// Descendant form controls (`input`, `select`, `textarea`, `button`) in
    /// document order.
    pub fn form_controls(&self) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|e| CONTROL_TAGS.contains(&e.tag.as_str()))
            .collect()
    }

    /// The descendant form control whose `name` is `name`.
    pub fn control_mut(&mut self, name: &str) -> Option<&mut Element> {
        for child in &mut self.children {
            if let Node::Element(element) = child {
                if CONTROL_TAGS.contains(&element.tag.as_str()) && element.attr("name") == Some(name)
                {
                    return Some(element);
                }
                if let Some(found) = element.control_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// The current value of a form control, as a browser would report it.
    ///
    /// - `input`/`button`: the `value` attribute, or `""`.
    /// - `textarea`: its text content.
    /// - `select`: the value of the `selected` option, else the first option,
    ///   else `None`.
    /// - anything else: `None`.
    pub fn control_value(&self) -> Option<String> {
        match self.tag.as_str() {
            "input" | "button" => Some(self.attr("value").unwrap_or_default().to_string()),
            "textarea" => Some(self.text_content()),
            "select" => {
                let options: Vec<&Element> = self
                    .descendants()
                    .into_iter()
                    .filter(|e| e.tag == "option")
                    .collect();
                options
                    .iter()
                    .find(|o| o.has_attr("selected"))
                    .or_else(|| options.first())
                    .map(|o| option_value(o))
            }
            _ => None,
        }
    }

    /// Sets the current value of a form control.
    ///
    /// For a `select` this moves the `selected` mark to the option whose
    /// value matches; other controls get a `value` attribute.
    pub fn set_control_value(&mut self, value: &str) {
        if self.tag == "select" {
            for child in &mut self.children {
                if let Node::Element(option) = child {
                    if option.tag != "option" {
                        continue;
                    }
                    if option_value(option) == value {
                        option.set_attr("selected", "");
                    } else {
                        option.remove_attr("selected");
                    }
                }
            }
        }
        self.set_attr("value", value);
    }

    /// Serializes the element as HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            if value.is_empty() {
                let _ = write!(out, " {name}");
            } else {
                let _ = write!(
                    out,
                    r#" {name}="{}""#,
                    html_escape::encode_double_quoted_attribute(value)
                );
            }
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }

        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// An `option` element's value: its `value` attribute, else its text.
fn option_value(option: &Element) -> String {
    option
        .attr("value")
        .map(str::to_string)
        .unwrap_or_else(|| option.text_content())
}

/// Creates an element.
///
/// - Every attribute in `attrs` whose value is `Some` is set; `None` values
///   are skipped, as is a `None` attribute set.
/// - Children are appended in order. Strings become text nodes, nodes are
///   appended as is, and [`Child::Skip`] or empty strings are dropped.
pub fn el(
    tag: &str,
    attrs: Option<&[(&str, Option<&str>)]>,
    children: impl IntoIterator<Item = Child>,
) -> Element {
    let mut element = Element::new(tag);

    for (name, value) in attrs.unwrap_or_default() {
        if let Some(value) = value {
            element.set_attr(*name, *value);
        }
    }

    for child in children {
        match child {
            Child::Node(node) => element.append(node),
            Child::Text(text) if !text.is_empty() => element.append(Node::Text(text)),
            Child::Text(_) | Child::Skip => {}
        }
    }

    element
}

/// Joins class names, dropping `None` and empty parts.
///
/// Returns `None` when nothing is left so the attribute can be skipped.
/// Conditional classes are written with `bool::then_some`.
///
/// ## Examples
///
/// ```
/// use read_aloud::dom::class_names;
///
/// let active = true;
/// let hidden = false;
/// assert_eq!(
///     class_names(&[Some("field"), active.then_some("active"), hidden.then_some("hidden")]),
///     Some("field active".to_string())
/// );
/// ```
pub fn class_names(parts: &[Option<&str>]) -> Option<String> {
    let joined = parts
        .iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}
