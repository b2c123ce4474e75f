//! In-memory document tree.
//!
//! # Design
//! Nodes live in an arena owned by `Document` and are addressed by copyable
//! `NodeId` handles. Detaching a node never frees it: a removed element keeps
//! its subtree and can be re-inserted, the same way a browser keeps a
//! detached element alive while something still references it.
//!
//! Listeners are plain values of type `L` rather than closures. Dispatching an
//! event hands the registered values back to the caller, which decides what
//! they mean. This keeps the document free of borrows into application state.

use std::fmt::Write as _;

use crate::error::DomError;

/// Handle to a node inside one `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct ElementData<L> {
    tag: String,
    attributes: Vec<(String, String)>,
    listeners: Vec<(String, L)>,
}

#[derive(Debug)]
enum NodeKind<L> {
    Element(ElementData<L>),
    Text(String),
}

#[derive(Debug)]
struct Node<L> {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind<L>,
}

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta"];

#[derive(Debug)]
pub struct Document<L> {
    nodes: Vec<Node<L>>,
    root: NodeId,
    body: NodeId,
}

impl<L> Default for Document<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> Document<L> {
    /// An `html` root holding an empty `body`.
    pub fn new() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.nodes[doc.root.0].children.push(doc.body);
        doc.nodes[doc.body.0].parent = Some(doc.root);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_string(),
            attributes: Vec::new(),
            listeners: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind<L>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node<L>, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData<L>, DomError> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData<L>, DomError> {
        match self.nodes.get_mut(id.0) {
            Some(Node {
                kind: NodeKind::Element(data),
                ..
            }) => Ok(data),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|data| data.tag.as_str())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let data = self.element_mut(id)?;
        match data.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let data = self.element(id).ok()?;
        data.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.element_mut(id)?.attributes.retain(|(key, _)| key != name);
        Ok(())
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "id")
    }

    /// Replaces every child of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.element(id)?;
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        let text = self.create_text(text);
        self.append_child(id, text)
    }

    /// Concatenated text of `id` and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.walk(id) {
            if let NodeKind::Text(text) = &self.nodes[node.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    pub fn add_listener(&mut self, id: NodeId, event: &str, listener: L) -> Result<(), DomError> {
        self.element_mut(id)?
            .listeners
            .push((event.to_string(), listener));
        Ok(())
    }

    /// Listeners registered on `id` for `event`, in registration order.
    pub fn listeners(&self, id: NodeId, event: &str) -> Vec<&L> {
        match self.element(id) {
            Ok(data) => data
                .listeners
                .iter()
                .filter(|(name, _)| name == event)
                .map(|(_, listener)| listener)
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Cycle { node: child });
        }
        Ok(())
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Result<usize, DomError> {
        self.children(parent)
            .iter()
            .position(|&c| c == child)
            .ok_or(DomError::NotAChild { parent, child })
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != child);
        }
    }

    fn attach_at(&mut self, parent: NodeId, child: NodeId, index: usize) {
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        let index = self.nodes[parent.0].children.len();
        self.attach_at(parent, child, index);
        Ok(())
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.attach_at(parent, child, 0);
        Ok(())
    }

    /// Inserts `child` into `parent` directly before `reference`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.position(parent, reference)?;
        if child == reference {
            return Ok(());
        }
        self.detach(child);
        let index = self.position(parent, reference)?;
        self.attach_at(parent, child, index);
        Ok(())
    }

    /// Puts `new` exactly where `old` was and detaches `old`.
    pub fn replace_child(&mut self, parent: NodeId, new: NodeId, old: NodeId) -> Result<(), DomError> {
        self.check_insert(parent, new)?;
        self.position(parent, old)?;
        if new == old {
            return Ok(());
        }
        self.detach(new);
        let index = self.position(parent, old)?;
        self.nodes[parent.0].children[index] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        Ok(())
    }

    /// Detaches `id` from its parent. Removing a detached node is a no-op.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node(id)?;
        self.detach(id);
        Ok(())
    }

    /// Preorder walk starting at (and including) `start`.
    fn walk(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.node(start).is_err() {
            return out;
        }
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev());
        }
        out
    }

    /// First element in `scope` (inclusive) whose `id` attribute equals `id`.
    pub fn find_by_id_within(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.walk(scope)
            .into_iter()
            .find(|&node| self.element_id(node) == Some(id))
    }

    /// Connected element with the given `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_id_within(self.root, id)
    }

    /// Supports `#id` and bare tag-name selectors.
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        match selector.strip_prefix('#') {
            Some(id) => self.get_element_by_id(id),
            None => self
                .walk(self.root)
                .into_iter()
                .find(|&node| self.tag(node) == Some(selector)),
        }
    }

    /// Current value of an input element.
    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.attribute(id, "value")
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        self.set_attribute(id, "value", value)
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.attribute(id, "checked").is_some()
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), DomError> {
        if checked {
            self.set_attribute(id, "checked", "checked")
        } else {
            self.remove_attribute(id, "checked")
        }
    }

    /// HTML serialization of `id` and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape(text, false)),
            NodeKind::Element(data) => {
                out.push('<');
                out.push_str(&data.tag);
                for (name, value) in &data.attributes {
                    let _ = write!(out, " {name}=\"{}\"", escape(value, true));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&data.tag.as_str()) {
                    return;
                }
                for &child in &node.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{}>", data.tag);
            }
        }
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// An event being dispatched to a node's listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
    default_prevented: bool,
}

impl Event {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_prevented: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> (Document<()>, NodeId, [NodeId; 3]) {
        let mut doc = Document::new();
        let main = doc.create_element("main");
        doc.append_child(doc.body(), main).unwrap();
        let items = [(); 3].map(|_| doc.create_element("li"));
        for item in items {
            doc.append_child(main, item).unwrap();
        }
        (doc, main, items)
    }

    #[test]
    fn insert_before_places_node_ahead_of_reference() {
        let (mut doc, main, [a, b, c]) = list();
        let new = doc.create_element("li");
        doc.insert_before(main, new, c).unwrap();
        assert_eq!(doc.children(main), &[a, b, new, c]);
    }

    #[test]
    fn insert_before_moves_an_attached_node() {
        let (mut doc, main, [a, b, c]) = list();
        doc.insert_before(main, c, a).unwrap();
        assert_eq!(doc.children(main), &[c, a, b]);
    }

    #[test]
    fn replace_child_keeps_position() {
        let (mut doc, main, [a, b, c]) = list();
        let new = doc.create_element("li");
        doc.replace_child(main, new, b).unwrap();
        assert_eq!(doc.children(main), &[a, new, c]);
        assert_eq!(doc.parent(b), None);
        assert!(!doc.is_connected(b));
    }

    #[test]
    fn prepend_child_goes_first() {
        let (mut doc, main, [a, b, c]) = list();
        let new = doc.create_element("form");
        doc.prepend_child(main, new).unwrap();
        assert_eq!(doc.children(main), &[new, a, b, c]);
    }

    #[test]
    fn reference_must_be_a_child() {
        let (mut doc, main, _) = list();
        let stranger = doc.create_element("li");
        let new = doc.create_element("li");
        assert_eq!(
            doc.insert_before(main, new, stranger),
            Err(DomError::NotAChild {
                parent: main,
                child: stranger
            })
        );
        assert_eq!(doc.parent(new), None);
    }

    #[test]
    fn cannot_insert_ancestor_below_descendant() {
        let (mut doc, main, [a, _, _]) = list();
        assert_eq!(doc.append_child(a, main), Err(DomError::Cycle { node: main }));
    }

    #[test]
    fn text_nodes_take_no_children() {
        let mut doc: Document<()> = Document::new();
        let text = doc.create_text("x");
        let child = doc.create_element("b");
        assert_eq!(doc.append_child(text, child), Err(DomError::NotAnElement(text)));
    }

    #[test]
    fn removed_nodes_are_not_found_by_id() {
        let (mut doc, _, [a, _, _]) = list();
        doc.set_attribute(a, "id", "first").unwrap();
        assert_eq!(doc.get_element_by_id("first"), Some(a));
        doc.remove(a).unwrap();
        assert_eq!(doc.get_element_by_id("first"), None);
    }

    #[test]
    fn set_text_replaces_children() {
        let mut doc: Document<()> = Document::new();
        let p = doc.create_element("p");
        let span = doc.create_element("span");
        doc.append_child(p, span).unwrap();
        doc.set_text(p, "hello").unwrap();
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text_content(p), "hello");
        assert_eq!(doc.parent(span), None);
    }

    #[test]
    fn query_selector_by_tag_and_id() {
        let (mut doc, main, [_, b, _]) = list();
        doc.set_attribute(b, "id", "bottom").unwrap();
        assert_eq!(doc.query_selector("main"), Some(main));
        assert_eq!(doc.query_selector("#bottom"), Some(b));
        assert_eq!(doc.query_selector("section"), None);
    }

    #[test]
    fn checkbox_state_is_an_attribute_flag() {
        let mut doc: Document<()> = Document::new();
        let input = doc.create_element("input");
        assert!(!doc.checked(input));
        doc.set_checked(input, true).unwrap();
        assert!(doc.checked(input));
        doc.set_checked(input, false).unwrap();
        assert!(!doc.checked(input));
    }

    #[test]
    fn outer_html_escapes_text_and_attributes() {
        let mut doc: Document<()> = Document::new();
        let p = doc.create_element("p");
        doc.set_attribute(p, "title", "a \"b\"").unwrap();
        doc.set_text(p, "<b>&</b>").unwrap();
        let input = doc.create_element("input");
        doc.append_child(p, input).unwrap();
        assert_eq!(
            doc.outer_html(p),
            r#"<p title="a &quot;b&quot;">&lt;b&gt;&amp;&lt;/b&gt;<input></p>"#
        );
    }

    #[test]
    fn listeners_filter_by_event_name() {
        let mut doc: Document<u8> = Document::new();
        let button = doc.create_element("button");
        doc.add_listener(button, "click", 1).unwrap();
        doc.add_listener(button, "focus", 2).unwrap();
        doc.add_listener(button, "click", 3).unwrap();
        assert_eq!(doc.listeners(button, "click"), vec![&1, &3]);
    }
}
