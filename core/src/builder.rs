//! Fluent element construction.
//!
//! An `ElementCreator` owns a detached element description until one of its
//! placement calls materializes it into a `Document`. Configuration calls
//! take and return the builder by value, so a whole subtree reads as one
//! chained expression.

use crate::dom::{Document, NodeId};
use crate::error::DomError;

#[derive(Debug, Clone)]
enum Content<L> {
    Text(String),
    Element(ElementCreator<L>),
}

#[derive(Debug, Clone)]
pub struct ElementCreator<L> {
    tag: String,
    attributes: Vec<(String, String)>,
    listeners: Vec<(String, L)>,
    content: Vec<Content<L>>,
}

impl<L> ElementCreator<L> {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            listeners: Vec::new(),
            content: Vec::new(),
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.with("id", id)
    }

    pub fn class(self, class: &str) -> Self {
        self.with("class", class)
    }

    /// Replaces the element's content with `text`. Later `append` calls add
    /// after it.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content.clear();
        self.content.push(Content::Text(text.into()));
        self
    }

    /// Sets an arbitrary attribute, overwriting an earlier value.
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    /// Applies `configure` only when `condition` holds.
    pub fn with_if(self, condition: bool, configure: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            configure(self)
        } else {
            self
        }
    }

    pub fn listener(mut self, event: &str, listener: L) -> Self {
        self.listeners.push((event.to_string(), listener));
        self
    }

    /// Adds `child` as the last child of this element.
    pub fn append(mut self, child: ElementCreator<L>) -> Self {
        self.content.push(Content::Element(child));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Materializes the subtree as a detached node of `doc`.
    pub fn build(self, doc: &mut Document<L>) -> Result<NodeId, DomError> {
        let node = doc.create_element(&self.tag);
        for (name, value) in &self.attributes {
            doc.set_attribute(node, name, value)?;
        }
        for (event, listener) in self.listeners {
            doc.add_listener(node, &event, listener)?;
        }
        for content in self.content {
            let child = match content {
                Content::Text(text) => doc.create_text(&text),
                Content::Element(creator) => creator.build(doc)?,
            };
            doc.append_child(node, child)?;
        }
        Ok(node)
    }

    pub fn prepend_to(self, doc: &mut Document<L>, parent: NodeId) -> Result<NodeId, DomError> {
        let node = self.build(doc)?;
        doc.prepend_child(parent, node)?;
        Ok(node)
    }

    pub fn append_to(self, doc: &mut Document<L>, parent: NodeId) -> Result<NodeId, DomError> {
        let node = self.build(doc)?;
        doc.append_child(parent, node)?;
        Ok(node)
    }

    pub fn insert_before(
        self,
        doc: &mut Document<L>,
        parent: NodeId,
        sibling: NodeId,
    ) -> Result<NodeId, DomError> {
        let node = self.build(doc)?;
        doc.insert_before(parent, node, sibling)?;
        Ok(node)
    }

    /// Swaps `sibling` out of `parent` for the built element.
    pub fn replace(
        self,
        doc: &mut Document<L>,
        parent: NodeId,
        sibling: NodeId,
    ) -> Result<NodeId, DomError> {
        let node = self.build(doc)?;
        doc.replace_child(parent, node, sibling)?;
        Ok(node)
    }
}
