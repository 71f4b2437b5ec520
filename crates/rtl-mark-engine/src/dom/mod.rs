//! In-memory document tree.
//!
//! The engine never talks to a live browser document. Instead it operates on
//! an index-based arena: nodes are referenced by [`NodeId`] and every
//! structural change goes through a [`DomTree`] method. Mutators record
//! [`MutationRecord`]s for registered observers, filtered per observer by
//! [`ObserveOptions`] the same way a host mutation observer would filter by
//! its init options. A test harness (or the CLI) owns the tree and drains
//! observer queues to drive the watcher.
//!
//! Removed nodes leave a vacant slot behind rather than being reused, so a
//! stale [`NodeId`] held by a queued record resolves to "gone" instead of
//! aliasing an unrelated node.

pub mod classify;
pub mod parse;

pub use classify::{Classification, HIGHLIGHT_CLASS, classify};
pub use parse::parse_html;

use thiserror::Error;

/// Handle to a node in a [`DomTree`]. Ids are never reused within a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Handle to a registered observer, returned by [`DomTree::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(usize);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("node is no longer part of the tree")]
    NodeGone,
    #[error("children can only be attached to element nodes")]
    NotAnElement,
    #[error("text content can only be set on text nodes")]
    NotText,
    #[error("node cannot be inserted into its own subtree")]
    HierarchyViolation,
}

/// An element's local facts: lowercased tag name and class list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    tag: String,
    classes: Vec<String>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// What a single observer asked to be told about, mirroring the host
/// observer's init options. `attributes` exists so a test can prove the
/// engine never requests it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub character_data: bool,
    pub attributes: bool,
    pub subtree: bool,
}

/// One recorded mutation, queued per observer and drained in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList { target: NodeId, added: Vec<NodeId> },
    CharacterData { target: NodeId },
    Attributes { target: NodeId },
}

impl MutationRecord {
    pub fn target(&self) -> NodeId {
        match self {
            MutationRecord::ChildList { target, .. } => *target,
            MutationRecord::CharacterData { target } => *target,
            MutationRecord::Attributes { target } => *target,
        }
    }
}

#[derive(Debug)]
struct Observer {
    target: NodeId,
    options: ObserveOptions,
    queue: Vec<MutationRecord>,
}

impl Observer {
    fn wants(&self, record: &MutationRecord) -> bool {
        match record {
            MutationRecord::ChildList { .. } => self.options.child_list,
            MutationRecord::CharacterData { .. } => self.options.character_data,
            MutationRecord::Attributes { .. } => self.options.attributes,
        }
    }
}

pub struct DomTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    body: Option<NodeId>,
    observers: Vec<Option<Observer>>,
}

const NO_CHILDREN: &[NodeId] = &[];

impl DomTree {
    /// A fresh document: an `html` root with an empty `body`.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: None,
            observers: Vec::new(),
        };
        let root = dom.alloc(NodeData::Element(ElementData::new("html")));
        let body = dom.alloc(NodeData::Element(ElementData::new("body")));
        dom.link(root, body);
        dom.root = root;
        dom.body = Some(body);
        dom
    }

    /// A document root with no body, as seen in host contexts that have no
    /// renderable document.
    pub fn detached() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: None,
            observers: Vec::new(),
        };
        let root = dom.alloc(NodeData::Element(ElementData::new("html")));
        dom.root = root;
        dom
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|slot| slot.is_some())
    }

    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.get(node).map(|n| &n.data)
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.data(node) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag())
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.data(node) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map_or(NO_CHILDREN, |n| n.children.as_slice())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.has_class(class))
    }

    /// Depth-first walk over `root` and everything below it.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            stack: vec![root],
        }
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Attach `child` as the last child of `parent`, detaching it from its
    /// current parent first. Records a child-list mutation on `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.contains(child) {
            return Err(DomError::NodeGone);
        }
        match self.data(parent) {
            None => return Err(DomError::NodeGone),
            Some(NodeData::Text(_)) => return Err(DomError::NotAnElement),
            Some(NodeData::Element(_)) => {}
        }
        // Walk up from the insertion point: inserting a node under itself
        // would make the tree cyclic.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(DomError::HierarchyViolation);
            }
            cursor = self.parent(id);
        }
        self.unlink(child);
        self.link(parent, child);
        self.deliver(MutationRecord::ChildList {
            target: parent,
            added: vec![child],
        });
        Ok(())
    }

    /// Replace a text node's content. Records a character-data mutation.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        match self.get_mut(node) {
            None => return Err(DomError::NodeGone),
            Some(n) => match &mut n.data {
                NodeData::Element(_) => return Err(DomError::NotText),
                NodeData::Text(current) => {
                    *current = text.to_string();
                }
            },
        }
        self.deliver(MutationRecord::CharacterData { target: node });
        Ok(())
    }

    /// Add a class if absent. Returns whether the class list changed; only a
    /// real change records an attribute mutation.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        let changed = match self.get_mut(node) {
            None => return Err(DomError::NodeGone),
            Some(n) => match &mut n.data {
                NodeData::Text(_) => return Err(DomError::NotAnElement),
                NodeData::Element(el) => {
                    if el.has_class(class) {
                        false
                    } else {
                        el.classes.push(class.to_string());
                        true
                    }
                }
            },
        };
        if changed {
            self.deliver(MutationRecord::Attributes { target: node });
        }
        Ok(changed)
    }

    /// Remove a class if present. Counterpart of [`DomTree::add_class`].
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        let changed = match self.get_mut(node) {
            None => return Err(DomError::NodeGone),
            Some(n) => match &mut n.data {
                NodeData::Text(_) => return Err(DomError::NotAnElement),
                NodeData::Element(el) => {
                    let before = el.classes.len();
                    el.classes.retain(|c| c != class);
                    el.classes.len() != before
                }
            },
        };
        if changed {
            self.deliver(MutationRecord::Attributes { target: node });
        }
        Ok(changed)
    }

    /// Detach `node` and drop its whole subtree. The slots stay vacant, so
    /// queued records pointing into the subtree resolve to nothing.
    pub fn remove_subtree(&mut self, node: NodeId) -> Result<(), DomError> {
        if !self.contains(node) {
            return Err(DomError::NodeGone);
        }
        let parent = self.parent(node);
        self.unlink(node);
        let doomed: Vec<NodeId> = self.descendants(node).collect();
        for id in doomed {
            self.nodes[id.0] = None;
        }
        if let Some(parent) = parent {
            self.deliver(MutationRecord::ChildList {
                target: parent,
                added: Vec::new(),
            });
        }
        Ok(())
    }

    /// Register an observer rooted at `target`. Records are queued per
    /// observer until drained with [`DomTree::take_records`].
    pub fn observe(&mut self, target: NodeId, options: ObserveOptions) -> ObserverId {
        let id = ObserverId(self.observers.len());
        self.observers.push(Some(Observer {
            target,
            options,
            queue: Vec::new(),
        }));
        id
    }

    pub fn disconnect(&mut self, id: ObserverId) {
        if let Some(slot) = self.observers.get_mut(id.0) {
            *slot = None;
        }
    }

    /// Drain the observer's queue, in the order the mutations happened.
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        match self.observers.get_mut(id.0) {
            Some(Some(observer)) => std::mem::take(&mut observer.queue),
            _ => Vec::new(),
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            parent: None,
            children: Vec::new(),
            data,
        }));
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(Some(n)) = self.nodes.get_mut(child.0) {
            n.parent = Some(parent);
        }
        if let Some(Some(n)) = self.nodes.get_mut(parent.0) {
            n.children.push(child);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(Some(n)) = self.nodes.get_mut(parent.0) {
            n.children.retain(|c| *c != child);
        }
        if let Some(Some(n)) = self.nodes.get_mut(child.0) {
            n.parent = None;
        }
    }

    fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0).and_then(|slot| slot.as_ref())
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node.0).and_then(|slot| slot.as_mut())
    }

    /// Queue `record` on every observer whose options and scope match.
    fn deliver(&mut self, record: MutationRecord) {
        if self.observers.is_empty() {
            return;
        }
        let target = record.target();
        let mut scope = vec![target];
        let mut cursor = target;
        while let Some(parent) = self.parent(cursor) {
            scope.push(parent);
            cursor = parent;
        }
        for observer in self.observers.iter_mut().flatten() {
            if !observer.wants(&record) {
                continue;
            }
            let in_scope = if observer.options.subtree {
                scope.contains(&observer.target)
            } else {
                observer.target == target
            };
            if in_scope {
                observer.queue.push(record.clone());
            }
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Descendants<'a> {
    dom: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if !self.dom.contains(id) {
                continue;
            }
            self.stack.extend(self.dom.children(id).iter().rev().copied());
            return Some(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph_with_text(dom: &mut DomTree, text: &str) -> (NodeId, NodeId) {
        let body = dom.body().unwrap();
        let p = dom.create_element("p");
        let t = dom.create_text(text);
        dom.append_child(p, t).unwrap();
        dom.append_child(body, p).unwrap();
        (p, t)
    }

    #[test]
    fn new_tree_has_html_root_and_body() {
        let dom = DomTree::new();
        assert_eq!(dom.tag(dom.root()), Some("html"));
        let body = dom.body().unwrap();
        assert_eq!(dom.tag(body), Some("body"));
        assert_eq!(dom.parent(body), Some(dom.root()));
    }

    #[test]
    fn detached_tree_has_no_body() {
        let dom = DomTree::detached();
        assert!(dom.body().is_none());
        assert_eq!(dom.tag(dom.root()), Some("html"));
    }

    #[test]
    fn append_rejects_cycles() {
        let mut dom = DomTree::new();
        let body = dom.body().unwrap();
        let outer = dom.create_element("div");
        let inner = dom.create_element("div");
        dom.append_child(body, outer).unwrap();
        dom.append_child(outer, inner).unwrap();
        assert_eq!(
            dom.append_child(inner, outer),
            Err(DomError::HierarchyViolation)
        );
    }

    #[test]
    fn append_reparents_an_attached_node() {
        let mut dom = DomTree::new();
        let body = dom.body().unwrap();
        let first = dom.create_element("div");
        let second = dom.create_element("div");
        let child = dom.create_element("p");
        dom.append_child(body, first).unwrap();
        dom.append_child(body, second).unwrap();
        dom.append_child(first, child).unwrap();
        dom.append_child(second, child).unwrap();
        assert_eq!(dom.children(first), &[]);
        assert_eq!(dom.children(second), &[child]);
        assert_eq!(dom.parent(child), Some(second));
    }

    #[test]
    fn removed_subtree_leaves_vacant_slots() {
        let mut dom = DomTree::new();
        let (p, t) = paragraph_with_text(&mut dom, "hello");
        dom.remove_subtree(p).unwrap();
        assert!(!dom.contains(p));
        assert!(!dom.contains(t));
        assert_eq!(dom.set_text(t, "gone"), Err(DomError::NodeGone));
    }

    #[test]
    fn observer_receives_child_list_and_character_data_in_order() {
        let mut dom = DomTree::new();
        let body = dom.body().unwrap();
        let observer = dom.observe(
            body,
            ObserveOptions {
                child_list: true,
                character_data: true,
                subtree: true,
                attributes: false,
            },
        );
        let (p, t) = paragraph_with_text(&mut dom, "hello");
        dom.set_text(t, "goodbye").unwrap();
        let records = dom.take_records(observer);
        // The text was appended while the paragraph was still detached, so
        // only the body-level insertion and the text change are in scope.
        assert_eq!(
            records,
            vec![
                MutationRecord::ChildList {
                    target: body,
                    added: vec![p]
                },
                MutationRecord::CharacterData { target: t },
            ]
        );
        assert!(dom.take_records(observer).is_empty());
    }

    #[test]
    fn attribute_records_only_reach_observers_that_asked() {
        let mut dom = DomTree::new();
        let body = dom.body().unwrap();
        let silent = dom.observe(
            body,
            ObserveOptions {
                child_list: true,
                character_data: true,
                subtree: true,
                attributes: false,
            },
        );
        let chatty = dom.observe(
            body,
            ObserveOptions {
                attributes: true,
                subtree: true,
                ..ObserveOptions::default()
            },
        );
        let (p, _) = paragraph_with_text(&mut dom, "hello");
        dom.take_records(silent);
        dom.take_records(chatty);

        dom.add_class(p, "direction-marker").unwrap();
        assert!(dom.take_records(silent).is_empty());
        assert_eq!(
            dom.take_records(chatty),
            vec![MutationRecord::Attributes { target: p }]
        );
    }

    #[test]
    fn redundant_class_add_records_nothing() {
        let mut dom = DomTree::new();
        let body = dom.body().unwrap();
        let chatty = dom.observe(
            body,
            ObserveOptions {
                attributes: true,
                subtree: true,
                ..ObserveOptions::default()
            },
        );
        let (p, _) = paragraph_with_text(&mut dom, "hello");
        dom.take_records(chatty);

        assert!(dom.add_class(p, "x").unwrap());
        assert!(!dom.add_class(p, "x").unwrap());
        assert_eq!(dom.take_records(chatty).len(), 1);
    }

    #[test]
    fn subtree_scoping_limits_delivery() {
        let mut dom = DomTree::new();
        let body = dom.body().unwrap();
        let aside = dom.create_element("aside");
        dom.append_child(body, aside).unwrap();
        let narrow = dom.observe(
            aside,
            ObserveOptions {
                child_list: true,
                subtree: true,
                ..ObserveOptions::default()
            },
        );
        paragraph_with_text(&mut dom, "outside the observed subtree");
        assert!(dom.take_records(narrow).is_empty());

        let p = dom.create_element("p");
        dom.append_child(aside, p).unwrap();
        assert_eq!(dom.take_records(narrow).len(), 1);
    }

    #[test]
    fn disconnect_stops_delivery() {
        let mut dom = DomTree::new();
        let body = dom.body().unwrap();
        let observer = dom.observe(
            body,
            ObserveOptions {
                child_list: true,
                subtree: true,
                ..ObserveOptions::default()
            },
        );
        dom.disconnect(observer);
        paragraph_with_text(&mut dom, "hello");
        assert!(dom.take_records(observer).is_empty());
    }
}
