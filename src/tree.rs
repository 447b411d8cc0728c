// Fragment trees and the mutation primitives the cleaning rules rely on.
//
// A fragment is a list of html5ever `RcDom` nodes hung under a synthetic
// document root. Every structural edit goes through `walk`, which keeps parent
// pointers in sync and defines where traversal resumes after a splice.
//
// rcdom's `Drop` empties the child lists of every descendant it reaches, even
// ones still referenced elsewhere. Nodes that outlive their old parent must be
// moved out (`take`/`detach`) before that parent is dropped.

use std::rc::{Rc, Weak};

use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use markup5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// The rendered output of one markdown source, as a mutable HTML tree.
#[derive(Debug)]
pub struct Fragment {
    root: Handle,
}

impl Fragment {
    /// Parse an HTML snippet into a fragment (the `<body>` content of the
    /// parsed document).
    pub fn parse(html: &str) -> Self {
        let dom = parse_html(html);
        let children = find_first(&dom.document, &mut |node| is_element(node, "body"))
            .map(|body| body.children.take())
            .unwrap_or_default();
        Self::adopt(children)
    }

    /// Build a fragment from nodes that were moved out of a larger document.
    pub fn adopt(children: Vec<Handle>) -> Self {
        let root = Node::new(NodeData::Document);
        for child in &children {
            child.parent.set(Some(Rc::downgrade(&root)));
        }
        *root.children.borrow_mut() = children;
        Self { root }
    }

    /// The synthetic root whose children are the fragment's top-level nodes.
    pub fn root(&self) -> &Handle {
        &self.root
    }

    /// Snapshot of the top-level nodes.
    pub fn children(&self) -> Vec<Handle> {
        self.root.children.borrow().clone()
    }
}

/// Parse a full HTML document into an html5ever RcDom.
pub(crate) fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// What `walk` should do with the node the visitor just saw.
pub(crate) enum Visit {
    /// Keep the node, descend into its children, then go to the next sibling.
    Continue,
    /// Replace the node with its children and resume at the first of them.
    Unwrap,
    /// Replace the node with another one and resume at the replacement.
    /// The replacement is detached from wherever it currently lives.
    Replace(Handle),
}

/// Depth-first, document-order traversal of everything below `parent`.
///
/// Splices performed through the returned `Visit` never skip a node: after an
/// unwrap or replace, the nodes now occupying the old position are visited
/// next.
pub(crate) fn walk<F>(parent: &Handle, visit: &mut F)
where
    F: FnMut(&Handle) -> Visit,
{
    let mut index = 0;
    loop {
        let child = match parent.children.borrow().get(index) {
            Some(child) => child.clone(),
            None => break,
        };
        match visit(&child) {
            Visit::Continue => {
                walk(&child, visit);
                index += 1;
            }
            Visit::Unwrap => {
                let grandchildren = child.children.take();
                splice(parent, index, grandchildren);
            }
            Visit::Replace(node) => {
                detach(&node);
                splice(parent, index, vec![node]);
            }
        }
    }
}

/// Replace `parent.children[index]` with `nodes`.
fn splice(parent: &Handle, index: usize, nodes: Vec<Handle>) {
    for node in &nodes {
        node.parent.set(Some(Rc::downgrade(parent)));
    }
    let removed: Vec<Handle> = parent
        .children
        .borrow_mut()
        .splice(index..=index, nodes)
        .collect();
    for node in removed {
        node.parent.set(None);
    }
}

/// Remove a node from its parent's child list, if it has a parent.
fn detach(node: &Handle) {
    if let Some(parent) = parent(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// Remove the top-level child at `index` of a root.
pub(crate) fn remove_child(parent: &Handle, index: usize) {
    if index < parent.children.borrow().len() {
        splice(parent, index, Vec::new());
    }
}

/// Get the parent of a node, if it is still attached.
pub(crate) fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    node.parent.set(weak);
    parent
}

/// First descendant (not `handle` itself) in document order matching `pred`.
pub(crate) fn find_first<F>(handle: &Handle, pred: &mut F) -> Option<Handle>
where
    F: FnMut(&Handle) -> bool,
{
    for child in handle.children.borrow().iter() {
        if pred(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_first(child, pred) {
            return Some(found);
        }
    }
    None
}

/// All descendants matching `pred`, in document order. Matches are not
/// searched for nested matches.
pub(crate) fn find_all<F>(handle: &Handle, pred: &mut F) -> Vec<Handle>
where
    F: FnMut(&Handle) -> bool,
{
    let mut found = Vec::new();
    collect(handle, pred, &mut found);
    found
}

fn collect<F>(handle: &Handle, pred: &mut F, found: &mut Vec<Handle>)
where
    F: FnMut(&Handle) -> bool,
{
    for child in handle.children.borrow().iter() {
        if pred(child) {
            found.push(child.clone());
        } else {
            collect(child, pred, found);
        }
    }
}

// ---------------------------------------------------------------------------
// Node helpers
// ---------------------------------------------------------------------------

/// Get the tag name of an element node.
pub(crate) fn tag_name(handle: &Handle) -> Option<&str> {
    if let NodeData::Element { ref name, .. } = handle.data {
        Some(name.local.as_ref())
    } else {
        None
    }
}

pub(crate) fn is_element(handle: &Handle, tag: &str) -> bool {
    tag_name(handle) == Some(tag)
}

/// Text node whose content is only HTML whitespace.
pub(crate) fn is_whitespace_text(handle: &Handle) -> bool {
    match handle.data {
        NodeData::Text { ref contents } => contents
            .borrow()
            .chars()
            .all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')),
        _ => false,
    }
}

/// Text node whose content is exactly `value`.
pub(crate) fn is_text(handle: &Handle, value: &str) -> bool {
    match handle.data {
        NodeData::Text { ref contents } => &**contents.borrow() == value,
        _ => false,
    }
}

/// Concatenated text of all descendant text nodes.
pub(crate) fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    push_text(handle, &mut out);
    out
}

fn push_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { ref contents } = handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        push_text(child, out);
    }
}

// ---------------------------------------------------------------------------
// Attribute helpers
// ---------------------------------------------------------------------------

/// Get the value of an attribute on an element node.
pub(crate) fn get_attr(handle: &Handle, name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow().iter() {
            if attr.name.local.as_ref() == name {
                return Some(attr.value.to_string());
            }
        }
    }
    None
}

pub(crate) fn has_attr(handle: &Handle, name: &str) -> bool {
    match handle.data {
        NodeData::Element { ref attrs, .. } => {
            attrs.borrow().iter().any(|a| a.name.local.as_ref() == name)
        }
        _ => false,
    }
}

/// Overwrite the value of an existing attribute. Returns false when the
/// attribute is absent.
pub(crate) fn set_attr(handle: &Handle, name: &str, value: &str) -> bool {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        for attr in attrs.borrow_mut().iter_mut() {
            if attr.name.local.as_ref() == name {
                attr.value = StrTendril::from(value);
                return true;
            }
        }
    }
    false
}

/// Append a new attribute in the null namespace.
pub(crate) fn insert_attr(handle: &Handle, name: &str, value: &str) {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        attrs.borrow_mut().push(Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
            value: StrTendril::from(value),
        });
    }
}

pub(crate) fn remove_attr(handle: &Handle, name: &str) {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        attrs.borrow_mut().retain(|a| a.name.local.as_ref() != name);
    }
}

/// Drop every attribute not named in `keep`.
pub(crate) fn retain_attrs(handle: &Handle, keep: &[&str]) {
    if let NodeData::Element { ref attrs, .. } = handle.data {
        attrs
            .borrow_mut()
            .retain(|a| keep.contains(&a.name.local.as_ref()));
    }
}

/// Whether the element's `class` attribute contains `class` as a token.
pub(crate) fn has_class(handle: &Handle, class: &str) -> bool {
    get_attr(handle, "class")
        .is_some_and(|value| value.split_ascii_whitespace().any(|token| token == class))
}

/// Remove one class token; the attribute goes away when nothing is left.
pub(crate) fn remove_class(handle: &Handle, class: &str) {
    let Some(value) = get_attr(handle, "class") else {
        return;
    };
    let rest: Vec<&str> = value
        .split_ascii_whitespace()
        .filter(|token| *token != class)
        .collect();
    if rest.is_empty() {
        remove_attr(handle, "class");
    } else {
        set_attr(handle, "class", &rest.join(" "));
    }
}
