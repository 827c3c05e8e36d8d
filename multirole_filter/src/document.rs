//! HTML document parsing, serialization and subtree removal.
//!
//! Parsing never fails: broken markup is recovered the way a browser would
//! recover it, and parse errors are dropped without being reported. The
//! serialized output is valid HTML but is not byte-identical to the input,
//! so callers only serialize when something was removed.
//!
//! Parsing runs with scripting disabled so `<noscript>` content becomes
//! elements, and `<template>` contents are walked and emitted like any other
//! children. Both reach the viewer, so both are filtered.

use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, parse_fragment, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use multirole_core::config::ParseMode;
use multirole_core::error::{Error, Result};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed HTML document owned by a single filter invocation.
pub struct Document {
    /// The parsed tree.
    dom: RcDom,

    /// Node whose children make up the output.
    ///
    /// For fragments this is the synthetic `<html>` element the parser wraps
    /// the fragment in; for documents it is the document node itself.
    root: Handle,

    /// The mode the text was parsed in. Never `Auto`.
    mode: ParseMode,
}

fn parse_opts() -> ParseOpts {
    ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

impl Document {
    /// Parse text into a document.
    ///
    /// The mode is resolved against the text first.
    pub fn parse(text: &str, mode: ParseMode) -> Self {
        let mode = mode.resolve(text);

        let dom = match mode {
            ParseMode::Document => parse_document(RcDom::default(), parse_opts()).one(text),
            _ => parse_fragment(
                RcDom::default(),
                parse_opts(),
                QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("body")),
                Vec::new(),
            )
            .one(text),
        };

        let root = match mode {
            ParseMode::Document => dom.document.clone(),
            _ => {
                let first = dom.document.children.borrow().first().cloned();
                first.unwrap_or_else(|| dom.document.clone())
            }
        };

        Self { dom, root, mode }
    }

    /// The resolved parse mode.
    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Visit every element carrying an attribute in document order and
    /// remove those `keep` rejects.
    ///
    /// `keep` receives the attribute value. The attribute name is matched
    /// ASCII case-insensitively. A removed element's descendants are not
    /// visited. Returns whether anything was removed; an error from `keep`
    /// stops the walk and is returned as is.
    pub fn retain_elements<F>(&self, name: &str, mut keep: F) -> Result<bool>
    where
        F: FnMut(&str) -> Result<bool>,
    {
        let mut removed = false;
        let mut stack: Vec<Handle> = children_of(&self.root).into_iter().rev().collect();

        while let Some(node) = stack.pop() {
            if let Some(value) = attribute_value(&node, name) {
                if !keep(&value)? {
                    self.remove(&node);
                    removed = true;
                    continue;
                }
            }
            // Reverse so the leftmost child is visited first.
            stack.extend(children_of(&node).into_iter().rev());
        }

        Ok(removed)
    }

    /// Remove a node and everything below it.
    ///
    /// A node without a parent is removed from the document's own children.
    /// Siblings keep their relative order.
    pub fn remove(&self, node: &Handle) {
        let parent = parent_of(node).unwrap_or_else(|| self.dom.document.clone());
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
        node.parent.set(None);
    }

    /// Serialize the document back to HTML.
    pub fn serialize(&self) -> Result<String> {
        let mut bytes = Vec::new();
        serialize(
            &mut bytes,
            &Subtree(self.root.clone()),
            SerializeOpts {
                scripting_enabled: false,
                traversal_scope: TraversalScope::ChildrenOnly(None),
                ..Default::default()
            },
        )?;

        String::from_utf8(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// The value of an element's attribute, if the node is an element that has it.
pub fn attribute_value(node: &Handle, name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| (&*attr.name.local).eq_ignore_ascii_case(name))
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Children of a node; for `<template>` these are its contents.
fn children_of(node: &Handle) -> Vec<Handle> {
    if let NodeData::Element {
        ref template_contents,
        ..
    } = node.data
    {
        if let Some(ref contents) = *template_contents.borrow() {
            return contents.children.borrow().clone();
        }
    }
    node.children.borrow().clone()
}

fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

enum SerializeOp {
    Open(Handle),
    Close(QualName),
}

/// Serializable view of a node that emits `<template>` contents.
struct Subtree(Handle);

impl Serialize for Subtree {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut ops: VecDeque<SerializeOp> = match traversal_scope {
            TraversalScope::IncludeNode => VecDeque::from(vec![SerializeOp::Open(self.0.clone())]),
            TraversalScope::ChildrenOnly(_) => children_of(&self.0)
                .into_iter()
                .map(SerializeOp::Open)
                .collect(),
        };

        while let Some(op) = ops.pop_front() {
            match op {
                SerializeOp::Open(handle) => match handle.data {
                    NodeData::Element {
                        ref name,
                        ref attrs,
                        ..
                    } => {
                        serializer.start_elem(
                            name.clone(),
                            attrs.borrow().iter().map(|attr| (&attr.name, &attr.value[..])),
                        )?;
                        ops.push_front(SerializeOp::Close(name.clone()));
                        for child in children_of(&handle).into_iter().rev() {
                            ops.push_front(SerializeOp::Open(child));
                        }
                    }
                    NodeData::Document => {
                        for child in children_of(&handle).into_iter().rev() {
                            ops.push_front(SerializeOp::Open(child));
                        }
                    }
                    NodeData::Doctype { ref name, .. } => serializer.write_doctype(name)?,
                    NodeData::Text { ref contents } => serializer.write_text(&contents.borrow())?,
                    NodeData::Comment { ref contents } => serializer.write_comment(contents)?,
                    NodeData::ProcessingInstruction {
                        ref target,
                        ref contents,
                    } => serializer.write_processing_instruction(target, contents)?,
                },
                SerializeOp::Close(name) => serializer.end_elem(name)?,
            }
        }

        Ok(())
    }
}
