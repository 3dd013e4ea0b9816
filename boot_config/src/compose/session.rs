//! One resolution session: a root fragment plus a variable environment.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::condition::Condition;
use crate::document::{Document, DocumentLoader, Entry, Include, Item, Node, index_crumb, key_crumb};
use crate::error::{BootError, BootResult};
use crate::variables::Variables;

use super::merge::{IDENTITY_KEY, identity, merge_member};

/// Recursive resolver state for a single root.
///
/// `stack` lists the documents currently being resolved, outermost first;
/// meeting one of them again is a cycle. `resolved` memoises finished
/// documents so a fragment referenced from several places is composed once.
pub(super) struct Session<'a> {
    loader: &'a DocumentLoader,
    vars: &'a Variables,
    stack: Vec<String>,
    resolved: HashMap<String, Arc<Value>>,
}

impl<'a> Session<'a> {
    pub(super) fn new(loader: &'a DocumentLoader, vars: &'a Variables) -> Self {
        Self {
            loader,
            vars,
            stack: Vec::new(),
            resolved: HashMap::new(),
        }
    }

    /// Resolves the document with canonical name `name`.
    pub(super) fn resolve(&mut self, name: &str) -> BootResult<Arc<Value>> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(Arc::clone(done));
        }
        if let Some(start) = self.stack.iter().position(|open| open == name) {
            let chain = self.stack.iter().skip(start).map(String::as_str);
            return Err(BootError::cycle(chain, name));
        }
        self.stack.push(name.to_owned());
        let result = self.compose(name);
        self.stack.pop();
        let value = Arc::new(result?);
        self.resolved.insert(name.to_owned(), Arc::clone(&value));
        Ok(value)
    }

    /// Folds the `$merge` chain into a base, lays the document's own entries
    /// over it, then splices includes and substitutes placeholders in what
    /// the document contributed.
    fn compose(&mut self, name: &str) -> BootResult<Value> {
        let document = self.loader.load(name)?;
        let mut base = Map::new();
        for base_name in document.merge() {
            let canonical = self.loader.locate(base_name, Some(document.name()))?;
            let layer = self.resolve(&canonical)?;
            if let Value::Object(members) = Value::clone(&layer) {
                for (key, value) in members {
                    merge_member(&mut base, key, value);
                }
            }
        }
        if !document.merge().is_empty() {
            debug!(
                document = document.name(),
                bases = ?document.merge(),
                "folded merge chain"
            );
        }
        self.layer_object(&document, "", &mut base, document.entries())?;
        Ok(Value::Object(base))
    }

    fn node(&mut self, document: &Document, crumb: &str, node: &Node) -> BootResult<Value> {
        Ok(match node {
            Node::Null => Value::Null,
            Node::Bool(flag) => Value::Bool(*flag),
            Node::Number(number) => Value::Number(number.clone()),
            Node::String(text) => self.vars.substitute(text),
            Node::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                self.layer_array(document, crumb, &mut out, items)?;
                Value::Array(out)
            }
            Node::Object(entries) => {
                let mut out = Map::new();
                self.layer_object(document, crumb, &mut out, entries)?;
                Value::Object(out)
            }
        })
    }

    /// Lays `node` over an already resolved `target`.
    ///
    /// Objects and arrays follow the merge policy; a literal `null` keeps the
    /// target; anything else replaces it with the resolved node.
    fn layer(
        &mut self,
        document: &Document,
        crumb: &str,
        target: &mut Value,
        node: &Node,
    ) -> BootResult<()> {
        if matches!(node, Node::Null) && !target.is_null() {
            return Ok(());
        }
        match (target, node) {
            (Value::Object(map), Node::Object(entries)) => {
                self.layer_object(document, crumb, map, entries)
            }
            (Value::Array(items), Node::Array(overlay)) => {
                self.layer_array(document, crumb, items, overlay)
            }
            (slot, other) => {
                *slot = self.node(document, crumb, other)?;
                Ok(())
            }
        }
    }

    /// Inherited keys are layered; keys the document introduces are
    /// inserted, a repeated one replacing the earlier occurrence. Included
    /// objects merge their members in source order.
    fn layer_object(
        &mut self,
        document: &Document,
        crumb: &str,
        target: &mut Map<String, Value>,
        entries: &[Entry],
    ) -> BootResult<()> {
        let inherited: HashSet<String> = target.keys().cloned().collect();
        for entry in entries {
            match entry {
                Entry::Field(key, node) => {
                    let child = key_crumb(crumb, key);
                    let existing = target
                        .get_mut(key.as_str())
                        .filter(|_| inherited.contains(key.as_str()));
                    if let Some(existing) = existing {
                        self.layer(document, &child, existing, node)?;
                        continue;
                    }
                    let value = self.node(document, &child, node)?;
                    target.insert(key.clone(), value);
                }
                Entry::Include(include) => {
                    for selected in self.include(document, include)? {
                        let Value::Object(members) = selected else {
                            return Err(BootError::malformed(
                                document.name(),
                                include.location.as_str(),
                                "`$include` inside an object must select objects",
                            ));
                        };
                        for (key, value) in members {
                            merge_member(target, key, value);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// A document element whose `name` matches an inherited element, or an
    /// earlier element of the document, is layered over it; other elements
    /// and everything an include splices are appended in order.
    fn layer_array(
        &mut self,
        document: &Document,
        crumb: &str,
        target: &mut Vec<Value>,
        items: &[Item],
    ) -> BootResult<()> {
        let mut candidates: Vec<usize> = (0..target.len()).collect();
        for (index, item) in items.iter().enumerate() {
            let child = index_crumb(crumb, index);
            match item {
                Item::Include(include) => target.extend(self.include(document, include)?),
                Item::Value(node) => {
                    let name = self.element_name(document, &child, node)?;
                    let position = name.and_then(|name| {
                        candidates.iter().copied().find(|&at| {
                            target.get(at).and_then(identity) == Some(&name)
                        })
                    });
                    if let Some(existing) = position.and_then(|at| target.get_mut(at)) {
                        self.layer(document, &child, existing, node)?;
                        continue;
                    }
                    candidates.push(target.len());
                    target.push(self.node(document, &child, node)?);
                }
            }
        }
        Ok(())
    }

    /// The resolved `name` of an object element, if it has one.
    fn element_name(
        &mut self,
        document: &Document,
        crumb: &str,
        node: &Node,
    ) -> BootResult<Option<Value>> {
        let Node::Object(entries) = node else {
            return Ok(None);
        };
        let named = entries.iter().rev().find_map(|entry| match entry {
            Entry::Field(key, value) if key == IDENTITY_KEY => Some(value),
            _ => None,
        });
        named
            .map(|value| self.node(document, &key_crumb(crumb, IDENTITY_KEY), value))
            .transpose()
    }

    /// Evaluates the guard and returns the selected nodes in listed order.
    fn include(&mut self, document: &Document, include: &Include) -> BootResult<Vec<Value>> {
        if let Some(source) = &include.condition {
            let condition = Condition::parse(source).map_err(|err| {
                Arc::new(BootError::ConditionSyntax {
                    expression: source.clone(),
                    document: document.name().to_owned(),
                    location: include.location.clone(),
                    offset: err.offset,
                    message: err.message,
                })
            })?;
            if !condition.evaluate(self.vars) {
                debug!(
                    document = document.name(),
                    location = include.location.as_str(),
                    condition = source.as_str(),
                    "skipped include"
                );
                return Ok(Vec::new());
            }
        }
        let mut selected = Vec::new();
        for reference in &include.references {
            let target = self
                .loader
                .locate(reference.document(), Some(document.name()))?;
            let root = self.resolve(&target)?;
            let nodes = reference.pointer().select(&root).map_err(|detail| {
                Arc::new(BootError::PathNotFound {
                    reference: reference.to_string(),
                    document: document.name().to_owned(),
                    location: include.location.clone(),
                    detail,
                })
            })?;
            trace!(
                document = document.name(),
                reference = %reference,
                count = nodes.len(),
                "spliced include"
            );
            selected.extend(nodes);
        }
        Ok(selected)
    }
}
