//! Schema Graph Walker
//!
//! Depth-first descent over a schema node: the node itself, then each
//! property, `items`, and every `allOf`/`oneOf`/`anyOf` member. The caller's
//! visitor sees each node once, together with its walk path and the slot it
//! occupies in its parent.
//!
//! Reference nodes are leaves. Their identity is the reference target. The
//! visited set holds the targets open on the current path; a reference to one
//! of them is skipped entirely (no visit, no descent), which keeps self and
//! mutual recursion finite. Sibling references to the same target are each
//! visited. Named targets are walked from their own root by whoever owns them.

use std::collections::HashSet;
use std::fmt;

use crate::document::Schema;

// =============================================================================
// Slot
// =============================================================================

/// Where a node sits relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    /// Start of the walk
    Root,
    /// A named property of an object
    Property(&'a str),
    /// Array items type
    Items,
    /// An allOf member (index into allOf array)
    AllOf(usize),
    /// A oneOf member
    OneOf(usize),
    /// An anyOf member
    AnyOf(usize),
}

impl fmt::Display for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => Ok(()),
            Self::Property(name) => write!(f, ".{}", name),
            Self::Items => write!(f, ".items"),
            Self::AllOf(i) => write!(f, ".allOf[{}]", i),
            Self::OneOf(i) => write!(f, ".oneOf[{}]", i),
            Self::AnyOf(i) => write!(f, ".anyOf[{}]", i),
        }
    }
}

// =============================================================================
// Visit
// =============================================================================

/// What the visitor is handed for every node
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub schema: &'a Schema,
    /// Walk path, `<prefix>.<key>` with bracketed indexes
    pub path: &'a str,
    pub slot: Slot<'a>,
    pub parent: Option<&'a Schema>,
}

impl Visit<'_> {
    pub fn is_root(&self) -> bool {
        self.slot == Slot::Root
    }
}

/// Walk `schema`, calling `visitor` on every reachable node
///
/// `visited` holds the reference targets open on the current path. A target
/// is added while its reference is visited and removed afterwards, so the set
/// comes back unchanged.
pub fn walk_schema<F>(schema: &Schema, prefix: &str, visited: &mut HashSet<String>, visitor: &mut F)
where
    F: FnMut(&Visit<'_>),
{
    walk_node(schema, prefix, Slot::Root, None, visited, visitor);
}

fn walk_node<'a, F>(
    schema: &'a Schema,
    path: &str,
    slot: Slot<'a>,
    parent: Option<&'a Schema>,
    visited: &mut HashSet<String>,
    visitor: &mut F,
) where
    F: FnMut(&Visit<'_>),
{
    if let Some(target) = schema.reference_target() {
        if !visited.insert(target.to_string()) {
            return;
        }
        visitor(&Visit { schema, path, slot, parent });
        visited.remove(target);
        return;
    }

    visitor(&Visit { schema, path, slot, parent });

    for (name, property) in &schema.properties {
        let child = Slot::Property(name);
        walk_node(property, &format!("{}{}", path, child), child, Some(schema), visited, visitor);
    }

    if let Some(items) = &schema.items {
        walk_node(items, &format!("{}{}", path, Slot::Items), Slot::Items, Some(schema), visited, visitor);
    }

    let branches = [
        (schema.all_of.as_slice(), Slot::AllOf as fn(usize) -> Slot<'a>),
        (schema.one_of.as_slice(), Slot::OneOf as fn(usize) -> Slot<'a>),
        (schema.any_of.as_slice(), Slot::AnyOf as fn(usize) -> Slot<'a>),
    ];
    for (members, slot_fn) in branches {
        for (i, member) in members.iter().enumerate() {
            let child = slot_fn(i);
            walk_node(member, &format!("{}{}", path, child), child, Some(schema), visited, visitor);
        }
    }
}
