//! Conditional field overlays
//!
//! `when` blocks become a tree of tagged nodes. A branch body is itself a
//! tree: its own fields as a leaf, followed by nested branches. Trees are
//! emitted as `if`/`else` blocks and never evaluated.

use crate::fields::FieldSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalTree {
    pub nodes: Vec<ConditionalNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalNode {
    Leaf(FieldSet),
    Branch {
        condition: String,
        then: ConditionalTree,
        otherwise: Option<ConditionalTree>,
    },
}

impl ConditionalTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A branch body: `fields` as the leading leaf, then `nested` branches.
    pub fn body(fields: FieldSet, nested: ConditionalTree) -> Self {
        let mut nodes = Vec::with_capacity(nested.nodes.len() + 1);
        nodes.push(ConditionalNode::Leaf(fields));
        nodes.extend(nested.nodes);
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, node: ConditionalNode) {
        self.nodes.push(node);
    }

    /// `self` followed by `later`.
    pub fn concat(mut self, later: ConditionalTree) -> Self {
        self.nodes.extend(later.nodes);
        self
    }

    /// Fields of the leading leaf, the body's own fields.
    pub fn own_fields(&self) -> Option<&FieldSet> {
        match self.nodes.first() {
            Some(ConditionalNode::Leaf(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn own_fields_mut(&mut self) -> Option<&mut FieldSet> {
        match self.nodes.first_mut() {
            Some(ConditionalNode::Leaf(fields)) => Some(fields),
            _ => None,
        }
    }

    /// Every field set in the tree, depth-first, both arms of every branch.
    pub fn all_field_sets(&self) -> Vec<&FieldSet> {
        let mut sets = Vec::new();
        self.collect_field_sets(&mut sets);
        sets
    }

    fn collect_field_sets<'a>(&'a self, sets: &mut Vec<&'a FieldSet>) {
        for node in &self.nodes {
            match node {
                ConditionalNode::Leaf(fields) => sets.push(fields),
                ConditionalNode::Branch {
                    then, otherwise, ..
                } => {
                    then.collect_field_sets(sets);
                    if let Some(otherwise) = otherwise {
                        otherwise.collect_field_sets(sets);
                    }
                }
            }
        }
    }

    /// Apply `f` to every field set in the tree.
    pub fn for_each_field_set_mut(&mut self, f: &mut impl FnMut(&mut FieldSet)) {
        for node in &mut self.nodes {
            match node {
                ConditionalNode::Leaf(fields) => f(fields),
                ConditionalNode::Branch {
                    then, otherwise, ..
                } => {
                    then.for_each_field_set_mut(f);
                    if let Some(otherwise) = otherwise {
                        otherwise.for_each_field_set_mut(f);
                    }
                }
            }
        }
    }
}
