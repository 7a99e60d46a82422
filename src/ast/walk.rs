//! Tree traversal and combination helpers.
//!
//! These functions never fail and never change the structural shape of a
//! tree they are given; the ones returning a [`Node`] build a new tree.

use crate::ast::{Conjunction, FieldGroup, LogicalGroup, Negation, Node};

/// Whether the tree matches everything because it holds no predicate.
pub fn is_empty_ast(node: &Node) -> bool {
    match node {
        Node::Empty => true,
        Node::LogicalGroup(group) => group.flow.iter().all(|c| c.nodes.iter().all(is_empty_ast)),
        Node::Conjunction(conj) => conj.nodes.iter().all(is_empty_ast),
        _ => false,
    }
}

/// Visit every node of the tree, parents before children.
pub fn for_each_node<'a, F>(node: &'a Node, visitor: &mut F)
where
    F: FnMut(&'a Node),
{
    visitor(node);
    match node {
        Node::Negation(negation) => for_each_node(&negation.node, visitor),
        Node::Conjunction(conj) => {
            for n in &conj.nodes {
                for_each_node(n, visitor);
            }
        }
        Node::LogicalGroup(LogicalGroup { flow }) | Node::FieldGroup(FieldGroup { flow, .. }) => {
            for n in flow.iter().flat_map(|c| &c.nodes) {
                for_each_node(n, visitor);
            }
        }
        Node::Term(_)
        | Node::Range(_)
        | Node::Regexp(_)
        | Node::Wildcard(_)
        | Node::Exists(_)
        | Node::GeoDistance(_)
        | Node::GeoBoundingBox(_)
        | Node::Function(_)
        | Node::Empty => {}
    }
}

/// Visit every term-like node (see [`Node::is_term_like`]).
pub fn for_each_term_like<'a, F>(node: &'a Node, visitor: &mut F)
where
    F: FnMut(&'a Node),
{
    for_each_node(node, &mut |n| {
        if n.is_term_like() {
            visitor(n);
        }
    });
}

/// Collect the term-like nodes for which `predicate` holds.
pub fn filter_term_like<'a, F>(node: &'a Node, mut predicate: F) -> Vec<&'a Node>
where
    F: FnMut(&Node) -> bool,
{
    let mut found = Vec::new();
    for_each_term_like(node, &mut |n| {
        if predicate(n) {
            found.push(n);
        }
    });
    found
}

/// Push `field` onto every descendant that has no field of its own.
///
/// Recursion passes through negations, conjunctions and logical groups and
/// stops at nodes that already declare a field (including nested field
/// groups).
pub fn propagate_default_field(node: Node, field: &str) -> Node {
    match node {
        Node::Term(mut term) => {
            term.field.get_or_insert_with(|| field.to_string());
            Node::Term(term)
        }
        Node::Range(mut range) => {
            range.field.get_or_insert_with(|| field.to_string());
            Node::Range(range)
        }
        Node::Regexp(mut regexp) => {
            regexp.field.get_or_insert_with(|| field.to_string());
            Node::Regexp(regexp)
        }
        Node::Wildcard(mut wildcard) => {
            wildcard.field.get_or_insert_with(|| field.to_string());
            Node::Wildcard(wildcard)
        }
        Node::Negation(negation) => Node::Negation(Negation {
            node: Box::new(propagate_default_field(*negation.node, field)),
        }),
        Node::Conjunction(conj) => Node::Conjunction(propagate_conjunction(conj, field)),
        Node::LogicalGroup(group) => Node::LogicalGroup(LogicalGroup {
            flow: group
                .flow
                .into_iter()
                .map(|c| propagate_conjunction(c, field))
                .collect(),
        }),
        node @ (Node::Exists(_)
        | Node::GeoDistance(_)
        | Node::GeoBoundingBox(_)
        | Node::Function(_)
        | Node::FieldGroup(_)
        | Node::Empty) => node,
    }
}

fn propagate_conjunction(conj: Conjunction, field: &str) -> Conjunction {
    Conjunction {
        nodes: conj
            .nodes
            .into_iter()
            .map(|n| propagate_default_field(n, field))
            .collect(),
    }
}

/// Logical NOT. Double negations cancel out.
pub fn negate(node: Node) -> Node {
    match node {
        Node::Negation(negation) => *negation.node,
        other => Node::Negation(Negation {
            node: Box::new(other),
        }),
    }
}

/// AND the given nodes together, skipping empty ones.
pub fn and(nodes: Vec<Node>) -> Node {
    let mut nodes: Vec<Node> = nodes.into_iter().filter(|n| !is_empty_ast(n)).collect();
    match nodes.len() {
        0 => Node::Empty,
        1 => nodes.remove(0),
        _ => Node::LogicalGroup(LogicalGroup {
            flow: vec![Conjunction::new(nodes)],
        }),
    }
}

/// OR the given nodes together, skipping empty ones.
pub fn or(nodes: Vec<Node>) -> Node {
    let mut nodes: Vec<Node> = nodes.into_iter().filter(|n| !is_empty_ast(n)).collect();
    match nodes.len() {
        0 => Node::Empty,
        1 => nodes.remove(0),
        _ => Node::LogicalGroup(LogicalGroup {
            flow: nodes
                .into_iter()
                .map(|n| Conjunction::new(vec![n]))
                .collect(),
        }),
    }
}
