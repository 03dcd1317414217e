// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router: derive the bubble path for an envelope.
//!
//! ## Overview
//!
//! Walks parent links from the originating node to its root and keeps every
//! ancestor that intercepts events. The result is ordered closest-first, which is
//! the order the [`dispatcher`](crate::dispatcher) visits groups in.
//!
//! - The origin itself is never part of its own path.
//! - Ancestors that do not intercept (leaves hosting nested nodes) are skipped.
//! - Every intercepting ancestor is kept, with or without a namespace or handler.
//! - A root, or a node whose ancestors never intercept, yields an empty path.

use smallvec::SmallVec;

/// Closest-first list of intercepting ancestors.
pub type BubblePath<K> = SmallVec<[K; 8]>;

/// Source of parent links.
pub trait ParentLookup<K> {
    /// Parent of `node`, or `None` for roots and unknown nodes.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// Decides which ancestors take part in bubbling.
pub trait InterceptorLookup<K> {
    /// Returns true if `node` intercepts envelopes from its descendants.
    fn intercepts(&self, node: &K) -> bool;
}

/// Compute the closest-first bubble path for `target`.
///
/// ```
/// use understory_form::router::{InterceptorLookup, ParentLookup, bubble_path};
///
/// // 3 → 2 → 1, where only 1 and 3 intercept.
/// struct Chain;
/// impl ParentLookup<u32> for Chain {
///     fn parent_of(&self, node: &u32) -> Option<u32> {
///         (*node > 1).then(|| node - 1)
///     }
/// }
/// impl InterceptorLookup<u32> for Chain {
///     fn intercepts(&self, node: &u32) -> bool {
///         *node != 2
///     }
/// }
///
/// assert_eq!(bubble_path(4, &Chain).as_slice(), &[3, 1]);
/// assert!(bubble_path(1, &Chain).is_empty());
/// ```
pub fn bubble_path<K, T>(target: K, tree: &T) -> BubblePath<K>
where
    K: Copy,
    T: ParentLookup<K> + InterceptorLookup<K>,
{
    let mut out = BubblePath::new();
    let mut cur = target;
    // Collect to root; the tree guarantees acyclic ancestry.
    while let Some(parent) = tree.parent_of(&cur) {
        if tree.intercepts(&parent) {
            out.push(parent);
        }
        cur = parent;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct Node(u32);

    /// Parent table indexed by node id, plus the set of intercepting nodes.
    struct Table {
        parents: &'static [Option<u32>],
        groups: &'static [u32],
    }

    impl ParentLookup<Node> for Table {
        fn parent_of(&self, node: &Node) -> Option<Node> {
            self.parents
                .get(node.0 as usize)
                .copied()
                .flatten()
                .map(Node)
        }
    }

    impl InterceptorLookup<Node> for Table {
        fn intercepts(&self, node: &Node) -> bool {
            self.groups.contains(&node.0)
        }
    }

    // 0 (group) ← 1 (group) ← 2 (leaf) ← 3 (group) ← 4 (leaf)
    const TABLE: Table = Table {
        parents: &[None, Some(0), Some(1), Some(2), Some(3)],
        groups: &[0, 1, 3],
    };

    #[test]
    fn closest_ancestor_first() {
        let path = bubble_path(Node(4), &TABLE);
        assert_eq!(path.as_slice(), &[Node(3), Node(1), Node(0)]);
    }

    #[test]
    fn non_intercepting_ancestors_are_skipped() {
        let path = bubble_path(Node(3), &TABLE);
        assert_eq!(path.as_slice(), &[Node(1), Node(0)]);
    }

    #[test]
    fn origin_is_not_part_of_its_path() {
        let path = bubble_path(Node(1), &TABLE);
        assert_eq!(path.as_slice(), &[Node(0)]);
    }

    #[test]
    fn root_has_empty_path() {
        assert!(bubble_path(Node(0), &TABLE).is_empty());
    }

    #[test]
    fn unknown_node_has_empty_path() {
        assert!(bubble_path(Node(42), &TABLE).is_empty());
    }
}
