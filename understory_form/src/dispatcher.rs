// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatcher helper: walk a bubble path and collect the first reply.
//!
//! The dispatcher executes a handler for each entry of a bubble path, closest
//! ancestor first. It is deliberately minimal:
//!
//! - There is no cancellation; every entry is visited.
//! - The accumulator you pass in is handed to each handler in turn, so later
//!   entries observe everything earlier entries wrote.
//! - The first `Some` reply is kept; later replies are computed but discarded.
//!
//! Bubble paths are produced by [`bubble_path`](crate::router::bubble_path).
//!
//! ## Minimal example
//!
//! ```
//! use understory_form::dispatcher;
//!
//! let path = [3_u32, 1, 0];
//! let mut seen = Vec::new();
//! let reply = dispatcher::run(&path, &mut seen, |node, seen| {
//!     seen.push(*node);
//!     (*node < 2).then_some(*node)
//! });
//!
//! assert_eq!(seen, vec![3, 1, 0]);
//! assert_eq!(reply, Some(1));
//! ```

/// Run a handler over a bubble path.
///
/// - `seq`: closest-first entries.
/// - `acc`: mutable state shared by all handler calls; you own its shape.
/// - `handler`: per-entry callback; a `Some` return is a reply.
///
/// Returns the first reply, or `None` if no handler replied.
pub fn run<K, E, R>(
    seq: &[K],
    acc: &mut E,
    mut handler: impl FnMut(&K, &mut E) -> Option<R>,
) -> Option<R> {
    let mut reply = None;
    for entry in seq {
        let current = handler(entry, acc);
        if reply.is_none() {
            reply = current;
        }
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct Node(u32);

    fn mk_seq() -> Vec<Node> {
        vec![Node(3), Node(2), Node(1)]
    }

    #[test]
    fn visits_every_entry_in_order() {
        let seq = mk_seq();
        let mut seen: Vec<u32> = Vec::new();
        let reply: Option<()> = run(&seq, &mut seen, |d, seen| {
            seen.push(d.0);
            None
        });
        assert!(reply.is_none());
        assert_eq!(seen, vec![3, 2, 1]);
    }

    #[test]
    fn first_reply_wins_and_walk_continues() {
        let seq = mk_seq();
        let mut seen: Vec<u32> = Vec::new();
        let reply = run(&seq, &mut seen, |d, seen| {
            seen.push(d.0);
            (d.0 <= 2).then_some(d.0)
        });
        assert_eq!(reply, Some(2));
        assert_eq!(seen, vec![3, 2, 1]);
    }

    #[test]
    fn accumulator_is_cumulative() {
        let seq = mk_seq();
        let mut depth = 0_u32;
        let mut observed: Vec<u32> = Vec::new();
        let _: Option<()> = run(&seq, &mut depth, |_, depth| {
            observed.push(*depth);
            *depth += 1;
            None
        });
        assert_eq!(depth, 3);
        assert_eq!(observed, vec![0, 1, 2]);
    }

    #[test]
    fn empty_path_is_a_no_op() {
        let mut calls = 0_u32;
        let reply: Option<u32> = run(&[] as &[Node], &mut calls, |_, calls| {
            *calls += 1;
            Some(1)
        });
        assert_eq!(reply, None);
        assert_eq!(calls, 0);
    }
}
