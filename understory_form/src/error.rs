// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by tree operations.

use thiserror::Error;

use crate::types::NodeId;

/// Caller mistakes surfaced by [`FormTree`](crate::FormTree) operations.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormError {
    /// The id was removed or never belonged to this tree.
    #[error("node {0:?} is stale")]
    Stale(NodeId),

    /// A leaf operation was applied to a group.
    #[error("node {0:?} is a group, not a leaf")]
    NotALeaf(NodeId),

    /// A state operation was applied to a leaf that is not active.
    #[error("leaf {0:?} is not active")]
    Inactive(NodeId),

    /// Reparenting would make a node its own ancestor.
    #[error("node {0:?} cannot be moved under its own descendant")]
    Cycle(NodeId),
}
