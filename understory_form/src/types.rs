// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the form tree: node identifiers, flags, event types, and mount references.

use alloc::string::String;

/// Identifier for a node in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-node lifecycle flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node has been activated by the host and not deactivated since.
        const ACTIVE    = 0b0000_0001;
        /// Leaf has no usable name or no default value; it never contributes to value bags on register.
        const VALUELESS = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Capability discriminator for a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A field-like unit of state (value, aux-state, errors).
    Leaf,
    /// A container that intercepts events from descendants.
    Group,
}

/// Type tag of a dispatched event.
///
/// Groups bind handlers per variant. [`EventType::Custom`] keeps the binding set open for
/// deployments that route their own events through the tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Emitted once by a leaf each time it is activated.
    Register,
    /// A leaf reports a new value; every namespaced ancestor folds it into the value bag.
    NewValue,
    /// Any other event; never touches the value bag.
    Custom(String),
}

impl EventType {
    /// Shorthand for [`EventType::Custom`].
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

/// Opaque reference handed over by the host when it mounts a node.
///
/// The core never interprets it; it is only carried in the register payload so that
/// ancestors can correlate a leaf with whatever the host rendered for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MountRef(pub u64);

/// Delivery mode for a dispatch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// Ancestors are visited before the call returns.
    Sync,
    /// The envelope is queued and delivered on the next [`FormTree::flush`](crate::FormTree::flush).
    #[default]
    Async,
}
