// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between the form tree and whatever renders it.
//!
//! The core does not render. It hands a [`Renderer`] a [`RenderProps`] bundle for an
//! active leaf and, if an ancestor group (or the tree itself) configured an element
//! wrapper, asks the renderer to wrap the result. Wrappers are identified by
//! [`WrapperId`]; their meaning belongs to the renderer.

use serde_json::{Map, Value};

use alloc::string::String;

use crate::tree::{DispatchOutcome, FormTree};
use crate::types::{DispatchMode, EventType, NodeId};

/// Opaque identifier of an element wrapper known to the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WrapperId(pub u32);

/// Dispatch capability bound to one node, handed out with [`RenderProps`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DispatchHandle {
    node: NodeId,
}

impl DispatchHandle {
    pub(crate) fn new(node: NodeId) -> Self {
        Self { node }
    }

    /// Node this handle dispatches from.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Dispatch `event_type` with `payload` from the bound node.
    ///
    /// Same contract as [`FormTree::dispatch`].
    pub fn dispatch(
        &self,
        tree: &mut FormTree,
        event_type: EventType,
        payload: Value,
        mode: DispatchMode,
    ) -> Option<DispatchOutcome> {
        tree.dispatch(self.node, event_type, payload, mode)
    }
}

/// Everything a renderer needs to draw one leaf.
#[derive(Clone, Copy, Debug)]
pub struct RenderProps<'a> {
    /// Current value.
    pub value: Option<&'a Value>,
    /// Aux-state.
    pub state: &'a Map<String, Value>,
    /// Validation errors.
    pub errors: &'a Map<String, Value>,
    /// Dispatch capability for the leaf.
    pub dispatch: DispatchHandle,
}

/// Host-side rendering of leaves.
pub trait Renderer {
    /// Whatever the host produces for a leaf.
    type Element;

    /// Render one active leaf.
    fn render_leaf(&mut self, props: RenderProps<'_>) -> Self::Element;

    /// Wrap a rendered leaf with the wrapper inherited from its ancestors.
    ///
    /// The default leaves the element untouched.
    fn wrap(
        &mut self,
        wrapper: WrapperId,
        name: Option<&str>,
        element: Self::Element,
    ) -> Self::Element {
        let _ = (wrapper, name);
        element
    }
}
