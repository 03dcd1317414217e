// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Envelopes and the per-dispatch details accumulator.
//!
//! An [`Envelope`] describes one dispatched occurrence and never changes while it
//! bubbles, except for the group currently intercepting it. Everything ancestors
//! want to tell each other goes into [`Details`], which is created fresh for every
//! delivery and handed from group to group by mutable reference.

use alloc::string::String;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{EventType, MountRef, NodeId};
use crate::value_bag::ValueBag;

/// Payload carried by an envelope.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Produced by leaf activation.
    Register(Registration),
    /// Anything a node dispatches explicitly.
    Value(Value),
}

impl Payload {
    /// The field value this payload reports, if any.
    ///
    /// For [`Payload::Register`] this is the leaf's value at activation.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Register(registration) => registration.value.as_ref(),
            Self::Value(value) => Some(value),
        }
    }
}

/// Register payload: the host's mount reference plus the leaf's current value.
#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    /// Mount reference passed to [`FormTree::activate`](crate::FormTree::activate).
    pub mount: Option<MountRef>,
    /// Value of the leaf when it was activated (unset for valueless leaves without a default).
    pub value: Option<Value>,
}

/// Snapshot of the originating node, taken when the envelope is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    /// Originating node.
    pub id: NodeId,
    /// Field name, if the origin is a named leaf.
    pub name: Option<String>,
    /// Whether the origin is a valueless leaf (groups count as valueless).
    pub valueless: bool,
}

impl Target {
    /// Key under which this target's value is stored in a value bag.
    ///
    /// Unnamed origins use the empty string.
    pub fn bag_key(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Description of one dispatched occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    event_type: EventType,
    payload: Payload,
    target: Target,
    current: Option<NodeId>,
}

impl Envelope {
    pub(crate) fn new(event_type: EventType, payload: Payload, target: Target) -> Self {
        Self {
            event_type,
            payload,
            target,
            current: None,
        }
    }

    /// Event type tag.
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Event payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Originating node.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Group currently intercepting the envelope; `None` outside a traversal.
    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    pub(crate) fn set_current(&mut self, node: Option<NodeId>) {
        self.current = node;
    }
}

/// Mutable side channel shared by the groups visited during one delivery.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Details {
    /// Namespaced aggregate of the origin's value.
    pub value_bag: ValueBag,
    /// Free-form entries groups use to talk to their ancestors.
    pub entries: Map<String, Value>,
    /// Set once a namespaced group has placed the origin's field in the bag.
    #[serde(skip)]
    pub(crate) nested: bool,
}

impl Details {
    /// Create empty details.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a free-form entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Write a free-form entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }
}
