// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group configuration and interception.
//!
//! A group sits between its descendants and the rest of the tree. Every envelope
//! bubbling through it is intercepted exactly once:
//!
//! 1. [`EventType::Register`] from a leaf that is not valueless folds the registered
//!    value into [`Details::value_bag`].
//! 2. [`EventType::NewValue`] always folds the payload into the bag.
//! 3. Other event types leave the bag alone.
//!
//! Folding only happens when the group has a namespace. Afterwards the handler bound
//! for the event type (if any) runs with the envelope and the details; its reply is
//! the interception's result. Propagation continues either way.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use hashbrown::HashMap;
use serde_json::{Map, Value};

use crate::envelope::{Details, Envelope};
use crate::render::WrapperId;
use crate::types::EventType;

/// Handler bound to an event type on a group.
///
/// Returning `Some` makes the value available to a synchronous dispatcher.
pub type Handler = Box<dyn FnMut(&Envelope, &mut Details) -> Option<Value>>;

/// Construction-time configuration of a group.
///
/// ```
/// use understory_form::{EventType, GroupConfig};
///
/// let group = GroupConfig::new()
///     .with_namespace("profile")
///     .on_new_value(|envelope, details| {
///         assert_eq!(envelope.event_type(), &EventType::NewValue);
///         Some(details.value_bag.to_value())
///     });
/// assert_eq!(group.namespace(), Some("profile"));
/// assert!(group.handles(&EventType::NewValue));
/// assert!(!group.handles(&EventType::Register));
/// ```
#[derive(Default)]
pub struct GroupConfig {
    namespace: Option<String>,
    wrapper: Option<WrapperId>,
    handlers: HashMap<EventType, Handler>,
}

impl core::fmt::Debug for GroupConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupConfig")
            .field("namespace", &self.namespace)
            .field("wrapper", &self.wrapper)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl GroupConfig {
    /// A group with no namespace and no handlers; it passes everything through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nest descendants' contributions under `namespace`. An empty string means no namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    /// Wrap the rendered leaves of this subtree with `wrapper`.
    pub fn with_wrapper(mut self, wrapper: WrapperId) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    /// Bind `handler` to `event_type`, replacing any previous binding.
    pub fn on(
        mut self,
        event_type: EventType,
        handler: impl FnMut(&Envelope, &mut Details) -> Option<Value> + 'static,
    ) -> Self {
        self.handlers.insert(event_type, Box::new(handler));
        self
    }

    /// Bind a handler for [`EventType::Register`].
    pub fn on_register(
        self,
        handler: impl FnMut(&Envelope, &mut Details) -> Option<Value> + 'static,
    ) -> Self {
        self.on(EventType::Register, handler)
    }

    /// Bind a handler for [`EventType::NewValue`].
    pub fn on_new_value(
        self,
        handler: impl FnMut(&Envelope, &mut Details) -> Option<Value> + 'static,
    ) -> Self {
        self.on(EventType::NewValue, handler)
    }

    /// Namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Element wrapper, if any.
    pub fn wrapper(&self) -> Option<WrapperId> {
        self.wrapper
    }

    /// Returns true if a handler is bound for `event_type`.
    pub fn handles(&self, event_type: &EventType) -> bool {
        self.handlers.contains_key(event_type)
    }

    /// Run this group's part of a delivery.
    pub(crate) fn intercept(&mut self, envelope: &Envelope, details: &mut Details) -> Option<Value> {
        match envelope.event_type() {
            EventType::Register => {
                if !envelope.target().valueless {
                    let value = envelope.payload().value().cloned().unwrap_or(Value::Null);
                    self.patch_value_bag(envelope, details, value);
                }
            }
            EventType::NewValue => {
                let value = envelope.payload().value().cloned().unwrap_or(Value::Null);
                self.patch_value_bag(envelope, details, value);
            }
            EventType::Custom(_) => {}
        }
        let handler = self.handlers.get_mut(envelope.event_type())?;
        handler(envelope, details)
    }

    fn patch_value_bag(&self, envelope: &Envelope, details: &mut Details, value: Value) {
        // No namespace: the bag passes through intact.
        let Some(namespace) = self.namespace.as_deref() else {
            return;
        };
        let mut bag = core::mem::take(&mut details.value_bag);
        // The closest namespaced group seeds the field next to whatever handlers wrote.
        if !details.nested {
            bag.insert(envelope.target().bag_key(), value);
            details.nested = true;
        }
        details.value_bag = bag.nest(namespace);
    }

    /// Context this group exposes to its children.
    pub(crate) fn child_context(&self, inherited: &Context) -> Context {
        let initial_values = match self.namespace.as_deref() {
            None => inherited.initial_values.clone(),
            Some(namespace) => Rc::new(
                inherited
                    .initial_values
                    .get(namespace)
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
            ),
        };
        Context {
            initial_values,
            wrapper: self.wrapper.or(inherited.wrapper),
        }
    }
}

/// Ambient configuration flowing from parents to children.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Context {
    pub(crate) initial_values: Rc<Map<String, Value>>,
    pub(crate) wrapper: Option<WrapperId>,
}
