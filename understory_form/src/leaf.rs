// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf configuration and the per-activation state container.
//!
//! A leaf's [`LeafState`] exists only while the leaf is active. It is built from the
//! leaf's [`LeafConfig`] and the initial-values view inherited from its ancestors,
//! and mutated only through [`FormTree`](crate::FormTree)'s leaf operations.

use alloc::rc::Rc;
use alloc::string::String;
use serde_json::{Map, Value};

/// Default aux-state of a leaf.
///
/// Resolved every time the aux-state is reset, so a computed default can change
/// between resets.
#[derive(Clone)]
pub enum DefaultState {
    /// Fixed mapping.
    Fixed(Map<String, Value>),
    /// Mapping produced on demand.
    Computed(Rc<dyn Fn() -> Map<String, Value>>),
}

impl DefaultState {
    /// Produce the default aux-state.
    pub fn resolve(&self) -> Map<String, Value> {
        match self {
            Self::Fixed(map) => map.clone(),
            Self::Computed(f) => f(),
        }
    }
}

impl Default for DefaultState {
    fn default() -> Self {
        Self::Fixed(Map::new())
    }
}

impl core::fmt::Debug for DefaultState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fixed(map) => f.debug_tuple("Fixed").field(map).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Construction-time configuration of a leaf.
///
/// ```
/// use serde_json::json;
/// use understory_form::LeafConfig;
///
/// let email = LeafConfig::new("email").with_default_value(json!(""));
/// assert!(!email.is_valueless());
///
/// // No default value: the leaf tracks state but never contributes on register.
/// assert!(LeafConfig::new("submit").is_valueless());
/// ```
#[derive(Clone, Debug, Default)]
pub struct LeafConfig {
    /// Field name; also the key looked up in the initial-values view.
    pub name: Option<String>,
    /// Value restored by reset and used when no initial value is supplied.
    pub default_value: Option<Value>,
    /// Aux-state restored by reset.
    pub default_state: DefaultState,
}

impl LeafConfig {
    /// Configuration for a named leaf with no default value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Configuration for an unnamed leaf.
    pub fn unnamed() -> Self {
        Self::default()
    }

    /// Set the default value.
    pub fn with_default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Set a fixed default aux-state.
    pub fn with_default_state(mut self, state: Map<String, Value>) -> Self {
        self.default_state = DefaultState::Fixed(state);
        self
    }

    /// Compute the default aux-state on every reset.
    pub fn with_default_state_fn(mut self, f: impl Fn() -> Map<String, Value> + 'static) -> Self {
        self.default_state = DefaultState::Computed(Rc::new(f));
        self
    }

    /// A leaf is valueless if it has no non-empty name or no default value.
    pub fn is_valueless(&self) -> bool {
        self.default_value.is_none() || self.name.as_deref().is_none_or(str::is_empty)
    }
}

/// State owned by an active leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafState {
    value: Option<Value>,
    previous: Option<Value>,
    initial: Option<Value>,
    aux: Map<String, Value>,
    errors: Map<String, Value>,
}

impl LeafState {
    /// Build the state for a freshly activated leaf.
    ///
    /// `initial_values` is the view inherited from the nearest ancestors.
    pub(crate) fn new(config: &LeafConfig, initial_values: &Map<String, Value>) -> Self {
        let (value, previous, initial) = if config.is_valueless() {
            (config.default_value.clone(), Some(Value::Null), None)
        } else {
            let initial = config
                .name
                .as_deref()
                .and_then(|name| initial_values.get(name))
                .or(config.default_value.as_ref())
                .cloned();
            (initial.clone(), None, initial)
        };
        Self {
            value,
            previous,
            initial,
            aux: config.default_state.resolve(),
            errors: Map::new(),
        }
    }

    /// Current value.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Value before the most recent write.
    ///
    /// Valueless leaves report `Null` until their first write.
    pub fn previous_value(&self) -> Option<&Value> {
        self.previous.as_ref()
    }

    /// Value captured at activation.
    pub fn initial_value(&self) -> Option<&Value> {
        self.initial.as_ref()
    }

    /// Aux-state.
    pub fn aux_state(&self) -> &Map<String, Value> {
        &self.aux
    }

    /// Validation errors.
    pub fn errors(&self) -> &Map<String, Value> {
        &self.errors
    }

    pub(crate) fn set_value(&mut self, value: Option<Value>) {
        self.previous = core::mem::replace(&mut self.value, value);
    }

    pub(crate) fn merge_aux_state(&mut self, partial: Map<String, Value>) {
        self.aux.extend(partial);
    }

    pub(crate) fn replace_aux_state(&mut self, aux: Map<String, Value>) {
        self.aux = aux;
    }

    pub(crate) fn merge_errors(&mut self, partial: Map<String, Value>) {
        self.errors.extend(partial);
    }

    pub(crate) fn clear_errors(&mut self) {
        self.errors = Map::new();
    }

    /// Value, then aux-state, then errors; all three unconditionally.
    pub(crate) fn reset(&mut self, config: &LeafConfig) {
        self.set_value(config.default_value.clone());
        self.replace_aux_state(config.default_state.resolve());
        self.clear_errors();
    }
}
