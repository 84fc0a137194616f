//! Persisted set of active animations.
//!
//! One bit per registered animation, stored as a bool array on the item. The
//! stored vector is the only source of truth for "is this animation active";
//! anything the presentation side holds is derived from it.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::error::ActionError;
use crate::ids::AnimIndex;
use crate::registry::AnimationRegistry;
use crate::storage::AttributeStore;

/// Attribute key for a system instance.
pub fn attribute_key(code: &str) -> String {
    format!("FSMlib.{code}.active")
}

/// Result of a tolerant read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveBits {
    pub bits: Vec<bool>,
    /// Length of a stored vector that did not match the registry and was
    /// replaced by the all-false default.
    pub discarded_len: Option<usize>,
}

impl ActiveBits {
    pub fn is_stale(&self) -> bool {
        self.discarded_len.is_some()
    }
}

#[derive(Debug)]
pub struct ActiveAnimationSet {
    attribute: String,
    registry: Arc<AnimationRegistry>,
}

impl ActiveAnimationSet {
    pub fn new(code: &str, registry: Arc<AnimationRegistry>) -> Self {
        Self {
            attribute: attribute_key(code),
            registry,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Read the stored vector. Absent or wrongly sized vectors read as all-false.
    pub fn load<S: AttributeStore + ?Sized>(&self, store: &S) -> ActiveBits {
        let len = self.registry.len();
        match store.get_bool_array(&self.attribute) {
            Some(bits) if bits.len() == len => ActiveBits {
                bits,
                discarded_len: None,
            },
            Some(stale) => ActiveBits {
                bits: vec![false; len],
                discarded_len: Some(stale.len()),
            },
            None => ActiveBits {
                bits: vec![false; len],
                discarded_len: None,
            },
        }
    }

    pub fn is_active<S: AttributeStore + ?Sized>(&self, store: &S, index: AnimIndex) -> bool {
        self.load(store).bits.get(index.0).copied().unwrap_or(false)
    }

    /// Write one bit, persist the whole vector and mark the store dirty.
    /// Returns the vector as written.
    pub fn set_active<S: AttributeStore + ?Sized>(
        &self,
        store: &mut S,
        index: AnimIndex,
        active: bool,
    ) -> Result<Vec<bool>, ActionError> {
        let len = self.registry.len();
        if index.0 >= len {
            return Err(ActionError::IndexOutOfRange { index, len });
        }
        let mut bits = self.load(store).bits;
        bits[index.0] = active;
        store.set_bool_array(&self.attribute, bits.clone());
        store.mark_dirty();
        Ok(bits)
    }

    /// Identifiers of all set bits, in index order.
    pub fn snapshot_active_identifiers<S: AttributeStore + ?Sized>(
        &self,
        store: &S,
    ) -> IndexSet<String> {
        self.identifiers_of(&self.load(store).bits)
    }

    pub(crate) fn identifiers_of(&self, bits: &[bool]) -> IndexSet<String> {
        bits.iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .filter_map(|(i, _)| self.registry.identifier(AnimIndex(i)))
            .map(str::to_string)
            .collect()
    }
}
