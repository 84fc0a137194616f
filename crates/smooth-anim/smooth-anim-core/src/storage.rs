//! Item-local attribute storage.
//!
//! The host owns the real storage and its synchronization; the controller only
//! needs the three calls on [`AttributeStore`]. [`ItemStack`] is the in-crate
//! implementation. It serializes with serde so a save/reload round trip can be
//! reproduced without a host.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

pub trait AttributeStore {
    /// Stored vector under `key`, or `None` if absent or of another type.
    fn get_bool_array(&self, key: &str) -> Option<Vec<bool>>;
    fn set_bool_array(&mut self, key: &str, value: Vec<bool>);
    /// Flag the owning item for re-synchronization to remote observers.
    fn mark_dirty(&mut self);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    BoolArray(Vec<bool>),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemAttributes {
    inner: HashMap<String, AttributeValue>,
}

impl ItemAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.inner.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: AttributeValue) -> Option<AttributeValue> {
        self.inner.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.inner.remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// A concrete item: the carried item whose state is persisted, and also what
/// equipment providers hand back for attachment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub code: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub attributes: ItemAttributes,
    /// Set by `mark_dirty`; never persisted.
    #[serde(skip)]
    dirty: bool,
}

fn default_quantity() -> u32 {
    1
}

impl ItemStack {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            quantity: 1,
            attributes: ItemAttributes::new(),
            dirty: false,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear and return the dirty flag, as a sync pass would.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl AttributeStore for ItemStack {
    fn get_bool_array(&self, key: &str) -> Option<Vec<bool>> {
        match self.attributes.get(key) {
            Some(AttributeValue::BoolArray(v)) => Some(v.clone()),
            _ => None,
        }
    }

    fn set_bool_array(&mut self, key: &str, value: Vec<bool>) {
        self.attributes.set(key, AttributeValue::BoolArray(value));
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
