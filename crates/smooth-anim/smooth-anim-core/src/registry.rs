//! Animation registry: identifier ↔ dense index, plus the normal and instant
//! descriptors for every configured animation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::AnimationEntry;
use crate::error::ConfigError;
use crate::ids::{AnimIndex, IndexAllocator};

/// Speed used for every field of an instant descriptor. Large enough that the
/// clip snaps to its end pose on the first frame.
pub const INSTANT_SPEED: f32 = 1e4;

/// Immutable clip metadata handed to the presentation sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub index: AnimIndex,
    pub identifier: String,
    pub clip_name: String,
    pub clip_id: String,
    pub speed: f32,
    pub ease_in_speed: f32,
    pub ease_out_speed: f32,
}

impl AnimationDescriptor {
    /// Same clip, with every speed set to [`INSTANT_SPEED`].
    pub fn to_instant(&self) -> Self {
        Self {
            speed: INSTANT_SPEED,
            ease_in_speed: INSTANT_SPEED,
            ease_out_speed: INSTANT_SPEED,
            ..self.clone()
        }
    }

    pub fn is_instant(&self) -> bool {
        self.speed >= INSTANT_SPEED
            && self.ease_in_speed >= INSTANT_SPEED
            && self.ease_out_speed >= INSTANT_SPEED
    }
}

#[derive(Debug, Default)]
pub struct AnimationRegistry {
    indices: IndexMap<String, AnimIndex>,
    normal: Vec<AnimationDescriptor>,
    instant: Vec<AnimationDescriptor>,
}

impl AnimationRegistry {
    /// Build from configuration order. Fails on the first malformed or
    /// duplicate entry.
    pub fn from_entries(entries: &[AnimationEntry]) -> Result<Self, ConfigError> {
        let mut alloc = IndexAllocator::new();
        let mut reg = Self {
            indices: IndexMap::with_capacity(entries.len()),
            normal: Vec::with_capacity(entries.len()),
            instant: Vec::with_capacity(entries.len()),
        };

        for (position, entry) in entries.iter().enumerate() {
            let identifier = entry.identifier.trim();
            if identifier.is_empty() {
                return Err(ConfigError::MissingIdentifier { position });
            }
            if entry.clip_name.trim().is_empty() {
                return Err(ConfigError::MissingClip {
                    identifier: identifier.to_string(),
                });
            }
            if reg.indices.contains_key(identifier) {
                return Err(ConfigError::DuplicateAnimation {
                    identifier: identifier.to_string(),
                });
            }

            let index = alloc.alloc();
            let clip_id = match entry.clip_id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => entry.clip_name.clone(),
            };
            let descriptor = AnimationDescriptor {
                index,
                identifier: identifier.to_string(),
                clip_name: entry.clip_name.clone(),
                clip_id,
                speed: entry.animation_speed,
                ease_in_speed: entry.ease_in_speed,
                ease_out_speed: entry.ease_out_speed,
            };

            reg.indices.insert(identifier.to_string(), index);
            reg.instant.push(descriptor.to_instant());
            reg.normal.push(descriptor);
        }

        Ok(reg)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.normal.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty()
    }

    pub fn index_of(&self, identifier: &str) -> Option<AnimIndex> {
        self.indices.get(identifier).copied()
    }

    pub fn identifier(&self, index: AnimIndex) -> Option<&str> {
        self.normal.get(index.0).map(|d| d.identifier.as_str())
    }

    pub fn descriptor(&self, index: AnimIndex) -> Option<&AnimationDescriptor> {
        self.normal.get(index.0)
    }

    pub fn instant_descriptor(&self, index: AnimIndex) -> Option<&AnimationDescriptor> {
        self.instant.get(index.0)
    }

    /// Normal descriptors in index order.
    pub fn iter(&self) -> impl Iterator<Item = &AnimationDescriptor> {
        self.normal.iter()
    }
}
