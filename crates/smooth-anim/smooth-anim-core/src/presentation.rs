//! Presentation side: what is attached to the item and which clips play.
//!
//! The controller writes the same action stream to whatever sink it was built
//! with. [`NoPresentation`] makes it an authoritative-only controller;
//! [`PresentationState`] records the derived scene for a renderer to read.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::registry::AnimationDescriptor;
use crate::storage::ItemStack;
use crate::transform::Transform;

/// Which execution context a sink belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Side {
    /// Persists canonical state; never renders.
    Authoritative,
    /// Persists like the authoritative side and also drives visuals.
    Presentation,
}

pub trait PresentationSink {
    fn side(&self) -> Side;
    fn clear_attachments(&mut self);
    fn attach(&mut self, slot: &str, item: ItemStack, transform: &Transform);
    fn start_clip(&mut self, descriptor: &AnimationDescriptor);
    fn stop_clip(&mut self, clip_id: &str, immediate: bool);

    fn is_presenting(&self) -> bool {
        self.side() == Side::Presentation
    }
}

/// Sink of the authoritative context. Every call is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPresentation;

impl PresentationSink for NoPresentation {
    fn side(&self) -> Side {
        Side::Authoritative
    }
    fn clear_attachments(&mut self) {}
    fn attach(&mut self, _slot: &str, _item: ItemStack, _transform: &Transform) {}
    fn start_clip(&mut self, _descriptor: &AnimationDescriptor) {}
    fn stop_clip(&mut self, _clip_id: &str, _immediate: bool) {}
}

/// What to do when two active animations bind the same slot.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum SlotPolicy {
    /// The most recently resolved attachment replaces the slot's item.
    #[default]
    LastWins,
    /// The first attachment in a slot stays until attachments are cleared.
    KeepFirst,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attached {
    pub item: ItemStack,
    pub transform: Transform,
}

/// Recorded presentation state, keyed by slot and clip id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PresentationState {
    attachments: IndexMap<String, Attached>,
    playing: IndexMap<String, AnimationDescriptor>,
    /// Every stop request as `(clip_id, immediate)`, in call order.
    stopped: Vec<(String, bool)>,
    policy: SlotPolicy,
}

impl PresentationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot_policy(mut self, policy: SlotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn slot_policy(&self) -> SlotPolicy {
        self.policy
    }

    pub fn attachments(&self) -> &IndexMap<String, Attached> {
        &self.attachments
    }

    pub fn attachment(&self, slot: &str) -> Option<&Attached> {
        self.attachments.get(slot)
    }

    /// Descriptors of playing clips, keyed by clip id.
    pub fn playing(&self) -> &IndexMap<String, AnimationDescriptor> {
        &self.playing
    }

    pub fn is_playing(&self, clip_id: &str) -> bool {
        self.playing.contains_key(clip_id)
    }

    /// Identifiers of the animations whose clips are playing.
    pub fn playing_identifiers(&self) -> Vec<&str> {
        self.playing.values().map(|d| d.identifier.as_str()).collect()
    }

    pub fn stopped(&self) -> &[(String, bool)] {
        &self.stopped
    }

    /// Drop everything, e.g. after the renderer lost its scene.
    pub fn reset(&mut self) {
        self.attachments.clear();
        self.playing.clear();
        self.stopped.clear();
    }
}

impl PresentationSink for PresentationState {
    fn side(&self) -> Side {
        Side::Presentation
    }

    fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    fn attach(&mut self, slot: &str, item: ItemStack, transform: &Transform) {
        if self.policy == SlotPolicy::KeepFirst && self.attachments.contains_key(slot) {
            return;
        }
        self.attachments.insert(
            slot.to_string(),
            Attached {
                item,
                transform: transform.clone(),
            },
        );
    }

    fn start_clip(&mut self, descriptor: &AnimationDescriptor) {
        self.playing
            .insert(descriptor.clip_id.clone(), descriptor.clone());
    }

    fn stop_clip(&mut self, clip_id: &str, immediate: bool) {
        self.stopped.push((clip_id.to_string(), immediate));
        self.playing.shift_remove(clip_id);
    }
}
