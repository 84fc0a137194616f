//! Smooth animation state for carried items (host-agnostic).
//!
//! Tracks which configured animations are active on an item, persists that as
//! a bit-vector in the item's attributes, and keeps attachments and clip
//! playback on the presentation side consistent with it. The presentation side
//! can always be rebuilt from the persisted bits alone with the `last` action.
//!
//! Hosts supply three things: equipment providers ([`EquipmentProvider`]),
//! item storage ([`AttributeStore`]) and, on the rendering side, a
//! [`PresentationSink`].

pub mod active_set;
pub mod binding;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod ids;
pub mod presentation;
pub mod registry;
pub mod resolver;
pub mod storage;
pub mod transform;

// Re-exports for hosts
pub use active_set::{attribute_key, ActiveAnimationSet, ActiveBits};
pub use binding::{AttachmentBinding, BindingTable, SlotBindings};
pub use config::{parse_config_json, AnimationEntry, AttachmentEntry, SmoothAnimationConfig};
pub use controller::{Action, ActionParams, AnimationController};
pub use diagnostics::{
    Diagnostic, DiagnosticSink, DiagnosticsCfg, LogSink, RecordingSink, Severity,
};
pub use error::{ActionError, ConfigError};
pub use ids::AnimIndex;
pub use presentation::{
    Attached, NoPresentation, PresentationSink, PresentationState, Side, SlotPolicy,
};
pub use registry::{AnimationDescriptor, AnimationRegistry, INSTANT_SPEED};
pub use resolver::{AttachmentResolver, EquipmentProvider, ProviderRegistry, ResolvedAttachment};
pub use storage::{AttributeStore, AttributeValue, ItemAttributes, ItemStack};
pub use transform::Transform;
