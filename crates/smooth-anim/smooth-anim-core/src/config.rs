//! Configuration block handed over by the host when the system is registered
//! on an item type.
//!
//! Required fields are modelled as defaulted strings so that a malformed entry
//! still deserializes and is reported by the registry with its position,
//! instead of surfacing as an opaque serde error.

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticsCfg;
use crate::error::ConfigError;
use crate::transform::Transform;

fn default_speed() -> f32 {
    1.0
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothAnimationConfig {
    /// Ordered list; position determines the persisted bit index.
    #[serde(default)]
    pub animations: Vec<AnimationEntry>,
    #[serde(default)]
    pub diagnostics: DiagnosticsCfg,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawAnimationEntry")]
pub struct AnimationEntry {
    pub identifier: String,
    pub clip_name: String,
    /// Handle used to stop the clip. Falls back to `clip_name` when absent.
    pub clip_id: Option<String>,
    pub animation_speed: f32,
    pub ease_in_speed: f32,
    pub ease_out_speed: f32,
    pub attachments: Vec<AttachmentEntry>,
}

/// Clip fields nested under `parameters`, the layout of older configs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClipParameters {
    animation: Option<String>,
    code: Option<String>,
    animation_speed: Option<f32>,
    ease_in_speed: Option<f32>,
    ease_out_speed: Option<f32>,
}

/// Accepts both the flat layout and the nested `parameters` one. Flat fields
/// take precedence when both are given.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnimationEntry {
    #[serde(default, alias = "code")]
    identifier: String,
    clip_name: Option<String>,
    clip_id: Option<String>,
    animation_speed: Option<f32>,
    ease_in_speed: Option<f32>,
    ease_out_speed: Option<f32>,
    #[serde(default)]
    attachments: Vec<AttachmentEntry>,
    #[serde(default)]
    parameters: ClipParameters,
}

impl From<RawAnimationEntry> for AnimationEntry {
    fn from(raw: RawAnimationEntry) -> Self {
        let params = raw.parameters;
        Self {
            identifier: raw.identifier,
            clip_name: raw.clip_name.or(params.animation).unwrap_or_default(),
            clip_id: raw.clip_id.or(params.code),
            animation_speed: raw
                .animation_speed
                .or(params.animation_speed)
                .unwrap_or_else(default_speed),
            ease_in_speed: raw
                .ease_in_speed
                .or(params.ease_in_speed)
                .unwrap_or_else(default_speed),
            ease_out_speed: raw
                .ease_out_speed
                .or(params.ease_out_speed)
                .unwrap_or_else(default_speed),
            attachments: raw.attachments,
        }
    }
}

impl AnimationEntry {
    /// Entry with default speeds and no attachments.
    pub fn new(identifier: impl Into<String>, clip_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            clip_name: clip_name.into(),
            clip_id: None,
            animation_speed: 1.0,
            ease_in_speed: 1.0,
            ease_out_speed: 1.0,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: AttachmentEntry) -> Self {
        self.attachments.push(attachment);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentEntry {
    #[serde(default, alias = "attachment")]
    pub slot_name: String,
    #[serde(default, alias = "system")]
    pub provider_reference: String,
    #[serde(default)]
    pub transform: Transform,
}

impl AttachmentEntry {
    pub fn new(slot_name: impl Into<String>, provider_reference: impl Into<String>) -> Self {
        Self {
            slot_name: slot_name.into(),
            provider_reference: provider_reference.into(),
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Parse a configuration block from JSON text.
pub fn parse_config_json(s: &str) -> Result<SmoothAnimationConfig, ConfigError> {
    serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
}
