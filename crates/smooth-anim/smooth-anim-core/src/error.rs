//! Error types for configuration loading and action processing.

use thiserror::Error;

use crate::ids::AnimIndex;

/// Fatal problems found while building the registry or binding table.
///
/// Any of these means the item type must not activate the system; no partial
/// registry is ever handed out.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("animation entry #{position} has no identifier")]
    MissingIdentifier { position: usize },

    #[error("animation '{identifier}' has no clip name")]
    MissingClip { identifier: String },

    #[error("animation '{identifier}' is declared more than once")]
    DuplicateAnimation { identifier: String },

    #[error("attachment #{position} of animation '{animation}' is missing '{field}'")]
    MissingBindingField {
        animation: String,
        position: usize,
        field: &'static str,
    },

    #[error("animation '{animation}' binds slot '{slot}' more than once")]
    DuplicateSlot { animation: String, slot: String },

    #[error("slot '{slot}' of animation '{animation}' references unknown provider '{provider}'")]
    UnknownProvider {
        animation: String,
        slot: String,
        provider: String,
    },
}

/// Recoverable failures of a single action. The controller logs these and
/// reports `false`; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("action does not exist: {action}")]
    UnknownAction { action: String },

    #[error("action '{action}' requires an animation code")]
    MissingCode { action: &'static str },

    #[error("unknown animation code: {code}")]
    UnknownAnimation { code: String },

    #[error("animation index {index} is out of range (registry size {len})")]
    IndexOutOfRange { index: AnimIndex, len: usize },
}
