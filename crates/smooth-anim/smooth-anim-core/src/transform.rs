use serde::{Deserialize, Serialize};

/// Render transform applied to an attached sub-item, relative to its slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transform {
    pub translation: [f32; 3],
    /// Euler angles in degrees.
    pub rotation: [f32; 3],
    pub origin: [f32; 3],
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            origin: [0.5, 0.0, 0.5],
            scale: 1.0,
        }
    }
}
