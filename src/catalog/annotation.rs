//! Annotation payload types
//!
//! An annotation is the list of things tracked in a video. Each thing keeps
//! its keyframe boxes plus whatever presentation properties the annotator
//! client attaches to it, which are stored untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Box of one thing at one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub x: f64,
    pub y: f64,
    /// May be negative when the box was dragged up or left
    pub w: f64,
    pub h: f64,
    pub frame: f64,
}

/// One annotated object and its keyframes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    pub keyframes: Vec<Keyframe>,
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Annotation of a whole video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotation(pub Vec<Thing>);

impl Annotation {
    /// Parse and validate an annotation from a request body
    pub fn from_slice(body: &[u8]) -> Result<Self, String> {
        let annotation: Self =
            serde_json::from_slice(body).map_err(|e| format!("Invalid annotation JSON: {e}"))?;
        annotation.validate()?;
        Ok(annotation)
    }

    /// Frames must be non-negative and unique within a thing
    pub fn validate(&self) -> Result<(), String> {
        for (index, thing) in self.0.iter().enumerate() {
            let mut seen = HashSet::new();
            for keyframe in &thing.keyframes {
                if keyframe.frame < 0.0 {
                    return Err(format!(
                        "thing {index}: negative frame {}",
                        keyframe.frame
                    ));
                }
                // -0.0 and 0.0 are the same frame
                if !seen.insert((keyframe.frame + 0.0).to_bits()) {
                    return Err(format!(
                        "thing {index}: duplicate keyframe at frame {}",
                        keyframe.frame
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn things(&self) -> usize {
        self.0.len()
    }
}
