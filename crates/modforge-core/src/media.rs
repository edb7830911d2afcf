//! Combined media handles: a sprite or sound assembled from one or more
//! source graphics/sounds, exported as a single file.

use serde::{Deserialize, Serialize};

/// A sprite built from a head graphic and its deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSprite {
    pub head_sprite_id: i64,
    pub filename: String,
    /// Ids of the staging objects referencing this sprite.
    refs: Vec<String>,
}

impl CombinedSprite {
    pub fn new(head_sprite_id: i64, filename: impl Into<String>) -> Self {
        Self {
            head_sprite_id,
            filename: filename.into(),
            refs: Vec::new(),
        }
    }

    pub fn add_reference(&mut self, staging_id: &str) {
        if !self.refs.iter().any(|r| r == staging_id) {
            self.refs.push(staging_id.to_string());
        }
    }

    pub fn remove_reference(&mut self, staging_id: &str) {
        self.refs.retain(|r| r != staging_id);
    }

    pub fn references(&self) -> &[String] {
        &self.refs
    }

    /// Sprites nobody references are not exported.
    pub fn is_referenced(&self) -> bool {
        !self.refs.is_empty()
    }

    pub fn relative_sprite_location(&self) -> String {
        format!("graphics/{}.sprite", self.filename)
    }
}

/// A sound built from one source sound entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSound {
    pub head_sound_id: i64,
    pub filename: String,
    refs: Vec<String>,
}

impl CombinedSound {
    pub fn new(head_sound_id: i64, filename: impl Into<String>) -> Self {
        Self {
            head_sound_id,
            filename: filename.into(),
            refs: Vec::new(),
        }
    }

    pub fn add_reference(&mut self, staging_id: &str) {
        if !self.refs.iter().any(|r| r == staging_id) {
            self.refs.push(staging_id.to_string());
        }
    }

    pub fn references(&self) -> &[String] {
        &self.refs
    }

    pub fn is_referenced(&self) -> bool {
        !self.refs.is_empty()
    }

    pub fn relative_file_location(&self) -> String {
        format!("sounds/{}.opus", self.filename)
    }
}
