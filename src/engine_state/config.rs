//! # World Configuration
//!
//! Streaming radii, the chunk cap and the terrain seed. Every field has a
//! default, so a JSON file only needs to name the values it overrides:
//!
//! ```json
//! { "create_radius": 2, "render_radius": 2, "delete_radius": 4, "seed": 42 }
//! ```
//!
//! All radii are Chebyshev distances in chunks.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::error::WorldError;

/// Default hard cap on resident chunks.
pub const MAX_CHUNKS: usize = 1024;
/// Default half-width of the square in which chunks are created.
pub const CREATE_CHUNK_RADIUS: i32 = 6;
/// Default radius within which chunks are offered to the renderer.
pub const RENDER_CHUNK_RADIUS: i32 = 6;
/// Default radius at or beyond which chunks are evicted.
pub const DELETE_CHUNK_RADIUS: i32 = 8;

/// Tunable parameters of the world core.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorldConfig {
    /// Hard cap on resident chunks.
    pub max_chunks: usize,
    /// Half-width of the creation square around the viewer's chunk.
    pub create_radius: i32,
    /// Chunks further than this are never offered to the renderer.
    pub render_radius: i32,
    /// Chunks at this distance or further are evicted.
    pub delete_radius: i32,
    /// Seed of every terrain noise layer.
    pub seed: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_chunks: MAX_CHUNKS,
            create_radius: CREATE_CHUNK_RADIUS,
            render_radius: RENDER_CHUNK_RADIUS,
            delete_radius: DELETE_CHUNK_RADIUS,
            seed: 0,
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from JSON and validates it.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: WorldConfig =
            serde_json::from_str(json).context("failed to parse world configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in {}", path.display()))
    }

    /// Largest number of chunks that can be resident right after an eviction
    /// pass: the square of side `2 * delete_radius - 1` around the viewer.
    pub fn resident_chunk_bound(&self) -> usize {
        let side = (2 * self.delete_radius - 1).max(0) as usize;
        side * side
    }

    /// Rejects configurations under which streaming could overflow the cap.
    ///
    /// Creation must stay strictly inside the eviction radius, otherwise a
    /// freshly created chunk would be evicted on the next tick and recreated
    /// on the one after.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.create_radius < 0 || self.render_radius < 0 || self.delete_radius <= 0 {
            return Err(WorldError::InvalidConfig(format!(
                "create and render radii must be non-negative and the delete radius positive (create {}, render {}, delete {})",
                self.create_radius, self.render_radius, self.delete_radius
            )));
        }
        if self.create_radius >= self.delete_radius {
            return Err(WorldError::InvalidConfig(format!(
                "create radius {} must be below delete radius {}",
                self.create_radius, self.delete_radius
            )));
        }
        if self.render_radius > self.delete_radius {
            return Err(WorldError::InvalidConfig(format!(
                "render radius {} exceeds delete radius {}",
                self.render_radius, self.delete_radius
            )));
        }
        if self.resident_chunk_bound() > self.max_chunks {
            return Err(WorldError::InvalidConfig(format!(
                "delete radius {} can keep {} chunks resident, above the cap of {}",
                self.delete_radius,
                self.resident_chunk_bound(),
                self.max_chunks
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WorldConfig::default();
        assert_eq!(config.resident_chunk_bound(), 225);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = WorldConfig::from_json_str(r#"{ "seed": 42, "create_radius": 1 }"#)
            .expect("valid config");
        assert_eq!(config.seed, 42);
        assert_eq!(config.create_radius, 1);
        assert_eq!(config.delete_radius, DELETE_CHUNK_RADIUS);
        assert_eq!(config.max_chunks, MAX_CHUNKS);
    }

    #[test]
    fn overlapping_radii_are_rejected() {
        let config = WorldConfig {
            create_radius: 8,
            ..WorldConfig::default()
        };
        assert!(matches!(config.validate(), Err(WorldError::InvalidConfig(_))));

        let config = WorldConfig {
            render_radius: 9,
            ..WorldConfig::default()
        };
        assert!(matches!(config.validate(), Err(WorldError::InvalidConfig(_))));
    }

    #[test]
    fn caps_too_small_for_the_delete_radius_are_rejected() {
        let config = WorldConfig {
            max_chunks: 224,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(WorldConfig::from_json_str(r#"{ "max_chunks": 8 }"#).is_err());
    }

    #[test]
    fn zero_radii_are_allowed_below_a_positive_delete_radius() {
        let config = WorldConfig {
            create_radius: 0,
            render_radius: 0,
            delete_radius: 1,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_ok());

        let negative = WorldConfig {
            create_radius: -1,
            ..WorldConfig::default()
        };
        match negative.validate() {
            Err(WorldError::InvalidConfig(message)) => assert!(message.contains("non-negative")),
            other => panic!("unexpected result {other:?}"),
        }

        let no_delete = WorldConfig {
            create_radius: 0,
            delete_radius: 0,
            ..WorldConfig::default()
        };
        assert!(no_delete.validate().is_err());
    }
}
