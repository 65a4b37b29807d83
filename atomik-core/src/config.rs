//! Simulation constants a host may override.

use serde::{Deserialize, Serialize};

use crate::channel::PREVIEW_BYTES;
use crate::polymorph::LOAD_SEED;

/// Tunables of the simulated core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalConfig {
    /// Sparsity threshold a freshly opened device starts with (percent)
    pub default_sparsity: f32,
    /// Seed armed when a loaded genome requests rotation
    pub load_seed: u64,
    /// Number of scrambled tokens shown per secure send
    pub preview_bytes: usize,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            default_sparsity: 90.0,
            load_seed: LOAD_SEED,
            preview_bytes: PREVIEW_BYTES,
        }
    }
}

impl HalConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
