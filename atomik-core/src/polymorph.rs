//! Moving-target configuration of the core.
//!
//! The controller records a seed and a rotation period. No rotation is ever
//! scheduled in the simulator; the pair only drives status and telemetry.

use std::fmt;

use serde::Serialize;

/// Seed armed automatically when a genome requests rotation on load
pub const LOAD_SEED: u64 = 0xCAFE_BABE;

/// Seed and rotation period of the register map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PolymorphismController {
    seed: u64,
    frequency_ms: u32,
}

impl PolymorphismController {
    /// Disabled controller (seed 0, frequency 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite both fields. A zero frequency is stored like any other.
    pub fn set(&mut self, seed: u64, frequency_ms: u32) {
        self.seed = seed;
        self.frequency_ms = frequency_ms;
    }

    /// Current entropy seed
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current rotation period in milliseconds
    pub fn frequency_ms(&self) -> u32 {
        self.frequency_ms
    }

    /// Rotation is considered active for any nonzero period.
    pub fn is_active(&self) -> bool {
        self.frequency_ms > 0
    }

    /// Status as reported to telemetry.
    pub fn status(&self) -> PolymorphStatus {
        if self.is_active() {
            PolymorphStatus::Hopping {
                seed: self.seed,
                frequency_ms: self.frequency_ms,
            }
        } else {
            PolymorphStatus::Static
        }
    }
}

/// Observable polymorphism state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PolymorphStatus {
    /// Register map is fixed
    Static,
    /// Register map nominally rotates every `frequency_ms`
    Hopping {
        /// Entropy seed
        seed: u64,
        /// Rotation period
        frequency_ms: u32,
    },
}

impl fmt::Display for PolymorphStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolymorphStatus::Static => f.write_str("STATIC"),
            PolymorphStatus::Hopping { seed, frequency_ms } => write!(
                f,
                "HARDWARE HOPPING ACTIVE (seed 0x{seed:016X}, every {frequency_ms} ms)"
            ),
        }
    }
}
