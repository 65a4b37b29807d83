#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![doc = r#"
ATOMiK hardware abstraction layer simulator.

Models a reconfigurable accelerator core: a single-slot device registry,
a strict binary genome decoder, a polymorphism controller, a secure channel
that derives compression telemetry from outbound bytes, and a metrics engine
that turns raw counters into efficiency figures.
"#]

pub mod channel;
pub mod config;
pub mod device;
pub mod error;
pub mod genome;
pub mod metrics;
pub mod polymorph;
pub mod registry;
pub mod tunnel;

// Re-export main types for easy access
pub use channel::{Counters, ObfuscatedPreview, SecureChannel, Transmission};
pub use config::HalConfig;
pub use device::{Device, DeviceStatus};
pub use error::{GenomeError, HalError, HalResult};
pub use genome::{Genome, GenomeHeader, GenomeId};
pub use metrics::Metrics;
pub use polymorph::{PolymorphStatus, PolymorphismController};
pub use registry::{DeviceHandle, DeviceRegistry};
pub use tunnel::{IncomingMessage, Tunnel, TunnelError};

/// Hardware constants advertised by the simulated core
pub mod constants {
    /// Major version of the HAL interface
    pub const VERSION_MAJOR: u32 = 1;

    /// Minor version of the HAL interface
    pub const VERSION_MINOR: u32 = 0;

    /// Advertised per-event latency of the core
    pub const LATENCY_NS: u32 = 37;

    /// Standard page-sized transfer buffer
    pub const MAX_BUFFER_SIZE: usize = 4096;

    /// The only device index the simulator exposes
    pub const SIMULATED_DEVICE_ID: u32 = 0;
}

/// Prelude for easy importing of core functionality
pub mod prelude {
    pub use super::constants::*;
    pub use super::{
        Device, DeviceHandle, DeviceRegistry, Genome, HalConfig, HalError, HalResult, Metrics,
    };
    pub use rand::{Rng, RngCore, SeedableRng};
}
