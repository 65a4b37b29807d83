//! Simulated accelerator state and its operations.

use std::path::Path;

use rand::RngCore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::channel::{Counters, SecureChannel, Transmission};
use crate::config::HalConfig;
use crate::constants::LATENCY_NS;
use crate::error::{GenomeError, HalError, HalResult};
use crate::genome::Genome;
use crate::metrics::Metrics;
use crate::polymorph::{PolymorphStatus, PolymorphismController};

/// One simulated ATOMiK core.
///
/// Every configuration and telemetry operation fails with
/// [`HalError::NoDevice`] while the device is inactive, leaving state as is.
/// Instances are created and reset by the [`DeviceRegistry`](crate::DeviceRegistry).
pub struct Device<R> {
    id: u32,
    active: bool,
    genome: Genome,
    polymorphism: PolymorphismController,
    sparsity_threshold: f32,
    channel: SecureChannel,
    config: HalConfig,
    rng: R,
}

impl<R: RngCore> Device<R> {
    pub(crate) fn attach(id: u32, config: HalConfig, rng: R) -> Self {
        let mut device = Self {
            id,
            active: false,
            genome: Genome::default(),
            polymorphism: PolymorphismController::new(),
            sparsity_threshold: config.default_sparsity,
            channel: SecureChannel::new(config.preview_bytes),
            config,
            rng,
        };
        device.reset();
        device
    }

    /// Restore power-on defaults and mark active. The RNG keeps its stream.
    pub(crate) fn reset(&mut self) {
        self.active = true;
        self.genome = Genome::default();
        self.polymorphism = PolymorphismController::new();
        self.sparsity_threshold = self.config.default_sparsity;
        self.channel = SecureChannel::new(self.config.preview_bytes);
        info!(
            device = self.id,
            latency_ns = LATENCY_NS,
            "device attached (simulated core)"
        );
    }

    pub(crate) fn detach(&mut self) {
        if self.active {
            self.active = false;
            info!(device = self.id, "device detached");
        }
    }

    fn ensure_active(&self, op: &'static str) -> HalResult<()> {
        if self.active {
            Ok(())
        } else {
            warn!(device = self.id, op, "operation on inactive device");
            Err(HalError::NoDevice)
        }
    }

    /// Flash the genome file at `path`.
    pub fn load_genome(&mut self, path: impl AsRef<Path>) -> HalResult<&Genome> {
        self.ensure_active("load_genome")?;
        let path = path.as_ref();
        info!(path = %path.display(), "reading genome file");
        let decoded = Genome::load(path);
        self.flash(decoded)
    }

    /// Flash an in-memory genome image.
    pub fn load_genome_bytes(&mut self, bytes: &[u8]) -> HalResult<&Genome> {
        self.ensure_active("load_genome")?;
        let decoded = Genome::decode(bytes);
        self.flash(decoded)
    }

    fn flash(&mut self, decoded: Result<Genome, GenomeError>) -> HalResult<&Genome> {
        let genome = match decoded {
            Ok(genome) => genome,
            Err(err) => {
                warn!(error = %err, "genome rejected");
                return Err(err.into());
            }
        };

        info!(
            version = genome.version(),
            payload_bytes = genome.payload_size(),
            polymorph_ms = genome.polymorph_frequency_ms(),
            "genome header valid, logic flashed"
        );
        self.genome = genome;

        if genome.polymorph_frequency_ms() > 0 {
            self.set_polymorphism(self.config.load_seed, genome.polymorph_frequency_ms())?;
        }
        Ok(&self.genome)
    }

    /// Compare hardware state against `expected`.
    ///
    /// The simulator has no registers to read back, so this always succeeds.
    pub fn verify_genome(&self, _expected: &Genome) -> HalResult<()> {
        Ok(())
    }

    /// Set the moving-target parameters.
    pub fn set_polymorphism(&mut self, seed: u64, frequency_ms: u32) -> HalResult<()> {
        self.ensure_active("set_polymorphism")?;
        self.polymorphism.set(seed, frequency_ms);
        info!(
            seed = %format!("0x{seed:016X}"),
            frequency_ms, "polymorphism configured"
        );
        Ok(())
    }

    /// Store the sparsity filter threshold verbatim (no range check).
    pub fn set_sparsity(&mut self, threshold_percent: f32) -> HalResult<()> {
        self.ensure_active("set_sparsity")?;
        self.sparsity_threshold = threshold_percent;
        info!(threshold_percent, "sparsity filter set");
        Ok(())
    }

    /// Route `data` through the secure channel.
    pub fn secure_send(&mut self, data: &[u8]) -> HalResult<Transmission> {
        self.ensure_active("secure_send")?;
        let tx = self.channel.send(data, &mut self.rng);
        debug!(
            bytes_in = tx.bytes_in,
            bytes_out = tx.bytes_out,
            preview = %tx.preview,
            "secure send"
        );
        Ok(tx)
    }

    /// Fresh telemetry from the counters.
    pub fn get_metrics(&mut self) -> HalResult<Metrics> {
        self.ensure_active("get_metrics")?;
        Ok(Metrics::sample(&self.channel.counters(), &mut self.rng))
    }

    /// Everything a dashboard shows, in one snapshot.
    pub fn status(&mut self) -> HalResult<DeviceStatus> {
        let metrics = self.get_metrics()?;
        Ok(DeviceStatus {
            device_id: self.id,
            genome_id: self.genome.id().to_string(),
            polymorphism: self.polymorphism.status(),
            sparsity_threshold: self.sparsity_threshold,
            metrics,
        })
    }
}

impl<R> Device<R> {
    /// Device index
    pub fn id(&self) -> u32 {
        self.id
    }

    /// True between open and close
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Currently flashed genome (default until a load succeeds)
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Polymorphism controller state
    pub fn polymorphism(&self) -> &PolymorphismController {
        &self.polymorphism
    }

    /// Stored sparsity threshold
    pub fn sparsity_threshold(&self) -> f32 {
        self.sparsity_threshold
    }

    /// Raw hardware counters
    pub fn counters(&self) -> Counters {
        self.channel.counters()
    }
}

impl<R> std::fmt::Debug for Device<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("genome", &self.genome)
            .field("polymorphism", &self.polymorphism)
            .field("sparsity_threshold", &self.sparsity_threshold)
            .field("counters", &self.channel.counters())
            .finish_non_exhaustive()
    }
}

/// Status snapshot returned by [`Device::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    /// Device index
    pub device_id: u32,
    /// Display id of the flashed genome, empty if none
    pub genome_id: String,
    /// Polymorphism mode
    pub polymorphism: PolymorphStatus,
    /// Sparsity filter threshold
    pub sparsity_threshold: f32,
    /// Fresh telemetry
    pub metrics: Metrics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GenomeHeader;
    use crate::polymorph::LOAD_SEED;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn device() -> Device<StdRng> {
        Device::attach(0, HalConfig::default(), StdRng::seed_from_u64(11))
    }

    fn image(freq: u32, payload: usize) -> Vec<u8> {
        GenomeHeader {
            version: 1,
            polymorph_frequency_ms: freq,
        }
        .encode(&vec![0x1B; payload])
    }

    #[test]
    fn test_power_on_defaults() {
        let dev = device();
        assert!(dev.is_active());
        assert_eq!(dev.sparsity_threshold(), 90.0);
        assert_eq!(dev.counters(), Counters::default());
        assert!(dev.genome().id().is_empty());
        assert!(!dev.polymorphism().is_active());
    }

    #[test]
    fn test_load_arms_polymorphism() {
        let mut dev = device();
        let genome = *dev.load_genome_bytes(&image(100, 20)).unwrap();
        assert_eq!(genome.polymorph_frequency_ms(), 100);
        assert_eq!(dev.polymorphism().frequency_ms(), 100);
        assert_eq!(dev.polymorphism().seed(), LOAD_SEED);
    }

    #[test]
    fn test_static_genome_leaves_polymorphism_alone() {
        let mut dev = device();
        dev.set_polymorphism(0xAABB, 25).unwrap();
        dev.load_genome_bytes(&image(0, 4)).unwrap();
        assert_eq!(dev.polymorphism().seed(), 0xAABB);
        assert_eq!(dev.polymorphism().frequency_ms(), 25);
    }

    #[test]
    fn test_failed_load_keeps_previous_genome() {
        let mut dev = device();
        dev.load_genome_bytes(&image(50, 8)).unwrap();
        let before = *dev.genome();

        let mut bad = image(900, 8);
        bad[0] = b'X';
        let err = dev.load_genome_bytes(&bad).unwrap_err();
        assert!(matches!(
            err,
            HalError::InvalidGenome(GenomeError::BadMagic { .. })
        ));
        assert_eq!(*dev.genome(), before);
        assert_eq!(dev.polymorphism().frequency_ms(), 50);
    }

    #[test]
    fn test_sparsity_is_not_clamped() {
        let mut dev = device();
        dev.set_sparsity(150.5).unwrap();
        assert_eq!(dev.sparsity_threshold(), 150.5);
        dev.set_sparsity(-3.0).unwrap();
        assert_eq!(dev.sparsity_threshold(), -3.0);
    }

    #[test]
    fn test_inactive_device_rejects_everything() {
        let mut dev = device();
        dev.secure_send(b"warmup").unwrap();
        let counters = dev.counters();
        dev.detach();

        assert!(matches!(dev.secure_send(b"x"), Err(HalError::NoDevice)));
        assert!(matches!(dev.get_metrics(), Err(HalError::NoDevice)));
        assert!(matches!(dev.status(), Err(HalError::NoDevice)));
        assert!(matches!(dev.set_sparsity(1.0), Err(HalError::NoDevice)));
        assert!(matches!(
            dev.set_polymorphism(1, 1),
            Err(HalError::NoDevice)
        ));
        assert!(matches!(
            dev.load_genome_bytes(&image(5, 5)),
            Err(HalError::NoDevice)
        ));
        assert_eq!(dev.counters(), counters);
        assert!(dev.genome().id().is_empty());
        assert_eq!(dev.sparsity_threshold(), 90.0);
    }

    #[test]
    fn test_verify_genome_always_succeeds() {
        let dev = device();
        let other = Genome::decode(&image(3, 3)).unwrap();
        assert!(dev.verify_genome(&other).is_ok());
    }

    #[test]
    fn test_status_snapshot() {
        let mut dev = device();
        dev.load_genome_bytes(&image(40, 2)).unwrap();
        dev.secure_send(&[7u8; 50]).unwrap();
        let status = dev.status().unwrap();
        assert_eq!(status.genome_id, "G_VER_1");
        assert_eq!(
            status.polymorphism,
            PolymorphStatus::Hopping {
                seed: LOAD_SEED,
                frequency_ms: 40
            }
        );
        assert_eq!(status.metrics.events_processed, 50);
        assert_eq!(status.metrics.events_emitted, 4);
    }
}
