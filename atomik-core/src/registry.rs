//! Single-slot device registry.
//!
//! Replaces a process-global device with an explicit owner: callers `init`
//! once, `open` the only board, and receive a shared handle to it.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::HalConfig;
use crate::constants::SIMULATED_DEVICE_ID;
use crate::device::Device;
use crate::error::{HalError, HalResult};

/// Shared handle to the registry's device.
pub type DeviceHandle<R = StdRng> = Arc<Mutex<Device<R>>>;

/// Owner of at most one simulated device.
pub struct DeviceRegistry<R = StdRng> {
    config: HalConfig,
    initialized: bool,
    /// RNG seeded by `init`, moved into the device on first open
    rng: Option<R>,
    slot: Option<DeviceHandle<R>>,
}

impl<R> Default for DeviceRegistry<R> {
    fn default() -> Self {
        Self::with_config(HalConfig::default())
    }
}

impl<R> DeviceRegistry<R> {
    /// Empty, uninitialised registry with default tunables
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty, uninitialised registry
    pub fn with_config(config: HalConfig) -> Self {
        Self {
            config,
            initialized: false,
            rng: None,
            slot: None,
        }
    }

    /// Whether `init` has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Tunables applied to opened devices
    pub fn config(&self) -> &HalConfig {
        &self.config
    }

    /// Handle to the device if it was ever opened, active or not.
    pub fn handle(&self) -> Option<DeviceHandle<R>> {
        self.slot.clone()
    }
}

impl<R: RngCore> DeviceRegistry<R> {
    /// Prepare the runtime with an explicit randomness source.
    ///
    /// Idempotent: once initialised, later calls keep the existing source.
    pub fn init_with_rng(&mut self, rng: R) -> HalResult<()> {
        if self.initialized {
            debug!("hal already initialised");
            return Ok(());
        }
        self.rng = Some(rng);
        self.initialized = true;
        info!("hardware abstraction layer initialised");
        Ok(())
    }

    /// Open device `device_id`. Only index 0 exists.
    ///
    /// Returns the same handle while the device stays active. Opening an
    /// inactive device resets it to power-on defaults.
    pub fn open(&mut self, device_id: u32) -> HalResult<DeviceHandle<R>> {
        if device_id != SIMULATED_DEVICE_ID {
            warn!(device_id, "no such device");
            return Err(HalError::NoDevice);
        }
        if !self.initialized {
            warn!(device_id, "open before init");
            return Err(HalError::NoDevice);
        }

        if let Some(handle) = &self.slot {
            let mut device = handle.lock();
            if !device.is_active() {
                device.reset();
            }
            drop(device);
            return Ok(Arc::clone(handle));
        }

        let rng = self.rng.take().ok_or(HalError::NoDevice)?;
        let handle = Arc::new(Mutex::new(Device::attach(device_id, self.config, rng)));
        self.slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Mark the device inactive. Its state is discarded on the next open.
    pub fn close(&mut self) {
        if let Some(handle) = &self.slot {
            handle.lock().detach();
        }
    }
}

impl<R: RngCore + SeedableRng> DeviceRegistry<R> {
    /// Prepare the runtime, seeding telemetry noise from OS entropy.
    pub fn init(&mut self) -> HalResult<()> {
        if self.initialized {
            debug!("hal already initialised");
            return Ok(());
        }
        self.init_with_rng(R::from_entropy())
    }
}
