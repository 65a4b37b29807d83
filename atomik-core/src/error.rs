//! Error surface of the HAL simulator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::genome::{GENOME_MAGIC, HEADER_LEN};

/// Result alias used by every device operation.
pub type HalResult<T> = Result<T, HalError>;

/// Failure kinds reported by the core.
///
/// `PolymorphFail` and `Timeout` belong to the hardware interface but the
/// simulator never produces them.
#[derive(Debug, Error)]
pub enum HalError {
    /// Device not opened, already closed, not initialised, or unknown index.
    #[error("no device")]
    NoDevice,
    /// Genome could not be decoded.
    #[error("invalid genome: {0}")]
    InvalidGenome(#[from] GenomeError),
    /// Scramble synchronisation with the hardware failed.
    #[error("polymorphic scramble sync failed")]
    PolymorphFail,
    /// Hardware did not respond in time.
    #[error("hardware unresponsive")]
    Timeout,
}

impl HalError {
    /// Numeric status code used by the hardware interface (success is 0).
    pub fn code(&self) -> i32 {
        match self {
            HalError::NoDevice => -1,
            HalError::InvalidGenome(_) => -2,
            HalError::PolymorphFail => -3,
            HalError::Timeout => -4,
        }
    }
}

/// Specific reason a genome source was rejected.
#[derive(Debug, Error)]
pub enum GenomeError {
    /// The source could not be opened at all.
    #[error("genome file not found: {}", .path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying open failure.
        #[source]
        source: io::Error,
    },
    /// The source opened but reading it failed.
    #[error("genome source unreadable: {0}")]
    Unreadable(#[from] io::Error),
    /// Fewer bytes than the magic itself.
    #[error("genome truncated: {len} bytes, signature needs {}", GENOME_MAGIC.len())]
    Truncated {
        /// Bytes available in the source.
        len: usize,
    },
    /// Signature bytes differ from `ATOM`.
    #[error("invalid signature {} (\"{}\"), expected \"ATOM\"", hex::encode_upper(.found), String::from_utf8_lossy(.found))]
    BadMagic {
        /// The four bytes actually read.
        found: [u8; 4],
    },
    /// Source ends inside the header, leaving a negative payload size.
    #[error("empty genome: {len} bytes is shorter than the {}-byte header", HEADER_LEN)]
    EmptyGenome {
        /// Bytes available in the source.
        len: usize,
    },
}
