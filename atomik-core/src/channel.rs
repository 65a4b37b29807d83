//! Secure channel simulator.
//!
//! Outbound bytes are only counted: the "compressed" size follows a fixed
//! 8%-retained model and the scrambled preview is random noise.

use std::fmt;

use rand::Rng;
use serde::Serialize;

/// Share of input bytes that survive compression, in percent
pub const RETAINED_PERCENT: u64 = 8;

/// Number of preview tokens shown for a transmission
pub const PREVIEW_BYTES: usize = 10;

/// Hardware performance counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Total bytes fed into the core
    pub bytes_in: u64,
    /// Total bytes emitted after compression
    pub bytes_out: u64,
}

/// Size of `len` input bytes after compression: `max(1, floor(len * 0.08))`.
pub fn compressed_len(len: u64) -> u64 {
    (len.saturating_mul(RETAINED_PERCENT) / 100).max(1)
}

/// Scrambled rendering of a transmission, for display only.
///
/// Tokens are freshly drawn noise and carry nothing of the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObfuscatedPreview {
    tokens: Vec<u8>,
    truncated: bool,
}

impl ObfuscatedPreview {
    /// Draw `min(len, limit)` noise tokens in `0x00..=0xFE`.
    pub fn generate<R: Rng + ?Sized>(len: usize, limit: usize, rng: &mut R) -> Self {
        let tokens = (0..len.min(limit)).map(|_| rng.gen_range(0..0xFF)).collect();
        Self {
            tokens,
            truncated: len > limit,
        }
    }

    /// The noise bytes
    pub fn tokens(&self) -> &[u8] {
        &self.tokens
    }

    /// Whether the input was longer than the preview
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl fmt::Display for ObfuscatedPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", hex::encode_upper(&self.tokens))?;
        if self.truncated {
            f.write_str("...")?;
        }
        f.write_str("]")
    }
}

/// Outcome of one secure send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    /// Bytes accepted from the caller
    pub bytes_in: u64,
    /// Bytes accounted as emitted
    pub bytes_out: u64,
    /// Display-only scrambled preview
    pub preview: ObfuscatedPreview,
}

/// Byte pipeline owning the in/out counters.
#[derive(Debug, Clone, Default)]
pub struct SecureChannel {
    counters: Counters,
    preview_bytes: usize,
}

impl SecureChannel {
    /// Channel with zeroed counters and the given preview length
    pub fn new(preview_bytes: usize) -> Self {
        Self {
            counters: Counters::default(),
            preview_bytes,
        }
    }

    /// Account for `data` and produce its scrambled preview.
    pub fn send<R: Rng + ?Sized>(&mut self, data: &[u8], rng: &mut R) -> Transmission {
        let bytes_in = data.len() as u64;
        let bytes_out = compressed_len(bytes_in);

        self.counters.bytes_in = self.counters.bytes_in.saturating_add(bytes_in);
        self.counters.bytes_out = self.counters.bytes_out.saturating_add(bytes_out);

        Transmission {
            bytes_in,
            bytes_out,
            preview: ObfuscatedPreview::generate(data.len(), self.preview_bytes, rng),
        }
    }

    /// Snapshot of the counters
    pub fn counters(&self) -> Counters {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_compression_model() {
        assert_eq!(compressed_len(0), 1);
        assert_eq!(compressed_len(1), 1);
        assert_eq!(compressed_len(12), 1);
        assert_eq!(compressed_len(13), 1);
        assert_eq!(compressed_len(15), 1);
        assert_eq!(compressed_len(25), 2);
        assert_eq!(compressed_len(100), 8);
        assert_eq!(compressed_len(4096), 327);
    }

    #[test]
    fn test_send_accumulates() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut channel = SecureChannel::new(PREVIEW_BYTES);
        channel.send(b"HELLOHELLOHELLO", &mut rng);
        channel.send(&[0u8; 100], &mut rng);
        assert_eq!(
            channel.counters(),
            Counters {
                bytes_in: 115,
                bytes_out: 9
            }
        );
    }

    #[test]
    fn test_preview_is_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let short = ObfuscatedPreview::generate(3, PREVIEW_BYTES, &mut rng);
        assert_eq!(short.tokens().len(), 3);
        assert!(!short.is_truncated());
        assert_eq!(short.to_string().len(), 2 + 6);

        let long = ObfuscatedPreview::generate(64, PREVIEW_BYTES, &mut rng);
        assert_eq!(long.tokens().len(), PREVIEW_BYTES);
        assert!(long.to_string().ends_with("...]"));
        assert!(long.tokens().iter().all(|&b| b < 0xFF));
    }

    #[test]
    fn test_empty_send_has_empty_preview() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut channel = SecureChannel::new(PREVIEW_BYTES);
        let tx = channel.send(&[], &mut rng);
        assert_eq!(tx.preview.to_string(), "[]");
        assert_eq!(tx.bytes_out, 1);
    }

    #[test]
    fn test_preview_independent_of_content() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let mut ch_a = SecureChannel::new(PREVIEW_BYTES);
        let mut ch_b = SecureChannel::new(PREVIEW_BYTES);
        let tx_a = ch_a.send(b"secret-one", &mut a);
        let tx_b = ch_b.send(b"different!", &mut b);
        assert_eq!(tx_a.preview, tx_b.preview);
    }
}
