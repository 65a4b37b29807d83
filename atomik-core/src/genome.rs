//! Genome binary format: decoding and header encoding.
//!
//! Layout of a `.gnm` file:
//!
//! ```text
//! [magic "ATOM":4][version:1][polymorph_freq_ms:4 LE][DNA payload...]
//! ```
//!
//! The payload is opaque to the HAL; only its length is accounted for.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::GenomeError;

/// File signature every genome starts with
pub const GENOME_MAGIC: [u8; 4] = *b"ATOM";

/// Size of the fixed header preceding the DNA payload
pub const HEADER_LEN: usize = 9;

/// File extension appended to genome names by hosts
pub const GENOME_EXTENSION: &str = "gnm";

const ID_LEN: usize = 16;

/// Build the on-disk file name for a genome name (`"eth"` -> `"eth.gnm"`).
pub fn genome_file_name(name: &str) -> String {
    format!("{name}.{GENOME_EXTENSION}")
}

/// Display identifier of a flashed genome.
///
/// Synthesised from the format version as `G_VER_<n>` in a 16-byte
/// NUL-padded field. Carries no cryptographic meaning.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GenomeId([u8; ID_LEN]);

impl GenomeId {
    /// Derive the identifier for a format version.
    pub fn from_version(version: u8) -> Self {
        let text = format!("G_VER_{version}");
        let mut bytes = [0u8; ID_LEN];
        // Always leaves room for a terminating NUL.
        let n = text.len().min(ID_LEN - 1);
        bytes[..n].copy_from_slice(&text.as_bytes()[..n]);
        Self(bytes)
    }

    /// Raw identifier bytes
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Identifier text up to the first NUL; empty for the default genome.
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(ID_LEN);
        std::str::from_utf8(&self.0[..end]).unwrap_or_default()
    }

    /// True for the placeholder id of a device with nothing flashed
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl fmt::Display for GenomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for GenomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GenomeId({:?})", self.as_str())
    }
}

/// The fixed 9-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeHeader {
    /// Format version, echoed into the genome id
    pub version: u8,
    /// Requested rotation period; 0 means static
    pub polymorph_frequency_ms: u32,
}

impl GenomeHeader {
    /// Serialise the header exactly as it appears on disk.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(&GENOME_MAGIC);
        out[4] = self.version;
        out[5..9].copy_from_slice(&self.polymorph_frequency_ms.to_le_bytes());
        out
    }

    /// Header followed by `payload`, ready to be written as a `.gnm` file.
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(&self.to_bytes());
        out.extend_from_slice(payload);
        out
    }
}

/// A validated genome. Immutable once decoded; reloading replaces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Genome {
    id: GenomeId,
    version: u8,
    polymorph_frequency_ms: u32,
    payload_size: usize,
}

impl Genome {
    /// Decode and validate an in-memory genome.
    ///
    /// Checks run in order: at least 4 bytes, `ATOM` signature, then a
    /// non-negative payload size. A header with zero payload bytes is
    /// accepted.
    pub fn decode(bytes: &[u8]) -> Result<Self, GenomeError> {
        let len = bytes.len();
        let magic: [u8; 4] = match bytes.get(..GENOME_MAGIC.len()) {
            Some(m) => [m[0], m[1], m[2], m[3]],
            None => return Err(GenomeError::Truncated { len }),
        };
        if magic != GENOME_MAGIC {
            return Err(GenomeError::BadMagic { found: magic });
        }

        let payload_size = len
            .checked_sub(HEADER_LEN)
            .ok_or(GenomeError::EmptyGenome { len })?;

        let header = GenomeHeader {
            version: bytes[4],
            polymorph_frequency_ms: u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]),
        };

        Ok(Self {
            id: GenomeId::from_version(header.version),
            version: header.version,
            polymorph_frequency_ms: header.polymorph_frequency_ms,
            payload_size,
        })
    }

    /// Drain `reader` and decode what it produced.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, GenomeError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::decode(&buf)
    }

    /// Open and decode a genome file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GenomeError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| GenomeError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_from(file)
    }

    /// Display identifier
    pub fn id(&self) -> &GenomeId {
        &self.id
    }

    /// Format version byte
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Rotation period requested by the file
    pub fn polymorph_frequency_ms(&self) -> u32 {
        self.polymorph_frequency_ms
    }

    /// Length of the DNA payload after the header
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Header this genome was decoded from
    pub fn header(&self) -> GenomeHeader {
        GenomeHeader {
            version: self.version,
            polymorph_frequency_ms: self.polymorph_frequency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome_bytes(version: u8, freq: u32, payload: usize) -> Vec<u8> {
        GenomeHeader {
            version,
            polymorph_frequency_ms: freq,
        }
        .encode(&vec![0xAB; payload])
    }

    #[test]
    fn test_decode_valid_genome() {
        let genome = Genome::decode(&genome_bytes(1, 100, 20)).unwrap();
        assert_eq!(genome.polymorph_frequency_ms(), 100);
        assert_eq!(genome.payload_size(), 20);
        assert_eq!(genome.version(), 1);
        assert_eq!(genome.id().as_str(), "G_VER_1");
    }

    #[test]
    fn test_frequency_is_little_endian() {
        let mut bytes = genome_bytes(3, 0, 0);
        bytes[5..9].copy_from_slice(&[0x01, 0x02, 0x00, 0x00]);
        let genome = Genome::decode(&bytes).unwrap();
        assert_eq!(genome.polymorph_frequency_ms(), 0x0201);
    }

    #[test]
    fn test_header_only_genome_is_accepted() {
        let genome = Genome::decode(&genome_bytes(7, 0, 0)).unwrap();
        assert_eq!(genome.payload_size(), 0);
        assert_eq!(genome.id().to_string(), "G_VER_7");
    }

    #[test]
    fn test_short_header_is_empty_genome() {
        let bytes = genome_bytes(1, 100, 0);
        for len in 4..HEADER_LEN {
            match Genome::decode(&bytes[..len]) {
                Err(GenomeError::EmptyGenome { len: got }) => assert_eq!(got, len),
                other => panic!("expected EmptyGenome for {len} bytes, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_truncated_signature() {
        assert!(matches!(
            Genome::decode(b"ATO"),
            Err(GenomeError::Truncated { len: 3 })
        ));
        assert!(matches!(
            Genome::decode(&[]),
            Err(GenomeError::Truncated { len: 0 })
        ));
    }

    #[test]
    fn test_magic_is_case_sensitive() {
        let mut bytes = genome_bytes(1, 0, 4);
        bytes[..4].copy_from_slice(b"atom");
        match Genome::decode(&bytes) {
            Err(GenomeError::BadMagic { found }) => assert_eq!(&found, b"atom"),
            other => panic!("expected BadMagic, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_magic_checked_before_length() {
        // Too short for a header, but the signature is wrong first.
        assert!(matches!(
            Genome::decode(b"NOPE"),
            Err(GenomeError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_id_for_max_version() {
        assert_eq!(GenomeId::from_version(255).as_str(), "G_VER_255");
        assert!(GenomeId::default().is_empty());
        assert_eq!(GenomeId::default().as_str(), "");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(genome_file_name("ghost"));
        match Genome::load(&path) {
            Err(GenomeError::NotFound { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(genome_file_name("ethereum_v2"));
        std::fs::write(&path, genome_bytes(2, 25, 64)).unwrap();
        let genome = Genome::load(&path).unwrap();
        assert_eq!(genome.payload_size(), 64);
        assert_eq!(genome.polymorph_frequency_ms(), 25);
        assert_eq!(genome.header().version, 2);
    }

    #[test]
    fn test_file_name_suffix() {
        assert_eq!(genome_file_name("DOD_secure"), "DOD_secure.gnm");
    }
}
