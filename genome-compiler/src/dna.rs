// genome-compiler/src/dna.rs
// Base-4 DNA tags and their 2-bit packing

/// One 2-bit DNA instruction symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    /// `00` - no operation
    Void = 0b00,
    /// `01` - pull data into the core
    Ingest = 0b01,
    /// `10` - transform in place
    Mutate = 0b10,
    /// `11` - push data out
    Emit = 0b11,
}

impl Tag {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Tag::Void,
            0b01 => Tag::Ingest,
            0b10 => Tag::Mutate,
            _ => Tag::Emit,
        }
    }
}

const FILTER: &[Tag] = &[Tag::Ingest, Tag::Mutate, Tag::Emit];
const ENCRYPT: &[Tag] = &[Tag::Ingest, Tag::Mutate, Tag::Mutate, Tag::Emit];
const STORE: &[Tag] = &[Tag::Ingest, Tag::Void, Tag::Emit];
const PASSTHROUGH: &[Tag] = &[Tag::Void];

/// Translate a high-level register op into its tag sequence.
///
/// Matching is a case-insensitive substring search; the first rule wins.
pub fn translate(op: &str) -> &'static [Tag] {
    let op = op.to_uppercase();
    if op.contains("FILTER") {
        FILTER
    } else if op.contains("ENCRYPT") {
        ENCRYPT
    } else if op.contains("STORE") {
        STORE
    } else {
        PASSTHROUGH
    }
}

/// Pack tags four per byte, most significant pair first.
/// A trailing partial byte is zero-filled.
pub fn pack(tags: &[Tag]) -> Vec<u8> {
    tags.chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, tag)| byte | ((*tag as u8) << (6 - 2 * i)))
        })
        .collect()
}

/// Inverse of [`pack`] for the first `count` tags.
pub fn unpack(bytes: &[u8], count: usize) -> Vec<Tag> {
    bytes
        .iter()
        .flat_map(|b| (0..4).map(move |i| Tag::from_bits(b >> (6 - 2 * i))))
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_rules() {
        assert_eq!(translate("filter spam"), FILTER);
        assert_eq!(translate("Encrypt payload"), ENCRYPT);
        assert_eq!(translate("STORE block"), STORE);
        assert_eq!(translate("noop"), PASSTHROUGH);
        // First matching rule wins.
        assert_eq!(translate("FILTER then STORE"), FILTER);
    }

    #[test]
    fn test_pack_msb_first() {
        // 01 10 11 01 -> 0x6D
        let tags = [Tag::Ingest, Tag::Mutate, Tag::Emit, Tag::Ingest];
        assert_eq!(pack(&tags), vec![0x6D]);
    }

    #[test]
    fn test_partial_byte_is_zero_padded() {
        // 01 10 11 00
        assert_eq!(pack(FILTER), vec![0b0110_1100]);
        assert_eq!(pack(&[Tag::Emit]), vec![0b1100_0000]);
        assert!(pack(&[]).is_empty());
    }

    #[test]
    fn test_unpack_recovers_sequence() {
        let tags: Vec<Tag> = [ENCRYPT, STORE, FILTER].concat();
        let packed = pack(&tags);
        assert_eq!(packed.len(), 3);
        assert_eq!(unpack(&packed, tags.len()), tags);
    }
}
