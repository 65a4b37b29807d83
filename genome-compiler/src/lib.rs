//! Genome compiler: JSON schema in, `.gnm` genome out.
//!
//! Each DNA register op is translated into base-4 tags, packed two bits per
//! tag, and placed behind the 9-byte ATOMiK genome header.

use std::fs;
use std::path::{Path, PathBuf};

use atomik_core::genome::{genome_file_name, GenomeHeader};
use serde::Deserialize;
use tracing::info;

pub mod dna;
mod error;

pub use error::CompileError;

use dna::Tag;

/// Header format version written by default
pub const DEFAULT_FORMAT_VERSION: u8 = 1;

/// Source schema of a genome.
#[derive(Debug, Clone, Deserialize)]
pub struct GenomeSchema {
    /// Naming information
    pub meta: Meta,
    /// Security policy, informational only
    #[serde(default)]
    pub policy: Policy,
    /// Rotation request
    #[serde(default)]
    pub mutation: Mutation,
    /// Register -> op, in document order
    pub dna: serde_json::Map<String, serde_json::Value>,
}

/// `meta` block.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    /// Human-readable target name
    pub name: String,
    /// Output file stem
    pub id: String,
}

/// `policy` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Policy {
    /// Declared security level
    #[serde(default)]
    pub security_level: String,
}

/// `mutation` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Mutation {
    /// Requested polymorphism period; 0 keeps the core static
    #[serde(default)]
    pub scramble_freq_ms: u32,
}

impl GenomeSchema {
    /// Parse a schema document.
    pub fn from_json(data: &[u8]) -> Result<Self, CompileError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Tag sequence for every DNA register, in document order.
    pub fn synthesize(&self) -> Result<Vec<Tag>, CompileError> {
        let mut tags = Vec::new();
        for (register, op) in &self.dna {
            let op = op.as_str().ok_or_else(|| CompileError::InvalidOp {
                register: register.clone(),
            })?;
            tags.extend_from_slice(dna::translate(op));
        }
        Ok(tags)
    }
}

/// A compiled genome ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGenome {
    /// File name (`<meta.id>.gnm`)
    pub file_name: String,
    /// Full file contents, header included
    pub bytes: Vec<u8>,
    /// Number of DNA tags synthesised
    pub tag_count: usize,
    /// Packed DNA length in bytes
    pub packed_len: usize,
}

impl CompiledGenome {
    /// Tags per packed byte; 0 for an empty payload.
    pub fn packing_ratio(&self) -> f64 {
        if self.packed_len == 0 {
            0.0
        } else {
            self.tag_count as f64 / self.packed_len as f64
        }
    }
}

/// Compile a parsed schema.
pub fn compile(schema: &GenomeSchema, version: u8) -> Result<CompiledGenome, CompileError> {
    if schema.meta.id.trim().is_empty() {
        return Err(CompileError::MissingId);
    }
    let tags = schema.synthesize()?;
    let packed = dna::pack(&tags);
    let header = GenomeHeader {
        version,
        polymorph_frequency_ms: schema.mutation.scramble_freq_ms,
    };
    Ok(CompiledGenome {
        file_name: genome_file_name(&schema.meta.id),
        bytes: header.encode(&packed),
        tag_count: tags.len(),
        packed_len: packed.len(),
    })
}

/// Read `input`, compile it, and write the genome into `out_dir`.
pub fn compile_file(input: &Path, out_dir: &Path, version: u8) -> Result<PathBuf, CompileError> {
    info!(input = %input.display(), "reading schema");
    let schema = GenomeSchema::from_json(&fs::read(input)?)?;
    info!(
        name = %schema.meta.name,
        security = %schema.policy.security_level,
        "compiling genome"
    );

    let compiled = compile(&schema, version)?;
    let output = out_dir.join(&compiled.file_name);
    fs::write(&output, &compiled.bytes)?;

    info!(output = %output.display(), "genome synthesized");
    info!(
        tags = compiled.tag_count,
        packed_bytes = compiled.packed_len,
        ratio = %format!("{:.1}x", compiled.packing_ratio()),
        "dna packed"
    );
    Ok(output)
}
