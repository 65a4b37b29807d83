use thiserror::Error;

/// Errors raised while compiling a genome schema.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Reading the schema or writing the genome failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The schema is not valid JSON or misses required fields.
    #[error("schema error: {0}")]
    Schema(#[from] serde_json::Error),
    /// A DNA entry is not a string op.
    #[error("dna register '{register}' must map to a string op")]
    InvalidOp {
        /// Offending register name
        register: String,
    },
    /// The schema has no usable output id.
    #[error("meta.id must not be empty")]
    MissingId,
}
