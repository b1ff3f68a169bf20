//! Error types for the wagering engine.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while compiling a declarative schema.
///
/// All of these indicate a defective schema definition and are surfaced at
/// load time, before any input line is parsed.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A field pattern is not a valid regular expression
    #[error("invalid pattern for {kind}.{field}: {source}")]
    BadPattern {
        kind: String,
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A conditional field references a field declared later (or not at all)
    /// in the same record kind
    #[error("conditional field {kind}.{field} references '{reference}', which is not resolved before it")]
    ForwardReference {
        kind: String,
        field: String,
        reference: String,
    },

    /// The same field name appears twice within one record kind
    #[error("duplicate field '{field}' in record kind '{kind}'")]
    DuplicateField { kind: String, field: String },
}

/// Errors raised while resolving a single input line against the schema.
///
/// These are expected, recoverable outcomes: the line is rejected, no record
/// is produced, and processing continues with the next line.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The leading token does not name a configured record kind
    #[error("unknown record kind '{kind}'")]
    UnknownRecordKind { kind: String },

    /// The line body has a different number of fields than the schema
    #[error("field count mismatch for '{kind}': expected {expected}, found {found}")]
    FieldCountMismatch {
        kind: String,
        expected: usize,
        found: usize,
    },

    /// A field's text does not match its resolved pattern
    #[error("'{value}' does not match the pattern {pattern} for field '{field}'")]
    PatternMismatch {
        field: String,
        value: String,
        pattern: String,
    },

    /// A conditional field's referenced field is not resolved in this record
    #[error("reference '{reference}' for field '{field}' is not resolved")]
    UnresolvedReference { field: String, reference: String },

    /// A conditional field has no pattern arm for the referenced field's value
    #[error("no pattern for field '{field}' when '{reference}' is '{value}'")]
    NoPatternForValue {
        field: String,
        reference: String,
        value: String,
    },
}

/// Errors raised while routing records and settling pools.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A record arrived whose kind has no registered handler
    #[error("no handler for record kind '{kind}'")]
    UnhandledKind { kind: String },

    /// A required field is absent from the record
    #[error("record is missing required field '{field}'")]
    MissingField { field: String },

    /// A stake field could not be coerced to a number
    #[error("invalid stake '{stake}': {source}")]
    InvalidStake {
        stake: String,
        #[source]
        source: rust_decimal::Error,
    },

    /// Settlement found a pool with no configured product rule.
    /// This is a configuration defect, not a user-input defect.
    #[error("no product rule configured for '{product}' with outstanding stakes")]
    MissingProductRule { product: String },

    /// A dividend or commission was requested for a product with no pool
    #[error("settlement requested for unknown product '{product}'")]
    UnknownProduct { product: String },
}

/// Top-level errors for the binary.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to read from stdin
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema failed to compile at startup
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Record routing or settlement failed
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
