//! Declarative record schemas and their compiled form.
//!
//! A schema maps a record kind to an ordered list of named field patterns.
//! Field order is significant: a `Conditional` pattern selects its regular
//! expression from the resolved value of a field declared earlier in the
//! same record, so forward references are rejected when the schema compiles.

use crate::error::SchemaError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A raw, data-level schema definition as supplied by the caller.
///
/// Deserializable, so schemas can live in configuration rather than code:
///
/// ```
/// use tote_engine::SchemaConfig;
///
/// let config: SchemaConfig = serde_json::from_str(r#"{
///     "delimiter": ":",
///     "records": {
///         "Result": [
///             { "name": "first", "pattern": "\\d+" },
///             { "name": "second", "pattern": "\\d+" },
///             { "name": "third", "pattern": "\\d+" }
///         ]
///     }
/// }"#).unwrap();
/// assert_eq!(config.delimiter, ':');
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Token delimiter, applied to the whole line
    pub delimiter: char,

    /// Record kind -> ordered field specifications
    pub records: BTreeMap<String, Vec<FieldSpec>>,
}

/// A single named field and the pattern its text must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used as the key in the parsed record
    pub name: String,

    /// Pattern the field text must match in full
    pub pattern: FieldPattern,
}

/// A field pattern: either a literal regular expression, or a set of
/// regular expressions selected by the resolved value of an earlier field.
///
/// Serialized untagged, so a plain string is a literal and an object with
/// `field`/`arms` keys is a conditional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldPattern {
    /// A regular expression string, anchored and matched against the full
    /// field text
    Literal(String),

    /// Pattern chosen by the value of an already-resolved field
    Conditional {
        /// Name of the earlier field whose value selects the arm
        field: String,

        /// Referenced value -> literal pattern
        arms: BTreeMap<String, String>,
    },
}

impl FieldSpec {
    /// Shorthand for a literal field spec.
    pub fn literal(name: &str, pattern: &str) -> Self {
        FieldSpec {
            name: name.to_string(),
            pattern: FieldPattern::Literal(pattern.to_string()),
        }
    }

    /// Shorthand for a conditional field spec.
    pub fn conditional(name: &str, reference: &str, arms: &[(&str, &str)]) -> Self {
        FieldSpec {
            name: name.to_string(),
            pattern: FieldPattern::Conditional {
                field: reference.to_string(),
                arms: arms
                    .iter()
                    .map(|(value, pattern)| (value.to_string(), pattern.to_string()))
                    .collect(),
            },
        }
    }
}

/// A compiled schema: every pattern string turned into an anchored `Regex`
/// exactly once, at load time, keyed by (kind, field) and, for conditionals,
/// by referenced value.
#[derive(Debug)]
pub struct Schema {
    delimiter: char,
    records: HashMap<String, Vec<CompiledField>>,
}

/// A field with its pattern(s) compiled.
#[derive(Debug)]
pub(crate) struct CompiledField {
    pub(crate) name: String,
    pub(crate) pattern: CompiledPattern,
}

#[derive(Debug)]
pub(crate) enum CompiledPattern {
    Literal(Regex),
    Conditional {
        field: String,
        arms: HashMap<String, Regex>,
    },
}

impl Schema {
    /// Compiles a raw schema configuration.
    ///
    /// Validates that every pattern is a well-formed regular expression,
    /// that field names are unique within a record kind, and that every
    /// conditional references a field declared earlier in the same record.
    pub fn compile(config: &SchemaConfig) -> Result<Self, SchemaError> {
        let mut records = HashMap::new();

        for (kind, specs) in &config.records {
            let mut compiled = Vec::with_capacity(specs.len());
            let mut resolved: Vec<&str> = Vec::with_capacity(specs.len());

            for spec in specs {
                if resolved.contains(&spec.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        kind: kind.clone(),
                        field: spec.name.clone(),
                    });
                }

                let pattern = match &spec.pattern {
                    FieldPattern::Literal(pattern) => {
                        CompiledPattern::Literal(anchor(kind, &spec.name, pattern)?)
                    }
                    FieldPattern::Conditional { field, arms } => {
                        if !resolved.contains(&field.as_str()) {
                            return Err(SchemaError::ForwardReference {
                                kind: kind.clone(),
                                field: spec.name.clone(),
                                reference: field.clone(),
                            });
                        }

                        let mut compiled_arms = HashMap::with_capacity(arms.len());
                        for (value, pattern) in arms {
                            compiled_arms
                                .insert(value.clone(), anchor(kind, &spec.name, pattern)?);
                        }
                        CompiledPattern::Conditional {
                            field: field.clone(),
                            arms: compiled_arms,
                        }
                    }
                };

                resolved.push(&spec.name);
                compiled.push(CompiledField {
                    name: spec.name.clone(),
                    pattern,
                });
            }

            records.insert(kind.clone(), compiled);
        }

        Ok(Schema {
            delimiter: config.delimiter,
            records,
        })
    }

    /// Returns the configured token delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Looks up the compiled field list for a record kind.
    /// Lookup is exact and case-sensitive.
    pub(crate) fn fields(&self, kind: &str) -> Option<&[CompiledField]> {
        self.records.get(kind).map(Vec::as_slice)
    }
}

/// Compiles a pattern anchored to the full field text. Anchoring is
/// mandatory: the match primitive is substring-capable, and a partial match
/// must not accept the field.
fn anchor(kind: &str, field: &str, pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| SchemaError::BadPattern {
        kind: kind.to_string(),
        field: field.to_string(),
        source,
    })
}
