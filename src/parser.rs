//! Schema-driven line parser.
//!
//! Resolves a raw delimited line against a compiled [`Schema`] and produces
//! a typed [`Record`], or nothing. Malformed input is a first-class outcome,
//! not an exception: [`SchemaParser::parse`] logs a diagnostic at `warn`
//! level and returns `None`, while [`SchemaParser::try_parse`] exposes the
//! typed [`ParseError`] for callers that want it.

use crate::error::ParseError;
use crate::schema::{CompiledPattern, Schema};
use log::warn;
use serde::Serialize;

/// A fully resolved record: the kind token plus every field, in schema order.
///
/// A record is only ever produced when every field of its kind's schema
/// matched in full; there are no partial records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Record kind, as it appeared on the line
    pub kind: String,

    fields: Vec<(String, String)>,
}

impl Record {
    /// Returns the resolved value of a field by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over `(name, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Re-serializes the record with the given delimiter.
    ///
    /// For any line accepted by the parser, this reproduces the original
    /// (sanitized) line.
    pub fn to_line(&self, delimiter: char) -> String {
        let mut line = self.kind.clone();
        for (_, value) in &self.fields {
            line.push(delimiter);
            line.push_str(value);
        }
        line
    }
}

/// Resolves raw delimited lines into typed records.
///
/// Holds a compiled [`Schema`]; all pattern compilation happened when the
/// schema was loaded, so parsing a line never builds a regex.
#[derive(Debug)]
pub struct SchemaParser {
    schema: Schema,
}

impl SchemaParser {
    /// Creates a parser over a compiled schema.
    pub fn new(schema: Schema) -> Self {
        SchemaParser { schema }
    }

    /// Returns the configured delimiter.
    pub fn delimiter(&self) -> char {
        self.schema.delimiter()
    }

    /// Parses a line, logging a diagnostic and returning `None` on rejection.
    ///
    /// Rejection never mutates anything and never panics; the caller simply
    /// moves on to the next line.
    pub fn parse(&self, line: &str) -> Option<Record> {
        match self.try_parse(line) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("rejected line {:?}: {}", line, err);
                None
            }
        }
    }

    /// Parses a line, surfacing the typed rejection reason.
    pub fn try_parse(&self, line: &str) -> Result<Record, ParseError> {
        let line = sanitize(line);
        let mut tokens = line.split(self.schema.delimiter());

        // split always yields at least one token, possibly empty
        let kind = tokens.next().unwrap_or_default();
        let specs = self
            .schema
            .fields(kind)
            .ok_or_else(|| ParseError::UnknownRecordKind {
                kind: kind.to_string(),
            })?;

        let values: Vec<&str> = tokens.collect();
        if values.len() != specs.len() {
            return Err(ParseError::FieldCountMismatch {
                kind: kind.to_string(),
                expected: specs.len(),
                found: values.len(),
            });
        }

        let mut fields: Vec<(String, String)> = Vec::with_capacity(specs.len());
        for (spec, value) in specs.iter().zip(values) {
            let regex = match &spec.pattern {
                CompiledPattern::Literal(regex) => regex,
                CompiledPattern::Conditional { field, arms } => {
                    let resolved = fields
                        .iter()
                        .find(|(name, _)| name == field)
                        .map(|(_, value)| value.as_str())
                        .ok_or_else(|| ParseError::UnresolvedReference {
                            field: spec.name.clone(),
                            reference: field.clone(),
                        })?;

                    arms.get(resolved)
                        .ok_or_else(|| ParseError::NoPatternForValue {
                            field: spec.name.clone(),
                            reference: field.clone(),
                            value: resolved.to_string(),
                        })?
                }
            };

            if !regex.is_match(value) {
                return Err(ParseError::PatternMismatch {
                    field: spec.name.clone(),
                    value: value.to_string(),
                    pattern: regex.as_str().to_string(),
                });
            }

            fields.push((spec.name.clone(), value.to_string()));
        }

        Ok(Record {
            kind: kind.to_string(),
            fields,
        })
    }
}

/// Normalizes raw input: trims surrounding whitespace and strips a leading
/// redirect-style `>` prefix. The prefix must be followed by whitespace; a
/// bare `>` glued to the kind token is left for the parser to reject.
/// Pure cleanup, never a rejection.
fn sanitize(line: &str) -> &str {
    let trimmed = line.trim();
    match trimmed.strip_prefix('>') {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => trimmed,
    }
}
