//! Sparse error accumulator and the `ValidationErrors` output shape

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Top-level requested-info field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    PhysicalAddress,
    PhoneNumber,
    Name,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Email,
        Field::PhysicalAddress,
        Field::PhoneNumber,
        Field::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::PhysicalAddress => "physicalAddress",
            Field::PhoneNumber => "phoneNumber",
            Field::Name => "name",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub sub_field: Option<&'static str>,
    pub message: String,
}

/// Collects violations while rules run; nothing is materialized until
/// [`ErrorAccumulator::finish`], so no empty branch can ever be produced.
#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    violations: Vec<Violation>,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation on a scalar field.
    pub fn reject(&mut self, field: Field, message: impl Into<String>) {
        self.push(field, None, message.into());
    }

    /// Record a violation on a sub-field of a structured field.
    pub fn reject_sub(&mut self, field: Field, sub_field: &'static str, message: impl Into<String>) {
        self.push(field, Some(sub_field), message.into());
    }

    fn push(&mut self, field: Field, sub_field: Option<&'static str>, message: String) {
        // Empty leaves are not representable in the output.
        if message.trim().is_empty() {
            return;
        }
        self.violations.push(Violation {
            field,
            sub_field,
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Materialize the non-empty branches. `None` when nothing was violated.
    ///
    /// For a repeated leaf the first recorded message wins. A field with any
    /// sub-field violation is emitted as a nested map.
    pub fn finish(self) -> Option<ValidationErrors> {
        if self.violations.is_empty() {
            return None;
        }

        let mut entries = Vec::new();
        for field in Field::ALL {
            let hits: Vec<&Violation> = self
                .violations
                .iter()
                .filter(|v| v.field == field)
                .collect();
            if hits.is_empty() {
                continue;
            }

            let mut nested: Vec<(&'static str, String)> = Vec::new();
            for v in hits.iter() {
                if let Some(sub) = v.sub_field {
                    if !nested.iter().any(|(k, _)| *k == sub) {
                        nested.push((sub, v.message.clone()));
                    }
                }
            }

            let error = if nested.is_empty() {
                FieldError::Message(hits[0].message.clone())
            } else {
                FieldError::Nested(nested)
            };
            entries.push((field, error));
        }

        Some(ValidationErrors { entries })
    }
}

/// Error entry for one top-level field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Message(String),
    Nested(Vec<(&'static str, String)>),
}

impl FieldError {
    pub fn message(&self) -> Option<&str> {
        match self {
            FieldError::Message(m) => Some(m),
            FieldError::Nested(_) => None,
        }
    }

    pub fn sub_field(&self, name: &str) -> Option<&str> {
        match self {
            FieldError::Message(_) => None,
            FieldError::Nested(entries) => entries
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, m)| m.as_str()),
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldError::Message(m) => serializer.serialize_str(m),
            FieldError::Nested(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Non-empty, field-keyed validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(Field, FieldError)>,
}

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, e)| e)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, error) in &self.entries {
            map.serialize_entry(field.as_str(), error)?;
        }
        map.end()
    }
}
