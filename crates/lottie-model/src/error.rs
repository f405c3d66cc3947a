use serde_json::Value;
use thiserror::Error;

/// Errors produced while mapping JSON onto the model.
///
/// Decoding stops at the first fatal error; no partial document is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The input is not well-formed JSON.
    #[error("invalid json: {0}")]
    Syntax(String),

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(String),

    /// A field is present but its JSON shape matches none of its allowed variants.
    #[error("field `{0}` expected {1}, found {2}")]
    TypeMismatch(String, &'static str, &'static str),

    /// A shape or layer type tag outside the recognized set.
    ///
    /// Only raised under [`UnknownVariantPolicy::Reject`](crate::UnknownVariantPolicy);
    /// by default such records are kept as opaque passthroughs.
    #[error("unrecognized type tag `{0}`")]
    UnknownVariant(String),

    /// Keyframes out of time order, or an animated track without keyframes.
    #[error("malformed keyframe sequence in `{0}`: {1}")]
    MalformedKeyframeSequence(String, String),
}

impl DecodeError {
    pub(crate) fn type_mismatch(field: &str, expected: &'static str, actual: &Value) -> Self {
        Self::TypeMismatch(field.to_string(), expected, json_kind(actual))
    }

    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingField(field.to_string())
    }
}

/// Errors produced while writing the model back to JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// NaN and the infinities have no JSON representation.
    #[error("field `{0}` holds a non-finite number")]
    NonFiniteNumber(String),

    #[error("json serialization failed: {0}")]
    Json(String),
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
