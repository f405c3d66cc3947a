//! Typed mapping between `serde_json::Value` trees and the model.
//!
//! Every record decodes by pulling its recognized keys out of the JSON
//! object; whatever is left over is kept verbatim and written back on encode.
//!
//! Records are mapped by hand rather than with `#[derive(Deserialize)]`:
//! callers get `MissingField` / `TypeMismatch` naming the offending key, and
//! unknown shape and layer tags fall back to an opaque record instead of
//! failing the untagged/internally tagged enum match. The serde traits are
//! still provided on top of this layer by `serde_via_codec!`.

use serde_json::{Map, Number, Value};

use crate::error::{DecodeError, EncodeError};
use crate::model::Document;

/// JSON object map used for passthrough payloads.
pub type Object = Map<String, Value>;

/// Build a typed value from a JSON value found under `field`.
pub trait Decode: Sized {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError>;
}

/// Write a typed value back as JSON. `field` names the key being written
/// and is only used for error reporting.
pub trait Encode {
    fn encode(&self, field: &str) -> Result<Value, EncodeError>;
}

/// What to do with shape and layer type tags outside the recognized set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownVariantPolicy {
    /// Keep the record verbatim as an opaque passthrough.
    #[default]
    Preserve,
    /// Fail the decode with [`DecodeError::UnknownVariant`].
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub unknown_variants: UnknownVariantPolicy,
}

impl DecodeOptions {
    /// Options that refuse any unrecognized shape or layer.
    pub fn strict() -> Self {
        Self {
            unknown_variants: UnknownVariantPolicy::Reject,
        }
    }
}

/// Decode a document from JSON text.
pub fn decode(raw: &str) -> Result<Document, DecodeError> {
    decode_with(raw, &DecodeOptions::default())
}

pub fn decode_with(raw: &str, options: &DecodeOptions) -> Result<Document, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| DecodeError::Syntax(e.to_string()))?;
    decode_value_with(value, options)
}

/// Decode a document from raw JSON bytes.
pub fn decode_slice(raw: &[u8]) -> Result<Document, DecodeError> {
    decode_slice_with(raw, &DecodeOptions::default())
}

pub fn decode_slice_with(raw: &[u8], options: &DecodeOptions) -> Result<Document, DecodeError> {
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| DecodeError::Syntax(e.to_string()))?;
    decode_value_with(value, options)
}

/// Decode a document from an already parsed JSON tree.
pub fn decode_value(value: Value) -> Result<Document, DecodeError> {
    decode_value_with(value, &DecodeOptions::default())
}

pub fn decode_value_with(value: Value, options: &DecodeOptions) -> Result<Document, DecodeError> {
    let document = Document::decode(value, "document")?;

    if options.unknown_variants == UnknownVariantPolicy::Reject {
        if let Some(tag) = document.unknown_tags().into_iter().next() {
            return Err(DecodeError::UnknownVariant(tag));
        }
    }

    tracing::debug!(
        layers = document.layers.len(),
        assets = document.assets.as_ref().map_or(0, Vec::len),
        "decoded document"
    );
    Ok(document)
}

/// Encode a document to compact JSON text.
pub fn encode(document: &Document) -> Result<String, EncodeError> {
    let value = encode_value(document)?;
    serde_json::to_string(&value).map_err(|e| EncodeError::Json(e.to_string()))
}

pub fn encode_pretty(document: &Document) -> Result<String, EncodeError> {
    let value = encode_value(document)?;
    serde_json::to_string_pretty(&value).map_err(|e| EncodeError::Json(e.to_string()))
}

pub fn encode_value(document: &Document) -> Result<Value, EncodeError> {
    document.encode("document")
}

/// A JSON object being taken apart field by field.
pub(crate) struct Fields {
    map: Object,
}

impl Fields {
    pub(crate) fn new(value: Value, field: &str) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            other => Err(DecodeError::type_mismatch(field, "object", &other)),
        }
    }

    pub(crate) fn required<T: Decode>(&mut self, key: &str) -> Result<T, DecodeError> {
        let value = self.take(key).ok_or_else(|| DecodeError::missing(key))?;
        T::decode(value, key)
    }

    pub(crate) fn optional<T: Decode>(&mut self, key: &str) -> Result<Option<T>, DecodeError> {
        self.take(key).map(|value| T::decode(value, key)).transpose()
    }

    pub(crate) fn take(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key)
    }

    pub(crate) fn peek(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Remaining, unrecognized keys.
    pub(crate) fn into_rest(self) -> Object {
        self.map
    }
}

/// A JSON object being assembled field by field.
#[derive(Default)]
pub(crate) struct ObjectWriter {
    map: Object,
}

impl ObjectWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn field<T: Encode + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), EncodeError> {
        let encoded = value.encode(key)?;
        self.map.insert(key.to_string(), encoded);
        Ok(())
    }

    pub(crate) fn optional<T: Encode>(
        &mut self,
        key: &str,
        value: &Option<T>,
    ) -> Result<(), EncodeError> {
        if let Some(value) = value {
            self.field(key, value)?;
        }
        Ok(())
    }

    pub(crate) fn raw(&mut self, key: &str, value: Value) {
        self.map.insert(key.to_string(), value);
    }

    /// Append passthrough keys. Keys already written keep their typed value.
    pub(crate) fn extend(&mut self, rest: &Object) {
        for (key, value) in rest {
            if !self.map.contains_key(key) {
                self.map.insert(key.clone(), value.clone());
            }
        }
    }

    pub(crate) fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Integral values are written as JSON integers, everything else as floats.
pub(crate) fn number(n: f64, field: &str) -> Result<Value, EncodeError> {
    if !n.is_finite() {
        return Err(EncodeError::NonFiniteNumber(field.to_string()));
    }
    if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        return Ok(Value::from(n as i64));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| EncodeError::NonFiniteNumber(field.to_string()))
}

impl Decode for f64 {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        value
            .as_f64()
            .ok_or_else(|| DecodeError::type_mismatch(field, "number", &value))
    }
}

impl Encode for f64 {
    fn encode(&self, field: &str) -> Result<Value, EncodeError> {
        number(*self, field)
    }
}

macro_rules! unsigned_codec {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
                    value
                        .as_u64()
                        .and_then(|n| <$ty>::try_from(n).ok())
                        .ok_or_else(|| DecodeError::type_mismatch(field, "unsigned integer", &value))
                }
            }

            impl Encode for $ty {
                fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
                    Ok(Value::from(*self))
                }
            }
        )*
    };
}

unsigned_codec!(u8, u32);

impl Decode for bool {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        value
            .as_bool()
            .ok_or_else(|| DecodeError::type_mismatch(field, "boolean", &value))
    }
}

impl Encode for bool {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        Ok(Value::Bool(*self))
    }
}

impl Decode for String {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(DecodeError::type_mismatch(field, "string", &other)),
        }
    }
}

impl Encode for String {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        Ok(Value::String(self.clone()))
    }
}

// Opaque payloads are carried as-is.
impl Decode for Value {
    fn decode(value: Value, _field: &str) -> Result<Self, DecodeError> {
        Ok(value)
    }
}

impl Encode for Value {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        Ok(self.clone())
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| T::decode(item, field))
                .collect(),
            other => Err(DecodeError::type_mismatch(field, "array", &other)),
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, field: &str) -> Result<Value, EncodeError> {
        self.iter()
            .map(|item| item.encode(field))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Forwards the serde traits through the codec so the types plug into
/// `serde_json::from_str` and friends.
macro_rules! serde_via_codec {
    ($($ty:ty => $field:literal),* $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    let value = $crate::codec::Encode::encode(self, $field)
                        .map_err(serde::ser::Error::custom)?;
                    serde::Serialize::serialize(&value, serializer)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                    $crate::codec::Decode::decode(value, $field).map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

pub(crate) use serde_via_codec;
