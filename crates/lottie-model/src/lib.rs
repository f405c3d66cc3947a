//! Typed, lossless model of Lottie animation documents.
//!
//! [`decode`] maps JSON text onto a [`Document`]; [`encode`] writes it back.
//! Shapes and layers with unrecognized type tags are kept verbatim as
//! [`OpaqueRecord`]s, and unrecognized keys on recognized records are kept
//! in each record's `extra` map, so `decode(encode(doc)) == doc`.

pub mod codec;
pub mod error;
pub mod model;
pub mod property;
pub mod shape;

pub use codec::{
    decode, decode_slice, decode_slice_with, decode_value, decode_value_with, decode_with, encode,
    encode_pretty, encode_value, Decode, DecodeOptions, Encode, Object, UnknownVariantPolicy,
};
pub use error::{DecodeError, EncodeError};
pub use model::{
    Asset, Document, Layer, LayerContent, Marker, Mask, OpaqueRecord, Position, SplitPosition,
    Transform, TypedLayer,
};
pub use property::{
    Animatable, AnimatedValue, BezierPath, BezierTangent, Color, Keyframe, Property,
    TangentComponent, Vec2, Vector,
};
pub use shape::Shape;
