use serde_json::Value;

use crate::codec::{number, Decode, Encode, Fields, Object, ObjectWriter};
use crate::error::{DecodeError, EncodeError};

pub type Vec2 = [f64; 2];

/// Numeric vector of free length (positions, anchors, scales, gradient stops).
pub type Vector = Vec<f64>;

/// RGB or RGBA color, components in `0..=1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Color(pub Vec<f64>);

/// A property that is either a constant or a keyframed track.
#[derive(Debug, Clone, PartialEq)]
pub struct Property<T> {
    pub a: Option<u8>, // Animated flag, kept exactly as written
    pub k: AnimatedValue<T>,
    pub ix: Option<u32>,
    pub x: Option<String>,   // Expression
    pub sid: Option<String>, // Slot id
    pub extra: Object,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimatedValue<T> {
    Static(T),
    Keyframed(Vec<Keyframe<T>>),
}

/// One segment of an animated track.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe<T> {
    pub t: f64,
    pub s: Option<T>,
    pub e: Option<T>,
    pub i: Option<BezierTangent>, // Easing in
    pub o: Option<BezierTangent>, // Easing out
    pub to: Option<Vec<f64>>,     // Spatial tangent out
    pub ti: Option<Vec<f64>>,     // Spatial tangent in
    pub h: Option<u8>,            // Hold
    pub extra: Object,
}

/// Bezier easing control point, e.g. `{"x": [0.48], "y": [1]}` or `{"x": 0.48, "y": 1}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierTangent {
    pub x: TangentComponent,
    pub y: TangentComponent,
    pub extra: Object,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TangentComponent {
    Uniform(f64),
    PerAxis(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BezierPath {
    pub c: Option<bool>, // Closed
    pub i: Vec<Vec2>,
    pub o: Vec<Vec2>,
    pub v: Vec<Vec2>,
    pub extra: Object,
}

impl<T> Property<T> {
    pub fn fixed(value: T) -> Self {
        Self {
            a: Some(0),
            k: AnimatedValue::Static(value),
            ix: None,
            x: None,
            sid: None,
            extra: Object::new(),
        }
    }

    pub fn keyframed(keyframes: Vec<Keyframe<T>>) -> Self {
        Self {
            a: Some(1),
            k: AnimatedValue::Keyframed(keyframes),
            ix: None,
            x: None,
            sid: None,
            extra: Object::new(),
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.k, AnimatedValue::Keyframed(_))
    }

    pub fn static_value(&self) -> Option<&T> {
        match &self.k {
            AnimatedValue::Static(value) => Some(value),
            AnimatedValue::Keyframed(_) => None,
        }
    }

    /// Keyframes of an animated track; empty for a static value.
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        match &self.k {
            AnimatedValue::Static(_) => &[],
            AnimatedValue::Keyframed(frames) => frames,
        }
    }
}

impl<T> Keyframe<T> {
    pub fn new(t: f64, s: T) -> Self {
        Self {
            t,
            s: Some(s),
            e: None,
            i: None,
            o: None,
            to: None,
            ti: None,
            h: None,
            extra: Object::new(),
        }
    }

    pub fn is_hold(&self) -> bool {
        self.h == Some(1)
    }
}

/// Value types that can sit inside a [`Property`].
///
/// Keyframe values may be spelled differently from static values: scalar
/// and path keyframes are conventionally wrapped in a one-element array.
pub trait Animatable: Decode + Encode {
    fn decode_keyframe_value(value: Value, field: &str) -> Result<Self, DecodeError> {
        Self::decode(value, field)
    }

    fn encode_keyframe_value(&self, field: &str) -> Result<Value, EncodeError> {
        self.encode(field)
    }
}

fn unwrap_single(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

impl Animatable for f64 {
    fn decode_keyframe_value(value: Value, field: &str) -> Result<Self, DecodeError> {
        f64::decode(unwrap_single(value), field)
    }

    fn encode_keyframe_value(&self, field: &str) -> Result<Value, EncodeError> {
        Ok(Value::Array(vec![number(*self, field)?]))
    }
}

impl Animatable for BezierPath {
    fn decode_keyframe_value(value: Value, field: &str) -> Result<Self, DecodeError> {
        BezierPath::decode(unwrap_single(value), field)
    }

    fn encode_keyframe_value(&self, field: &str) -> Result<Value, EncodeError> {
        Ok(Value::Array(vec![self.encode(field)?]))
    }
}

impl Animatable for Vec2 {}
impl Animatable for Vector {}
impl Animatable for Color {}

impl Decode for Vec2 {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        if let Value::Array(items) = &value {
            if let [x, y] = items.as_slice() {
                if let (Some(x), Some(y)) = (x.as_f64(), y.as_f64()) {
                    return Ok([x, y]);
                }
            }
        }
        Err(DecodeError::type_mismatch(
            field,
            "2-element numeric array",
            &value,
        ))
    }
}

impl Encode for Vec2 {
    fn encode(&self, field: &str) -> Result<Value, EncodeError> {
        Ok(Value::Array(vec![
            number(self[0], field)?,
            number(self[1], field)?,
        ]))
    }
}

impl Decode for Color {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        if let Value::Array(items) = &value {
            if matches!(items.len(), 3 | 4) {
                let components: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                if let Some(components) = components {
                    return Ok(Color(components));
                }
            }
        }
        Err(DecodeError::type_mismatch(
            field,
            "3 or 4 component color array",
            &value,
        ))
    }
}

impl Encode for Color {
    fn encode(&self, field: &str) -> Result<Value, EncodeError> {
        self.0.encode(field)
    }
}

impl<T: Animatable> Decode for Property<T> {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        let a = fields.optional::<u8>("a")?;
        let raw = fields.take("k").ok_or_else(|| DecodeError::missing("k"))?;
        let k = AnimatedValue::decode_track(raw, a, field)?;
        Ok(Self {
            a,
            k,
            ix: fields.optional("ix")?,
            x: fields.optional("x")?,
            sid: fields.optional("sid")?,
            extra: fields.into_rest(),
        })
    }
}

impl<T: Animatable> Encode for Property<T> {
    fn encode(&self, field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.optional("a", &self.a)?;
        let k = match &self.k {
            AnimatedValue::Static(value) => value.encode(field)?,
            AnimatedValue::Keyframed(frames) => frames.encode(field)?,
        };
        out.raw("k", k);
        out.optional("ix", &self.ix)?;
        out.optional("x", &self.x)?;
        out.optional("sid", &self.sid)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

/// A `k` array is a keyframe track when its entries are objects carrying a
/// `t` time; anything else is the static value itself.
fn is_keyframe_list(items: &[Value]) -> bool {
    items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|first| first.contains_key("t"))
}

impl<T: Animatable> AnimatedValue<T> {
    fn decode_track(raw: Value, a: Option<u8>, field: &str) -> Result<Self, DecodeError> {
        match raw {
            Value::Array(items) if is_keyframe_list(&items) => {
                let frames = items
                    .into_iter()
                    .map(|item| Keyframe::decode(item, field))
                    .collect::<Result<Vec<_>, _>>()?;
                check_sequence(&frames, field)?;
                Ok(Self::Keyframed(frames))
            }
            Value::Array(items) if items.is_empty() && a == Some(1) => {
                Err(DecodeError::MalformedKeyframeSequence(
                    field.to_string(),
                    "animated track has no keyframes".to_string(),
                ))
            }
            other => T::decode(other, field).map(Self::Static),
        }
    }
}

/// Start times must be non-decreasing, and only the final keyframe may
/// leave out its start value.
fn check_sequence<T>(frames: &[Keyframe<T>], field: &str) -> Result<(), DecodeError> {
    for (index, pair) in frames.windows(2).enumerate() {
        if pair[1].t < pair[0].t {
            return Err(DecodeError::MalformedKeyframeSequence(
                field.to_string(),
                format!(
                    "keyframe {} starts at {} before keyframe {} at {}",
                    index + 1,
                    pair[1].t,
                    index,
                    pair[0].t
                ),
            ));
        }
        if pair[0].s.is_none() {
            return Err(DecodeError::missing("s"));
        }
    }
    Ok(())
}

impl<T: Animatable> Decode for Keyframe<T> {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        let t = fields.required("t")?;
        let s = fields
            .take("s")
            .map(|v| T::decode_keyframe_value(v, "s"))
            .transpose()?;
        let e = fields
            .take("e")
            .map(|v| T::decode_keyframe_value(v, "e"))
            .transpose()?;
        Ok(Self {
            t,
            s,
            e,
            i: fields.optional("i")?,
            o: fields.optional("o")?,
            to: fields.optional("to")?,
            ti: fields.optional("ti")?,
            h: fields.optional("h")?,
            extra: fields.into_rest(),
        })
    }
}

impl<T: Animatable> Encode for Keyframe<T> {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.field("t", &self.t)?;
        if let Some(s) = &self.s {
            out.raw("s", s.encode_keyframe_value("s")?);
        }
        if let Some(e) = &self.e {
            out.raw("e", e.encode_keyframe_value("e")?);
        }
        out.optional("i", &self.i)?;
        out.optional("o", &self.o)?;
        out.optional("to", &self.to)?;
        out.optional("ti", &self.ti)?;
        out.optional("h", &self.h)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

impl Decode for BezierTangent {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        Ok(Self {
            x: fields.required("x")?,
            y: fields.required("y")?,
            extra: fields.into_rest(),
        })
    }
}

impl Encode for BezierTangent {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.field("x", &self.x)?;
        out.field("y", &self.y)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

impl Decode for TangentComponent {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        if let Some(n) = value.as_f64() {
            return Ok(Self::Uniform(n));
        }
        if let Value::Array(items) = &value {
            let components: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
            if let Some(components) = components {
                return Ok(Self::PerAxis(components));
            }
        }
        Err(DecodeError::type_mismatch(
            field,
            "number or numeric array",
            &value,
        ))
    }
}

impl Encode for TangentComponent {
    fn encode(&self, field: &str) -> Result<Value, EncodeError> {
        match self {
            Self::Uniform(n) => number(*n, field),
            Self::PerAxis(components) => components.encode(field),
        }
    }
}

impl Decode for BezierPath {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        Ok(Self {
            c: fields.optional("c")?,
            i: fields.required("i")?,
            o: fields.required("o")?,
            v: fields.required("v")?,
            extra: fields.into_rest(),
        })
    }
}

impl Encode for BezierPath {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.optional("c", &self.c)?;
        out.field("i", &self.i)?;
        out.field("o", &self.o)?;
        out.field("v", &self.v)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}
