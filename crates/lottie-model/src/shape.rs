use serde_json::Value;

use crate::codec::{serde_via_codec, Decode, Encode, Fields, Object, ObjectWriter};
use crate::error::{DecodeError, EncodeError};
use crate::model::{OpaqueRecord, Transform};
use crate::property::{BezierPath, Color, Property, Vec2, Vector};

/// One item of a shape list, selected by its `ty` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Group(GroupShape),                   // gr
    Transform(TransformShape),           // tr
    Rect(RectShape),                     // rc
    Ellipse(EllipseShape),               // el
    Polystar(PolystarShape),             // sr
    Path(PathShape),                     // sh
    Fill(FillShape),                     // fl
    Stroke(StrokeShape),                 // st
    GradientFill(GradientFillShape),     // gf
    GradientStroke(GradientStrokeShape), // gs
    Trim(TrimShape),                     // tm
    RoundCorners(RoundCornersShape),     // rd
    MergePaths(MergePathsShape),         // mm
    Repeater(RepeaterShape),             // rp
    Unknown(OpaqueRecord),
}

/// Keys every recognized shape may carry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeMeta {
    pub nm: Option<String>,
    pub match_name: Option<String>, // mn
    pub ix: Option<u32>,            // Property index
    pub cix: Option<u32>,
    pub ind: Option<u32>,
    pub np: Option<u32>, // Number of properties
    pub hd: Option<bool>,
    pub bm: Option<u8>,
    pub extra: Object,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupShape {
    pub it: Vec<Shape>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformShape {
    pub t: Transform,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub s: Property<Vec2>, // Size
    pub p: Property<Vec2>, // Center
    pub r: Property<f64>,  // Corner radius
    pub d: Option<u8>,     // Direction
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EllipseShape {
    pub s: Property<Vec2>,
    pub p: Property<Vec2>,
    pub d: Option<u8>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolystarShape {
    pub p: Property<Vec2>,
    pub or: Property<f64>, // Outer radius
    pub os: Property<f64>, // Outer roundness
    pub r: Property<f64>,
    pub pt: Property<f64>, // Points
    pub sy: u8,            // 1 = star, 2 = polygon
    pub ir: Option<Property<f64>>,
    pub is: Option<Property<f64>>,
    pub d: Option<u8>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathShape {
    pub ks: Property<BezierPath>,
    pub d: Option<u8>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillShape {
    pub c: Property<Color>,
    pub o: Property<f64>,
    pub r: Option<u8>, // Fill rule
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeShape {
    pub c: Property<Color>,
    pub o: Property<f64>,
    pub w: Property<f64>,
    pub lc: Option<u8>,
    pub lj: Option<u8>,
    pub ml: Option<f64>,
    pub d: Option<Vec<Dash>>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dash {
    pub n: Option<String>, // "d", "g" or "o"
    pub nm: Option<String>,
    pub v: Property<f64>,
    pub extra: Object,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientFillShape {
    pub o: Property<f64>,
    pub s: Property<Vec2>, // Start point
    pub e: Property<Vec2>, // End point
    pub t: u8,             // 1 = linear, 2 = radial
    pub g: GradientColors,
    pub h: Option<Property<f64>>, // Highlight length
    pub a: Option<Property<f64>>, // Highlight angle
    pub r: Option<u8>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStrokeShape {
    pub o: Property<f64>,
    pub w: Property<f64>,
    pub s: Property<Vec2>,
    pub e: Property<Vec2>,
    pub t: u8,
    pub g: GradientColors,
    pub h: Option<Property<f64>>,
    pub a: Option<Property<f64>>,
    pub lc: Option<u8>,
    pub lj: Option<u8>,
    pub ml: Option<f64>,
    pub d: Option<Vec<Dash>>,
    pub meta: ShapeMeta,
}

/// Flattened gradient stops: `p` color stops, then optional opacity stops.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientColors {
    pub p: u32,
    pub k: Property<Vector>,
    pub extra: Object,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrimShape {
    pub s: Property<f64>,
    pub e: Property<f64>,
    pub o: Property<f64>,
    pub m: Option<u8>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundCornersShape {
    pub r: Property<f64>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergePathsShape {
    pub mm: Option<u8>,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterShape {
    pub c: Property<f64>, // Copies
    pub o: Property<f64>, // Offset
    pub m: Option<u8>,    // Composite
    pub tr: RepeaterTransform,
    pub meta: ShapeMeta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterTransform {
    pub t: Transform,
    pub so: Option<Property<f64>>, // Start opacity
    pub eo: Option<Property<f64>>, // End opacity
}

impl Shape {
    /// The `ty` tag as written.
    pub fn tag(&self) -> &str {
        match self {
            Shape::Group(_) => "gr",
            Shape::Transform(_) => "tr",
            Shape::Rect(_) => "rc",
            Shape::Ellipse(_) => "el",
            Shape::Polystar(_) => "sr",
            Shape::Path(_) => "sh",
            Shape::Fill(_) => "fl",
            Shape::Stroke(_) => "st",
            Shape::GradientFill(_) => "gf",
            Shape::GradientStroke(_) => "gs",
            Shape::Trim(_) => "tm",
            Shape::RoundCorners(_) => "rd",
            Shape::MergePaths(_) => "mm",
            Shape::Repeater(_) => "rp",
            Shape::Unknown(record) => record.tag.as_str(),
        }
    }

    pub fn meta(&self) -> Option<&ShapeMeta> {
        Some(match self {
            Shape::Group(s) => &s.meta,
            Shape::Transform(s) => &s.meta,
            Shape::Rect(s) => &s.meta,
            Shape::Ellipse(s) => &s.meta,
            Shape::Polystar(s) => &s.meta,
            Shape::Path(s) => &s.meta,
            Shape::Fill(s) => &s.meta,
            Shape::Stroke(s) => &s.meta,
            Shape::GradientFill(s) => &s.meta,
            Shape::GradientStroke(s) => &s.meta,
            Shape::Trim(s) => &s.meta,
            Shape::RoundCorners(s) => &s.meta,
            Shape::MergePaths(s) => &s.meta,
            Shape::Repeater(s) => &s.meta,
            Shape::Unknown(_) => return None,
        })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Shape::Unknown(record) => record.raw.get("nm").and_then(Value::as_str),
            shape => shape.meta().and_then(|meta| meta.nm.as_deref()),
        }
    }

    /// Child items of a group; empty for every other shape.
    pub fn children(&self) -> &[Shape] {
        match self {
            Shape::Group(group) => &group.it,
            _ => &[],
        }
    }
}

impl ShapeMeta {
    /// Consumes the record: the meta keys are taken and whatever remains
    /// becomes `extra`.
    fn finish(mut fields: Fields) -> Result<Self, DecodeError> {
        fields.take("ty");
        Ok(Self {
            nm: fields.optional("nm")?,
            match_name: fields.optional("mn")?,
            ix: fields.optional("ix")?,
            cix: fields.optional("cix")?,
            ind: fields.optional("ind")?,
            np: fields.optional("np")?,
            hd: fields.optional("hd")?,
            bm: fields.optional("bm")?,
            extra: fields.into_rest(),
        })
    }

    fn write(&self, out: &mut ObjectWriter) -> Result<(), EncodeError> {
        out.optional("nm", &self.nm)?;
        out.optional("mn", &self.match_name)?;
        out.optional("ix", &self.ix)?;
        out.optional("cix", &self.cix)?;
        out.optional("ind", &self.ind)?;
        out.optional("np", &self.np)?;
        out.optional("hd", &self.hd)?;
        out.optional("bm", &self.bm)?;
        out.extend(&self.extra);
        Ok(())
    }
}

impl Decode for Shape {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut f = Fields::new(value, field)?;
        let tag = match f.peek("ty") {
            None => return Err(DecodeError::missing("ty")),
            Some(raw) => String::decode(raw.clone(), "ty")?,
        };

        Ok(match tag.as_str() {
            "gr" => Shape::Group(GroupShape {
                it: f.required("it")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "tr" => Shape::Transform(TransformShape {
                t: Transform::take(&mut f)?,
                meta: ShapeMeta::finish(f)?,
            }),
            "rc" => Shape::Rect(RectShape {
                s: f.required("s")?,
                p: f.required("p")?,
                r: f.required("r")?,
                d: f.optional("d")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "el" => Shape::Ellipse(EllipseShape {
                s: f.required("s")?,
                p: f.required("p")?,
                d: f.optional("d")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "sr" => Shape::Polystar(PolystarShape {
                p: f.required("p")?,
                or: f.required("or")?,
                os: f.required("os")?,
                r: f.required("r")?,
                pt: f.required("pt")?,
                sy: f.required("sy")?,
                ir: f.optional("ir")?,
                is: f.optional("is")?,
                d: f.optional("d")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "sh" => Shape::Path(PathShape {
                ks: f.required("ks")?,
                d: f.optional("d")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "fl" => Shape::Fill(FillShape {
                c: f.required("c")?,
                o: f.required("o")?,
                r: f.optional("r")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "st" => Shape::Stroke(StrokeShape {
                c: f.required("c")?,
                o: f.required("o")?,
                w: f.required("w")?,
                lc: f.optional("lc")?,
                lj: f.optional("lj")?,
                ml: f.optional("ml")?,
                d: f.optional("d")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "gf" => Shape::GradientFill(GradientFillShape {
                o: f.required("o")?,
                s: f.required("s")?,
                e: f.required("e")?,
                t: f.required("t")?,
                g: f.required("g")?,
                h: f.optional("h")?,
                a: f.optional("a")?,
                r: f.optional("r")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "gs" => Shape::GradientStroke(GradientStrokeShape {
                o: f.required("o")?,
                w: f.required("w")?,
                s: f.required("s")?,
                e: f.required("e")?,
                t: f.required("t")?,
                g: f.required("g")?,
                h: f.optional("h")?,
                a: f.optional("a")?,
                lc: f.optional("lc")?,
                lj: f.optional("lj")?,
                ml: f.optional("ml")?,
                d: f.optional("d")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "tm" => Shape::Trim(TrimShape {
                s: f.required("s")?,
                e: f.required("e")?,
                o: f.required("o")?,
                m: f.optional("m")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "rd" => Shape::RoundCorners(RoundCornersShape {
                r: f.required("r")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "mm" => Shape::MergePaths(MergePathsShape {
                mm: f.optional("mm")?,
                meta: ShapeMeta::finish(f)?,
            }),
            "rp" => Shape::Repeater(RepeaterShape {
                c: f.required("c")?,
                o: f.required("o")?,
                m: f.optional("m")?,
                tr: f.required("tr")?,
                meta: ShapeMeta::finish(f)?,
            }),
            _ => {
                tracing::debug!(ty = %tag, "keeping unrecognized shape as opaque passthrough");
                Shape::Unknown(OpaqueRecord {
                    tag: tag.clone(),
                    raw: f.into_rest(),
                })
            }
        })
    }
}

impl Encode for Shape {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.raw("ty", Value::String(self.tag().to_string()));
        let meta = match self {
            Shape::Unknown(record) => return Ok(Value::Object(record.raw.clone())),
            Shape::Group(s) => {
                out.field("it", &s.it)?;
                &s.meta
            }
            Shape::Transform(s) => {
                s.t.write(&mut out)?;
                &s.meta
            }
            Shape::Rect(s) => {
                out.field("s", &s.s)?;
                out.field("p", &s.p)?;
                out.field("r", &s.r)?;
                out.optional("d", &s.d)?;
                &s.meta
            }
            Shape::Ellipse(s) => {
                out.field("s", &s.s)?;
                out.field("p", &s.p)?;
                out.optional("d", &s.d)?;
                &s.meta
            }
            Shape::Polystar(s) => {
                out.field("p", &s.p)?;
                out.field("or", &s.or)?;
                out.field("os", &s.os)?;
                out.field("r", &s.r)?;
                out.field("pt", &s.pt)?;
                out.field("sy", &s.sy)?;
                out.optional("ir", &s.ir)?;
                out.optional("is", &s.is)?;
                out.optional("d", &s.d)?;
                &s.meta
            }
            Shape::Path(s) => {
                out.field("ks", &s.ks)?;
                out.optional("d", &s.d)?;
                &s.meta
            }
            Shape::Fill(s) => {
                out.field("c", &s.c)?;
                out.field("o", &s.o)?;
                out.optional("r", &s.r)?;
                &s.meta
            }
            Shape::Stroke(s) => {
                out.field("c", &s.c)?;
                out.field("o", &s.o)?;
                out.field("w", &s.w)?;
                out.optional("lc", &s.lc)?;
                out.optional("lj", &s.lj)?;
                out.optional("ml", &s.ml)?;
                out.optional("d", &s.d)?;
                &s.meta
            }
            Shape::GradientFill(s) => {
                out.field("o", &s.o)?;
                out.field("s", &s.s)?;
                out.field("e", &s.e)?;
                out.field("t", &s.t)?;
                out.field("g", &s.g)?;
                out.optional("h", &s.h)?;
                out.optional("a", &s.a)?;
                out.optional("r", &s.r)?;
                &s.meta
            }
            Shape::GradientStroke(s) => {
                out.field("o", &s.o)?;
                out.field("w", &s.w)?;
                out.field("s", &s.s)?;
                out.field("e", &s.e)?;
                out.field("t", &s.t)?;
                out.field("g", &s.g)?;
                out.optional("h", &s.h)?;
                out.optional("a", &s.a)?;
                out.optional("lc", &s.lc)?;
                out.optional("lj", &s.lj)?;
                out.optional("ml", &s.ml)?;
                out.optional("d", &s.d)?;
                &s.meta
            }
            Shape::Trim(s) => {
                out.field("s", &s.s)?;
                out.field("e", &s.e)?;
                out.field("o", &s.o)?;
                out.optional("m", &s.m)?;
                &s.meta
            }
            Shape::RoundCorners(s) => {
                out.field("r", &s.r)?;
                &s.meta
            }
            Shape::MergePaths(s) => {
                out.optional("mm", &s.mm)?;
                &s.meta
            }
            Shape::Repeater(s) => {
                out.field("c", &s.c)?;
                out.field("o", &s.o)?;
                out.optional("m", &s.m)?;
                out.field("tr", &s.tr)?;
                &s.meta
            }
        };
        meta.write(&mut out)?;
        Ok(out.finish())
    }
}

impl Decode for Dash {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        Ok(Self {
            n: fields.optional("n")?,
            nm: fields.optional("nm")?,
            v: fields.required("v")?,
            extra: fields.into_rest(),
        })
    }
}

impl Encode for Dash {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.optional("n", &self.n)?;
        out.optional("nm", &self.nm)?;
        out.field("v", &self.v)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

impl Decode for GradientColors {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        Ok(Self {
            p: fields.required("p")?,
            k: fields.required("k")?,
            extra: fields.into_rest(),
        })
    }
}

impl Encode for GradientColors {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.field("p", &self.p)?;
        out.field("k", &self.k)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

impl Decode for RepeaterTransform {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        let so = fields.optional("so")?;
        let eo = fields.optional("eo")?;
        let mut t = Transform::take(&mut fields)?;
        t.extra = fields.into_rest();
        Ok(Self { t, so, eo })
    }
}

impl Encode for RepeaterTransform {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.optional("so", &self.so)?;
        out.optional("eo", &self.eo)?;
        self.t.write(&mut out)?;
        Ok(out.finish())
    }
}

serde_via_codec! {
    Shape => "shapes",
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::AnimatedValue;
    use serde_json::json;

    #[test]
    fn test_unknown_shape_round_trips_unchanged() {
        let raw = json!({
            "ty": "zz",
            "nm": "Zig Zag 1",
            "r": { "a": 0, "k": 4 },
            "s": { "a": 1, "k": [{ "t": 0, "s": [10] }, { "t": 5, "s": [20] }] },
            "nested": { "deeper": [null, true, "x", 1.25] }
        });
        let shape = Shape::decode(raw.clone(), "shapes").unwrap();
        assert_eq!(shape.tag(), "zz");
        assert_eq!(shape.name(), Some("Zig Zag 1"));
        assert!(shape.meta().is_none());
        assert_eq!(shape.encode("shapes").unwrap(), raw);
    }

    #[test]
    fn test_unknown_shape_is_not_inspected() {
        // Fields that would be a type mismatch on a known shape pass through.
        let raw = json!({ "ty": "xx", "s": "not a vector", "nm": 12 });
        let shape = Shape::decode(raw.clone(), "shapes").unwrap();
        assert_eq!(shape.encode("shapes").unwrap(), raw);
    }

    #[test]
    fn test_missing_tag() {
        assert_eq!(
            Shape::decode(json!({ "nm": "Nameless" }), "shapes"),
            Err(DecodeError::MissingField("ty".to_string()))
        );
    }

    #[test]
    fn test_rect_static_and_animated_size() {
        let raw = json!({
            "ty": "rc",
            "d": 1,
            "s": { "a": 1, "k": [
                { "t": 0, "s": [10, 10], "e": [80, 40],
                  "i": { "x": [0.833], "y": [0.833] }, "o": { "x": [0.167], "y": [0.167] } },
                { "t": 24 }
            ], "ix": 2 },
            "p": { "a": 0, "k": [0, 0], "ix": 3 },
            "r": { "a": 0, "k": 8, "ix": 4 },
            "nm": "Rectangle Path 1",
            "mn": "ADBE Vector Shape - Rect",
            "hd": false
        });
        let shape = Shape::decode(raw.clone(), "shapes").unwrap();
        let Shape::Rect(rect) = &shape else {
            panic!("expected rect, got {}", shape.tag());
        };
        assert!(rect.s.is_animated());
        assert_eq!(rect.p.k, AnimatedValue::Static([0.0, 0.0]));
        assert_eq!(rect.meta.match_name.as_deref(), Some("ADBE Vector Shape - Rect"));
        assert_eq!(shape.encode("shapes").unwrap(), raw);
    }

    #[test]
    fn test_rect_size_type_mismatch() {
        let raw = json!({
            "ty": "rc",
            "s": { "a": 0, "k": 100 },
            "p": { "a": 0, "k": [0, 0] },
            "r": { "a": 0, "k": 0 }
        });
        assert_eq!(
            Shape::decode(raw, "shapes"),
            Err(DecodeError::TypeMismatch(
                "s".to_string(),
                "2-element numeric array",
                "number"
            ))
        );
    }

    #[test]
    fn test_group_with_fill_and_transform() {
        let raw = json!({
            "ty": "gr",
            "nm": "Dot",
            "np": 3,
            "cix": 2,
            "ix": 1,
            "mn": "ADBE Vector Group",
            "it": [
                { "ty": "el", "s": { "a": 0, "k": [20, 20] }, "p": { "a": 0, "k": [0, 0] }, "nm": "Ellipse Path 1" },
                { "ty": "fl", "c": { "a": 0, "k": [0.2, 0.4, 0.9, 1] }, "o": { "a": 0, "k": 100 }, "r": 1, "nm": "Fill 1" },
                { "ty": "tr",
                  "p": { "a": 0, "k": [40, 0] }, "a": { "a": 0, "k": [0, 0] },
                  "s": { "a": 0, "k": [100, 100] }, "r": { "a": 0, "k": 0 },
                  "o": { "a": 0, "k": 100 }, "sk": { "a": 0, "k": 0 }, "sa": { "a": 0, "k": 0 },
                  "nm": "Transform" }
            ]
        });
        let shape = Shape::decode(raw.clone(), "shapes").unwrap();
        let tags: Vec<&str> = shape.children().iter().map(Shape::tag).collect();
        assert_eq!(tags, ["el", "fl", "tr"]);

        match &shape.children()[2] {
            Shape::Transform(tr) => {
                assert!(tr.t.sk.is_some());
                assert!(tr.t.extra.is_empty());
                assert_eq!(tr.meta.nm.as_deref(), Some("Transform"));
            }
            other => panic!("expected transform, got {}", other.tag()),
        }
        assert_eq!(shape.encode("shapes").unwrap(), raw);
    }

    #[test]
    fn test_stroke_with_dashes() {
        let raw = json!({
            "ty": "st",
            "c": { "a": 0, "k": [1, 1, 1, 1] },
            "o": { "a": 0, "k": 100 },
            "w": { "a": 0, "k": 4 },
            "lc": 2, "lj": 1, "ml": 4,
            "d": [
                { "n": "d", "nm": "dash", "v": { "a": 0, "k": 6 } },
                { "n": "o", "nm": "offset", "v": { "a": 0, "k": 0 } }
            ]
        });
        let shape = Shape::decode(raw.clone(), "shapes").unwrap();
        let Shape::Stroke(stroke) = &shape else {
            panic!("expected stroke");
        };
        assert_eq!(stroke.d.as_ref().map(Vec::len), Some(2));
        assert_eq!(shape.encode("shapes").unwrap(), raw);
    }

    #[test]
    fn test_gradient_fill_and_trim() {
        let gradient = json!({
            "ty": "gf",
            "o": { "a": 0, "k": 100 },
            "s": { "a": 0, "k": [0, 0] },
            "e": { "a": 0, "k": [100, 0] },
            "t": 1,
            "g": { "p": 2, "k": { "a": 0, "k": [0, 1, 0, 0, 1, 0, 0, 1] } },
            "r": 1
        });
        let shape = Shape::decode(gradient.clone(), "shapes").unwrap();
        assert!(matches!(&shape, Shape::GradientFill(g) if g.g.p == 2));
        assert_eq!(shape.encode("shapes").unwrap(), gradient);

        let trim = json!({
            "ty": "tm",
            "s": { "a": 0, "k": 0 },
            "e": { "a": 1, "k": [{ "t": 0, "s": [0] }, { "t": 30, "s": [100] }] },
            "o": { "a": 0, "k": 0 },
            "m": 1
        });
        let shape = Shape::decode(trim.clone(), "shapes").unwrap();
        assert_eq!(shape.encode("shapes").unwrap(), trim);
    }

    #[test]
    fn test_gradient_stroke_requires_width() {
        let raw = json!({
            "ty": "gs",
            "o": { "a": 0, "k": 100 },
            "w": { "a": 1, "k": [{ "t": 0, "s": [2] }, { "t": 20, "s": [8] }] },
            "s": { "a": 0, "k": [-50, 0] },
            "e": { "a": 0, "k": [50, 0] },
            "t": 2,
            "g": { "p": 3, "k": { "a": 0, "k": [0, 1, 0, 0, 0.5, 1, 1, 0, 1, 0, 0, 1] } },
            "h": { "a": 0, "k": 25 },
            "a": { "a": 0, "k": 45 },
            "lc": 1, "lj": 2, "ml": 4,
            "d": [{ "n": "d", "v": { "a": 0, "k": 3 } }],
            "nm": "Gradient Stroke 1"
        });
        let shape = Shape::decode(raw.clone(), "shapes").unwrap();
        let Shape::GradientStroke(stroke) = &shape else {
            panic!("expected gradient stroke, got {}", shape.tag());
        };
        assert!(stroke.w.is_animated());
        assert_eq!(stroke.t, 2);
        assert_eq!(stroke.g.p, 3);
        assert!(stroke.h.is_some());
        assert_eq!(shape.encode("shapes").unwrap(), raw);

        let mut missing = raw;
        missing.as_object_mut().unwrap().remove("w");
        assert_eq!(
            Shape::decode(missing, "shapes"),
            Err(DecodeError::MissingField("w".to_string()))
        );
    }

    #[test]
    fn test_merge_paths_mode_is_optional() {
        let raw = json!({ "ty": "mm", "mm": 4, "nm": "Merge Paths 1", "mn": "ADBE Vector Filter - Merge" });
        let shape = Shape::decode(raw.clone(), "shapes").unwrap();
        assert!(matches!(&shape, Shape::MergePaths(m) if m.mm == Some(4)));
        assert_eq!(shape.name(), Some("Merge Paths 1"));
        assert_eq!(shape.encode("shapes").unwrap(), raw);

        let bare = json!({ "ty": "mm" });
        let shape = Shape::decode(bare.clone(), "shapes").unwrap();
        assert!(matches!(&shape, Shape::MergePaths(m) if m.mm.is_none()));
        assert_eq!(shape.encode("shapes").unwrap(), bare);
    }

    #[test]
    fn test_repeater_transform() {
        let raw = json!({
            "ty": "rp",
            "c": { "a": 0, "k": 5 },
            "o": { "a": 0, "k": 0 },
            "m": 1,
            "tr": {
                "ty": "tr",
                "p": { "a": 0, "k": [30, 0] },
                "so": { "a": 0, "k": 100 },
                "eo": { "a": 0, "k": 20 }
            }
        });
        let shape = Shape::decode(raw.clone(), "shapes").unwrap();
        let Shape::Repeater(repeater) = &shape else {
            panic!("expected repeater");
        };
        assert!(repeater.tr.so.is_some());
        assert_eq!(repeater.tr.t.extra["ty"], json!("tr"));
        assert_eq!(shape.encode("shapes").unwrap(), raw);
    }

    #[test]
    fn test_polystar_and_path() {
        let star = json!({
            "ty": "sr", "sy": 1, "d": 1,
            "pt": { "a": 0, "k": 5 },
            "p": { "a": 0, "k": [0, 0] },
            "r": { "a": 0, "k": 0 },
            "ir": { "a": 0, "k": 20 }, "is": { "a": 0, "k": 0 },
            "or": { "a": 0, "k": 50 }, "os": { "a": 0, "k": 0 }
        });
        let shape = Shape::decode(star.clone(), "shapes").unwrap();
        assert_eq!(shape.tag(), "sr");
        assert_eq!(shape.encode("shapes").unwrap(), star);

        let path = json!({
            "ty": "sh",
            "ks": { "a": 0, "k": {
                "i": [[0, 0], [0, 0], [0, 0]],
                "o": [[0, 0], [0, 0], [0, 0]],
                "v": [[0, 0], [50, 0], [25, 40]],
                "c": true
            } }
        });
        let shape = Shape::decode(path.clone(), "shapes").unwrap();
        assert_eq!(shape.encode("shapes").unwrap(), path);
    }
}
