use serde_json::Value;

use crate::codec::{serde_via_codec, Decode, Encode, Fields, Object, ObjectWriter};
use crate::error::{DecodeError, EncodeError};
use crate::property::{BezierPath, Property, Vector};
use crate::shape::Shape;

/// Top-level composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub v: String, // Format version
    pub fr: f64,   // Frame rate
    pub ip: f64,
    pub op: f64,
    pub w: u32,
    pub h: u32,
    pub nm: Option<String>,
    pub ddd: Option<u8>,
    pub assets: Option<Vec<Asset>>,
    /// Paint order: first entry is drawn on top.
    pub layers: Vec<Layer>,
    pub markers: Option<Vec<Marker>>,
    pub extra: Object,
}

/// An entry of the `assets` table. Only the id and precomposition layers are
/// typed; images, fonts and data assets ride along in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: String,
    pub nm: Option<String>,
    pub fr: Option<f64>,
    pub layers: Option<Vec<Layer>>,
    pub extra: Object,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marker {
    pub cm: Option<String>, // Comment
    pub tm: Option<f64>,    // Time
    pub dr: Option<f64>,    // Duration
    pub extra: Object,
}

/// A record whose type tag is not recognized, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueRecord {
    pub tag: String,
    /// The whole record, `ty` included.
    pub raw: Object,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Typed(Box<TypedLayer>),
    Unknown(OpaqueRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedLayer {
    pub ind: u32,
    pub parent: Option<u32>,
    pub nm: Option<String>,
    pub match_name: Option<String>, // mn
    pub ddd: Option<u8>,
    pub hd: Option<bool>, // Hidden
    pub ks: Transform,
    pub ao: Option<u8>, // Auto-orient
    pub bm: Option<u8>, // Blend mode
    pub ip: f64,
    pub op: f64,
    pub st: Option<f64>,
    pub sr: Option<f64>, // Time stretch
    pub tt: Option<u8>,  // Matte mode
    pub tp: Option<u32>, // Matte parent
    pub td: Option<u8>,  // Matte target
    pub has_mask: Option<bool>,
    pub masks_properties: Option<Vec<Mask>>,
    pub ct: Option<u8>, // Collapse transform
    pub cl: Option<String>,
    pub ln: Option<String>,
    pub content: LayerContent,
    pub extra: Object,
}

/// Type-specific part of a layer; the variant determines `ty`.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    Precomp {
        ref_id: String,
        w: Option<u32>,
        h: Option<u32>,
        tm: Option<Property<f64>>, // Time remap
    },
    Solid {
        sc: String,
        sw: u32,
        sh: u32,
    },
    Image {
        ref_id: String,
    },
    Null,
    Shape {
        shapes: Vec<Shape>,
    },
    /// Text document and animators, kept as written.
    Text {
        t: Value,
    },
    Audio {
        au: Option<Value>,
    },
    Camera {
        pe: Property<f64>, // Perspective
    },
}

/// Transform bundle shared by layers (`ks`), shape transforms and repeaters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transform {
    pub a: Option<Property<Vector>>, // Anchor point
    pub p: Option<Position>,
    pub s: Option<Property<Vector>>, // Scale, percent
    pub r: Option<Property<f64>>,    // Rotation, degrees
    pub rx: Option<Property<f64>>,
    pub ry: Option<Property<f64>>,
    pub rz: Option<Property<f64>>,
    pub or: Option<Property<Vector>>, // Orientation
    pub o: Option<Property<f64>>,     // Opacity, percent
    pub sk: Option<Property<f64>>,    // Skew
    pub sa: Option<Property<f64>>,    // Skew axis
    pub extra: Object,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    Unified(Property<Vector>),
    /// `{"s": true, "x": .., "y": ..}`
    Split(SplitPosition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitPosition {
    pub x: Property<f64>,
    pub y: Property<f64>,
    pub z: Option<Property<f64>>,
    pub extra: Object,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub inv: Option<bool>,
    pub mode: Option<String>,
    pub pt: Property<BezierPath>,
    pub o: Option<Property<f64>>,
    pub x: Option<Property<f64>>, // Expansion
    pub nm: Option<String>,
    pub extra: Object,
}

impl Document {
    /// Layer with the given `ind`, searched among the top-level layers.
    pub fn find_layer(&self, ind: u32) -> Option<&TypedLayer> {
        self.layers
            .iter()
            .filter_map(Layer::as_typed)
            .find(|layer| layer.ind == ind)
    }

    /// Tags of every opaque passthrough record in the tree, in document
    /// order: top-level layers first, then asset layers.
    pub fn unknown_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        collect_layer_tags(&self.layers, &mut tags);
        for asset in self.assets.iter().flatten() {
            if let Some(layers) = &asset.layers {
                collect_layer_tags(layers, &mut tags);
            }
        }
        tags
    }
}

fn collect_layer_tags(layers: &[Layer], tags: &mut Vec<String>) {
    for layer in layers {
        match layer {
            Layer::Unknown(record) => tags.push(record.tag.clone()),
            Layer::Typed(layer) => {
                if let LayerContent::Shape { shapes } = &layer.content {
                    collect_shape_tags(shapes, tags);
                }
            }
        }
    }
}

fn collect_shape_tags(shapes: &[Shape], tags: &mut Vec<String>) {
    for shape in shapes {
        if let Shape::Unknown(record) = shape {
            tags.push(record.tag.clone());
        }
        collect_shape_tags(shape.children(), tags);
    }
}

impl Layer {
    pub fn as_typed(&self) -> Option<&TypedLayer> {
        match self {
            Layer::Typed(layer) => Some(layer),
            Layer::Unknown(_) => None,
        }
    }

    pub fn as_typed_mut(&mut self) -> Option<&mut TypedLayer> {
        match self {
            Layer::Typed(layer) => Some(layer),
            Layer::Unknown(_) => None,
        }
    }

    /// The `ty` tag as written.
    pub fn tag(&self) -> String {
        match self {
            Layer::Typed(layer) => layer.content.ty().to_string(),
            Layer::Unknown(record) => record.tag.clone(),
        }
    }

    /// Shapes of a shape layer; empty for every other kind.
    pub fn shapes(&self) -> &[Shape] {
        match self {
            Layer::Typed(layer) => match &layer.content {
                LayerContent::Shape { shapes } => shapes,
                _ => &[],
            },
            Layer::Unknown(_) => &[],
        }
    }
}

impl LayerContent {
    pub fn ty(&self) -> u32 {
        match self {
            LayerContent::Precomp { .. } => 0,
            LayerContent::Solid { .. } => 1,
            LayerContent::Image { .. } => 2,
            LayerContent::Null => 3,
            LayerContent::Shape { .. } => 4,
            LayerContent::Text { .. } => 5,
            LayerContent::Audio { .. } => 6,
            LayerContent::Camera { .. } => 13,
        }
    }

    fn take(ty: u32, fields: &mut Fields) -> Result<Self, DecodeError> {
        Ok(match ty {
            0 => LayerContent::Precomp {
                ref_id: fields.required("refId")?,
                w: fields.optional("w")?,
                h: fields.optional("h")?,
                tm: fields.optional("tm")?,
            },
            1 => LayerContent::Solid {
                sc: fields.required("sc")?,
                sw: fields.required("sw")?,
                sh: fields.required("sh")?,
            },
            2 => LayerContent::Image {
                ref_id: fields.required("refId")?,
            },
            3 => LayerContent::Null,
            4 => LayerContent::Shape {
                shapes: fields.required("shapes")?,
            },
            5 => LayerContent::Text {
                t: fields.required("t")?,
            },
            6 => LayerContent::Audio {
                au: fields.optional("au")?,
            },
            13 => LayerContent::Camera {
                pe: fields.required("pe")?,
            },
            other => return Err(DecodeError::UnknownVariant(other.to_string())),
        })
    }

    fn write(&self, out: &mut ObjectWriter) -> Result<(), EncodeError> {
        match self {
            LayerContent::Precomp { ref_id, w, h, tm } => {
                out.field("refId", ref_id)?;
                out.optional("w", w)?;
                out.optional("h", h)?;
                out.optional("tm", tm)?;
            }
            LayerContent::Solid { sc, sw, sh } => {
                out.field("sc", sc)?;
                out.field("sw", sw)?;
                out.field("sh", sh)?;
            }
            LayerContent::Image { ref_id } => out.field("refId", ref_id)?,
            LayerContent::Null => {}
            LayerContent::Shape { shapes } => out.field("shapes", shapes)?,
            LayerContent::Text { t } => out.field("t", t)?,
            LayerContent::Audio { au } => out.optional("au", au)?,
            LayerContent::Camera { pe } => out.field("pe", pe)?,
        }
        Ok(())
    }
}

const LAYER_TYPES: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 13];

impl Decode for Layer {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        let tag = match fields.peek("ty") {
            None => return Err(DecodeError::missing("ty")),
            Some(raw) if raw.is_i64() || raw.is_u64() => raw.clone(),
            Some(raw) => return Err(DecodeError::type_mismatch("ty", "integer", raw)),
        };

        // Any integer outside the recognized set, negative or oversized included.
        let known = tag
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| LAYER_TYPES.contains(n));
        let Some(ty) = known else {
            tracing::debug!(ty = %tag, "keeping unrecognized layer as opaque passthrough");
            return Ok(Layer::Unknown(OpaqueRecord {
                tag: tag.to_string(),
                raw: fields.into_rest(),
            }));
        };

        fields.take("ty");
        let ind = fields.required("ind")?;
        let ks = fields.required("ks")?;
        let ip = fields.required("ip")?;
        let op = fields.required("op")?;
        let content = LayerContent::take(ty, &mut fields)?;

        Ok(Layer::Typed(Box::new(TypedLayer {
            ind,
            parent: fields.optional("parent")?,
            nm: fields.optional("nm")?,
            match_name: fields.optional("mn")?,
            ddd: fields.optional("ddd")?,
            hd: fields.optional("hd")?,
            ks,
            ao: fields.optional("ao")?,
            bm: fields.optional("bm")?,
            ip,
            op,
            st: fields.optional("st")?,
            sr: fields.optional("sr")?,
            tt: fields.optional("tt")?,
            tp: fields.optional("tp")?,
            td: fields.optional("td")?,
            has_mask: fields.optional("hasMask")?,
            masks_properties: fields.optional("masksProperties")?,
            ct: fields.optional("ct")?,
            cl: fields.optional("cl")?,
            ln: fields.optional("ln")?,
            content,
            extra: fields.into_rest(),
        })))
    }
}

impl Encode for Layer {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let layer = match self {
            Layer::Unknown(record) => return Ok(Value::Object(record.raw.clone())),
            Layer::Typed(layer) => layer,
        };

        let mut out = ObjectWriter::new();
        out.field("ty", &layer.content.ty())?;
        out.field("ind", &layer.ind)?;
        out.optional("parent", &layer.parent)?;
        out.optional("nm", &layer.nm)?;
        out.optional("mn", &layer.match_name)?;
        out.optional("ddd", &layer.ddd)?;
        out.optional("hd", &layer.hd)?;
        out.field("ks", &layer.ks)?;
        out.optional("ao", &layer.ao)?;
        out.optional("bm", &layer.bm)?;
        out.field("ip", &layer.ip)?;
        out.field("op", &layer.op)?;
        out.optional("st", &layer.st)?;
        out.optional("sr", &layer.sr)?;
        out.optional("tt", &layer.tt)?;
        out.optional("tp", &layer.tp)?;
        out.optional("td", &layer.td)?;
        out.optional("hasMask", &layer.has_mask)?;
        out.optional("masksProperties", &layer.masks_properties)?;
        out.optional("ct", &layer.ct)?;
        out.optional("cl", &layer.cl)?;
        out.optional("ln", &layer.ln)?;
        layer.content.write(&mut out)?;
        out.extend(&layer.extra);
        Ok(out.finish())
    }
}

impl Transform {
    /// Pull the transform keys out of a record that also carries other keys.
    pub(crate) fn take(fields: &mut Fields) -> Result<Self, DecodeError> {
        Ok(Self {
            a: fields.optional("a")?,
            p: fields.optional("p")?,
            s: fields.optional("s")?,
            r: fields.optional("r")?,
            rx: fields.optional("rx")?,
            ry: fields.optional("ry")?,
            rz: fields.optional("rz")?,
            or: fields.optional("or")?,
            o: fields.optional("o")?,
            sk: fields.optional("sk")?,
            sa: fields.optional("sa")?,
            extra: Object::new(),
        })
    }

    pub(crate) fn write(&self, out: &mut ObjectWriter) -> Result<(), EncodeError> {
        out.optional("a", &self.a)?;
        out.optional("p", &self.p)?;
        out.optional("s", &self.s)?;
        out.optional("r", &self.r)?;
        out.optional("rx", &self.rx)?;
        out.optional("ry", &self.ry)?;
        out.optional("rz", &self.rz)?;
        out.optional("or", &self.or)?;
        out.optional("o", &self.o)?;
        out.optional("sk", &self.sk)?;
        out.optional("sa", &self.sa)?;
        out.extend(&self.extra);
        Ok(())
    }
}

impl Decode for Transform {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        let mut transform = Transform::take(&mut fields)?;
        transform.extra = fields.into_rest();
        Ok(transform)
    }
}

impl Encode for Transform {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        self.write(&mut out)?;
        Ok(out.finish())
    }
}

impl Decode for Position {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let split = value.get("s").and_then(Value::as_bool) == Some(true);
        if !split {
            return Property::decode(value, field).map(Position::Unified);
        }

        let mut fields = Fields::new(value, field)?;
        fields.take("s");
        Ok(Position::Split(SplitPosition {
            x: fields.required("x")?,
            y: fields.required("y")?,
            z: fields.optional("z")?,
            extra: fields.into_rest(),
        }))
    }
}

impl Encode for Position {
    fn encode(&self, field: &str) -> Result<Value, EncodeError> {
        match self {
            Position::Unified(prop) => prop.encode(field),
            Position::Split(split) => {
                let mut out = ObjectWriter::new();
                out.raw("s", Value::Bool(true));
                out.field("x", &split.x)?;
                out.field("y", &split.y)?;
                out.optional("z", &split.z)?;
                out.extend(&split.extra);
                Ok(out.finish())
            }
        }
    }
}

impl Decode for Mask {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        Ok(Self {
            inv: fields.optional("inv")?,
            mode: fields.optional("mode")?,
            pt: fields.required("pt")?,
            o: fields.optional("o")?,
            x: fields.optional("x")?,
            nm: fields.optional("nm")?,
            extra: fields.into_rest(),
        })
    }
}

impl Encode for Mask {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.optional("inv", &self.inv)?;
        out.optional("mode", &self.mode)?;
        out.field("pt", &self.pt)?;
        out.optional("o", &self.o)?;
        out.optional("x", &self.x)?;
        out.optional("nm", &self.nm)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

impl Decode for Asset {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        Ok(Self {
            id: fields.required("id")?,
            nm: fields.optional("nm")?,
            fr: fields.optional("fr")?,
            layers: fields.optional("layers")?,
            extra: fields.into_rest(),
        })
    }
}

impl Encode for Asset {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.field("id", &self.id)?;
        out.optional("nm", &self.nm)?;
        out.optional("fr", &self.fr)?;
        out.optional("layers", &self.layers)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

impl Decode for Marker {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        Ok(Self {
            cm: fields.optional("cm")?,
            tm: fields.optional("tm")?,
            dr: fields.optional("dr")?,
            extra: fields.into_rest(),
        })
    }
}

impl Encode for Marker {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.optional("cm", &self.cm)?;
        out.optional("tm", &self.tm)?;
        out.optional("dr", &self.dr)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

impl Decode for Document {
    fn decode(value: Value, field: &str) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, field)?;
        Ok(Self {
            v: fields.required("v")?,
            fr: fields.required("fr")?,
            ip: fields.required("ip")?,
            op: fields.required("op")?,
            w: fields.required("w")?,
            h: fields.required("h")?,
            nm: fields.optional("nm")?,
            ddd: fields.optional("ddd")?,
            assets: fields.optional("assets")?,
            layers: fields.required("layers")?,
            markers: fields.optional("markers")?,
            extra: fields.into_rest(),
        })
    }
}

impl Encode for Document {
    fn encode(&self, _field: &str) -> Result<Value, EncodeError> {
        let mut out = ObjectWriter::new();
        out.field("v", &self.v)?;
        out.field("fr", &self.fr)?;
        out.field("ip", &self.ip)?;
        out.field("op", &self.op)?;
        out.field("w", &self.w)?;
        out.field("h", &self.h)?;
        out.optional("nm", &self.nm)?;
        out.optional("ddd", &self.ddd)?;
        out.optional("assets", &self.assets)?;
        out.field("layers", &self.layers)?;
        out.optional("markers", &self.markers)?;
        out.extend(&self.extra);
        Ok(out.finish())
    }
}

serde_via_codec! {
    Document => "document",
    Layer => "layers",
}
