//! Round-trip and idempotence checks against a hand-written document.
//! Run with: cargo test -p lottie-model --test roundtrip

use lottie_model::{
    decode, decode_value, encode, encode_value, AnimatedValue, Document, Layer, LayerContent,
    Position, Shape, TangentComponent,
};
use rayon::prelude::*;
use serde_json::{json, Value};

const PULSE_BADGE: &str = include_str!("fixtures/pulse_badge.json");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn fixture() -> Document {
    decode(PULSE_BADGE).expect("Failed to decode fixture")
}

#[test]
fn test_fixture_encodes_back_to_identical_json() {
    init_tracing();
    let original: Value = serde_json::from_str(PULSE_BADGE).unwrap();
    let encoded = encode_value(&fixture()).unwrap();
    assert_eq!(encoded, original);
}

#[test]
fn test_decode_of_encode_is_structurally_equal() {
    let doc = fixture();
    let text = encode(&doc).unwrap();
    let again = decode(&text).unwrap();
    assert_eq!(again, doc);
}

#[test]
fn test_encode_decode_is_idempotent() {
    // Non-canonical spellings: bare scalar keyframe values and a bare path keyframe.
    let raw = json!({
        "v": "5.5.2", "fr": 60, "ip": 0, "op": 120, "w": 100, "h": 100,
        "layers": [{
            "ty": 4, "ind": 1, "ip": 0, "op": 120,
            "ks": { "o": { "a": 1, "k": [{ "t": 0, "s": 0 }, { "t": 60, "s": 100 }] } },
            "shapes": [{
                "ty": "sh",
                "ks": { "a": 1, "k": [
                    { "t": 0, "s": { "i": [[0, 0]], "o": [[0, 0]], "v": [[0, 0]], "c": false } },
                    { "t": 30, "s": { "i": [[0, 0]], "o": [[0, 0]], "v": [[9, 9]], "c": false } }
                ] }
            }]
        }]
    });

    let once = encode(&decode_value(raw).unwrap()).unwrap();
    let twice = encode(&decode(&once).unwrap()).unwrap();
    assert_eq!(once, twice);

    let canonical: Value = serde_json::from_str(&once).unwrap();
    assert_eq!(canonical["layers"][0]["ks"]["o"]["k"][1]["s"], json!([100]));
    assert!(canonical["layers"][0]["shapes"][0]["ks"]["k"][0]["s"].is_array());
}

#[test]
fn test_document_header() {
    let doc = fixture();
    assert_eq!(doc.v, "5.7.4");
    assert_eq!(doc.fr, 29.97);
    assert_eq!((doc.ip, doc.op), (0.0, 90.0));
    assert_eq!((doc.w, doc.h), (512, 512));
    assert_eq!(doc.nm.as_deref(), Some("Pulse Badge"));
    assert_eq!(doc.ddd, Some(0));
    assert_eq!(doc.markers.as_ref().map(Vec::len), Some(2));
    assert!(doc.extra.contains_key("fonts"));
    assert!(doc.extra.contains_key("meta"));
}

#[test]
fn test_layer_order_is_preserved() {
    let doc = fixture();
    let tags: Vec<String> = doc.layers.iter().map(Layer::tag).collect();
    assert_eq!(tags, ["3", "4", "0", "1", "99"]);

    let names: Vec<Option<&str>> = doc
        .layers
        .iter()
        .map(|layer| layer.as_typed().and_then(|l| l.nm.as_deref()))
        .collect();
    assert_eq!(
        names,
        [
            Some("Controller"),
            Some("Badge"),
            Some("Sparkle"),
            Some("Backdrop"),
            None
        ]
    );
}

#[test]
fn test_assets_keep_unknown_fields_and_typed_layers() {
    let doc = fixture();
    let assets = doc.assets.as_ref().unwrap();
    assert_eq!(assets[0].id, "image_0");
    assert_eq!(assets[0].extra["p"], json!("img_0.png"));
    assert!(assets[0].layers.is_none());

    let precomp_layers = assets[1].layers.as_ref().unwrap();
    assert!(matches!(
        &precomp_layers[0].as_typed().unwrap().content,
        LayerContent::Image { ref_id } if ref_id == "image_0"
    ));
}

#[test]
fn test_animated_and_static_transform_properties() {
    let doc = fixture();
    let controller = doc.find_layer(1).unwrap();

    let rotation = controller.ks.r.as_ref().unwrap();
    assert!(rotation.is_animated());
    assert_eq!(rotation.keyframes()[1].s, Some(360.0));
    assert_eq!(
        rotation.keyframes()[0].i.as_ref().unwrap().x,
        TangentComponent::PerAxis(vec![0.667])
    );

    let Some(Position::Unified(position)) = &controller.ks.p else {
        panic!("controller position should be unified");
    };
    let frames = position.keyframes();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].to, Some(vec![0.0, -3.333, 0.0]));
    assert_eq!(
        frames[0].o.as_ref().unwrap().x,
        TangentComponent::Uniform(0.333)
    );
    assert!(frames.windows(2).all(|pair| pair[0].t <= pair[1].t));

    let opacity = controller.ks.o.as_ref().unwrap();
    assert_eq!(opacity.k, AnimatedValue::Static(0.0));

    let badge = doc.find_layer(2).unwrap();
    assert_eq!(badge.parent, Some(1));
    assert!(matches!(badge.ks.p, Some(Position::Split(_))));
}

#[test]
fn test_shape_tree() {
    let doc = fixture();
    let shapes = doc.layers[1].shapes();
    assert_eq!(shapes.len(), 2);

    let ring = &shapes[0];
    assert_eq!(ring.name(), Some("Ring"));
    let tags: Vec<&str> = ring.children().iter().map(Shape::tag).collect();
    assert_eq!(tags, ["el", "st", "fl", "zz", "tr"]);

    let Shape::Fill(fill) = &ring.children()[2] else {
        panic!("third ring item should be a fill");
    };
    assert!(fill.c.is_animated());
    assert_eq!(
        fill.c.keyframes()[0].s.as_ref().map(|c| c.0.len()),
        Some(4)
    );

    let Shape::Unknown(zigzag) = &ring.children()[3] else {
        panic!("zig zag should pass through");
    };
    assert_eq!(zigzag.raw["mn"], json!("ADBE Vector Filter - Zigzag"));
}

#[test]
fn test_unknown_tags_cover_layers_and_nested_shapes() {
    assert_eq!(fixture().unknown_tags(), ["zz", "99"]);
}

#[test]
fn test_in_place_edit_survives_round_trip() {
    let mut doc = fixture();
    let badge = doc.layers[1].as_typed_mut().unwrap();
    badge.nm = Some("Badge (edited)".to_string());
    badge.op = 75.5;

    let again = decode(&encode(&doc).unwrap()).unwrap();
    let badge = again.find_layer(2).unwrap();
    assert_eq!(badge.nm.as_deref(), Some("Badge (edited)"));
    assert_eq!(badge.op, 75.5);
}

#[test]
fn test_serde_traits_match_codec() {
    let via_serde: Document = serde_json::from_str(PULSE_BADGE).unwrap();
    assert_eq!(via_serde, fixture());

    let text = serde_json::to_string(&via_serde).unwrap();
    assert_eq!(text, encode(&via_serde).unwrap());
}

#[test]
fn test_independent_documents_decode_in_parallel() {
    let inputs: Vec<String> = (0..16)
        .map(|i| PULSE_BADGE.replace("\"op\": 90,\n  \"w\"", &format!("\"op\": {},\n  \"w\"", 90 + i)))
        .collect();

    let decoded: Vec<Document> = inputs
        .par_iter()
        .map(|raw| decode(raw).unwrap())
        .collect();

    for (i, doc) in decoded.iter().enumerate() {
        assert_eq!(doc.op, 90.0 + i as f64);
        assert_eq!(doc.layers.len(), 5);
    }
}
