use lottie_model::{Document, Layer, Shape};
use std::fmt;

/// Headline numbers for one decoded document.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub version: String,
    pub frame_rate: f64,
    pub frames: (f64, f64),
    pub size: (u32, u32),
    pub layers: usize,
    pub shapes: usize,
    pub passthrough: Vec<String>,
}

impl Summary {
    /// Layer and shape counts include precomposition assets and nested groups.
    pub fn of(doc: &Document) -> Self {
        let mut layers = doc.layers.len();
        let mut shapes = count_shapes_in_layers(&doc.layers);
        for asset_layers in doc.assets.iter().flatten().filter_map(|a| a.layers.as_ref()) {
            layers += asset_layers.len();
            shapes += count_shapes_in_layers(asset_layers);
        }

        Self {
            version: doc.v.clone(),
            frame_rate: doc.fr,
            frames: (doc.ip, doc.op),
            size: (doc.w, doc.h),
            layers,
            shapes,
            passthrough: doc.unknown_tags(),
        }
    }
}

fn count_shapes_in_layers(layers: &[Layer]) -> usize {
    layers.iter().map(|layer| count_shapes(layer.shapes())).sum()
}

fn count_shapes(shapes: &[Shape]) -> usize {
    shapes
        .iter()
        .map(|shape| 1 + count_shapes(shape.children()))
        .sum()
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} {}fps frames {}..{} {}x{}, {} layers, {} shapes",
            self.version,
            self.frame_rate,
            self.frames.0,
            self.frames.1,
            self.size.0,
            self.size.1,
            self.layers,
            self.shapes
        )?;
        if !self.passthrough.is_empty() {
            write!(f, ", passthrough [{}]", self.passthrough.join(", "))?;
        }
        Ok(())
    }
}
