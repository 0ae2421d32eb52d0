use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

const FALLBACK: RGBColor = RGBColor(128, 128, 128);

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.45);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: method name → RGBColor
// ---------------------------------------------------------------------------

/// Fixed colour per method so a method looks the same in every figure.
#[derive(Debug, Clone)]
pub struct MethodColors {
    mapping: BTreeMap<String, RGBColor>,
}

impl MethodColors {
    /// Assign colours in the order the methods are given.
    pub fn new<S: AsRef<str>>(methods: &[S]) -> Self {
        let palette = generate_palette(methods.len());
        let mapping = methods
            .iter()
            .zip(palette)
            .map(|(m, c)| (m.as_ref().to_string(), c))
            .collect();
        MethodColors { mapping }
    }

    /// Colour of `method`; grey for methods not known up front.
    pub fn color_for(&self, method: &str) -> RGBColor {
        self.mapping.get(method).copied().unwrap_or(FALLBACK)
    }
}
