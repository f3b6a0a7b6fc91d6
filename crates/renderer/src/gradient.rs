//! Color ramps for suitability rasters.
//!
//! The ramp is held as a 256-entry lookup table built from piecewise-linear
//! channel segments, the same layout matplotlib uses for its segmented
//! colormaps. Normalized values in [0, 1] index the table by truncation, so
//! two renderings of the same data always agree byte for byte.

/// Number of entries in a colormap lookup table.
pub const LUT_SIZE: usize = 256;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// `#rrggbb`, alpha ignored.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One breakpoint of a channel ramp: at position `x` the channel is `y`.
type Segment = (f64, f64);

const JET_RED: &[Segment] = &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: &[Segment] = &[
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: &[Segment] = &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

/// A sampled color ramp.
///
/// Channel intensities are kept as floats so that legend swatches can be
/// rounded while raster pixels are truncated.
#[derive(Debug, Clone)]
pub struct Colormap {
    name: &'static str,
    lut: Vec<[f64; 3]>,
}

impl Colormap {
    /// The "jet" ramp: dark blue through cyan, yellow and red to dark red.
    pub fn jet() -> Self {
        Self::from_segments("jet", JET_RED, JET_GREEN, JET_BLUE)
    }

    fn from_segments(
        name: &'static str,
        red: &[Segment],
        green: &[Segment],
        blue: &[Segment],
    ) -> Self {
        let lut = (0..LUT_SIZE)
            .map(|i| {
                let x = i as f64 / (LUT_SIZE - 1) as f64;
                [
                    channel_at(red, x),
                    channel_at(green, x),
                    channel_at(blue, x),
                ]
            })
            .collect();

        Self { name, lut }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Table index for a normalized value. Out-of-range values saturate at
    /// the ends of the ramp.
    fn index(&self, value: f32) -> usize {
        let scaled = value as f64 * LUT_SIZE as f64;
        if scaled.is_nan() || scaled < 0.0 {
            0
        } else {
            (scaled as usize).min(LUT_SIZE - 1)
        }
    }

    /// Opaque raster color for a normalized value.
    pub fn map(&self, value: f32) -> Color {
        let [r, g, b] = self.lut[self.index(value)];
        Color::new(to_byte_truncated(r), to_byte_truncated(g), to_byte_truncated(b), 255)
    }

    /// `n` evenly spaced swatches from the bottom to the top of the ramp, as
    /// `#rrggbb` strings.
    pub fn sample_hex(&self, n: usize) -> Vec<String> {
        match n {
            0 => Vec::new(),
            1 => vec![self.hex_at(0.0)],
            _ => (0..n)
                .map(|i| self.hex_at(i as f32 / (n - 1) as f32))
                .collect(),
        }
    }

    fn hex_at(&self, value: f32) -> String {
        let [r, g, b] = self.lut[self.index(value)];
        Color::new(to_byte_rounded(r), to_byte_rounded(g), to_byte_rounded(b), 255).to_hex()
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::jet()
    }
}

/// Linear interpolation inside the segment containing `x`.
fn channel_at(segments: &[Segment], x: f64) -> f64 {
    let Some(&(first_x, first_y)) = segments.first() else {
        return 0.0;
    };
    if x <= first_x {
        return first_y;
    }

    for pair in segments.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            if x1 <= x0 {
                return y1;
            }
            return y0 + (x - x0) / (x1 - x0) * (y1 - y0);
        }
    }

    segments.last().map(|&(_, y)| y).unwrap_or(0.0)
}

fn to_byte_truncated(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

fn to_byte_rounded(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
