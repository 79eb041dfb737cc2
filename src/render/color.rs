//! Color utilities for the 3D figures.

use std::fmt;

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// HSV color: all components in [0.0, 1.0], hue as a fraction of a turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    /// Sector-based HSV → RGB conversion. Channels are truncated, not rounded.
    pub fn to_rgb(self) -> Rgb {
        let Hsv { h, s, v } = self;
        let (r, g, b) = if s == 0.0 {
            (v, v, v)
        } else {
            let sector = (h * 6.0).floor();
            let f = h * 6.0 - sector;
            let p = v * (1.0 - s);
            let q = v * (1.0 - s * f);
            let t = v * (1.0 - s * (1.0 - f));
            match (sector as i64).rem_euclid(6) {
                0 => (v, t, p),
                1 => (q, v, p),
                2 => (p, v, t),
                3 => (p, q, v),
                4 => (t, p, v),
                _ => (v, p, q),
            }
        };
        // `as u8` saturates, so out-of-range channels clamp to [0, 255].
        let channel = |c: f64| (c * 255.0) as u8;
        Rgb { r: channel(r), g: channel(g), b: channel(b) }
    }
}

/// Two-segment diverging palette of `n` stops.
///
/// The first half ramps cool (blue toward purple): hue 0.70 → 0.55, saturation
/// 0.7 → 1.0 and value 0.5 → 1.0. The second half ramps warm at full saturation
/// and value, with hue 0.55 → 0.20.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    let half = n as f64 / 2.0;
    (0..n)
        .map(|i| {
            let i = i as f64;
            let hsv = if i < half {
                let t = i / half;
                Hsv { h: 0.7 - t * 0.15, s: 0.7 + t * 0.3, v: 0.5 + t * 0.5 }
            } else {
                let t = (i - half) / half;
                Hsv { h: 0.55 - t * 0.35, s: 1.0, v: 1.0 }
            };
            hsv.to_rgb()
        })
        .collect()
}

/// Spread colors evenly over [0, 1] as a plotly colorscale.
pub fn colorscale(colors: &[Rgb]) -> Vec<(f64, String)> {
    match colors {
        [] => vec![],
        [only] => vec![(0.0, only.to_string()), (1.0, only.to_string())],
        _ => {
            let last = (colors.len() - 1) as f64;
            colors.iter().enumerate()
                .map(|(i, c)| (i as f64 / last, c.to_string()))
                .collect()
        }
    }
}
