//! plotly.js figures built from an enriched region table.

pub mod basic;
mod color;
mod figure;
pub mod peaks;

pub use color::{colorscale, generate_palette, Hsv, Rgb};
pub use figure::{capitalize, format_thousands, title_case, Figure};
pub(crate) use figure::linspace;
