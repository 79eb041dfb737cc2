//! Output formats.
//!
//! - `html` - standalone HTML pages embedding a plotly.js figure

pub mod html;
