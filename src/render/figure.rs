use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// A plotly.js figure: traces plus layout, serialized as `{"data": [...], "layout": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    data: Vec<Value>,
    layout: Value,
}

impl Figure {
    pub fn new(layout: Value) -> Self {
        Self { data: Vec::new(), layout }
    }

    /// Traces are drawn in insertion order.
    pub fn add_trace(&mut self, trace: Value) {
        self.data.push(trace);
    }

    pub fn traces(&self) -> &[Value] { &self.data }

    pub fn layout(&self) -> &Value { &self.layout }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("[render] failed to serialize figure")
    }
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| if i == n - 1 { stop } else { start + step * i as f64 }).collect()
        }
    }
}

/// Fixed-point formatting with comma thousands separators, e.g. `1,234.50`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() { return value.to_string() }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 { grouped.push(',') }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// First character upper-cased, the rest lower-cased ("POP100" → "Pop100").
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Underscores to spaces, then each word capitalized ("simulated_height" → "Simulated Height").
pub fn title_case(s: &str) -> String {
    s.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}
