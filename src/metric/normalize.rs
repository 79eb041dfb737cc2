use anyhow::{anyhow, ensure, Result};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Beta, Distribution};

/// Height given to every region when the metric has no spread.
pub const DEGENERATE_HEIGHT: f64 = 0.5;

/// Min and max of the finite values, if any.
pub(crate) fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Linear min-max scaling to [0, 1]. If every value is equal, all heights are
/// `DEGENERATE_HEIGHT`. Non-finite inputs map to 0.
pub fn min_max(values: &[f64]) -> Vec<f64> {
    match finite_range(values) {
        Some((lo, hi)) if hi > lo => values.iter()
            .map(|&v| if v.is_finite() { ((v - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.0 })
            .collect(),
        _ => vec![DEGENERATE_HEIGHT; values.len()],
    }
}

/// Min-max scaling followed by a power curve, then multiplied by `scale`.
/// The degenerate case yields `DEGENERATE_HEIGHT * scale`.
pub fn min_max_power(values: &[f64], exponent: f64, scale: f64) -> Vec<f64> {
    match finite_range(values) {
        Some((lo, hi)) if hi > lo => min_max(values).into_iter()
            .map(|h| h.powf(exponent) * scale)
            .collect(),
        _ => vec![DEGENERATE_HEIGHT * scale; values.len()],
    }
}

/// Parameters of the layered "terrain" heights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Terrain {
    /// Weight of the max-normalized metric in the combined height.
    pub metric_weight: f64,
    /// Shape parameters of the Beta noise distribution.
    pub noise_alpha: f64,
    pub noise_beta: f64,
    /// Beta samples are multiplied by this.
    pub noise_scale: f64,
    pub seed: u64,
}

impl Default for Terrain {
    fn default() -> Self {
        Self { metric_weight: 0.85, noise_alpha: 2.0, noise_beta: 5.0, noise_scale: 0.2, seed: 42 }
    }
}

/// Two interfering sine/cosine waves over lon/lat.
pub fn wave(lon: f64, lat: f64) -> f64 {
    (lon * 3.0).sin() * (lat * 3.0).cos() * 0.15
        + (lat * 5.0).sin() * (lon * 2.0).cos() * 0.1
}

/// Seeded Beta(alpha, beta) samples, scaled.
pub fn terrain_noise(n: usize, terrain: &Terrain) -> Result<Vec<f64>> {
    let beta = Beta::new(terrain.noise_alpha, terrain.noise_beta)
        .map_err(|e| anyhow!("invalid Beta({}, {}): {e}", terrain.noise_alpha, terrain.noise_beta))?;
    let mut rng = StdRng::seed_from_u64(terrain.seed);
    Ok((0..n).map(|_| beta.sample(&mut rng) * terrain.noise_scale).collect())
}

/// Layered heights: `metric / max(metric) * weight + wave(lon, lat) + noise`,
/// re-normalized to [0, 1] over the whole table.
pub fn layered_heights(metric: &[f64], lon: &[f64], lat: &[f64], terrain: &Terrain) -> Result<Vec<f64>> {
    ensure!(
        metric.len() == lon.len() && metric.len() == lat.len(),
        "metric ({}), lon ({}) and lat ({}) lengths differ", metric.len(), lon.len(), lat.len()
    );

    let max = metric.iter().copied().filter(|v| v.is_finite()).fold(f64::NEG_INFINITY, f64::max);
    let noise = terrain_noise(metric.len(), terrain)?;

    let raw: Vec<f64> = metric.iter().zip(lon).zip(lat).zip(noise)
        .map(|(((&m, &x), &y), n)| {
            let base = if max.is_finite() && max != 0.0 && m.is_finite() { m / max * terrain.metric_weight } else { 0.0 };
            base + wave(x, y) + n
        })
        .collect();

    Ok(min_max(&raw))
}
