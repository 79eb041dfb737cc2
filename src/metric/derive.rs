use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::region::RegionTable;

/// Square meters in a square kilometer; TIGER stores land area in m².
pub const SQ_METERS_PER_SQ_KM: f64 = 1_000_000.0;

/// Seed for synthetic values when no population column exists.
pub const SYNTHETIC_SEED: u64 = 42;

/// Synthetic values are drawn uniformly from `[0, SYNTHETIC_SCALE)`.
pub const SYNTHETIC_SCALE: f64 = 1000.0;

/// Which derivation produced the metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricSource {
    /// Population per square kilometer.
    Density,
    /// Raw population count.
    Population,
    /// Seeded random values, used when no population column is present.
    Synthetic,
}

impl MetricSource {
    /// Name of the derived column written back into the table.
    pub fn column_name(self) -> &'static str {
        match self {
            MetricSource::Density => "density",
            MetricSource::Population => "population",
            MetricSource::Synthetic => "simulated_height",
        }
    }
}

/// The columns chosen for the run, and the derivation path they imply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricSelection {
    pub population: Option<String>,
    pub area: Option<String>,
    pub source: MetricSource,
}

impl MetricSelection {
    /// Name used to describe the metric: the derived column, or the raw
    /// population column when that is used directly.
    pub fn value_name(&self) -> &str {
        match (self.source, &self.population) {
            (MetricSource::Population, Some(col)) => col,
            (source, _) => source.column_name(),
        }
    }
}

/// One derived value per region, plus the decision record behind it.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedMetric {
    pub values: Vec<f64>,
    pub selection: MetricSelection,
}

/// First candidate (in order) that names an existing column. Exact, case-sensitive match.
pub fn first_present<S: AsRef<str>>(candidates: &[S], columns: &[String]) -> Option<String> {
    candidates.iter()
        .map(AsRef::as_ref)
        .find(|candidate| columns.iter().any(|col| col == candidate))
        .map(str::to_string)
}

/// Pick the population and area columns for a table.
/// An area column only counts if it is numeric with a positive sum.
pub fn select_columns<S: AsRef<str>>(table: &RegionTable, population: &[S], area: &[S]) -> Result<MetricSelection> {
    let columns = table.column_names();
    let population = first_present(population, &columns);

    let mut area_col = None;
    for candidate in area.iter().map(AsRef::as_ref) {
        if !table.has_column(candidate) { continue }
        if !table.is_numeric(candidate) {
            tracing::debug!("[metric] area column {candidate:?} is not numeric, skipping");
            continue
        }
        let sum: f64 = table.float_values(candidate)?.into_iter().flatten().sum();
        if sum > 0.0 {
            area_col = Some(candidate.to_string());
            break
        }
        tracing::debug!("[metric] area column {candidate:?} sums to {sum}, skipping");
    }

    let source = match (&population, &area_col) {
        (Some(_), Some(_)) => MetricSource::Density,
        (Some(_), None) => MetricSource::Population,
        (None, _) => MetricSource::Synthetic,
    };

    Ok(MetricSelection { population, area: area_col, source })
}

/// Population per km² for each region. Missing or non-finite results become 0.
pub fn density(population: &[Option<f64>], area_m2: &[Option<f64>]) -> Vec<f64> {
    population.iter().zip(area_m2)
        .map(|(pop, area)| match (pop, area) {
            (Some(pop), Some(area)) => {
                let d = pop / (area / SQ_METERS_PER_SQ_KM);
                if d.is_finite() { d } else { 0.0 }
            }
            _ => 0.0,
        })
        .collect()
}

/// Reproducible uniform values in `[0, SYNTHETIC_SCALE)`.
pub fn synthetic_values(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random::<f64>() * SYNTHETIC_SCALE).collect()
}

/// Compute the metric for every region according to `selection`.
pub fn derive_values(table: &RegionTable, selection: &MetricSelection, seed: u64) -> Result<Vec<f64>> {
    match (selection.source, &selection.population, &selection.area) {
        (MetricSource::Density, Some(pop), Some(area)) => {
            let pop = table.float_values(pop)?;
            let area = table.float_values(area)?;
            Ok(density(&pop, &area))
        }
        (MetricSource::Population, Some(pop), _) | (MetricSource::Density, Some(pop), None) => {
            Ok(table.float_values(pop)?.into_iter()
                .map(|v| v.filter(|v| v.is_finite()).unwrap_or(0.0))
                .collect())
        }
        _ => Ok(synthetic_values(table.len(), seed)),
    }
}

/// Select columns and derive the metric in one step, logging the path taken.
pub fn derive_metric<S: AsRef<str>>(table: &RegionTable, population: &[S], area: &[S], seed: u64) -> Result<DerivedMetric> {
    let selection = select_columns(table, population, area)?;

    match (&selection.source, &selection.population, &selection.area) {
        (MetricSource::Density, Some(pop), Some(area)) => {
            tracing::info!("[metric] using {pop:?} for population and {area:?} for land area");
            tracing::info!("[metric] calculating density (population / land area)");
        }
        (MetricSource::Population, Some(pop), _) => tracing::warn!(
            "[metric] area column not found or invalid, using raw population {pop:?} for height and color"
        ),
        _ => tracing::warn!(
            "[metric] population column not found, simulating height with seeded random data (seed {seed})"
        ),
    }

    let values = derive_values(table, &selection, seed)?;
    Ok(DerivedMetric { values, selection })
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    const POP: [&str; 3] = ["POP", "POP100", "POP20"];
    const AREA: [&str; 1] = ["ALAND"];

    fn table(columns: Vec<Column>) -> RegionTable {
        let n = columns.first().map_or(0, |c| c.len());
        let df = DataFrame::new(columns).unwrap();
        RegionTable::from_centroids(df, vec![-97.0; n], vec![31.0; n]).unwrap()
    }

    #[test]
    fn first_match_wins() {
        let columns = vec!["POP20".to_string(), "POP100".to_string()];
        assert_eq!(first_present(&POP, &columns).as_deref(), Some("POP100"));
        assert_eq!(first_present(&["pop"], &columns), None);
    }

    #[test]
    fn density_scenario() {
        let t = table(vec![
            Column::new("POP100".into(), [100.0, 200.0, 0.0]),
            Column::new("ALAND".into(), [1_000_000.0, 2_000_000.0, 500_000.0]),
        ]);
        let metric = derive_metric(&t, &POP, &AREA, SYNTHETIC_SEED).unwrap();
        assert_eq!(metric.selection.source, MetricSource::Density);
        assert_eq!(metric.selection.population.as_deref(), Some("POP100"));
        assert_eq!(metric.selection.area.as_deref(), Some("ALAND"));
        assert_eq!(metric.values, vec![100.0, 100.0, 0.0]);
    }

    #[test]
    fn density_zero_or_missing_area_is_zero() {
        let pop = [Some(50.0), Some(50.0), Some(0.0), None, Some(30.0)];
        let area = [Some(0.0), None, Some(0.0), Some(1e6), Some(3e6)];
        assert_eq!(density(&pop, &area), vec![0.0, 0.0, 0.0, 0.0, 10.0]);
    }

    #[test]
    fn density_matches_formula() {
        let pop = [Some(1234.0), Some(7.0)];
        let area = [Some(987_654.0), Some(12_345_678.0)];
        let d = density(&pop, &area);
        assert_eq!(d[0], 1234.0 / (987_654.0 / 1e6));
        assert_eq!(d[1], 7.0 / (12_345_678.0 / 1e6));
    }

    #[test]
    fn population_only_coerces() {
        let t = table(vec![Column::new("POP".into(), [Some("100"), Some("abc"), None, Some("2.5")])]);
        let metric = derive_metric(&t, &POP, &AREA, SYNTHETIC_SEED).unwrap();
        assert_eq!(metric.selection.source, MetricSource::Population);
        assert_eq!(metric.selection.value_name(), "POP");
        assert_eq!(metric.values, vec![100.0, 0.0, 0.0, 2.5]);
    }

    #[test]
    fn non_numeric_area_is_ignored() {
        let t = table(vec![
            Column::new("POP".into(), [10.0, 20.0]),
            Column::new("ALAND".into(), ["1000000", "2000000"]),
        ]);
        let selection = select_columns(&t, &POP, &AREA).unwrap();
        assert_eq!(selection.area, None);
        assert_eq!(selection.source, MetricSource::Population);
    }

    #[test]
    fn zero_sum_area_is_ignored() {
        let t = table(vec![
            Column::new("POP".into(), [10.0, 20.0]),
            Column::new("ALAND".into(), [0.0, 0.0]),
        ]);
        assert_eq!(select_columns(&t, &POP, &AREA).unwrap().source, MetricSource::Population);
    }

    #[test]
    fn area_without_population_is_synthetic() {
        let t = table(vec![Column::new("ALAND".into(), [1e6, 2e6, 3e6])]);
        let metric = derive_metric(&t, &POP, &AREA, SYNTHETIC_SEED).unwrap();
        assert_eq!(metric.selection.source, MetricSource::Synthetic);
        assert_eq!(metric.selection.value_name(), "simulated_height");
        assert_eq!(metric.values.len(), 3);
    }

    #[test]
    fn synthetic_is_reproducible() {
        let a = synthetic_values(100, SYNTHETIC_SEED);
        let b = synthetic_values(100, SYNTHETIC_SEED);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (0.0..SYNTHETIC_SCALE).contains(v)));
        assert_ne!(a, synthetic_values(100, SYNTHETIC_SEED + 1));
    }

    #[test]
    fn column_match_is_case_sensitive() {
        let t = table(vec![Column::new("pop100".into(), [1.0, 2.0])]);
        assert_eq!(select_columns(&t, &POP, &AREA).unwrap().source, MetricSource::Synthetic);
    }
}
