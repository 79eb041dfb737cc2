mod derive;
mod normalize;

pub use derive::{
    DerivedMetric, MetricSelection, MetricSource,
    SQ_METERS_PER_SQ_KM, SYNTHETIC_SCALE, SYNTHETIC_SEED,
    density, derive_metric, derive_values, first_present, select_columns, synthetic_values,
};
pub use normalize::{DEGENERATE_HEIGHT, Terrain, layered_heights, min_max, min_max_power, terrain_noise, wave};
pub(crate) use normalize::finite_range;
