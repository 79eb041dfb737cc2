use anyhow::{Context, Result, ensure};
use geo::MultiPolygon;
use polars::prelude::*;

use crate::geom::{Crs, Geometries};

/// One row per region: attribute columns, boundary geometry and centroid.
/// Derived columns (metric, height, label) are appended as the pipeline runs.
#[derive(Debug, Clone)]
pub struct RegionTable {
    data: DataFrame,
    geoms: Geometries,
    lon: Vec<f64>,
    lat: Vec<f64>,
}

impl RegionTable {
    /// Build a table from attribute data and boundaries, reprojecting to WGS84
    /// and computing centroids.
    pub fn new(data: DataFrame, mut geoms: Geometries) -> Result<Self> {
        ensure!(
            data.height() == geoms.len() || data.width() == 0,
            "attribute rows ({}) do not match shape count ({})",
            data.height(), geoms.len()
        );

        if geoms.crs() != Crs::Wgs84 {
            tracing::info!("[load] reprojecting from EPSG:{} to EPSG:4326", geoms.crs().epsg());
            geoms.reproject_to_wgs84()?;
        }

        let (lon, lat) = geoms.centroids();
        Ok(Self { data, geoms, lon, lat })
    }

    /// Build a table from attribute data and precomputed centroids, with no boundaries.
    pub fn from_centroids(data: DataFrame, lon: Vec<f64>, lat: Vec<f64>) -> Result<Self> {
        ensure!(lon.len() == lat.len(), "lon/lat length mismatch: {} vs {}", lon.len(), lat.len());
        ensure!(
            data.height() == lon.len() || data.width() == 0,
            "attribute rows ({}) do not match centroid count ({})",
            data.height(), lon.len()
        );
        let geoms = Geometries::new(vec![MultiPolygon(vec![]); lon.len()], Crs::Wgs84);
        Ok(Self { data, geoms, lon, lat })
    }

    /// Number of regions.
    #[inline] pub fn len(&self) -> usize { self.lon.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.lon.is_empty() }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn geoms(&self) -> &Geometries { &self.geoms }

    /// Centroid longitudes, in degrees.
    #[inline] pub fn lon(&self) -> &[f64] { &self.lon }

    /// Centroid latitudes, in degrees.
    #[inline] pub fn lat(&self) -> &[f64] { &self.lat }

    /// Names of all attribute columns, in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.data.get_column_names().into_iter().map(|name| name.to_string()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// True if the column exists with a numeric dtype.
    pub fn is_numeric(&self, name: &str) -> bool {
        self.data.column(name).is_ok_and(|col| matches!(
            col.dtype(),
            DataType::Float64 | DataType::Float32 |
            DataType::Int64 | DataType::Int32 |
            DataType::UInt64 | DataType::UInt32
        ))
    }

    /// Column values coerced to f64. Missing and non-numeric entries become `None`.
    pub fn float_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let col = self.data.column(name)
            .with_context(|| format!("missing column {name:?}"))?
            .cast(&DataType::Float64)
            .with_context(|| format!("column {name:?} cannot be read as numbers"))?;
        Ok(col.f64()?.into_iter().collect())
    }

    /// Column values as strings, or `None` if the column does not exist.
    pub fn text_values(&self, name: &str) -> Result<Option<Vec<Option<String>>>> {
        let Ok(col) = self.data.column(name) else { return Ok(None) };
        let col = col.cast(&DataType::String)
            .with_context(|| format!("column {name:?} cannot be read as text"))?;
        Ok(Some(col.str()?.into_iter().map(|s| s.map(str::to_string)).collect()))
    }

    /// Insert or replace a derived f64 column.
    pub fn set_float_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        ensure!(values.len() == self.len(), "column {name:?} has {} values, expected {}", values.len(), self.len());
        self.data.with_column(Column::new(name.into(), values))?;
        Ok(())
    }

    /// Insert or replace a derived string column.
    pub fn set_text_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        ensure!(values.len() == self.len(), "column {name:?} has {} values, expected {}", values.len(), self.len());
        self.data.with_column(Column::new(name.into(), values))?;
        Ok(())
    }
}
