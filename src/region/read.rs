use std::{collections::{BTreeSet, HashMap}, path::Path};

use anyhow::{Context, Result};
use polars::prelude::*;
use shapefile::{dbase::{FieldValue, Record}, Reader, Shape};

use crate::{geom::{crs_from_shapefile, shape_to_multipolygon, Geometries}, region::RegionTable};

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<(Shape, Record)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result
            .with_context(|| format!("Error reading shape+record from {}", path.display()))?;
        items.push((shape, record));
    }
    Ok(items)
}

/// Numeric value of a dBASE field, if it holds one.
fn numeric_value(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Numeric(n) => *n,
        FieldValue::Float(f) => f.map(f64::from),
        FieldValue::Integer(i) => Some(f64::from(*i)),
        FieldValue::Double(d) => Some(*d),
        _ => None,
    }
}

fn is_numeric_field(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Numeric(_) | FieldValue::Float(_) | FieldValue::Integer(_) | FieldValue::Double(_))
}

/// Text value of a dBASE field, trimmed of the fixed-width padding.
fn text_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(s) => s.as_ref().map(|s| s.trim().to_string()),
        FieldValue::Logical(b) => b.map(|b| b.to_string()),
        other => numeric_value(other).map(|n| n.to_string()),
    }
}

/// Convert dBASE records to a DataFrame. Fields whose values are all numeric
/// become Float64 columns; everything else is kept as String.
fn records_to_dataframe(records: &[Record]) -> Result<DataFrame> {
    let names: BTreeSet<String> = records.iter()
        .flat_map(|record| HashMap::<String, FieldValue>::from(record.clone()).into_keys())
        .collect();

    let columns = names.into_iter()
        .map(|name| {
            let numeric = records.iter()
                .filter_map(|record| record.get(&name))
                .all(is_numeric_field);

            if numeric {
                let values: Vec<Option<f64>> = records.iter()
                    .map(|record| record.get(&name).and_then(numeric_value))
                    .collect();
                Column::new(name.as_str().into(), values)
            } else {
                let values: Vec<Option<String>> = records.iter()
                    .map(|record| record.get(&name).and_then(text_value))
                    .collect();
                Column::new(name.as_str().into(), values)
            }
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

impl RegionTable {
    /// Loads region boundaries and attributes from a given .shp file path,
    /// reprojecting to WGS84 lon/lat if the `.prj` says otherwise.
    pub fn from_shapefile(path: &Path) -> Result<Self> {
        let crs = crs_from_shapefile(path)?;
        tracing::info!("[load] {} (EPSG:{})", path.display(), crs.epsg());

        let (shapes, records): (Vec<_>, Vec<_>) = read_shapefile(path)?.into_iter()
            .filter(|(shape, _)| {
                let keep = !matches!(shape, Shape::NullShape);
                if !keep { tracing::warn!("[load] skipping region with null geometry") }
                keep
            })
            .unzip();

        let shapes = shapes.into_iter()
            .map(shape_to_multipolygon)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Error converting shapes to multipolygons in shapefile: {}", path.display()))?;

        let data = records_to_dataframe(&records)?;
        tracing::debug!("[load] available columns: {:?}", data.get_column_names());

        let table = Self::new(data, Geometries::new(shapes, crs))?;
        tracing::info!("[load] loaded {} regions", table.len());
        Ok(table)
    }
}
