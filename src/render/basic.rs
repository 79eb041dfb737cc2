//! Density point cloud with a viridis colorbar and the state outline.

use anyhow::Result;
use serde_json::{json, Value};

use crate::{
    geom::Geometries,
    metric::DerivedMetric,
    region::RegionTable,
    render::{capitalize, format_thousands, Figure},
};

/// Hover text per region: GEOID, centroid, raw metric and scaled height.
pub fn hover_labels(table: &RegionTable, metric: &DerivedMetric, heights: &[f64]) -> Result<Vec<String>> {
    let geoids = table.text_values("GEOID")?;
    let name = capitalize(metric.selection.value_name());

    Ok((0..table.len())
        .map(|i| {
            let geoid = geoids.as_ref()
                .and_then(|ids| ids[i].as_deref())
                .unwrap_or("N/A");
            format!(
                "GEOID: {geoid}<br>Lon: {:.4}<br>Lat: {:.4}<br>{name}: {}<br>Scaled Z: {:.2}",
                table.lon()[i], table.lat()[i], format_thousands(metric.values[i], 2), heights[i],
            )
        })
        .collect())
}

/// Outline of the union of all regions, drawn at z = 0.
/// Polygons are separated by nulls so plotly breaks the line between them.
pub fn outline_trace(geoms: &Geometries, name: &str) -> Option<Value> {
    let union = geoms.union();
    if union.0.is_empty() { return None }

    let mut xs: Vec<Option<f64>> = Vec::new();
    let mut ys: Vec<Option<f64>> = Vec::new();
    for (i, polygon) in union.0.iter().enumerate() {
        if i > 0 {
            xs.push(None);
            ys.push(None);
        }
        for coord in polygon.exterior().coords() {
            xs.push(Some(coord.x));
            ys.push(Some(coord.y));
        }
    }
    let zs = vec![0.0; xs.len()];

    Some(json!({
        "type": "scatter3d",
        "x": xs,
        "y": ys,
        "z": zs,
        "mode": "lines",
        "line": { "color": "black", "width": 2 },
        "hoverinfo": "none",
        "name": name,
    }))
}

/// Assemble the basic figure. `heights` are the scaled z values; color follows the raw metric.
pub fn basic_figure(
    table: &RegionTable,
    metric: &DerivedMetric,
    heights: &[f64],
    labels: &[String],
    region_name: &str,
) -> Figure {
    let value_name = metric.selection.value_name();

    let layout = json!({
        "title": { "text": format!("3D Visualization of {region_name} Block Group {} (2024 TIGER/Line)", capitalize(value_name)) },
        "scene": {
            "xaxis": { "title": { "text": "Longitude" } },
            "yaxis": { "title": { "text": "Latitude" } },
            "zaxis": { "title": { "text": format!("Scaled {}", capitalize(value_name)) } },
            "aspectratio": { "x": 1, "y": 1, "z": 0.3 },
            "camera": { "eye": { "x": 1.5, "y": -1.5, "z": 1.0 } },
        },
        "margin": { "l": 0, "r": 0, "b": 0, "t": 40 },
    });

    let mut figure = Figure::new(layout);
    figure.add_trace(json!({
        "type": "scatter3d",
        "x": table.lon(),
        "y": table.lat(),
        "z": heights,
        "mode": "markers",
        "marker": {
            "size": 3,
            "color": metric.values,
            "colorscale": "Viridis",
            "colorbar": { "title": { "text": capitalize(&value_name.replace('_', " ")) } },
            "opacity": 0.8,
        },
        "text": labels,
        "hoverinfo": "text",
        "name": "Block Groups",
    }));

    tracing::info!("[render] adding state boundary for context");
    if let Some(outline) = outline_trace(table.geoms(), &format!("{region_name} Outline")) {
        figure.add_trace(outline);
    }

    figure
}
