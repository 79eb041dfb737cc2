//! Layered "peaks" figure: palette-colored point cloud over a faint terrain surface.

use serde_json::{json, Value};

use crate::{
    metric::{finite_range, DerivedMetric},
    region::RegionTable,
    render::{colorscale, format_thousands, generate_palette, linspace, title_case, Figure},
};

/// Number of palette stops in the point colorscale.
pub const PALETTE_STOPS: usize = 150;

/// Resolution of the terrain surface along each axis.
pub const SURFACE_RESOLUTION: usize = 75;

/// Gentle undulation under the point cloud.
pub fn surface_height(lon: f64, lat: f64) -> f64 {
    (lon * 4.0).sin() * (lat * 4.0).cos() * 0.03
        + (lat * 6.0).sin() * (lon * 3.0).cos() * 0.02
}

/// Hover text per region: metric value and centroid location.
pub fn hover_labels(table: &RegionTable, metric: &DerivedMetric) -> Vec<String> {
    let name = title_case(metric.selection.source.column_name());
    metric.values.iter().zip(table.lon()).zip(table.lat())
        .map(|((&value, lon), lat)| format!(
            "{name}: {}<br>Location: ({lon:.2}°, {lat:.2}°)",
            format_thousands(value, 0),
        ))
        .collect()
}

/// Translucent surface spanning the centroid bounding box, or `None` for an empty table.
pub fn terrain_surface(lon: &[f64], lat: &[f64], resolution: usize) -> Option<Value> {
    let (lon_min, lon_max) = finite_range(lon)?;
    let (lat_min, lat_max) = finite_range(lat)?;

    let xs = linspace(lon_min, lon_max, resolution);
    let ys = linspace(lat_min, lat_max, resolution);
    // Row i follows ys[i], column j follows xs[j].
    let zs: Vec<Vec<f64>> = ys.iter()
        .map(|&y| xs.iter().map(|&x| surface_height(x, y)).collect())
        .collect();

    Some(json!({
        "type": "surface",
        "x": xs,
        "y": ys,
        "z": zs,
        "colorscale": [[0, "rgb(240,240,240)"], [1, "rgb(200,200,200)"]],
        "showscale": false,
        "opacity": 0.15,
        "hoverinfo": "skip",
    }))
}

/// Assemble the peaks figure. `heights` must already be normalized to [0, 1].
pub fn peaks_figure(
    table: &RegionTable,
    metric: &DerivedMetric,
    heights: &[f64],
    labels: &[String],
    region_name: &str,
) -> Figure {
    let value_title = title_case(metric.selection.source.column_name());
    let axis = |title: &str| json!({
        "title": { "text": title },
        "showgrid": false,
        "showspikes": false,
        "showbackground": true,
        "backgroundcolor": "rgb(250, 250, 250)",
    });

    let layout = json!({
        "scene": {
            "xaxis": axis("Longitude"),
            "yaxis": axis("Latitude"),
            "zaxis": axis(value_title.as_str()),
            "camera": {
                "up": { "x": 0, "y": 0, "z": 1 },
                "center": { "x": 0, "y": 0, "z": -0.1 },
                "eye": { "x": 1.8, "y": 1.8, "z": 1.5 },
            },
            "aspectratio": { "x": 1.5, "y": 1, "z": 0.7 },
        },
        "title": {
            "text": format!("{region_name} Population Peaks - An Artistic Visualization of {value_title}"),
            "y": 0.95,
            "x": 0.5,
            "xanchor": "center",
            "yanchor": "top",
            "font": { "family": "Arial Black", "size": 24, "color": "#1f77b4" },
        },
        "annotations": [{
            "text": format!("{region_name} Population Peaks - {value_title} Visualization"),
            "showarrow": false,
            "x": 0.5,
            "y": 1.0,
            "xref": "paper",
            "yref": "paper",
            "xanchor": "center",
            "yanchor": "bottom",
            "font": { "size": 16 },
        }],
        "showlegend": false,
        "paper_bgcolor": "rgb(240,240,240)",
        "margin": { "l": 0, "r": 0, "t": 30, "b": 0 },
    });

    let mut figure = Figure::new(layout);

    if let Some(surface) = terrain_surface(table.lon(), table.lat(), SURFACE_RESOLUTION) {
        figure.add_trace(surface);
    }

    let scale: Vec<(f64, String)> = colorscale(&generate_palette(PALETTE_STOPS));
    figure.add_trace(json!({
        "type": "scatter3d",
        "x": table.lon(),
        "y": table.lat(),
        "z": heights,
        "mode": "markers",
        "marker": {
            "size": 3.5,
            "color": heights,
            "colorscale": scale,
            "opacity": 0.85,
            "symbol": "circle",
            "line": { "color": "rgba(255, 255, 255, 0.3)", "width": 0.5 },
        },
        "text": labels,
        "hoverinfo": "text",
        "name": "Population Centers",
    }));

    figure
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;
    use crate::metric::{MetricSelection, MetricSource};

    fn fixture() -> (RegionTable, DerivedMetric) {
        let df = DataFrame::new(vec![Column::new("POP100".into(), [1500.0, 20.0])]).unwrap();
        let table = RegionTable::from_centroids(df, vec![-97.7431, -95.3698], vec![30.2672, 29.7604]).unwrap();
        let metric = DerivedMetric {
            values: vec![1500.4, 20.0],
            selection: MetricSelection { population: Some("POP100".into()), area: None, source: MetricSource::Population },
        };
        (table, metric)
    }

    #[test]
    fn labels_show_value_and_location() {
        let (table, metric) = fixture();
        let labels = hover_labels(&table, &metric);
        assert_eq!(labels[0], "Population: 1,500<br>Location: (-97.74°, 30.27°)");
    }

    #[test]
    fn surface_covers_bounding_box() {
        let surface = terrain_surface(&[-100.0, -94.0], &[26.0, 36.0], 75).unwrap();
        let xs = surface["x"].as_array().unwrap();
        let zs = surface["z"].as_array().unwrap();
        assert_eq!(xs.len(), 75);
        assert_eq!(xs[0], -100.0);
        assert_eq!(zs.len(), 75);
        assert_eq!(zs[0].as_array().unwrap().len(), 75);
        assert!(terrain_surface(&[], &[], 75).is_none());
    }

    #[test]
    fn figure_draws_surface_under_points() {
        let (table, metric) = fixture();
        let labels = hover_labels(&table, &metric);
        let figure = peaks_figure(&table, &metric, &[1.0, 0.0], &labels, "Texas");

        assert_eq!(figure.traces().len(), 2);
        assert_eq!(figure.traces()[0]["type"], "surface");
        assert_eq!(figure.traces()[1]["type"], "scatter3d");
        assert_eq!(figure.traces()[1]["marker"]["colorscale"].as_array().unwrap().len(), PALETTE_STOPS);
        assert_eq!(
            figure.layout()["title"]["text"],
            "Texas Population Peaks - An Artistic Visualization of Population"
        );
    }
}
