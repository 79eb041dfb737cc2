// End-to-end runs over a small block group shapefile written on the fly:
// archive install, shapefile loading with NAD83 reprojection, metric
// derivation, normalization and HTML output, all without network access.

use std::{fs, io::Write, path::{Path, PathBuf}, time::Duration};

use shapefile::{
    dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
    Point, Polygon, PolygonRing, Writer,
};
use texas_peaks::{
    MetricSource, PipelineConfig, PipelineState, RegionTable, ShapefileSource, Variant,
};
use zip::{write::SimpleFileOptions, ZipWriter};

const NAD83_PRJ: &str = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["Degree",0.017453292519943295]]"#;

const STUB_PLOTLY_JS: &str = "window.Plotly = { newPlot() {} };";

/// Clockwise unit-ish square, the shapefile convention for outer rings.
fn square(x: f64, y: f64, size: f64) -> Polygon {
    Polygon::new(PolygonRing::Outer(vec![
        Point::new(x, y),
        Point::new(x, y + size),
        Point::new(x + size, y + size),
        Point::new(x + size, y),
        Point::new(x, y),
    ]))
}

/// Three block groups: populations [100, 200, 0], land areas [1, 2, 0.5] km².
fn write_block_groups(shp_path: &Path, with_population: bool) {
    let mut builder = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("GEOID").unwrap(), 12)
        .add_numeric_field(FieldName::try_from("ALAND").unwrap(), 14, 0);
    if with_population {
        builder = builder.add_numeric_field(FieldName::try_from("POP100").unwrap(), 10, 0);
    }

    let rows = [
        ("480019501001", -97.75, 30.25, 100.0, 1_000_000.0),
        ("480019501002", -97.70, 30.25, 200.0, 2_000_000.0),
        ("480019501003", -97.65, 30.30, 0.0, 500_000.0),
    ];

    {
        let mut writer = Writer::from_path(shp_path, builder).unwrap();
        for (geoid, x, y, pop, aland) in rows {
            let mut record = Record::default();
            record.insert("GEOID".to_string(), FieldValue::Character(Some(geoid.to_string())));
            record.insert("ALAND".to_string(), FieldValue::Numeric(Some(aland)));
            if with_population {
                record.insert("POP100".to_string(), FieldValue::Numeric(Some(pop)));
            }
            writer.write_shape_and_record(&square(x, y, 0.04), &record).unwrap();
        }
    }

    fs::write(shp_path.with_extension("prj"), NAD83_PRJ).unwrap();
}

/// Zip every sidecar of `shp_path` into `zip_path`.
fn zip_shapefile(shp_path: &Path, zip_path: &Path) {
    let mut zip = ZipWriter::new(fs::File::create(zip_path).unwrap());
    for ext in ["shp", "shx", "dbf", "prj"] {
        let file = shp_path.with_extension(ext);
        let name = file.file_name().unwrap().to_str().unwrap().to_string();
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&fs::read(&file).unwrap()).unwrap();
    }
    zip.finish().unwrap();
}

fn offline_source(cache_dir: PathBuf) -> ShapefileSource {
    ShapefileSource {
        url: "http://127.0.0.1:9/tl_test_48_bg.zip".to_string(),
        cache_dir,
        shapefile_name: "tl_test_48_bg.shp".to_string(),
        timeout: Duration::from_secs(2),
    }
}

/// Build a cache directory holding the extracted fixture, via the archive path.
fn cached_fixture(root: &Path, with_population: bool) -> ShapefileSource {
    let staging = root.join("staging");
    fs::create_dir_all(&staging).unwrap();
    let shp = staging.join("tl_test_48_bg.shp");
    write_block_groups(&shp, with_population);

    let source = offline_source(root.join("cache"));
    fs::create_dir_all(&source.cache_dir).unwrap();
    let zip_path = source.cache_dir.join("download.zip");
    zip_shapefile(&shp, &zip_path);
    source.install_archive(&zip_path).unwrap();

    // Pages inline plotly.js from the cache; seed it so nothing is fetched.
    fs::write(source.cache_dir.join("plotly-2.35.2.min.js"), STUB_PLOTLY_JS).unwrap();
    source
}

#[test]
fn loads_extracted_shapefile() {
    let dir = tempfile::tempdir().unwrap();
    let source = cached_fixture(dir.path(), true);

    let table = RegionTable::from_shapefile(&source.shapefile_path()).unwrap();
    assert_eq!(table.len(), 3);
    assert!(table.has_column("GEOID"));
    assert!(table.is_numeric("ALAND"));
    assert!(table.is_numeric("POP100"));

    // Centroids land in the middle of each square, give or take the datum shift.
    assert!((table.lon()[0] - -97.73).abs() < 1e-3);
    assert!((table.lat()[0] - 30.27).abs() < 1e-3);
    assert!((table.lon()[2] - -97.63).abs() < 1e-3);
}

#[test]
fn density_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = cached_fixture(dir.path(), true);

    let mut config = PipelineConfig::basic();
    config.source = source;
    config.output = dir.path().join("basic.html");

    // The shapefile is cached, so the unreachable URL is never contacted.
    let output = texas_peaks::run(&config).unwrap();
    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("Texas Outline"));
    assert!(html.contains("GEOID: 480019501001"));
    assert!(html.contains(STUB_PLOTLY_JS));
    assert!(!html.contains("<script src="));

    let table = RegionTable::from_shapefile(&config.source.shapefile_path()).unwrap();
    let state = PipelineState::prepare(&config, table).unwrap();
    assert_eq!(state.metric.selection.source, MetricSource::Density);
    assert_eq!(state.metric.values, vec![100.0, 100.0, 0.0]);
    assert_eq!(state.heights[0], state.heights[1]);
    assert!(state.heights[2] < state.heights[0]);
}

#[test]
fn peaks_without_population_uses_synthetic_values() {
    let dir = tempfile::tempdir().unwrap();
    let source = cached_fixture(dir.path(), false);

    let mut config = PipelineConfig::new(Variant::Peaks);
    config.source = source;
    config.output = dir.path().join("peaks.html");

    let table = RegionTable::from_shapefile(&config.source.shapefile_path()).unwrap();
    let first = PipelineState::prepare(&config, table.clone()).unwrap();
    let second = PipelineState::prepare(&config, table).unwrap();

    assert_eq!(first.metric.selection.source, MetricSource::Synthetic);
    assert_eq!(first.metric.values, second.metric.values);
    assert_eq!(first.heights, second.heights);
    assert!(first.heights.iter().all(|h| (0.0..=1.0).contains(h)));

    first.render(&config).unwrap();
    let html = fs::read_to_string(&config.output).unwrap();
    assert!(html.contains("About This Visualization"));
    assert!(html.contains(r#""type":"surface""#));
    assert!(html.contains(STUB_PLOTLY_JS));
    assert!(!html.contains("<script src="));
}

#[test]
fn missing_cache_and_unreachable_host_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::basic();
    config.source = offline_source(dir.path().join("empty_cache"));
    config.output = dir.path().join("never.html");

    let err = texas_peaks::run(&config).unwrap_err();
    let acquire = err.downcast_ref::<texas_peaks::AcquireError>().expect("acquisition error");
    assert!(acquire.is_network());
    assert!(!config.output.exists());
    assert!(!config.source.shapefile_path().exists());
}
