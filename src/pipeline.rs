//! Acquire → load → derive → normalize → render, for one variant.

use std::{path::{Path, PathBuf}, time::Duration};

use anyhow::{Context, Result};

use crate::{
    acquire::{fetch_cached, ShapefileSource},
    io::html::{write_described_html, write_plot_html, Description, PlotlySource},
    metric::{derive_metric, layered_heights, min_max_power, DerivedMetric, Terrain},
    region::RegionTable,
    render::{basic, peaks, Figure},
};

pub const TIGER_BG_URL: &str = "https://www2.census.gov/geo/tiger/TIGER2024/BG/tl_2024_48_bg.zip";
pub const CACHE_DIR: &str = "texas_bg_shapefile_2024";
pub const SHAPEFILE_NAME: &str = "tl_2024_48_bg.shp";
pub const REGION_NAME: &str = "Texas";

/// Power curve and scale applied to basic heights.
pub const BASIC_HEIGHT_EXPONENT: f64 = 1.5;
pub const BASIC_HEIGHT_SCALE: f64 = 100.0;

/// Derived columns added to the region table.
pub const HEIGHT_COLUMN: &str = "z_height";
pub const LABEL_COLUMN: &str = "hover_info";

/// How the written page gets hold of plotly.js.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlotlyJs {
    /// Fetch the bundle at this URL once into the cache directory, then inline it.
    Cached(String),
    /// Inline a local copy.
    File(PathBuf),
    /// Link the bundle at this URL instead of inlining it.
    Cdn(String),
}

impl Default for PlotlyJs {
    fn default() -> Self { Self::Cached(PlotlySource::DEFAULT_CDN.to_string()) }
}

impl PlotlyJs {
    /// Turn the setting into page content, downloading into `cache_dir` if needed.
    pub fn resolve(&self, cache_dir: &Path, timeout: Duration) -> Result<PlotlySource> {
        match self {
            PlotlyJs::Cached(url) => {
                let file_name = url.rsplit('/').next().filter(|name| name.ends_with(".js")).unwrap_or("plotly.min.js");
                let path = fetch_cached(url, &cache_dir.join(file_name), timeout)
                    .with_context(|| format!("Could not fetch plotly.js from {url}"))?;
                PlotlySource::from_file(&path)
            }
            PlotlyJs::File(path) => PlotlySource::from_file(path),
            PlotlyJs::Cdn(url) => Ok(PlotlySource::Cdn(url.clone())),
        }
    }
}

/// The two renderings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Density point cloud, viridis colorbar, state outline.
    Basic,
    /// Layered wave + noise heights, custom palette, terrain surface, described page.
    Peaks,
}

impl Variant {
    pub fn default_output(self) -> &'static str {
        match self {
            Variant::Basic => "texas_block_group_density_3d.html",
            Variant::Peaks => "texas_population_peaks.html",
        }
    }

    /// Population column candidates, in preference order.
    pub fn population_candidates(self) -> &'static [&'static str] {
        match self {
            Variant::Basic => &["POP", "POP100", "POP20"],
            Variant::Peaks => &["POP100", "POP20", "POP"],
        }
    }
}

/// Everything a run needs. Defaults reproduce the fixed Texas 2024 setup.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub variant: Variant,
    pub source: ShapefileSource,
    pub output: PathBuf,
    pub region_name: String,
    pub population_candidates: Vec<String>,
    pub area_candidates: Vec<String>,
    /// Seed for the synthetic metric fallback.
    pub seed: u64,
    pub terrain: Terrain,
    pub plotly: PlotlyJs,
}

impl PipelineConfig {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            source: ShapefileSource {
                url: TIGER_BG_URL.to_string(),
                cache_dir: PathBuf::from(CACHE_DIR),
                shapefile_name: SHAPEFILE_NAME.to_string(),
                timeout: Duration::from_secs(300),
            },
            output: PathBuf::from(variant.default_output()),
            region_name: REGION_NAME.to_string(),
            population_candidates: variant.population_candidates().iter().map(|s| s.to_string()).collect(),
            area_candidates: vec!["ALAND".to_string()],
            seed: crate::metric::SYNTHETIC_SEED,
            terrain: Terrain::default(),
            plotly: PlotlyJs::default(),
        }
    }

    pub fn basic() -> Self { Self::new(Variant::Basic) }

    pub fn peaks() -> Self { Self::new(Variant::Peaks) }
}

/// The enriched table and everything derived from it, handed from stage to stage.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub table: RegionTable,
    pub metric: DerivedMetric,
    pub heights: Vec<f64>,
    pub labels: Vec<String>,
}

impl PipelineState {
    /// Derive the metric, heights and labels, writing them back into the table.
    pub fn prepare(config: &PipelineConfig, mut table: RegionTable) -> Result<Self> {
        let metric = derive_metric(&table, &config.population_candidates, &config.area_candidates, config.seed)?;

        let heights = match config.variant {
            Variant::Basic => min_max_power(&metric.values, BASIC_HEIGHT_EXPONENT, BASIC_HEIGHT_SCALE),
            Variant::Peaks => {
                tracing::info!("[metric] layering waves and terrain noise (seed {})", config.terrain.seed);
                layered_heights(&metric.values, table.lon(), table.lat(), &config.terrain)?
            }
        };

        let labels = match config.variant {
            Variant::Basic => basic::hover_labels(&table, &metric, &heights)?,
            Variant::Peaks => peaks::hover_labels(&table, &metric),
        };

        table.set_float_column(metric.selection.source.column_name(), metric.values.clone())?;
        table.set_float_column(HEIGHT_COLUMN, heights.clone())?;
        table.set_text_column(LABEL_COLUMN, labels.clone())?;

        Ok(Self { table, metric, heights, labels })
    }

    pub fn figure(&self, config: &PipelineConfig) -> Figure {
        match config.variant {
            Variant::Basic => basic::basic_figure(&self.table, &self.metric, &self.heights, &self.labels, &config.region_name),
            Variant::Peaks => peaks::peaks_figure(&self.table, &self.metric, &self.heights, &self.labels, &config.region_name),
        }
    }

    /// Write the HTML document for the configured variant.
    pub fn render(&self, config: &PipelineConfig) -> Result<()> {
        tracing::info!("[render] creating 3D plot");
        let figure = self.figure(config);
        let plotly = config.plotly.resolve(&config.source.cache_dir, config.source.timeout)?;

        tracing::info!("[render] saving interactive plot to {}", config.output.display());
        match config.variant {
            Variant::Basic => {
                let title = format!("3D Visualization of {} Block Groups", config.region_name);
                write_plot_html(&config.output, &title, &figure, &plotly)?;
            }
            Variant::Peaks => {
                let title = format!("{} Population Peaks - Interactive 3D Visualization", config.region_name);
                let description = Description::peaks(&config.region_name, self.metric.selection.source.column_name());
                write_described_html(&config.output, &title, &description, &figure, &plotly)?;
            }
        }
        Ok(())
    }
}

/// Run the whole pipeline. Returns the path of the written HTML file.
pub fn run(config: &PipelineConfig) -> Result<PathBuf> {
    let shp_path = config.source.acquire()
        .with_context(|| format!("Could not acquire {}", config.source.shapefile_name))?;

    let table = RegionTable::from_shapefile(&shp_path)
        .with_context(|| format!("Error loading shapefile {}", shp_path.display()))?;

    let state = PipelineState::prepare(config, table)?;
    state.render(config)?;

    tracing::info!("[done] open {} in a web browser", config.output.display());
    Ok(config.output.clone())
}
