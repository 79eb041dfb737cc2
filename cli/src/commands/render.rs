use std::time::Duration;

use anyhow::Result;
use texas_peaks::{io::html::PlotlySource, PipelineConfig, PlotlyJs, Variant};

use crate::cli::RenderArgs;

/// Apply command-line overrides on top of the variant's defaults.
pub fn config(variant: Variant, args: &RenderArgs) -> PipelineConfig {
    let mut config = PipelineConfig::new(variant);

    if let Some(output) = &args.output { config.output = output.clone() }
    if let Some(dir) = &args.cache_dir { config.source.cache_dir = dir.clone() }
    if let Some(url) = &args.url { config.source.url = url.clone() }
    if let Some(secs) = args.timeout { config.source.timeout = Duration::from_secs(secs) }
    if let Some(path) = &args.plotly_js { config.plotly = PlotlyJs::File(path.clone()) }
    if args.plotly_cdn { config.plotly = PlotlyJs::Cdn(PlotlySource::DEFAULT_CDN.to_string()) }

    config
}

pub fn run(variant: Variant, args: &RenderArgs) -> Result<()> {
    let config = config(variant, args);
    tracing::debug!("[cli] {variant:?} run, cache {}, output {}", config.source.cache_dir.display(), config.output.display());
    let output = texas_peaks::run(&config)?;
    println!("Visualization saved as {}", output.display());
    Ok(())
}
