use std::path::PathBuf;

/// Render Census block groups as an interactive 3D point cloud
#[derive(clap::Parser, Debug)]
#[command(name = "texas-peaks", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Density point cloud with a viridis colorbar and state outline
    Basic(RenderArgs),

    /// Layered "population peaks" with terrain surface and description panel
    Peaks(RenderArgs),
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Output HTML file, defaults to the variant's fixed file name
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Directory the shapefile archive is cached in
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,

    /// Zipped shapefile to download when the cache is empty
    #[arg(long)]
    pub url: Option<String>,

    /// Download timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Inline this copy of plotly.min.js instead of the cached download
    #[arg(long, value_hint = clap::ValueHint::FilePath, conflicts_with = "plotly_cdn")]
    pub plotly_js: Option<PathBuf>,

    /// Link plotly.js from its CDN; the page then needs network access to display
    #[arg(long)]
    pub plotly_cdn: bool,
}
