#![doc = "Census block group density as an interactive 3D point cloud"]
pub mod acquire;
mod common;
pub mod geom;
pub mod io;
pub mod metric;
pub mod pipeline;
pub mod region;
pub mod render;

#[doc(inline)]
pub use acquire::{AcquireError, ShapefileSource};

#[doc(inline)]
pub use metric::{DerivedMetric, MetricSelection, MetricSource, Terrain};

#[doc(inline)]
pub use pipeline::{run, PipelineConfig, PipelineState, PlotlyJs, Variant};

#[doc(inline)]
pub use region::RegionTable;
