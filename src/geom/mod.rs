mod geom;
mod polygon;
mod proj;

pub use geom::Geometries;
pub(crate) use polygon::shape_to_multipolygon;
pub use proj::{crs_from_shapefile, Crs};
