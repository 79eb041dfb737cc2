use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::geom::Geometries;

/// Geographic coordinate reference systems a layer can arrive in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:4326, the target for rendering.
    Wgs84,
    /// EPSG:4269, used by Census TIGER/Line products.
    Nad83,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::Nad83 => 4269,
        }
    }

    /// PROJ.4 string for the geographic CRS (degrees → radians handled in code).
    #[inline]
    fn proj4(self) -> &'static str {
        match self {
            Crs::Wgs84 => "+proj=longlat +datum=WGS84 +no_defs +type=crs",
            Crs::Nad83 => "+proj=longlat +datum=NAD83 +no_defs +type=crs",
        }
    }

    /// Identify the CRS from the WKT text of a `.prj` sidecar.
    pub fn from_prj_wkt(wkt: &str) -> Result<Self> {
        let upper = wkt.to_ascii_uppercase();
        if upper.trim_start().starts_with("PROJCS") {
            bail!("projected coordinate systems are not supported: {}", wkt.trim());
        }
        if ["NORTH_AMERICAN_1983", "NAD83", "NAD_1983"].iter().any(|tag| upper.contains(tag)) {
            Ok(Crs::Nad83)
        } else if ["WGS_1984", "WGS84", "WGS 84"].iter().any(|tag| upper.contains(tag)) {
            Ok(Crs::Wgs84)
        } else {
            bail!("unrecognized geographic coordinate system: {}", wkt.trim())
        }
    }
}

/// Determine the CRS of a shapefile from its `.prj` sidecar.
/// A missing `.prj` is taken to mean WGS84.
pub fn crs_from_shapefile(path: &Path) -> Result<Crs> {
    let prj = path.with_extension("prj");
    if !prj.exists() {
        tracing::debug!("[load] no {} found, assuming EPSG:4326", prj.display());
        return Ok(Crs::Wgs84);
    }
    let wkt = std::fs::read_to_string(&prj)
        .with_context(|| format!("Failed to read projection file: {}", prj.display()))?;
    Crs::from_prj_wkt(&wkt)
        .with_context(|| format!("Unsupported CRS in {}", prj.display()))
}

impl Geometries {
    /// Reproject shapes to WGS84 lon/lat in place. No-op if already there.
    pub fn reproject_to_wgs84(&mut self) -> Result<()> {
        if self.crs() == Crs::Wgs84 { return Ok(()) }

        let from = {
            let proj_string = self.crs().proj4();
            Proj4::from_proj_string(proj_string)
                .map_err(|e| anyhow!("failed to build source PROJ.4 {proj_string}: {e:?}"))?
        };

        let to = {
            let proj_string = Crs::Wgs84.proj4();
            Proj4::from_proj_string(proj_string)
                .map_err(|e| anyhow!("failed to build target PROJ.4 {proj_string}: {e:?}"))?
        };

        // Degrees → radians in, radians → degrees out.
        let projected = self.shapes().iter()
            .map(|shape| shape.try_map_coords(|coord: Coord<f64>| {
                let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
                transform(&from, &to, &mut point)
                    .map_err(|e| anyhow!("CRS transform failed at ({}, {}): {e:?}", coord.x, coord.y))?;
                Ok::<_, anyhow::Error>(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
            }))
            .collect::<Result<Vec<MultiPolygon<f64>>>>()?;

        self.set_shapes(projected, Crs::Wgs84);
        Ok(())
    }
}
