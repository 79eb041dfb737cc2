use geo::{BoundingRect, Centroid, Coord, MultiPolygon, Rect, unary_union};

use crate::geom::Crs;

/// Geometries represents the region boundaries of a layer, in a known CRS.
#[derive(Debug, Clone)]
pub struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    crs: Crs,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons
    pub fn new(shapes: Vec<MultiPolygon<f64>>, crs: Crs) -> Self {
        Self { shapes, crs }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    /// Check if there are no MultiPolygons.
    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Coordinate reference system the shapes are expressed in.
    #[inline] pub fn crs(&self) -> Crs { self.crs }

    pub(crate) fn set_shapes(&mut self, shapes: Vec<MultiPolygon<f64>>, crs: Crs) {
        self.shapes = shapes;
        self.crs = crs;
    }

    /// Compute the bounding rectangle of all MultiPolygons.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|polygon| polygon.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }

    /// Compute the area-weighted centroids of all MultiPolygons, as (lon, lat) columns.
    /// Empty shapes have no centroid and yield NaN.
    pub fn centroids(&self) -> (Vec<f64>, Vec<f64>) {
        self.shapes.iter()
            .map(|polygon| polygon.centroid()
                .map_or((f64::NAN, f64::NAN), |p| (p.x(), p.y())))
            .unzip()
    }

    /// Compute the union of all MultiPolygons into a single MultiPolygon.
    /// This method may be slow for large numbers of complex polygons.
    pub fn union(&self) -> MultiPolygon<f64> {
        unary_union(self.shapes.iter())
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, Area};

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]])
    }

    #[test]
    fn centroids_of_squares() {
        let geoms = Geometries::new(vec![square(0.0, 0.0, 2.0), square(10.0, -4.0, 2.0)], Crs::Wgs84);
        let (lon, lat) = geoms.centroids();
        assert_eq!(lon, vec![1.0, 11.0]);
        assert_eq!(lat, vec![1.0, -3.0]);
    }

    #[test]
    fn empty_shape_centroid_is_nan() {
        let geoms = Geometries::new(vec![MultiPolygon(vec![])], Crs::Wgs84);
        let (lon, lat) = geoms.centroids();
        assert!(lon[0].is_nan() && lat[0].is_nan());
    }

    #[test]
    fn bounds_cover_all_shapes() {
        let geoms = Geometries::new(vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)], Crs::Wgs84);
        let bounds = geoms.bounds().unwrap();
        assert_eq!(bounds.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(bounds.max(), Coord { x: 6.0, y: 6.0 });
    }

    #[test]
    fn union_merges_adjacent_squares() {
        let geoms = Geometries::new(vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)], Crs::Wgs84);
        let union = geoms.union();
        assert_eq!(union.0.len(), 1);
        assert!((union.unsigned_area() - 2.0).abs() < 1e-9);
    }
}
