//! Land polygons fed to the point sampler.
//!
//! Coordinates are planar `(x, y) = (lon, lat)` in degrees, as in GeoJSON.

use geo::algorithm::area::Area;
use geo::{Geometry as GeoGeometry, MultiPolygon, Polygon};

use crate::error::{GeosampleError, Result};

/// A single- or multi-part polygon
#[derive(Debug, Clone, PartialEq)]
pub enum LandPolygon {
    /// Exterior ring with optional holes
    Single(Polygon<f64>),
    Multi(Vec<Polygon<f64>>),
}

impl LandPolygon {
    /// Iterate over the polygon parts
    pub fn parts(&self) -> impl Iterator<Item = &Polygon<f64>> {
        match self {
            LandPolygon::Single(polygon) => std::slice::from_ref(polygon).iter(),
            LandPolygon::Multi(parts) => parts.iter(),
        }
    }

    pub fn part_count(&self) -> usize {
        match self {
            LandPolygon::Single(_) => 1,
            LandPolygon::Multi(parts) => parts.len(),
        }
    }

    /// Planar area in square degrees, holes excluded
    pub fn planar_area(&self) -> f64 {
        self.parts().map(|p| p.unsigned_area()).sum()
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(self.parts().cloned().collect())
    }

    /// Collapse a `MultiPolygon` into the narrowest variant
    pub fn from_multi_polygon(multi: MultiPolygon<f64>) -> Self {
        let mut parts = multi.0;
        if parts.len() == 1 {
            LandPolygon::Single(parts.remove(0))
        } else {
            LandPolygon::Multi(parts)
        }
    }
}

impl TryFrom<GeoGeometry<f64>> for LandPolygon {
    type Error = GeosampleError;

    fn try_from(geometry: GeoGeometry<f64>) -> Result<Self> {
        match geometry {
            GeoGeometry::Polygon(polygon) => Ok(LandPolygon::Single(polygon)),
            GeoGeometry::MultiPolygon(multi) => Ok(LandPolygon::from_multi_polygon(multi)),
            GeoGeometry::Rect(rect) => Ok(LandPolygon::Single(rect.to_polygon())),
            GeoGeometry::Triangle(triangle) => Ok(LandPolygon::Single(triangle.to_polygon())),
            other => Err(GeosampleError::InvalidGeometry {
                reason: format!("expected a polygon or multipolygon, found {}", kind(&other)),
            }),
        }
    }
}

fn kind(geometry: &GeoGeometry<f64>) -> &'static str {
    match geometry {
        GeoGeometry::Point(_) => "Point",
        GeoGeometry::Line(_) => "Line",
        GeoGeometry::LineString(_) => "LineString",
        GeoGeometry::Polygon(_) => "Polygon",
        GeoGeometry::MultiPoint(_) => "MultiPoint",
        GeoGeometry::MultiLineString(_) => "MultiLineString",
        GeoGeometry::MultiPolygon(_) => "MultiPolygon",
        GeoGeometry::GeometryCollection(_) => "GeometryCollection",
        GeoGeometry::Rect(_) => "Rect",
        GeoGeometry::Triangle(_) => "Triangle",
    }
}

/// A polygon with the name it is reported and excluded by
#[derive(Debug, Clone, PartialEq)]
pub struct NamedPolygon {
    pub name: String,
    pub polygon: LandPolygon,
}

impl NamedPolygon {
    pub fn new(name: impl Into<String>, polygon: LandPolygon) -> Self {
        Self { name: name.into(), polygon }
    }
}
