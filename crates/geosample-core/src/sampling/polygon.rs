use geo::algorithm::area::Area;
use geo::algorithm::contains::Contains;
use geo::algorithm::triangulate_delaunay::DelaunayTriangulationConfig;
use geo::{Coord, MultiPolygon, Point, TriangulateDelaunay};
use rand::Rng;

use crate::error::{GeosampleError, Result};
use crate::models::{GeoPoint, LandPolygon, NamedPolygon};
use crate::sampling::seam::trim_seam;
use crate::sampling::weights::AreaWeights;

/// Settings for [`PolygonSampler`]
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Half-width of the band removed around the antimeridian, in degrees
    pub seam_buffer_deg: f64,

    /// Total draw attempts allowed per requested point
    pub max_draw_factor: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { seam_buffer_deg: 0.01, max_draw_factor: 4 }
    }
}

/// A triangle of the polygon's triangulation, in planar lon/lat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Coord<f64>; 3],
    pub area: f64,
}

impl Triangle {
    pub fn new(vertices: [Coord<f64>; 3]) -> Self {
        let area = geo::Triangle::new(vertices[0], vertices[1], vertices[2]).unsigned_area();
        Self { vertices, area }
    }

    /// Barycentric point for uniform draws `r1`, `r2` in `[0, 1)`:
    /// `(1 - √r1)·A + √r1·(1 - r2)·B + √r1·r2·C`
    pub fn point_at(&self, r1: f64, r2: f64) -> Coord<f64> {
        let sr1 = r1.sqrt();
        let c0 = 1.0 - sr1;
        let c1 = sr1 * (1.0 - r2);
        let c2 = sr1 * r2;
        let [a, b, c] = self.vertices;

        Coord { x: c0 * a.x + c1 * b.x + c2 * c.x, y: c0 * a.y + c1 * b.y + c2 * c.y }
    }
}

/// A polygon triangulated and weighted, ready for repeated draws
#[derive(Debug, Clone)]
pub struct PreparedPolygon {
    name: String,
    shape: MultiPolygon<f64>,
    triangles: Vec<Triangle>,
    weights: AreaWeights,
    max_draw_factor: usize,
}

impl PreparedPolygon {
    /// Trim the seam, triangulate every part, and weight triangles by area
    pub fn prepare(name: &str, polygon: &LandPolygon, config: &SamplerConfig) -> Result<Self> {
        let failure = |reason: String| GeosampleError::TriangulationFailure {
            polygon: name.to_string(),
            reason,
        };

        let parts: Vec<_> = polygon
            .parts()
            .flat_map(|part| trim_seam(part, config.seam_buffer_deg).0)
            .collect();
        let shape = MultiPolygon::new(parts);

        let mut triangles = Vec::new();
        for part in &shape.0 {
            let pieces = part
                .constrained_triangulation(DelaunayTriangulationConfig::default())
                .map_err(|e| failure(e.to_string()))?;
            triangles.extend(pieces.into_iter().map(|t| Triangle::new(t.to_array())));
        }

        let areas: Vec<f64> = triangles.iter().map(|t| t.area).collect();
        let weights = AreaWeights::new(&areas)
            .ok_or_else(|| failure("triangulation has no area".to_string()))?;

        tracing::debug!(
            "Prepared polygon {} with {} parts and {} triangles",
            name,
            shape.0.len(),
            triangles.len()
        );

        Ok(Self {
            name: name.to_string(),
            shape,
            triangles,
            weights,
            max_draw_factor: config.max_draw_factor.max(1),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Planar area covered by the triangulation
    pub fn area(&self) -> f64 {
        self.weights.total()
    }

    /// One candidate point, before the containment check
    fn candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Coord<f64> {
        let triangle = &self.triangles[self.weights.select(rng.gen::<f64>())];
        let r1 = rng.gen::<f64>();
        let r2 = rng.gen::<f64>();
        triangle.point_at(r1, r2)
    }

    /// Up to `n` points inside the polygon.
    ///
    /// Candidates that land outside the polygon are redrawn, with at most
    /// `n * max_draw_factor` attempts in total.
    pub fn draws<'a, R: Rng + ?Sized>(&'a self, n: usize, rng: &'a mut R) -> Draws<'a, R> {
        Draws {
            polygon: self,
            rng,
            remaining: n,
            attempts_left: n.saturating_mul(self.max_draw_factor),
        }
    }
}

/// Finite, non-restartable stream of points from a [`PreparedPolygon`]
pub struct Draws<'a, R: Rng + ?Sized> {
    polygon: &'a PreparedPolygon,
    rng: &'a mut R,
    remaining: usize,
    attempts_left: usize,
}

impl<R: Rng + ?Sized> Iterator for Draws<'_, R> {
    type Item = GeoPoint;

    fn next(&mut self) -> Option<GeoPoint> {
        while self.remaining > 0 && self.attempts_left > 0 {
            self.attempts_left -= 1;

            let candidate = self.polygon.candidate(&mut *self.rng);
            if !self.polygon.shape.contains(&Point::from(candidate)) {
                continue;
            }

            if let Ok(point) = GeoPoint::from_lon_lat(candidate.x, candidate.y) {
                self.remaining -= 1;
                return Some(point);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Draws area-uniform random points inside land polygons
#[derive(Debug, Clone, Default)]
pub struct PolygonSampler {
    config: SamplerConfig,
}

impl PolygonSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample up to `n` points inside `polygon`
    pub fn sample<R: Rng + ?Sized>(
        &self,
        polygon: &NamedPolygon,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<GeoPoint>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let prepared = PreparedPolygon::prepare(&polygon.name, &polygon.polygon, &self.config)?;
        let points: Vec<GeoPoint> = prepared.draws(n, rng).collect();

        if points.len() < n {
            tracing::debug!(
                "Polygon {} yielded {} of {} requested points",
                polygon.name,
                points.len(),
                n
            );
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_square() -> LandPolygon {
        LandPolygon::Single(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ])
    }

    #[test]
    fn test_barycentric_corners() {
        let triangle = Triangle::new([
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 2.0, y: 0.0 },
            Coord { x: 0.0, y: 2.0 },
        ]);
        assert_eq!(triangle.area, 2.0);
        assert_eq!(triangle.point_at(0.0, 0.5), Coord { x: 0.0, y: 0.0 });
        assert_eq!(triangle.point_at(1.0, 0.0), Coord { x: 2.0, y: 0.0 });
        assert_eq!(triangle.point_at(1.0, 1.0), Coord { x: 0.0, y: 2.0 });

        // sqrt(0.25) = 0.5: halfway between A and the midpoint of BC
        let p = triangle.point_at(0.25, 0.5);
        assert!((p.x - 0.5).abs() < 1e-12 && (p.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_square_triangulation_covers_area() {
        let prepared =
            PreparedPolygon::prepare("square", &unit_square(), &SamplerConfig::default()).unwrap();
        assert!(prepared.triangles().len() >= 2);
        assert!((prepared.area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_concave_triangulation_excludes_notch() {
        let u_shape = LandPolygon::Single(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 2.0, y: 1.0),
            (x: 2.0, y: 0.0),
            (x: 3.0, y: 0.0),
            (x: 3.0, y: 3.0),
            (x: 0.0, y: 3.0),
            (x: 0.0, y: 0.0),
        ]);
        let prepared =
            PreparedPolygon::prepare("u", &u_shape, &SamplerConfig::default()).unwrap();

        assert!((prepared.area() - 8.0).abs() < 1e-9);
        let notch = Point::new(1.5, 0.5);
        assert!(prepared.triangles().iter().all(|t| {
            let [a, b, c] = t.vertices;
            !geo::Triangle::new(a, b, c).contains(&notch)
        }));
    }

    #[test]
    fn test_points_stay_inside() {
        let sampler = PolygonSampler::default();
        let mut rng = StdRng::seed_from_u64(5);
        let square = NamedPolygon::new("square", unit_square());

        let points = sampler.sample(&square, 500, &mut rng).unwrap();
        assert_eq!(points.len(), 500);
        assert!(points
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.lon()) && (0.0..=1.0).contains(&p.lat())));
    }

    #[test]
    fn test_zero_points_skips_triangulation() {
        let degenerate = NamedPolygon::new(
            "line",
            LandPolygon::Single(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 0.0)]),
        );
        let mut rng = StdRng::seed_from_u64(0);
        assert!(PolygonSampler::default().sample(&degenerate, 0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_degenerate_polygon_fails() {
        let degenerate = NamedPolygon::new(
            "line",
            LandPolygon::Single(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 0.0)]),
        );
        let mut rng = StdRng::seed_from_u64(0);
        let result = PolygonSampler::default().sample(&degenerate, 10, &mut rng);
        assert!(matches!(result, Err(GeosampleError::TriangulationFailure { .. })));
    }

    #[test]
    fn test_draws_are_bounded() {
        let prepared =
            PreparedPolygon::prepare("square", &unit_square(), &SamplerConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut draws = prepared.draws(3, &mut rng);
        assert_eq!(draws.size_hint(), (0, Some(3)));
        assert_eq!(draws.by_ref().count(), 3);
        assert!(draws.next().is_none());
    }
}
