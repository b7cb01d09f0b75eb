// THEORY:
// The `surface` module turns a sparse per-node belief sample (the posterior)
// into a dense regular grid suitable for banded contour rendering. Sample
// sites are the network's node coordinates; sample values are the posterior
// weights aligned with them by index.
//
// The interpolation is natural-neighbor over a Delaunay triangulation of the
// sites. Grid points outside the convex hull of the sites have no defined
// value; they are reported as `None` and the renderer paints them as
// background. The whole computation is a pure function of its inputs: the
// same sites, values and resolution always produce the same grid.

use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation};

use crate::core_modules::geometry::GeometryResolver;
use crate::error::{ReplayError, ReplayResult};

/// One posterior sample pinned to a network node's coordinates.
struct SampleSite {
    position: Point2<f64>,
    weight: f64,
}

impl HasPosition for SampleSite {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// A dense interpolated belief surface on a regular grid over [0, 1] x [0, 1].
///
/// Derived per frame and discarded with it. Values are stored row-major,
/// `None` marking grid points outside the convex hull of the sample sites.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSurface {
    resolution: usize,
    coords: Vec<f64>,
    values: Vec<Option<f64>>,
}

impl RenderedSurface {
    /// Grid points per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// The shared axis coordinates the grid was sampled on.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Interpolated value at grid cell (ix, iy), or `None` outside the hull.
    pub fn value(&self, ix: usize, iy: usize) -> Option<f64> {
        self.values[iy * self.resolution + ix]
    }

    /// Minimum and maximum over the defined values, if any are defined.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut bounds: Option<(f64, f64)> = None;
        for value in self.values.iter().flatten() {
            bounds = Some(match bounds {
                None => (*value, *value),
                Some((lo, hi)) => (lo.min(*value), hi.max(*value)),
            });
        }
        bounds
    }
}

/// Scattered-to-grid interpolator for belief surfaces.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceInterpolator {
    resolution: usize,
}

impl SurfaceInterpolator {
    pub fn new(resolution: usize) -> Self {
        Self { resolution }
    }

    /// Interpolate one snapshot's posterior onto the regular grid.
    ///
    /// `posterior` must be aligned by index with the resolver's node list;
    /// the caller (frame builder) validates that before rendering starts.
    pub fn interpolate(
        &self,
        resolver: &GeometryResolver<'_>,
        posterior: &[f64],
    ) -> ReplayResult<RenderedSurface> {
        if posterior.len() != resolver.len() {
            return Err(ReplayError::schema(format!(
                "posterior has {} entries but the network has {} nodes",
                posterior.len(),
                resolver.len()
            )));
        }

        let mut triangulation: DelaunayTriangulation<SampleSite> = DelaunayTriangulation::new();
        for ((x, y), &weight) in resolver.sites().zip(posterior) {
            triangulation
                .insert(SampleSite {
                    position: Point2::new(x, y),
                    weight,
                })
                .map_err(|err| ReplayError::Interpolation(format!("node ({x}, {y}): {err}")))?;
        }

        let natural_neighbor = triangulation.natural_neighbor();
        let coords: Vec<f64> = (0..self.resolution)
            .map(|i| i as f64 / (self.resolution - 1).max(1) as f64)
            .collect();

        let mut values = Vec::with_capacity(self.resolution * self.resolution);
        for &y in &coords {
            for &x in &coords {
                values.push(
                    natural_neighbor.interpolate(|v| v.data().weight, Point2::new(x, y)),
                );
            }
        }

        Ok(RenderedSurface {
            resolution: self.resolution,
            coords,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::record::Node;

    fn unit_square() -> Vec<Node> {
        vec![
            Node { x: 0.0, y: 0.0 },
            Node { x: 1.0, y: 0.0 },
            Node { x: 0.0, y: 1.0 },
            Node { x: 1.0, y: 1.0 },
        ]
    }

    #[test]
    fn grid_shape_matches_resolution() {
        let nodes = unit_square();
        let resolver = GeometryResolver::new(&nodes);
        let surface = SurfaceInterpolator::new(10)
            .interpolate(&resolver, &[1.0, 0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(surface.resolution(), 10);
        assert_eq!(surface.coords().len(), 10);
        assert_eq!(surface.coords()[0], 0.0);
        assert_eq!(surface.coords()[9], 1.0);
    }

    #[test]
    fn interpolation_is_deterministic() {
        let nodes = unit_square();
        let resolver = GeometryResolver::new(&nodes);
        let posterior = [0.7, 0.1, 0.1, 0.1];
        let interpolator = SurfaceInterpolator::new(25);
        let first = interpolator.interpolate(&resolver, &posterior).unwrap();
        let second = interpolator.interpolate(&resolver, &posterior).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn points_outside_hull_are_undefined() {
        // Triangle covering the lower-left half of the square: the opposite
        // corner of the grid falls outside the hull.
        let nodes = vec![
            Node { x: 0.0, y: 0.0 },
            Node { x: 1.0, y: 0.0 },
            Node { x: 0.0, y: 1.0 },
        ];
        let resolver = GeometryResolver::new(&nodes);
        let surface = SurfaceInterpolator::new(11)
            .interpolate(&resolver, &[1.0, 0.5, 0.0])
            .unwrap();
        assert!(surface.value(10, 10).is_none());
        assert!(surface.value(0, 0).is_some());
    }

    #[test]
    fn constant_posterior_yields_flat_surface() {
        let nodes = unit_square();
        let resolver = GeometryResolver::new(&nodes);
        let surface = SurfaceInterpolator::new(11)
            .interpolate(&resolver, &[0.25; 4])
            .unwrap();
        let (lo, hi) = surface.min_max().unwrap();
        assert!((hi - lo).abs() < 1e-9);
    }

    #[test]
    fn length_mismatch_is_a_schema_violation() {
        let nodes = unit_square();
        let resolver = GeometryResolver::new(&nodes);
        let err = SurfaceInterpolator::new(11)
            .interpolate(&resolver, &[1.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, crate::error::ReplayError::Schema(_)));
    }
}
