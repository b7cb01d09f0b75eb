use crate::core_modules::geometry::GeometryResolver;
use crate::core_modules::record::Informant;
use crate::error::ReplayResult;

/// Axis-aligned bounding region derived from an informant tip.
///
/// Derived per frame; `Absent` when the snapshot carries no tip. The padded
/// rectangle is guaranteed non-degenerate even for a single-node tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TipRegion {
    Absent,
    Present {
        /// Lower-left corner (min x, min y) after padding.
        origin: (f64, f64),
        width: f64,
        height: f64,
    },
}

impl TipRegion {
    pub fn is_present(&self) -> bool {
        matches!(self, TipRegion::Present { .. })
    }
}

/// Computes the padded bounding rectangle of a tip's candidate nodes.
#[derive(Debug, Clone, Copy)]
pub struct TipRegionEstimator {
    /// Symmetric padding applied to both axes of the raw bounds.
    padding: f64,
}

impl TipRegionEstimator {
    pub fn new(padding: f64) -> Self {
        Self { padding }
    }

    /// Estimate the tip region for one snapshot's informant state.
    ///
    /// A snapshot with `has_tip == false` yields `Absent` regardless of what
    /// `locs` contains; so does a disclosed tip with no locations.
    pub fn estimate(
        &self,
        informant: &Informant,
        resolver: &GeometryResolver<'_>,
    ) -> ReplayResult<TipRegion> {
        if !informant.has_tip || informant.locs.is_empty() {
            return Ok(TipRegion::Absent);
        }

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &loc in &informant.locs {
            let (x, y) = resolver.resolve(loc)?;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        Ok(TipRegion::Present {
            origin: (min_x - self.padding, min_y - self.padding),
            width: (max_x - min_x) + 2.0 * self.padding,
            height: (max_y - min_y) + 2.0 * self.padding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::record::Node;

    fn tip(locs: Vec<usize>) -> Informant {
        Informant {
            has_tip: true,
            locs,
            ..Informant::default()
        }
    }

    #[test]
    fn single_node_tip_gets_padded_bounds() {
        let nodes = vec![Node { x: 0.5, y: 0.5 }];
        let resolver = GeometryResolver::new(&nodes);
        let region = TipRegionEstimator::new(0.02)
            .estimate(&tip(vec![0]), &resolver)
            .unwrap();
        match region {
            TipRegion::Present {
                origin,
                width,
                height,
            } => {
                assert!((origin.0 - 0.48).abs() < 1e-12);
                assert!((origin.1 - 0.48).abs() < 1e-12);
                assert!((width - 0.04).abs() < 1e-12);
                assert!((height - 0.04).abs() < 1e-12);
            }
            TipRegion::Absent => panic!("expected a present region"),
        }
    }

    #[test]
    fn multi_node_tip_spans_all_locations() {
        let nodes = vec![Node { x: 0.2, y: 0.3 }, Node { x: 0.6, y: 0.9 }];
        let resolver = GeometryResolver::new(&nodes);
        let region = TipRegionEstimator::new(0.05)
            .estimate(&tip(vec![0, 1]), &resolver)
            .unwrap();
        match region {
            TipRegion::Present {
                origin,
                width,
                height,
            } => {
                assert!((origin.0 - 0.15).abs() < 1e-12);
                assert!((origin.1 - 0.25).abs() < 1e-12);
                assert!((width - 0.5).abs() < 1e-12);
                assert!((height - 0.7).abs() < 1e-12);
            }
            TipRegion::Absent => panic!("expected a present region"),
        }
    }

    #[test]
    fn no_tip_wins_over_populated_locations() {
        let nodes = vec![Node { x: 0.5, y: 0.5 }];
        let resolver = GeometryResolver::new(&nodes);
        let informant = Informant {
            has_tip: false,
            locs: vec![0],
            ..Informant::default()
        };
        let region = TipRegionEstimator::new(0.02)
            .estimate(&informant, &resolver)
            .unwrap();
        assert_eq!(region, TipRegion::Absent);
    }

    #[test]
    fn empty_locations_yield_absent() {
        let nodes = vec![Node { x: 0.5, y: 0.5 }];
        let resolver = GeometryResolver::new(&nodes);
        let region = TipRegionEstimator::new(0.02)
            .estimate(&tip(vec![]), &resolver)
            .unwrap();
        assert_eq!(region, TipRegion::Absent);
    }

    #[test]
    fn out_of_range_tip_location_is_fatal() {
        let nodes = vec![Node { x: 0.5, y: 0.5 }];
        let resolver = GeometryResolver::new(&nodes);
        assert!(TipRegionEstimator::new(0.02)
            .estimate(&tip(vec![3]), &resolver)
            .is_err());
    }
}
