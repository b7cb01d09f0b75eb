/// Viridis-style color ramp for the belief surface.
///
/// Anchor colors sampled from the matplotlib viridis map; values between
/// anchors are linearly interpolated.
#[derive(Clone, Copy)]
struct ColorStop {
    at: f64,
    rgb: [u8; 3],
}

const VIRIDIS_STOPS: [ColorStop; 9] = [
    ColorStop { at: 0.000, rgb: [68, 1, 84] },
    ColorStop { at: 0.125, rgb: [72, 40, 120] },
    ColorStop { at: 0.250, rgb: [62, 74, 137] },
    ColorStop { at: 0.375, rgb: [49, 104, 142] },
    ColorStop { at: 0.500, rgb: [38, 130, 142] },
    ColorStop { at: 0.625, rgb: [31, 158, 137] },
    ColorStop { at: 0.750, rgb: [53, 183, 121] },
    ColorStop { at: 0.875, rgb: [109, 205, 89] },
    ColorStop { at: 1.000, rgb: [253, 231, 37] },
];

fn lerp(a: [u8; 3], b: [u8; 3], t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Sample the ramp at a normalized intensity in [0, 1].
pub fn viridis(t: f64) -> [u8; 3] {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    for window in VIRIDIS_STOPS.windows(2) {
        let (start, end) = (window[0], window[1]);
        if t <= end.at {
            let span = (end.at - start.at).max(f64::EPSILON);
            return lerp(start.rgb, end.rgb, (t - start.at) / span);
        }
    }
    VIRIDIS_STOPS[VIRIDIS_STOPS.len() - 1].rgb
}

/// Sample the ramp after quantizing the intensity into discrete bands,
/// reproducing the stepped look of a filled contour plot.
pub fn viridis_banded(t: f64, bands: usize) -> [u8; 3] {
    if bands <= 1 {
        return viridis(0.5);
    }
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let band = ((t * bands as f64) as usize).min(bands - 1);
    viridis(band as f64 / (bands - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_anchor_colors() {
        assert_eq!(viridis(0.0), [68, 1, 84]);
        assert_eq!(viridis(1.0), [253, 231, 37]);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        assert_eq!(viridis(-1.0), viridis(0.0));
        assert_eq!(viridis(2.0), viridis(1.0));
        assert_eq!(viridis(f64::NAN), viridis(0.0));
    }

    #[test]
    fn banding_quantizes_to_discrete_levels() {
        let bands = 10;
        assert_eq!(viridis_banded(0.0, bands), viridis(0.0));
        assert_eq!(viridis_banded(0.999, bands), viridis(1.0));
        // Values inside one band collapse to the same color.
        assert_eq!(viridis_banded(0.41, bands), viridis_banded(0.49, bands));
    }

    #[test]
    fn single_band_is_constant() {
        assert_eq!(viridis_banded(0.1, 1), viridis_banded(0.9, 1));
    }
}
