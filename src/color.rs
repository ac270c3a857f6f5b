use palette::{Hsl, IntoColor, Srgb};

use crate::regression::RegressionKind;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct RGB colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// Colours of one fit in a plot: the sample scatter and the fitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColors {
    pub points: [u8; 3],
    pub line: [u8; 3],
}

impl SeriesColors {
    /// One hue per regression kind; the line is a darker shade of it.
    pub fn for_kind(kind: RegressionKind) -> Self {
        let palette = generate_palette(RegressionKind::ALL.len());
        let idx = RegressionKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0);
        let points = palette[idx];
        SeriesColors {
            points,
            line: points.map(|c| c / 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colors() {
        let p = generate_palette(3);
        assert_eq!(p.len(), 3);
        assert_ne!(p[0], p[1]);
        assert_ne!(p[1], p[2]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn kinds_get_distinct_series_colors() {
        let a = SeriesColors::for_kind(RegressionKind::Linear);
        let b = SeriesColors::for_kind(RegressionKind::LogLog);
        assert_ne!(a.points, b.points);
        assert_ne!(a.points, a.line);
    }
}
