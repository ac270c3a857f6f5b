use image::{Rgb, RgbImage};

use crate::color::SeriesColors;

// ---------------------------------------------------------------------------
// PNG plot export
// ---------------------------------------------------------------------------

/// Raster size and styling of an exported plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    /// Blank border around the plotting area, in pixels.
    pub margin: u32,
    pub point_radius: u32,
    pub background: [u8; 3],
    pub axis: [u8; 3],
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 40,
            point_radius: 3,
            background: [255, 255, 255],
            axis: [90, 90, 90],
        }
    }
}

/// Data-to-pixel mapping for the plotting area.
struct Frame {
    x_min: f64,
    x_span: f64,
    y_min: f64,
    y_span: f64,
    left: f64,
    bottom: f64,
    plot_w: f64,
    plot_h: f64,
}

impl Frame {
    fn new(xs: impl Iterator<Item = f64>, ys: impl Iterator<Item = f64>, opts: &PlotOptions) -> Self {
        let (x_min, x_span) = extent(xs);
        let (y_min, y_span) = extent(ys);
        let m = opts.margin as f64;
        Frame {
            x_min,
            x_span,
            y_min,
            y_span,
            left: m,
            bottom: opts.height as f64 - m,
            plot_w: (opts.width as f64 - 2.0 * m).max(1.0),
            plot_h: (opts.height as f64 - 2.0 * m).max(1.0),
        }
    }

    fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.left + (x - self.x_min) / self.x_span * self.plot_w,
            self.bottom - (y - self.y_min) / self.y_span * self.plot_h,
        )
    }
}

/// Minimum and span of the finite values; a zero span is widened to 1.
fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    if max - min > 0.0 {
        (min, max - min)
    } else {
        (min - 0.5, 1.0)
    }
}

/// Render a scatter of `(x, y)` with the segment `line` drawn over it.
pub fn render_plot(
    x: &[f64],
    y: &[f64],
    line: [[f64; 2]; 2],
    colors: SeriesColors,
    opts: &PlotOptions,
) -> RgbImage {
    let mut img = RgbImage::from_pixel(opts.width, opts.height, Rgb(opts.background));

    let xs = x.iter().copied().chain(line.iter().map(|p| p[0]));
    let ys = y.iter().copied().chain(line.iter().map(|p| p[1]));
    let frame = Frame::new(xs, ys, opts);

    // Axes along the left and bottom edge of the plotting area.
    let right = frame.left + frame.plot_w;
    let top = frame.bottom - frame.plot_h;
    draw_segment(&mut img, (frame.left, frame.bottom), (right, frame.bottom), opts.axis);
    draw_segment(&mut img, (frame.left, frame.bottom), (frame.left, top), opts.axis);

    for (&xi, &yi) in x.iter().zip(y) {
        let (px, py) = frame.to_pixel(xi, yi);
        draw_disc(&mut img, px, py, opts.point_radius, colors.points);
    }

    let a = frame.to_pixel(line[0][0], line[0][1]);
    let b = frame.to_pixel(line[1][0], line[1][1]);
    draw_segment(&mut img, a, b, colors.line);

    img
}

fn put(img: &mut RgbImage, x: f64, y: f64, color: [u8; 3]) {
    if x < 0.0 || y < 0.0 {
        return;
    }
    let (x, y) = (x.round() as u32, y.round() as u32);
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, Rgb(color));
    }
}

fn draw_segment(img: &mut RgbImage, a: (f64, f64), b: (f64, f64), color: [u8; 3]) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    if !(dx.is_finite() && dy.is_finite()) {
        return;
    }
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        put(img, a.0 + t * dx, a.1 + t * dy, color);
    }
}

fn draw_disc(img: &mut RgbImage, cx: f64, cy: f64, radius: u32, color: [u8; 3]) {
    let r = radius as i64;
    for oy in -r..=r {
        for ox in -r..=r {
            if ox * ox + oy * oy <= r * r {
                put(img, cx + ox as f64, cy + oy as f64, color);
            }
        }
    }
}
