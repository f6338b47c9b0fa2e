use crate::chart::{Category, ChartKind, Series, palette};
use crate::error::{CaptureError, ReportError};
use crate::types::Color;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform,
};

/// Fixed-resolution RGBA8 raster of one chart. Always opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if width == 0 || height == 0 || pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    /// Packed RGB, the layout a PDF `/DeviceRGB` image stream expects.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    pub fn to_png(&self) -> Result<Vec<u8>, ReportError> {
        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&self.pixels, self.width, self.height, ColorType::Rgba8.into())
            .map_err(|err| ReportError::Image(format!("png encode failed: {err}")))?;
        Ok(png)
    }
}

const AXIS: (u8, u8, u8) = (148, 163, 184);
const GRID: (u8, u8, u8) = (226, 232, 240);

/// Plots `kind` into an offscreen pixmap of `width` x `height` pixels.
pub fn render_chart(kind: &ChartKind, width: u32, height: u32) -> Result<RasterImage, CaptureError> {
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        CaptureError::Render(format!("invalid raster size {}x{}", width, height))
    })?;
    pixmap.fill(tiny_skia::Color::from_rgba8(255, 255, 255, 255));

    match kind {
        ChartKind::CategoryBreakdown(categories) => draw_pie(&mut pixmap, categories),
        ChartKind::Comparison(categories) => draw_bars(&mut pixmap, categories),
        ChartKind::TimeSeries(series) => draw_lines(&mut pixmap, series),
    }

    let (width, height) = (pixmap.width(), pixmap.height());
    RasterImage::from_rgba(width, height, pixmap.take())
        .ok_or_else(|| CaptureError::Render("pixmap buffer size mismatch".to_string()))
}

struct PlotArea {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl PlotArea {
    fn inset(pixmap: &Pixmap) -> Self {
        let w = pixmap.width() as f32;
        let h = pixmap.height() as f32;
        Self {
            left: w * 0.08,
            top: h * 0.06,
            right: w * 0.96,
            bottom: h * 0.92,
        }
    }

    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

// Value range that always includes zero, never empty.
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, mut hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi - lo <= f64::EPSILON {
        hi = lo + 1.0;
    }
    (lo, hi)
}

fn draw_pie(pixmap: &mut Pixmap, categories: &[Category]) {
    let total: f64 = categories.iter().map(|c| c.value.max(0.0)).sum();
    if total <= 0.0 {
        return;
    }
    let cx = pixmap.width() as f32 / 2.0;
    let cy = pixmap.height() as f32 / 2.0;
    let radius = pixmap.width().min(pixmap.height()) as f32 * 0.42;
    let separator = stroke(radius * 0.01 + 1.0);
    let white = fill_paint(Color::rgb(1.0, 1.0, 1.0));

    let mut start = -std::f64::consts::FRAC_PI_2;
    for (idx, category) in categories.iter().enumerate() {
        if category.value <= 0.0 {
            continue;
        }
        let sweep = category.value / total * std::f64::consts::TAU;
        if let Some(path) = wedge_path(cx, cy, radius, start, sweep) {
            pixmap.fill_path(
                &path,
                &fill_paint(palette(idx)),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
            pixmap.stroke_path(&path, &white, &separator, Transform::identity(), None);
        }
        start += sweep;
    }
}

fn wedge_path(cx: f32, cy: f32, radius: f32, start: f64, sweep: f64) -> Option<Path> {
    // Polyline arc; ~0.03 rad per segment is smooth at report resolution.
    let steps = ((sweep / 0.03).ceil() as usize).max(2);
    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy);
    for step in 0..=steps {
        let angle = start + sweep * step as f64 / steps as f64;
        pb.line_to(
            cx + radius * angle.cos() as f32,
            cy + radius * angle.sin() as f32,
        );
    }
    pb.close();
    pb.finish()
}

fn draw_bars(pixmap: &mut Pixmap, categories: &[Category]) {
    if categories.is_empty() {
        return;
    }
    let area = PlotArea::inset(pixmap);
    let (lo, hi) = value_range(categories.iter().map(|c| c.value));
    draw_grid(pixmap, &area);
    let to_y = |v: f64| area.bottom - ((v - lo) / (hi - lo)) as f32 * area.height();
    let slot = area.width() / categories.len() as f32;
    let bar = slot * 0.6;
    let zero = to_y(0.0);

    for (idx, category) in categories.iter().enumerate() {
        let left = area.left + slot * idx as f32 + (slot - bar) / 2.0;
        let value_y = to_y(category.value);
        let (top, bottom) = if value_y <= zero {
            (value_y, zero)
        } else {
            (zero, value_y)
        };
        if let Some(rect) = Rect::from_ltrb(left, top, left + bar, bottom) {
            pixmap.fill_rect(rect, &fill_paint(palette(idx)), Transform::identity(), None);
        }
    }
    draw_line(pixmap, (area.left, zero), (area.right, zero), AXIS, 2.0);
    draw_line(pixmap, (area.left, area.top), (area.left, area.bottom), AXIS, 2.0);
}

fn draw_lines(pixmap: &mut Pixmap, series: &[Series]) {
    let points = || series.iter().flat_map(|s| s.points.iter().copied());
    if points().next().is_none() {
        return;
    }
    let area = PlotArea::inset(pixmap);
    let (mut x_lo, mut x_hi) = points().fold((f64::MAX, f64::MIN), |(lo, hi), (x, _)| {
        (lo.min(x), hi.max(x))
    });
    if x_hi - x_lo <= f64::EPSILON {
        x_lo -= 1.0;
        x_hi += 1.0;
    }
    let (y_lo, y_hi) = value_range(points().map(|(_, y)| y));
    draw_grid(pixmap, &area);

    let to_px = |(x, y): (f64, f64)| {
        (
            area.left + ((x - x_lo) / (x_hi - x_lo)) as f32 * area.width(),
            area.bottom - ((y - y_lo) / (y_hi - y_lo)) as f32 * area.height(),
        )
    };
    let line_width = (pixmap.width() as f32 / 300.0).max(1.5);
    for s in series {
        let paint = fill_paint(s.color);
        if s.points.len() == 1 {
            let (x, y) = to_px(s.points[0]);
            if let Some(dot) = PathBuilder::from_circle(x, y, line_width * 2.0) {
                pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
            }
            continue;
        }
        let mut pb = PathBuilder::new();
        for (idx, point) in s.points.iter().enumerate() {
            let (x, y) = to_px(*point);
            if idx == 0 {
                pb.move_to(x, y);
            } else {
                pb.line_to(x, y);
            }
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke(line_width), Transform::identity(), None);
        }
    }
    let zero = to_px((x_lo, 0.0)).1;
    draw_line(pixmap, (area.left, zero), (area.right, zero), AXIS, 2.0);
    draw_line(pixmap, (area.left, area.top), (area.left, area.bottom), AXIS, 2.0);
}

fn draw_grid(pixmap: &mut Pixmap, area: &PlotArea) {
    for step in 0..=4 {
        let y = area.top + area.height() * step as f32 / 4.0;
        draw_line(pixmap, (area.left, y), (area.right, y), GRID, 1.0);
    }
}

fn draw_line(pixmap: &mut Pixmap, from: (f32, f32), to: (f32, f32), rgb: (u8, u8, u8), width: f32) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    if let Some(path) = pb.finish() {
        let paint = fill_paint(Color::rgb8(rgb.0, rgb.1, rgb.2));
        pixmap.stroke_path(&path, &paint, &stroke(width), Transform::identity(), None);
    }
}

fn stroke(width: f32) -> Stroke {
    let mut stroke = Stroke::default();
    stroke.width = width.max(0.0);
    stroke.line_cap = LineCap::Round;
    stroke.line_join = LineJoin::Round;
    stroke
}

fn fill_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_sk_color(color));
    paint.anti_alias = true;
    paint
}

fn to_sk_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(values: &[f64]) -> Vec<Category> {
        values
            .iter()
            .enumerate()
            .map(|(idx, value)| Category {
                label: format!("c{idx}"),
                value: *value,
            })
            .collect()
    }

    fn is_white(px: [u8; 4]) -> bool {
        px == [255, 255, 255, 255]
    }

    #[test]
    fn pie_fills_center_with_first_wedge_color() {
        let image = render_chart(
            &ChartKind::CategoryBreakdown(categories(&[3.0, 1.0])),
            200,
            100,
        )
        .expect("render");
        assert_eq!((image.width(), image.height()), (200, 100));
        // First wedge sweeps three quarters clockwise from 12 o'clock.
        let [r, g, b, _] = image.pixel(130, 50).expect("pixel");
        assert_eq!([r, g, b], [59, 130, 246]);
        assert!(is_white(image.pixel(2, 2).expect("corner")));
    }

    #[test]
    fn bars_draw_below_and_above_zero() {
        let image = render_chart(
            &ChartKind::Comparison(categories(&[100.0, -50.0])),
            300,
            200,
        )
        .expect("render");
        let colored = image
            .pixels()
            .chunks_exact(4)
            .filter(|px| px[..3] == [59, 130, 246] || px[..3] == [239, 68, 68])
            .count();
        assert!(colored > 1000);
    }

    #[test]
    fn rendering_is_deterministic() {
        let kind = ChartKind::TimeSeries(vec![Series {
            label: "Balance".to_string(),
            color: palette(2),
            points: vec![(1.0, 300.0), (2.0, 250.0), (3.0, 190.0)],
        }]);
        let a = render_chart(&kind, 240, 160).expect("render");
        let b = render_chart(&kind, 240, 160).expect("render");
        assert_eq!(a, b);
        assert!(a.pixels().chunks_exact(4).any(|px| px[..3] != [255, 255, 255]));
    }

    #[test]
    fn zero_size_is_a_render_error() {
        let err = render_chart(&ChartKind::Comparison(categories(&[1.0])), 0, 10)
            .expect_err("zero width");
        assert!(matches!(err, CaptureError::Render(_)));
    }

    #[test]
    fn png_and_rgb_exports() {
        let image = RasterImage::from_rgba(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 255]).expect("image");
        assert_eq!(image.rgb_bytes(), vec![1, 2, 3, 4, 5, 6]);
        let png = image.to_png().expect("png");
        assert_eq!(&png[..4], b"\x89PNG");
        assert!(RasterImage::from_rgba(2, 2, vec![0; 4]).is_none());
    }
}
