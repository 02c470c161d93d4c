//! Anti-aliased rasterization of the styled code.
//!
//! Shapes are described by signed distance functions. A pixel's coverage is how far its center
//! sits inside the shape, clamped to one pixel, which gives a one-pixel soft edge on curves and
//! crisp edges on axis-aligned sides that fall on pixel boundaries.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::color::{blend_over, parse_hex};
use crate::engine::geometry::{
    corner_dot_radius, corner_square_radii, dot_shape, DotShape, Layout, Matrix, PixelRect,
    FINDER_SIZE,
};
use crate::engine::paint::Paint;
use crate::error::Result;
use crate::options::Options;

/// Per-pixel coverage in `[0, 1]`.
pub(crate) struct Mask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Mask {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    pub(crate) fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Adds a shape given by `sd` (negative inside) within `bounds`.
    fn fill(&mut self, bounds: PixelRect, sd: impl Fn(f32, f32) -> f32) {
        let x0 = (bounds.x.floor() - 1.0).max(0.0) as u32;
        let y0 = (bounds.y.floor() - 1.0).max(0.0) as u32;
        let x1 = ((bounds.x + bounds.width).ceil() + 1.0).clamp(0.0, self.width as f32) as u32;
        let y1 = ((bounds.y + bounds.height).ceil() + 1.0).clamp(0.0, self.height as f32) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let coverage = (0.5 - sd(x as f32 + 0.5, y as f32 + 0.5)).clamp(0.0, 1.0);
                let slot = &mut self.data[(y * self.width + x) as usize];
                if coverage > *slot {
                    *slot = coverage;
                }
            }
        }
    }

    fn paint_onto(&self, canvas: &mut RgbaImage, paint: &Paint) {
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            let coverage = self.get(x, y);
            if coverage > 0.0 {
                let color = paint.at(x as f64 + 0.5, y as f64 + 0.5);
                *pixel = blend_over(*pixel, color, coverage);
            }
        }
    }
}

/// Signed distance to a rectangle with its own radius per corner, `[tl, tr, br, bl]`.
fn rounded_rect_sd(px: f32, py: f32, rect: PixelRect, radii: [f32; 4]) -> f32 {
    let (hw, hh) = (rect.width / 2.0, rect.height / 2.0);
    let (dx, dy) = (px - (rect.x + hw), py - (rect.y + hh));
    let r = match (dx > 0.0, dy > 0.0) {
        (false, false) => radii[0],
        (true, false) => radii[1],
        (true, true) => radii[2],
        (false, true) => radii[3],
    };
    let r = r.min(hw).min(hh);
    let qx = dx.abs() - hw + r;
    let qy = dy.abs() - hh + r;
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    qx.max(qy).min(0.0) + outside - r
}

/// Signed distance to one dot of side `size` at `(x, y)`.
fn dot_sd(px: f32, py: f32, x: f32, y: f32, size: f32, shape: DotShape) -> f32 {
    use crate::engine::geometry::Rounding;

    let rect = PixelRect {
        x,
        y,
        width: size,
        height: size,
    };
    let radii = shape.map(|r| match r {
        Rounding::Half => r.radius(size),
        _ => 0.0,
    });
    let mut d = rounded_rect_sd(px, py, rect, radii);

    // A full cut keeps what lies within one side of the opposite corner.
    let opposite = [(x + size, y + size), (x, y + size), (x, y), (x + size, y)];
    for (corner, rounding) in shape.iter().enumerate() {
        if *rounding == Rounding::Full {
            let (ox, oy) = opposite[corner];
            let dist = ((px - ox).powi(2) + (py - oy).powi(2)).sqrt() - size;
            d = d.max(dist);
        }
    }
    d
}

/// Signed distance to a square ring; each rectangle comes with its corner radius.
fn ring_sd(px: f32, py: f32, outer: (PixelRect, f32), inner: (PixelRect, f32)) -> f32 {
    let o = rounded_rect_sd(px, py, outer.0, [outer.1; 4]);
    let i = rounded_rect_sd(px, py, inner.0, [inner.1; 4]);
    o.max(-i)
}

/// Fill of the ordinary dots. Its gradient spans the whole canvas, not just the code.
pub(crate) fn dots_paint(options: &Options) -> Result<Paint> {
    Paint::for_shape(&options.dots_options, PixelRect::canvas(options), 0.0)
}

/// Paints the whole code into a new image.
///
/// # Arguments
///
/// * `options` - The engine options in effect.
/// * `matrix` - Encoded modules, `None` when there is no data to encode.
/// * `logo` - The decoded logo, if any.
pub(crate) fn draw(
    options: &Options,
    matrix: Option<&Matrix>,
    logo: Option<&RgbaImage>,
) -> Result<RgbaImage> {
    let background = parse_hex(&options.background_options.color)?;
    let mut canvas = RgbaImage::from_pixel(options.width, options.height, background);
    if let Some(gradient) = &options.background_options.gradient {
        let paint = Paint::gradient(gradient, PixelRect::canvas(options), 0.0)?;
        for (x, y, pixel) in canvas.enumerate_pixels_mut() {
            *pixel = paint.at(x as f64 + 0.5, y as f64 + 0.5);
        }
    }

    let Some(matrix) = matrix else {
        return Ok(canvas);
    };
    let layout = Layout::new(options, matrix.count(), logo.map(|l| l.dimensions()));
    if layout.dot_size == 0 {
        tracing::warn!(
            "canvas {}x{} is too small for {} modules",
            options.width,
            options.height,
            matrix.count()
        );
        return Ok(canvas);
    }

    draw_dots(&mut canvas, options, matrix, &layout)?;
    draw_finders(&mut canvas, options, matrix, &layout)?;

    if let (Some(logo), Some(rect)) = (logo, layout.logo) {
        let (width, height) = (rect.width as u32, rect.height as u32);
        let scaled = imageops::resize(logo, width, height, FilterType::Lanczos3);
        imageops::overlay(&mut canvas, &scaled, rect.x as i64, rect.y as i64);
    }

    Ok(canvas)
}

fn draw_dots(
    canvas: &mut RgbaImage,
    options: &Options,
    matrix: &Matrix,
    layout: &Layout,
) -> Result<()> {
    let paint = dots_paint(options)?;
    let size = layout.dot_size as f32;
    let mut mask = Mask::new(canvas.width(), canvas.height());

    for y in 0..matrix.count() {
        for x in 0..matrix.count() {
            if !layout.is_dot(matrix, x as i32, y as i32) {
                continue;
            }
            let neighbors = layout.neighbors(matrix, x as i32, y as i32);
            let shape = dot_shape(options.dots_options.kind, neighbors);
            let (ox, oy) = layout.module_origin(x, y);
            let bounds = PixelRect {
                x: ox,
                y: oy,
                width: size,
                height: size,
            };
            mask.fill(bounds, |px, py| dot_sd(px, py, ox, oy, size, shape));
        }
    }

    mask.paint_onto(canvas, &paint);
    Ok(())
}

fn draw_finders(
    canvas: &mut RgbaImage,
    options: &Options,
    matrix: &Matrix,
    layout: &Layout,
) -> Result<()> {
    let dot = layout.dot_size as f32;
    let square_style = options.corners_square_options.kind;
    let dot_style = options.corners_dot_options.kind;
    let (outer_r, inner_r) = corner_square_radii(square_style);
    let center_r = corner_dot_radius(dot_style);

    for (mx, my, rotation) in matrix.finder_origins() {
        let (ox, oy) = layout.module_origin(mx, my);
        let side = FINDER_SIZE as f32 * dot;
        let outer = PixelRect {
            x: ox,
            y: oy,
            width: side,
            height: side,
        };
        let inner = PixelRect {
            x: ox + dot,
            y: oy + dot,
            width: side - 2.0 * dot,
            height: side - 2.0 * dot,
        };
        let center = PixelRect {
            x: ox + 2.0 * dot,
            y: oy + 2.0 * dot,
            width: 3.0 * dot,
            height: 3.0 * dot,
        };

        let mut ring = Mask::new(canvas.width(), canvas.height());
        ring.fill(outer, |px, py| {
            ring_sd(px, py, (outer, outer_r * dot), (inner, inner_r * dot))
        });
        let ring_paint = Paint::for_shape(&options.corners_square_options, outer, rotation)?;
        ring.paint_onto(canvas, &ring_paint);

        let mut middle = Mask::new(canvas.width(), canvas.height());
        middle.fill(center, |px, py| {
            rounded_rect_sd(px, py, center, [center_r * dot; 4])
        });
        let center_paint = Paint::for_shape(&options.corners_dot_options, outer, rotation)?;
        middle.paint_onto(canvas, &center_paint);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CornerStyle, DotStyle};
    use crate::engine::geometry::Rounding;
    use crate::options::{BackgroundOptions, DotsOptions, Gradient};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn solid(style: DotStyle) -> Options {
        Options {
            width: 256,
            height: 256,
            dots_options: DotsOptions {
                kind: style,
                color: Some("#000000".into()),
                gradient: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn circle_distance_is_radial() {
        let rect = PixelRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert!((rounded_rect_sd(5.0, 5.0, rect, [5.0; 4]) + 5.0).abs() < 1e-5);
        assert!(rounded_rect_sd(0.5, 0.5, rect, [5.0; 4]) > 0.0);
        assert!(rounded_rect_sd(0.5, 0.5, rect, [0.0; 4]) < 0.0);
    }

    #[test]
    fn full_cut_clips_the_corner() {
        let shape = [Rounding::Full, Rounding::Sharp, Rounding::Sharp, Rounding::Sharp];
        assert!(dot_sd(0.5, 0.5, 0.0, 0.0, 10.0, shape) > 0.0);
        assert!(dot_sd(9.5, 9.5, 0.0, 0.0, 10.0, shape) < 0.0);
        assert!(dot_sd(9.5, 0.5, 0.0, 0.0, 10.0, shape) < 0.0);
    }

    #[test]
    fn empty_data_paints_background_only() {
        let options = Options {
            background_options: BackgroundOptions {
                color: "#123456".into(),
                gradient: None,
            },
            ..solid(DotStyle::Square)
        };
        let image = draw(&options, None, None).unwrap();
        assert_eq!(image.dimensions(), (256, 256));
        assert!(image.pixels().all(|p| *p == Rgba([0x12, 0x34, 0x56, 255])));
    }

    #[test]
    fn finder_corner_is_painted() {
        let options = solid(DotStyle::Square);
        let matrix = Matrix::encode("https://example.com").unwrap();
        let image = draw(&options, Some(&matrix), None).unwrap();
        let layout = Layout::new(&options, matrix.count(), None);
        let (ox, oy) = layout.module_origin(0, 0);
        let (dot, half) = (layout.dot_size, layout.dot_size / 2);
        let at = |module: u32| {
            let offset = module * dot + half;
            *image.get_pixel(ox as u32 + offset, oy as u32 + offset)
        };

        // outer ring, gap, center
        assert_eq!(at(0), BLACK);
        assert_eq!(at(1), WHITE);
        assert_eq!(at(3), BLACK);
        // canvas corner is background
        assert_eq!(*image.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn dot_finder_leaves_ring_corner_empty() {
        let mut options = solid(DotStyle::Square);
        options.corners_square_options.kind = CornerStyle::Dot;
        let matrix = Matrix::encode("https://example.com").unwrap();
        let image = draw(&options, Some(&matrix), None).unwrap();
        let layout = Layout::new(&options, matrix.count(), None);
        let (ox, oy) = layout.module_origin(0, 0);
        assert_eq!(*image.get_pixel(ox as u32, oy as u32), WHITE);
    }

    #[test]
    fn dots_are_smaller_than_squares() {
        let matrix = Matrix::encode("https://example.com").unwrap();
        let ink = |style| {
            let image = draw(&solid(style), Some(&matrix), None).unwrap();
            image.pixels().filter(|p| p.0[0] < 128).count()
        };
        assert!(ink(DotStyle::Dots) < ink(DotStyle::Square));
        assert!(ink(DotStyle::Rounded) < ink(DotStyle::Square));
    }

    #[test]
    fn logo_is_composited_in_the_center() {
        let options = solid(DotStyle::Square);
        let matrix = Matrix::encode("https://example.com").unwrap();
        let logo = RgbaImage::from_pixel(32, 32, Rgba([0, 0, 255, 255]));
        let image = draw(&options, Some(&matrix), Some(&logo)).unwrap();
        let center = image.get_pixel(128, 128).0;
        assert!(center[2] > 200 && center[0] < 50 && center[1] < 50, "{center:?}");
    }

    #[test]
    fn dots_gradient_spans_the_canvas() {
        let mut options = solid(DotStyle::Square);
        options.margin = 20;
        options.dots_options.gradient = Some(Gradient::linear("#000000", "#ff0000", 0.0));
        let layout = Layout::new(&options, 25, None);
        let paint = dots_paint(&options).unwrap();

        // the leftmost module already sits partway along the gradient
        let left = layout.code_rect().x as f64;
        assert!(paint.at(left, 128.0).0[0] > 20);
        assert_eq!(paint.at(0.0, 128.0).0[0], 0);
        assert_eq!(paint.at(256.0, 128.0).0[0], 255);
    }
}
