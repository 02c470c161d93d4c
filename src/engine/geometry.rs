//! Module matrix, canvas layout and the shape of every drawn element.
//!
//! Everything here is backend-neutral: the raster painter and the SVG writer both turn the same
//! shapes into pixels or paths.

use qrcode::{Color, EcLevel, QrCode};

use crate::config::{CornerStyle, DotStyle};
use crate::error::Result;
use crate::options::Options;

/// Side of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// The encoded module grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    count: usize,
    dark: Vec<bool>,
}

impl Matrix {
    /// Encodes `data` at error correction level Quartile.
    pub fn encode(data: &str) -> Result<Self> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::Q)?;
        let count = code.width();
        let dark = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
        Ok(Self { count, dark })
    }

    /// Width and height of the grid, in modules.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Coordinates outside the grid are light.
    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        let range = 0..self.count as i32;
        range.contains(&x) && range.contains(&y) && self.dark[y as usize * self.count + x as usize]
    }

    /// Whether a module belongs to one of the three finder patterns.
    pub fn in_finder(&self, x: usize, y: usize) -> bool {
        let far = self.count.saturating_sub(FINDER_SIZE);
        (x < FINDER_SIZE && y < FINDER_SIZE)
            || (x >= far && y < FINDER_SIZE)
            || (x < FINDER_SIZE && y >= far)
    }

    /// Top-left module of each finder pattern with the extra gradient rotation the finder gets:
    /// top-left, top-right, bottom-left.
    pub fn finder_origins(&self) -> [(usize, usize, f64); 3] {
        let far = self.count.saturating_sub(FINDER_SIZE);
        let quarter = std::f64::consts::FRAC_PI_2;
        [(0, 0, 0.0), (far, 0, quarter), (0, far, -quarter)]
    }
}

/// An axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    /// The whole canvas of `options`.
    pub fn canvas(options: &Options) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: options.width as f32,
            height: options.height as f32,
        }
    }
}

/// Where the code, its modules and the logo land on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub count: usize,
    /// Side of one module, in whole pixels.
    pub dot_size: u32,
    pub origin_x: u32,
    pub origin_y: u32,
    /// Modules left blank for the logo: `(first_x, first_y, columns, rows)`.
    pub hidden: Option<(usize, usize, usize, usize)>,
    /// Where the logo is drawn.
    pub logo: Option<PixelRect>,
}

impl Layout {
    /// Computes the layout for a grid of `count` modules.
    ///
    /// # Arguments
    ///
    /// * `options` - Canvas size, margin and image placement.
    /// * `count` - Modules per side.
    /// * `logo` - Natural size of the decoded logo, if one is embedded.
    pub fn new(options: &Options, count: usize, logo: Option<(u32, u32)>) -> Self {
        let min_side = options.width.min(options.height);
        let usable = min_side.saturating_sub(2 * options.margin);
        let dot_size = if count == 0 { 0 } else { usable / count as u32 };
        let code_px = dot_size * count as u32;
        let mut layout = Self {
            count,
            dot_size,
            origin_x: options.width.saturating_sub(code_px) / 2,
            origin_y: options.height.saturating_sub(code_px) / 2,
            hidden: None,
            logo: None,
        };

        if let Some((w, h)) = logo {
            layout.place_logo(options, w, h);
        }
        layout
    }

    fn place_logo(&mut self, options: &Options, natural_w: u32, natural_h: u32) {
        if self.dot_size == 0 || natural_w == 0 || natural_h == 0 {
            return;
        }
        let image = &options.image_options;
        let count = self.count;

        // Error correction has to restore every dark module the logo covers.
        let budget = image.image_size.max(0.0) * QUARTILE_RECOVERY * (count * count) as f32;
        // The logo may never reach the finder patterns.
        let max_axis = count.saturating_sub(2 * FINDER_SIZE).max(1);
        let aspect = natural_h as f32 / natural_w as f32;
        let dot = self.dot_size as f32;
        let Some(block) = logo_block(aspect, budget.floor() as usize, max_axis, dot) else {
            return;
        };

        let margin = image.margin as f32;
        let (w, h) = (block.width - 2.0 * margin, block.height - 2.0 * margin);
        if w < 1.0 || h < 1.0 {
            return;
        }

        if image.hide_background_dots {
            self.hidden = Some((
                (count - block.cols) / 2,
                (count - block.rows) / 2,
                block.cols,
                block.rows,
            ));
        }
        let code_px = dot * count as f32;
        let center_x = self.origin_x as f32 + code_px / 2.0;
        let center_y = self.origin_y as f32 + code_px / 2.0;
        self.logo = Some(PixelRect {
            x: (center_x - w / 2.0).round(),
            y: (center_y - h / 2.0).round(),
            width: w.round(),
            height: h.round(),
        });
    }

    pub fn is_hidden(&self, x: usize, y: usize) -> bool {
        match self.hidden {
            Some((hx, hy, cols, rows)) => x >= hx && x < hx + cols && y >= hy && y < hy + rows,
            None => false,
        }
    }

    /// Whether the module at `(x, y)` is drawn as an ordinary dot.
    pub fn is_dot(&self, matrix: &Matrix, x: i32, y: i32) -> bool {
        matrix.is_dark(x, y)
            && !matrix.in_finder(x as usize, y as usize)
            && !self.is_hidden(x as usize, y as usize)
    }

    pub fn neighbors(&self, matrix: &Matrix, x: i32, y: i32) -> Neighbors {
        Neighbors {
            left: self.is_dot(matrix, x - 1, y),
            right: self.is_dot(matrix, x + 1, y),
            top: self.is_dot(matrix, x, y - 1),
            bottom: self.is_dot(matrix, x, y + 1),
        }
    }

    /// Top-left pixel of a module.
    pub fn module_origin(&self, x: usize, y: usize) -> (f32, f32) {
        (
            self.origin_x as f32 + (x as u32 * self.dot_size) as f32,
            self.origin_y as f32 + (y as u32 * self.dot_size) as f32,
        )
    }

    /// The square covered by the whole code.
    pub fn code_rect(&self) -> PixelRect {
        let side = (self.dot_size * self.count as u32) as f32;
        PixelRect {
            x: self.origin_x as f32,
            y: self.origin_y as f32,
            width: side,
            height: side,
        }
    }
}

/// Share of the symbol error correction level Quartile can restore.
const QUARTILE_RECOVERY: f32 = 0.25;

/// Modules cleared for a logo and the pixel box the logo (with its margin) takes.
#[derive(Clone, Copy, Debug, PartialEq)]
struct LogoBlock {
    cols: usize,
    rows: usize,
    width: f32,
    height: f32,
}

/// Sizes the logo block for a logo of `aspect` (height / width).
///
/// Both sides are odd so the block stays centered on the middle module. At most `budget`
/// modules are cleared and neither side exceeds `max_axis`.
fn logo_block(aspect: f32, budget: usize, max_axis: usize, dot: f32) -> Option<LogoBlock> {
    if budget == 0 || !aspect.is_finite() || aspect <= 0.0 {
        return None;
    }

    let widest = (budget as f32 / aspect).sqrt().floor() as usize;
    let mut cols = widest.clamp(1, max_axis);
    if cols % 2 == 0 {
        cols -= 1;
    }
    let mut rows = odd_ceil(cols as f32 * aspect);
    let mut width = cols as f32 * dot;
    let mut height = (width * aspect).round();

    if cols * rows > budget || rows > max_axis {
        rows = if rows > max_axis {
            odd_floor(max_axis)
        } else {
            rows.saturating_sub(2)
        };
        if rows == 0 {
            return None;
        }
        height = rows as f32 * dot;
        cols = odd_ceil(rows as f32 / aspect).min(odd_floor(max_axis));
        width = (height / aspect).round();
    }

    Some(LogoBlock {
        cols,
        rows,
        width,
        height,
    })
}

/// Smallest odd count covering `modules`.
fn odd_ceil(modules: f32) -> usize {
    1 + 2 * ((modules - 1.0) / 2.0).ceil().max(0.0) as usize
}

fn odd_floor(n: usize) -> usize {
    if n % 2 == 0 {
        n.saturating_sub(1).max(1)
    } else {
        n
    }
}

/// Which orthogonal neighbors of a module are drawn dots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Neighbors {
    pub fn count(self) -> usize {
        [self.left, self.right, self.top, self.bottom].iter().filter(|n| **n).count()
    }

    /// Corners with no neighbor on either adjoining side, in `[tl, tr, br, bl]` order.
    fn exposed(self) -> [bool; 4] {
        [
            !self.left && !self.top,
            !self.right && !self.top,
            !self.right && !self.bottom,
            !self.left && !self.bottom,
        ]
    }
}

/// How one corner of a module is cut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rounding {
    #[default]
    Sharp,
    /// Arc with half the module side as radius.
    Half,
    /// Arc with the full module side as radius, centered on the opposite corner.
    Full,
}

impl Rounding {
    /// Radius of the arc for a module of side `size`.
    pub fn radius(self, size: f32) -> f32 {
        match self {
            Rounding::Sharp => 0.0,
            Rounding::Half => size / 2.0,
            Rounding::Full => size,
        }
    }
}

/// Corner cuts of one dot, in `[tl, tr, br, bl]` order.
pub type DotShape = [Rounding; 4];

/// Picks the shape of a dot from its style and which neighbors are drawn.
///
/// Rounded styles round the corners that have no neighbor on either side, so runs of dots
/// merge into smooth strokes. The classy styles only ever cut the top-left and bottom-right.
pub fn dot_shape(style: DotStyle, neighbors: Neighbors) -> DotShape {
    use Rounding::*;

    let exposed = neighbors.exposed();
    let pick = |corner: usize, cut: Rounding| if exposed[corner] { cut } else { Sharp };

    match style {
        DotStyle::Square => [Sharp; 4],
        DotStyle::Dots => [Half; 4],
        DotStyle::Rounded | DotStyle::ExtraRounded => {
            let cut = if style == DotStyle::ExtraRounded && neighbors.count() == 2 {
                Full
            } else {
                Half
            };
            [pick(0, cut), pick(1, cut), pick(2, cut), pick(3, cut)]
        }
        DotStyle::Classy => [pick(0, Half), Sharp, pick(2, Half), Sharp],
        DotStyle::ClassyRounded => [pick(0, Full), Sharp, pick(2, Full), Sharp],
    }
}

/// Outer and inner corner radius of a finder ring, in modules.
pub fn corner_square_radii(style: CornerStyle) -> (f32, f32) {
    match style {
        CornerStyle::Square => (0.0, 0.0),
        CornerStyle::Dot => (3.5, 2.5),
        CornerStyle::ExtraRounded => (2.5, 1.5),
    }
}

/// Corner radius of the 3x3 finder center, in modules.
pub fn corner_dot_radius(style: CornerStyle) -> f32 {
    match style {
        CornerStyle::Square => 0.0,
        CornerStyle::Dot => 1.5,
        CornerStyle::ExtraRounded => 1.0,
    }
}
