use std::fmt::Write as _;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::color::{parse_hex, to_hex};
use crate::engine::geometry::{
    corner_dot_radius, corner_square_radii, dot_shape, Layout, Matrix, PixelRect, FINDER_SIZE,
};
use crate::engine::paint::Paint;
use crate::engine::raster;
use crate::error::Result;
use crate::options::Options;

/*---- Utilities ----*/

/// Returns a string of SVG code depicting the styled QR code described by `options`.
///
/// Shapes, gradients and logo placement match the raster output. The string always uses Unix
/// newlines (\n), regardless of the platform.
///
/// # Arguments
///
/// * `options` - The engine options in effect.
/// * `matrix` - The encoded modules, `None` for an empty payload (only the background is drawn).
/// * `logo` - Raw bytes and natural size of the logo, embedded as a base64 data URI.
///
/// # Example
///
/// ```rust
/// use qrforge::engine::geometry::Matrix;
/// use qrforge::helper::to_svg_string;
/// use qrforge::options::Options;
///
/// let matrix = Matrix::encode("HELLO WORLD").unwrap();
/// let svg = to_svg_string(&Options::default(), Some(&matrix), None).unwrap();
/// assert!(svg.starts_with("<?xml"));
/// ```
pub fn to_svg_string(
    options: &Options,
    matrix: Option<&Matrix>,
    logo: Option<(&[u8], (u32, u32))>,
) -> Result<String> {
    let (width, height) = (options.width, options.height);
    let mut svg = Svg::default();

    let background = match &options.background_options.gradient {
        Some(gradient) => {
            let paint = Paint::gradient(gradient, PixelRect::canvas(options), 0.0)?;
            svg.fill_ref(&paint, "background")
        }
        None => to_hex(parse_hex(&options.background_options.color)?),
    };
    svg.body += &format!("\t<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n", background);

    if let Some(matrix) = matrix {
        let layout = Layout::new(options, matrix.count(), logo.map(|(_, size)| size));
        if layout.dot_size > 0 {
            svg.write_dots(options, matrix, &layout)?;
            svg.write_finders(options, matrix, &layout)?;
            if let (Some((bytes, _)), Some(rect)) = (logo, layout.logo) {
                svg.write_logo(bytes, rect);
            }
        }
    }

    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
               \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{0}\" height=\"{1}\" \
         viewBox=\"0 0 {0} {1}\" stroke=\"none\">\n",
        width, height
    );
    if !svg.defs.is_empty() {
        result += "\t<defs>\n";
        result += &svg.defs;
        result += "\t</defs>\n";
    }
    result += &svg.body;
    result += "</svg>\n";
    Ok(result)
}

/// Gradient definitions and drawn elements, collected separately.
#[derive(Default)]
struct Svg {
    defs: String,
    body: String,
}

impl Svg {
    fn write_dots(&mut self, options: &Options, matrix: &Matrix, layout: &Layout) -> Result<()> {
        let fill = self.fill_ref(&raster::dots_paint(options)?, "dots");
        let size = layout.dot_size as f32;
        let mut d = String::new();
        for y in 0..matrix.count() {
            for x in 0..matrix.count() {
                if !layout.is_dot(matrix, x as i32, y as i32) {
                    continue;
                }
                let neighbors = layout.neighbors(matrix, x as i32, y as i32);
                let shape = dot_shape(options.dots_options.kind, neighbors);
                let (ox, oy) = layout.module_origin(x, y);
                let rect = PixelRect {
                    x: ox,
                    y: oy,
                    width: size,
                    height: size,
                };
                d += &rect_path(rect, shape.map(|r| r.radius(size)));
            }
        }
        if !d.is_empty() {
            self.body += &format!("\t<path d=\"{}\" fill=\"{}\"/>\n", d, fill);
        }
        Ok(())
    }

    fn write_finders(&mut self, options: &Options, matrix: &Matrix, layout: &Layout) -> Result<()> {
        let dot = layout.dot_size as f32;
        let (outer_r, inner_r) = corner_square_radii(options.corners_square_options.kind);
        let center_r = corner_dot_radius(options.corners_dot_options.kind) * dot;
        let side = FINDER_SIZE as f32 * dot;

        for (i, (mx, my, rotation)) in matrix.finder_origins().into_iter().enumerate() {
            let (ox, oy) = layout.module_origin(mx, my);
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

            let ring = Paint::for_shape(&options.corners_square_options, outer, rotation)?;
            let ring_fill = self.fill_ref(&ring, &format!("corner-square-{i}"));
            self.body += &format!(
                "\t<path fill-rule=\"evenodd\" d=\"{}{}\" fill=\"{}\"/>\n",
                rect_path(outer, [outer_r * dot; 4]),
                rect_path(inner, [inner_r * dot; 4]),
                ring_fill
            );

            let middle = Paint::for_shape(&options.corners_dot_options, outer, rotation)?;
            let center_fill = self.fill_ref(&middle, &format!("corner-dot-{i}"));
            self.body += &format!(
                "\t<path d=\"{}\" fill=\"{}\"/>\n",
                rect_path(center, [center_r; 4]),
                center_fill
            );
        }
        Ok(())
    }

    fn write_logo(&mut self, bytes: &[u8], rect: PixelRect) {
        let mime = image::guess_format(bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");
        self.body += &format!(
            "\t<image href=\"data:{};base64,{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>\n",
            mime,
            STANDARD.encode(bytes),
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
    }

    /// Returns a `fill` value for `paint`, adding a gradient definition when needed.
    fn fill_ref(&mut self, paint: &Paint, id: &str) -> String {
        let (stops, element) = match paint {
            Paint::Solid(color) => return to_hex(*color),
            Paint::Linear { start, end, stops } => {
                let _ = writeln!(
                    self.defs,
                    "\t\t<linearGradient id=\"{}-gradient\" gradientUnits=\"userSpaceOnUse\" \
                     x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">",
                    id, start.0, start.1, end.0, end.1
                );
                (stops, "linearGradient")
            }
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let _ = writeln!(
                    self.defs,
                    "\t\t<radialGradient id=\"{}-gradient\" gradientUnits=\"userSpaceOnUse\" \
                     cx=\"{}\" cy=\"{}\" r=\"{}\">",
                    id, center.0, center.1, radius
                );
                (stops, "radialGradient")
            }
        };

        for (offset, color) in stops {
            let _ = writeln!(
                self.defs,
                "\t\t\t<stop offset=\"{}\" stop-color=\"{}\"/>",
                offset,
                to_hex(*color)
            );
        }
        let _ = writeln!(self.defs, "\t\t</{}>", element);
        format!("url(#{}-gradient)", id)
    }
}

/// Closed clockwise path around `rect` with one arc radius per corner, `[tl, tr, br, bl]`.
fn rect_path(rect: PixelRect, radii: [f32; 4]) -> String {
    let PixelRect { x, y, width: w, height: h } = rect;
    let [tl, tr, br, bl] = radii;
    let mut d = format!("M{},{}", x + tl, y);
    d += &format!("H{}", x + w - tr);
    if tr > 0.0 {
        d += &format!("A{0},{0} 0 0 1 {1},{2}", tr, x + w, y + tr);
    }
    d += &format!("V{}", y + h - br);
    if br > 0.0 {
        d += &format!("A{0},{0} 0 0 1 {1},{2}", br, x + w - br, y + h);
    }
    d += &format!("H{}", x + bl);
    if bl > 0.0 {
        d += &format!("A{0},{0} 0 0 1 {1},{2}", bl, x, y + h - bl);
    }
    d += &format!("V{}", y + tl);
    if tl > 0.0 {
        d += &format!("A{0},{0} 0 0 1 {1},{2}", tl, x + tl, y);
    }
    d += "z";
    d
}

/// Renders the module grid as block characters, two per module, with a quiet zone of `border`.
pub fn to_console_string(matrix: &Matrix, border: i32) -> String {
    let size = matrix.count() as i32;
    let mut out = String::new();
    for y in -border..size + border {
        for x in -border..size + border {
            let c: char = if matrix.is_dark(x, y) { '█' } else { ' ' };
            out.push(c);
            out.push(c);
        }
        out.push('\n');
    }
    out
}

/// Prints the given matrix to the console.
pub fn print_qr(matrix: &Matrix) {
    println!("{}", to_console_string(matrix, 4));
}
