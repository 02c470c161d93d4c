//! Solid and gradient fills.

use std::f64::consts::PI;

use image::Rgba;

use crate::color::{lerp, parse_hex};
use crate::engine::geometry::PixelRect;
use crate::error::{Result, StyleError};
use crate::options::{Gradient, GradientKind, ShapeOptions};

/// A resolved fill: colors parsed, gradient geometry fixed to a region.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba<u8>),
    Linear {
        start: (f64, f64),
        end: (f64, f64),
        stops: Vec<(f32, Rgba<u8>)>,
    },
    Radial {
        center: (f64, f64),
        radius: f64,
        stops: Vec<(f32, Rgba<u8>)>,
    },
}

impl Paint {
    /// Resolves the fill of a shape family over `region`.
    ///
    /// `extra_rotation` is added to the gradient's own rotation; finder patterns use it so their
    /// gradient turns with the corner they sit in.
    pub fn for_shape<S>(
        shape: &ShapeOptions<S>,
        region: PixelRect,
        extra_rotation: f64,
    ) -> Result<Self> {
        match (&shape.gradient, &shape.color) {
            (Some(gradient), _) => Self::gradient(gradient, region, extra_rotation),
            (None, Some(color)) => Ok(Paint::Solid(parse_hex(color)?)),
            (None, None) => Ok(Paint::Solid(Rgba([0, 0, 0, 255]))),
        }
    }

    pub fn gradient(gradient: &Gradient, region: PixelRect, extra_rotation: f64) -> Result<Self> {
        if gradient.color_stops.len() < 2 {
            return Err(StyleError::GradientStops(gradient.color_stops.len()));
        }
        let mut stops = gradient
            .color_stops
            .iter()
            .map(|stop| Ok((stop.offset, parse_hex(&stop.color)?)))
            .collect::<Result<Vec<_>>>()?;
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));

        let size = region.width.max(region.height) as f64;
        let (x, y) = (region.x as f64, region.y as f64);

        Ok(match gradient.kind {
            GradientKind::Linear => {
                let (start, end) = linear_endpoints(gradient.rotation + extra_rotation, x, y, size);
                Paint::Linear { start, end, stops }
            }
            GradientKind::Radial => Paint::Radial {
                center: (x + size / 2.0, y + size / 2.0),
                radius: size / 2.0,
                stops,
            },
        })
    }

    /// Color at a canvas point.
    pub fn at(&self, px: f64, py: f64) -> Rgba<u8> {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear { start, end, stops } => {
                let (dx, dy) = (end.0 - start.0, end.1 - start.1);
                let len2 = dx * dx + dy * dy;
                let t = if len2 > 0.0 {
                    ((px - start.0) * dx + (py - start.1) * dy) / len2
                } else {
                    0.0
                };
                sample(stops, t as f32)
            }
            Paint::Radial { center, radius, stops } => {
                let d = ((px - center.0).powi(2) + (py - center.1).powi(2)).sqrt();
                let t = if *radius > 0.0 { d / radius } else { 0.0 };
                sample(stops, t as f32)
            }
        }
    }
}

fn sample(stops: &[(f32, Rgba<u8>)], t: f32) -> Rgba<u8> {
    let (first, last) = (stops[0], stops[stops.len() - 1]);
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.0 {
            let span = b.0 - a.0;
            let local = if span > 0.0 { (t - a.0) / span } else { 1.0 };
            return lerp(a.1, b.1, local);
        }
    }
    last.1
}

/// Start and end of the gradient line across a square region, for a rotation in radians.
///
/// The line runs through the center of the square; its ends sit on the two sides the rotation
/// points at, so a zero rotation goes left to right and a quarter turn goes top to bottom.
pub fn linear_endpoints(rotation: f64, x: f64, y: f64, size: f64) -> ((f64, f64), (f64, f64)) {
    let rotation = rotation % (2.0 * PI);
    let positive = (rotation + 2.0 * PI) % (2.0 * PI);
    let half = size / 2.0;
    let (cx, cy) = (x + half, y + half);

    if positive <= 0.25 * PI || positive > 1.75 * PI {
        let dy = half * rotation.tan();
        ((cx - half, cy - dy), (cx + half, cy + dy))
    } else if positive <= 0.75 * PI {
        let dx = half / rotation.tan();
        ((cx - dx, cy - half), (cx + dx, cy + half))
    } else if positive <= 1.25 * PI {
        let dy = half * rotation.tan();
        ((cx + half, cy + dy), (cx - half, cy - dy))
    } else {
        let dx = half / rotation.tan();
        ((cx + dx, cy + half), (cx - dx, cy - half))
    }
}
