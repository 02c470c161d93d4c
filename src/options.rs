//! Option object understood by the rendering engine.
//!
//! The shape follows the one used by browser QR styling engines: a full [`Options`] value is
//! given at construction, later changes arrive as an [`OptionsUpdate`] where every field is
//! optional and only the present ones overwrite the current options.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{CornerStyle, DotStyle};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient, `0.0..=1.0`.
    pub offset: f32,
    pub color: String,
}

/// A color gradient. `rotation` is in radians and only affects linear gradients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub rotation: f64,
    pub color_stops: Vec<ColorStop>,
}

impl Gradient {
    /// Two-stop linear gradient from `start` (offset 0) to `end` (offset 1).
    pub fn linear(start: impl Into<String>, end: impl Into<String>, rotation: f64) -> Self {
        Self {
            kind: GradientKind::Linear,
            rotation,
            color_stops: vec![
                ColorStop { offset: 0.0, color: start.into() },
                ColorStop { offset: 1.0, color: end.into() },
            ],
        }
    }
}

/// Fill and shape for one family of modules. A gradient takes precedence over `color`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeOptions<S> {
    #[serde(rename = "type")]
    pub kind: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

impl<S: Default> Default for ShapeOptions<S> {
    fn default() -> Self {
        Self {
            kind: S::default(),
            color: Some("#000000".to_string()),
            gradient: None,
        }
    }
}

pub type DotsOptions = ShapeOptions<DotStyle>;
pub type CornersSquareOptions = ShapeOptions<CornerStyle>;
pub type CornersDotOptions = ShapeOptions<CornerStyle>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundOptions {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self { color: "#ffffff".to_string(), gradient: None }
    }
}

/// How an external image may be fetched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossOrigin {
    Anonymous,
    UseCredentials,
}

/// Placement of the embedded logo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    /// Skip the dots that would sit behind the logo.
    pub hide_background_dots: bool,
    /// Maximum logo size as a fraction of the code's side.
    pub image_size: f32,
    /// Clear space around the logo, in pixels.
    pub margin: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<CrossOrigin>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            hide_background_dots: true,
            image_size: 0.4,
            margin: 0,
            cross_origin: None,
        }
    }
}

/// Full engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub width: u32,
    pub height: u32,
    /// Quiet space between the canvas edge and the code, in pixels.
    pub margin: u32,
    pub data: String,
    /// Reference to the logo, resolved through the engine's resource resolver.
    pub image: Option<String>,
    pub dots_options: DotsOptions,
    pub corners_square_options: CornersSquareOptions,
    pub corners_dot_options: CornersDotOptions,
    pub background_options: BackgroundOptions,
    pub image_options: ImageOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            margin: 0,
            data: String::new(),
            image: None,
            dots_options: DotsOptions::default(),
            corners_square_options: CornersSquareOptions::default(),
            corners_dot_options: CornersDotOptions::default(),
            background_options: BackgroundOptions::default(),
            image_options: ImageOptions::default(),
        }
    }
}

/// A partial change to [`Options`]. `None` leaves the current value untouched.
///
/// `image` is two-level: `Some(None)` removes the logo.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dots_options: Option<DotsOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corners_square_options: Option<CornersSquareOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corners_dot_options: Option<CornersDotOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_options: Option<BackgroundOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_options: Option<ImageOptions>,
}

impl Options {
    /// Overwrites every field present in `update`.
    pub fn apply(&mut self, update: OptionsUpdate) {
        let OptionsUpdate {
            width,
            height,
            margin,
            data,
            image,
            dots_options,
            corners_square_options,
            corners_dot_options,
            background_options,
            image_options,
        } = update;

        if let Some(v) = width {
            self.width = v;
        }
        if let Some(v) = height {
            self.height = v;
        }
        if let Some(v) = margin {
            self.margin = v;
        }
        if let Some(v) = data {
            self.data = v;
        }
        if let Some(v) = image {
            self.image = v;
        }
        if let Some(v) = dots_options {
            self.dots_options = v;
        }
        if let Some(v) = corners_square_options {
            self.corners_square_options = v;
        }
        if let Some(v) = corners_dot_options {
            self.corners_dot_options = v;
        }
        if let Some(v) = background_options {
            self.background_options = v;
        }
        if let Some(v) = image_options {
            self.image_options = v;
        }
    }
}

/// Export format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    #[default]
    Png,
    Jpeg,
    Svg,
}

impl Extension {
    pub fn as_str(self) -> &'static str {
        match self {
            Extension::Png => "png",
            Extension::Jpeg => "jpeg",
            Extension::Svg => "svg",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
