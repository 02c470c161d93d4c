//! The user-adjustable render configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blob::ObjectUrl;
use crate::error::Result;

/// Shape used for ordinary (non-finder) modules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotStyle {
    #[default]
    Square,
    Dots,
    Rounded,
    Classy,
    ClassyRounded,
    ExtraRounded,
}

/// Shape used for the three finder patterns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerStyle {
    #[default]
    Square,
    Dot,
    ExtraRounded,
}

/// One snapshot of everything the user can adjust.
///
/// Snapshots are replaced as a whole on every edit. Colors are kept as the text the user
/// entered and are only interpreted by the rendering engine.
///
/// # Example
///
/// ```rust
/// use qrforge::config::{DotStyle, RenderConfiguration};
///
/// let config = RenderConfiguration {
///     payload: "https://example.com".into(),
///     dot_style: DotStyle::Dots,
///     ..Default::default()
/// };
/// assert_eq!(config.gradient_end, "#ff0000");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfiguration {
    pub payload: String,
    pub dot_style: DotStyle,
    pub corner_style: CornerStyle,
    pub gradient_start: String,
    pub gradient_end: String,
    pub gradient_rotation_degrees: f64,
    pub background_color: String,
    /// Handle to the uploaded logo. Uploads go through the form, never through JSON.
    #[serde(skip)]
    pub logo: Option<ObjectUrl>,
}

impl Default for RenderConfiguration {
    fn default() -> Self {
        Self {
            payload: String::new(),
            dot_style: DotStyle::Square,
            corner_style: CornerStyle::Square,
            gradient_start: "#000000".to_string(),
            gradient_end: "#ff0000".to_string(),
            gradient_rotation_degrees: 0.0,
            background_color: "#ffffff".to_string(),
            logo: None,
        }
    }
}

impl RenderConfiguration {
    /// Reads a configuration from a JSON file. Missing fields take their defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a JSON object such as `{"payload": "hi", "dotStyle": "dots"}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form_defaults() {
        let config = RenderConfiguration::default();
        assert_eq!(config.dot_style, DotStyle::Square);
        assert_eq!(config.corner_style, CornerStyle::Square);
        assert_eq!(config.gradient_start, "#000000");
        assert_eq!(config.gradient_end, "#ff0000");
        assert_eq!(config.background_color, "#ffffff");
        assert_eq!(config.gradient_rotation_degrees, 0.0);
        assert!(config.logo.is_none());
    }

    #[test]
    fn parses_kebab_case_styles() {
        let json = r#"{
            "payload": "hi",
            "dotStyle": "classy-rounded",
            "cornerStyle": "extra-rounded",
            "gradientRotationDegrees": 45
        }"#;
        let config = RenderConfiguration::from_json_str(json).unwrap();
        assert_eq!(config.payload, "hi");
        assert_eq!(config.dot_style, DotStyle::ClassyRounded);
        assert_eq!(config.corner_style, CornerStyle::ExtraRounded);
        assert_eq!(config.gradient_rotation_degrees, 45.0);
        assert_eq!(config.background_color, "#ffffff");
    }

    #[test]
    fn unknown_style_is_rejected() {
        assert!(RenderConfiguration::from_json_str(r#"{"dotStyle":"hexagon"}"#).is_err());
    }

    #[test]
    fn colors_are_not_validated() {
        let config =
            RenderConfiguration::from_json_str(r#"{"backgroundColor":"not a color"}"#).unwrap();
        assert_eq!(config.background_color, "not a color");
    }
}
