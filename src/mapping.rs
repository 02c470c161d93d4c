//! Translation from a [`RenderConfiguration`] snapshot to engine options.
//!
//! Both directions share the same field mapping. The canvas size and the image placement
//! options are fixed and only go out with the full options used at construction.

use crate::config::RenderConfiguration;
use crate::options::{
    BackgroundOptions, CornersDotOptions, CornersSquareOptions, CrossOrigin, DotsOptions,
    Gradient, ImageOptions, Options, OptionsUpdate,
};

/// Side of the rendered canvas, in pixels.
pub const CANVAS_SIZE: u32 = 256;

/// Clear space kept around an embedded logo, in pixels.
pub const LOGO_MARGIN: u32 = 10;

/// The styled parts of the options, shared by the full and the partial shape.
struct Styled {
    data: String,
    image: Option<String>,
    dots: DotsOptions,
    corners_square: CornersSquareOptions,
    corners_dot: CornersDotOptions,
    background: BackgroundOptions,
}

fn styled(config: &RenderConfiguration) -> Styled {
    let gradient = Gradient::linear(
        config.gradient_start.clone(),
        config.gradient_end.clone(),
        config.gradient_rotation_degrees.to_radians(),
    );
    let corners = CornersSquareOptions {
        kind: config.corner_style,
        color: None,
        gradient: Some(gradient.clone()),
    };

    Styled {
        data: config.payload.clone(),
        image: config.logo.as_ref().map(|url| url.as_str().to_string()),
        dots: DotsOptions {
            kind: config.dot_style,
            color: None,
            gradient: Some(gradient),
        },
        corners_dot: corners.clone(),
        corners_square: corners,
        background: BackgroundOptions {
            color: config.background_color.clone(),
            gradient: None,
        },
    }
}

/// Full options used to construct the engine.
///
/// # Example
///
/// ```rust
/// use qrforge::config::RenderConfiguration;
/// use qrforge::mapping::full_options;
///
/// let options = full_options(&RenderConfiguration::default());
/// assert_eq!(options.width, 256);
/// assert_eq!(options.image_options.margin, 10);
/// ```
pub fn full_options(config: &RenderConfiguration) -> Options {
    let s = styled(config);
    Options {
        width: CANVAS_SIZE,
        height: CANVAS_SIZE,
        data: s.data,
        image: s.image,
        dots_options: s.dots,
        corners_square_options: s.corners_square,
        corners_dot_options: s.corners_dot,
        background_options: s.background,
        image_options: ImageOptions {
            margin: LOGO_MARGIN,
            cross_origin: Some(CrossOrigin::Anonymous),
            ..ImageOptions::default()
        },
        ..Options::default()
    }
}

/// Partial options sent on every change after construction.
///
/// Every styled field is present, so nothing from an earlier snapshot can survive an update.
/// A missing logo is sent as an explicit removal.
pub fn update_options(config: &RenderConfiguration) -> OptionsUpdate {
    let s = styled(config);
    OptionsUpdate {
        data: Some(s.data),
        image: Some(s.image),
        dots_options: Some(s.dots),
        corners_square_options: Some(s.corners_square),
        corners_dot_options: Some(s.corners_dot),
        background_options: Some(s.background),
        ..OptionsUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::BlobRegistry;
    use crate::config::{CornerStyle, DotStyle};
    use crate::options::GradientKind;

    fn example() -> RenderConfiguration {
        RenderConfiguration {
            payload: "https://example.com".into(),
            ..Default::default()
        }
    }

    #[test]
    fn full_options_carry_gradient_and_background() {
        let options = full_options(&example());
        assert_eq!(options.data, "https://example.com");
        assert!(options.image.is_none());
        assert_eq!(options.background_options.color, "#ffffff");

        let gradient = options.dots_options.gradient.as_ref().unwrap();
        assert_eq!(gradient.kind, GradientKind::Linear);
        assert_eq!(gradient.rotation, 0.0);
        assert_eq!(gradient.color_stops[0].offset, 0.0);
        assert_eq!(gradient.color_stops[0].color, "#000000");
        assert_eq!(gradient.color_stops[1].offset, 1.0);
        assert_eq!(gradient.color_stops[1].color, "#ff0000");
        assert_eq!(options.dots_options.kind, DotStyle::Square);
    }

    #[test]
    fn both_corner_aspects_share_style_and_gradient() {
        let config = RenderConfiguration {
            corner_style: CornerStyle::Dot,
            gradient_rotation_degrees: 90.0,
            ..example()
        };
        let options = full_options(&config);
        assert_eq!(options.corners_square_options, options.corners_dot_options);
        assert_eq!(options.corners_square_options.kind, CornerStyle::Dot);
        assert_eq!(options.corners_square_options.gradient, options.dots_options.gradient);
    }

    #[test]
    fn rotation_is_converted_to_radians() {
        let config = RenderConfiguration { gradient_rotation_degrees: 180.0, ..example() };
        let rotation = full_options(&config).dots_options.gradient.unwrap().rotation;
        assert!((rotation - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn image_placement_is_construction_only() {
        let config = example();
        let full = full_options(&config);
        assert_eq!(full.image_options.margin, LOGO_MARGIN);
        assert_eq!(full.image_options.cross_origin, Some(CrossOrigin::Anonymous));

        let update = update_options(&config);
        assert!(update.image_options.is_none());
        assert!(update.width.is_none());
        assert!(update.height.is_none());
    }

    #[test]
    fn update_matches_full_options_for_styled_fields() {
        let registry = BlobRegistry::new();
        let config = RenderConfiguration {
            dot_style: DotStyle::ClassyRounded,
            logo: Some(registry.create_object_url(vec![1u8])),
            ..example()
        };
        let full = full_options(&config);
        let mut base = Options::default();
        base.apply(update_options(&config));
        assert_eq!(base.data, full.data);
        assert_eq!(base.image, full.image);
        assert_eq!(base.dots_options, full.dots_options);
        assert_eq!(base.corners_square_options, full.corners_square_options);
        assert_eq!(base.corners_dot_options, full.corners_dot_options);
        assert_eq!(base.background_options, full.background_options);
    }

    #[test]
    fn missing_logo_is_an_explicit_removal() {
        assert_eq!(update_options(&example()).image, Some(None));
    }
}
