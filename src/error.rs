/// Errors raised while styling, rendering or exporting a QR code.
///
/// The adapter never produces these on its own: they come from the rendering engine and are
/// handed back to whoever drove the update or the download.
#[derive(thiserror::Error, Debug)]
pub enum StyleError {
    /// A color string could not be parsed as `#RRGGBB`, `#RGB` or `#RRGGBBAA`.
    #[error("invalid color \"{0}\"")]
    InvalidColor(String),

    /// The payload could not be encoded into a QR symbol.
    #[error("qr encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A gradient needs at least two color stops.
    #[error("gradient needs at least two color stops, got {0}")]
    GradientStops(usize),
}

pub type Result<T> = std::result::Result<T, StyleError>;
