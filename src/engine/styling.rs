use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::engine::geometry::Matrix;
use crate::engine::{raster, RenderEngine, ResourceResolver};
use crate::error::Result;
use crate::helper;
use crate::mount::{Canvas, MountPoint};
use crate::options::{Extension, Options, OptionsUpdate};

struct LoadedLogo {
    reference: String,
    bytes: Rc<[u8]>,
    image: RgbaImage,
}

/// Draws styled QR codes onto a shared [`Canvas`].
///
/// The canvas is created once and repainted on every update, so a mount point that received it
/// keeps showing the latest frame.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use qrforge::blob::BlobRegistry;
/// use qrforge::engine::{RenderEngine, StylingEngine};
/// use qrforge::options::{Options, OptionsUpdate};
///
/// let options = Options { data: "Hello, World!".into(), ..Default::default() };
/// let registry = Rc::new(BlobRegistry::new());
/// let mut engine = StylingEngine::new(options, registry, "generated").unwrap();
/// engine.update(OptionsUpdate { data: Some("Bye".into()), ..Default::default() }).unwrap();
/// assert_eq!(engine.options().data, "Bye");
/// ```
pub struct StylingEngine {
    options: Options,
    resolver: Rc<dyn ResourceResolver>,
    download_dir: PathBuf,
    canvas: Canvas,
    encoded: Option<(String, Matrix)>,
    logo: Option<LoadedLogo>,
}

impl StylingEngine {
    /// Builds the engine and paints the first frame.
    ///
    /// # Arguments
    ///
    /// * `options` - Full options.
    /// * `resolver` - Where `options.image` references are looked up.
    /// * `download_dir` - Directory that [`download`](RenderEngine::download) writes into. It is
    ///   created on first download if it does not exist.
    pub fn new(
        options: Options,
        resolver: Rc<dyn ResourceResolver>,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let mut engine = Self {
            canvas: Canvas::new(options.width, options.height),
            options,
            resolver,
            download_dir: download_dir.into(),
            encoded: None,
            logo: None,
        };
        engine.redraw()?;
        Ok(engine)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// The encoded module grid, `None` while there is no data.
    pub fn matrix(&self) -> Option<&Matrix> {
        self.encoded.as_ref().map(|(_, m)| m)
    }

    /// Encodes the current output without touching the filesystem.
    pub fn raw_data(&self, extension: Extension) -> Result<Vec<u8>> {
        match extension {
            Extension::Svg => {
                let logo = self.logo.as_ref().map(|l| (&*l.bytes, l.image.dimensions()));
                Ok(helper::to_svg_string(&self.options, self.matrix(), logo)?.into_bytes())
            }
            Extension::Png => {
                encode(DynamicImage::ImageRgba8(self.canvas.snapshot()), ImageFormat::Png)
            }
            // JPEG has no alpha channel.
            Extension::Jpeg => encode(
                DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(self.canvas.snapshot()).to_rgb8()),
                ImageFormat::Jpeg,
            ),
        }
    }

    fn redraw(&mut self) -> Result<()> {
        self.encode_data()?;
        self.load_logo();
        let frame = raster::draw(
            &self.options,
            self.matrix(),
            self.logo.as_ref().map(|l| &l.image),
        )?;
        self.canvas.present(frame);
        Ok(())
    }

    fn encode_data(&mut self) -> Result<()> {
        let data = &self.options.data;
        if data.is_empty() {
            self.encoded = None;
            return Ok(());
        }
        if matches!(&self.encoded, Some((cached, _)) if cached == data) {
            return Ok(());
        }
        let matrix = Matrix::encode(data)?;
        tracing::debug!("encoded {} bytes into {} modules", data.len(), matrix.count());
        self.encoded = Some((data.clone(), matrix));
        Ok(())
    }

    // A logo that cannot be fetched or decoded is left out; the code is still drawn.
    fn load_logo(&mut self) {
        let Some(reference) = self.options.image.as_deref() else {
            self.logo = None;
            return;
        };
        if matches!(&self.logo, Some(loaded) if loaded.reference == reference) {
            return;
        }

        let cross_origin = self.options.image_options.cross_origin;
        self.logo = match self.resolver.resolve(reference, cross_origin) {
            None => {
                tracing::warn!("logo {} could not be resolved", reference);
                None
            }
            Some(bytes) => match image::load_from_memory(&bytes) {
                Ok(decoded) => Some(LoadedLogo {
                    reference: reference.to_string(),
                    image: decoded.to_rgba8(),
                    bytes,
                }),
                Err(e) => {
                    tracing::warn!("logo {} could not be decoded: {}", reference, e);
                    None
                }
            },
        };
    }
}

fn encode(image: DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format)?;
    Ok(bytes)
}

impl RenderEngine for StylingEngine {
    fn options(&self) -> &Options {
        &self.options
    }

    fn update(&mut self, update: OptionsUpdate) -> Result<()> {
        self.options.apply(update);
        self.redraw()
    }

    fn attach_to(&mut self, mount: &mut dyn MountPoint) {
        mount.append(self.canvas.clone());
    }

    fn download(&self, name: &str, extension: Extension) -> Result<PathBuf> {
        let bytes = self.raw_data(extension)?;
        if !self.download_dir.exists() {
            fs::create_dir_all(&self.download_dir)?;
        }
        let path = self.download_dir.join(format!("{}.{}", name, extension));
        fs::write(&path, bytes)?;
        tracing::info!("saved {}", path.display());
        Ok(path)
    }
}
