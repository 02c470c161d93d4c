//! Keeps one rendering engine in step with a stream of configuration snapshots.
//!
//! The adapter is either uninitialized or initialized. [`initialize`](RendererAdapter::initialize)
//! constructs the engine from the first snapshot and mounts its output; every later snapshot goes
//! through [`synchronize`](RendererAdapter::synchronize), which updates the same instance in place.
//! Calls that need an engine are no-ops until one exists.

use std::path::PathBuf;

use crate::config::RenderConfiguration;
use crate::engine::RenderEngine;
use crate::error::Result;
use crate::mapping;
use crate::mount::MountPoint;
use crate::options::{Extension, Options};

/// File name (without extension) used for downloads.
pub const DOWNLOAD_NAME: &str = "qr-code";

/// Format used for downloads.
pub const DOWNLOAD_EXTENSION: Extension = Extension::Png;

/// Owns the engine instance and the snapshot it currently reflects.
///
/// The engine is built lazily by the `construct` closure, which runs at most once per adapter.
/// The current snapshot is retained so the resources it references (the logo handle) stay alive
/// exactly as long as the engine shows them.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use qrforge::adapter::RendererAdapter;
/// use qrforge::blob::BlobRegistry;
/// use qrforge::config::{DotStyle, RenderConfiguration};
/// use qrforge::engine::StylingEngine;
/// use qrforge::mount::{MountPoint, PreviewPane};
///
/// let registry = Rc::new(BlobRegistry::new());
/// let mut adapter = RendererAdapter::new(move |options| {
///     StylingEngine::new(options, registry.clone(), "generated")
/// });
///
/// let mut pane = PreviewPane::new();
/// let config = RenderConfiguration {
///     payload: "https://example.com".into(),
///     ..Default::default()
/// };
/// adapter.initialize(config.clone(), &mut pane).unwrap();
/// adapter.synchronize(RenderConfiguration { dot_style: DotStyle::Dots, ..config }).unwrap();
/// assert_eq!(pane.children().len(), 1);
/// ```
pub struct RendererAdapter<E, F> {
    construct: F,
    engine: Option<E>,
    current: Option<RenderConfiguration>,
}

impl<E, F> RendererAdapter<E, F>
where
    E: RenderEngine,
    F: FnMut(Options) -> Result<E>,
{
    pub fn new(construct: F) -> Self {
        Self {
            construct,
            engine: None,
            current: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    /// Builds the engine from `config` and shows it in `mount`.
    ///
    /// Anything already inside `mount` is cleared first. Only the first call does anything; the
    /// engine is never rebuilt for the lifetime of the adapter.
    pub fn initialize(
        &mut self,
        config: RenderConfiguration,
        mount: &mut dyn MountPoint,
    ) -> Result<()> {
        if self.engine.is_some() {
            tracing::debug!("renderer already initialized, ignoring");
            return Ok(());
        }

        let mut engine = (self.construct)(mapping::full_options(&config))?;
        mount.clear();
        engine.attach_to(mount);
        tracing::info!("renderer initialized for {} byte payload", config.payload.len());

        self.engine = Some(engine);
        self.current = Some(config);
        Ok(())
    }

    /// Pushes `config` to the engine as an in-place update.
    ///
    /// The snapshot replaces the previous one even if the engine rejects it, so a superseded logo
    /// is released either way.
    pub fn synchronize(&mut self, config: RenderConfiguration) -> Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            tracing::debug!("renderer not initialized, dropping update");
            return Ok(());
        };

        let update = mapping::update_options(&config);
        tracing::debug!(
            "synchronizing renderer: dots={:?} corners={:?}",
            config.dot_style,
            config.corner_style
        );
        let result = engine.update(update);
        self.current = Some(config);
        result
    }

    /// Saves the current output as `qr-code.png`.
    ///
    /// Returns the written path, or `None` when nothing has been initialized yet.
    pub fn download(&self) -> Result<Option<PathBuf>> {
        match &self.engine {
            Some(engine) => engine.download(DOWNLOAD_NAME, DOWNLOAD_EXTENSION).map(Some),
            None => {
                tracing::debug!("download requested before initialization");
                Ok(None)
            }
        }
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// The snapshot the engine currently reflects.
    pub fn current(&self) -> Option<&RenderConfiguration> {
        self.current.as_ref()
    }
}
