//! The rendering engine seam and its styled QR implementation.
//!
//! The adapter only talks to a [`RenderEngine`]: construct it once from full [`Options`],
//! [`update`](RenderEngine::update) it in place, [`attach`](RenderEngine::attach_to) its output
//! to a mount point and ask it to [`download`](RenderEngine::download) what it shows.
//! [`StylingEngine`] is the implementation used by the application.

use std::path::PathBuf;
use std::rc::Rc;

use crate::error::Result;
use crate::mount::MountPoint;
use crate::options::{CrossOrigin, Extension, Options, OptionsUpdate};

pub mod geometry;
pub mod paint;
pub(crate) mod raster;
mod styling;

pub use styling::StylingEngine;

/// A stateful renderer that turns options into visible output.
pub trait RenderEngine {
    /// The options currently in effect.
    fn options(&self) -> &Options;

    /// Merges `update` into the current options and redraws.
    fn update(&mut self, update: OptionsUpdate) -> Result<()>;

    /// Shows this engine's output inside `mount`.
    fn attach_to(&mut self, mount: &mut dyn MountPoint);

    /// Saves the current output as `<name>.<extension>` and returns where it went.
    fn download(&self, name: &str, extension: Extension) -> Result<PathBuf>;
}

/// Turns an image reference from the options into bytes.
pub trait ResourceResolver {
    fn resolve(&self, reference: &str, cross_origin: Option<CrossOrigin>) -> Option<Rc<[u8]>>;
}
