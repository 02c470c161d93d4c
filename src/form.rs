//! The configuration form and the view that hosts the preview.
//!
//! [`FormState`] holds the field values and turns every edit into a new snapshot. A [`Session`]
//! wires a form to a [`RendererAdapter`]: it initializes the preview from the form's first
//! snapshot and synchronizes it after each [`FormEvent`].

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::adapter::RendererAdapter;
use crate::blob::{BlobRegistry, ObjectUrl};
use crate::config::{CornerStyle, DotStyle, RenderConfiguration};
use crate::engine::StylingEngine;
use crate::error::Result;
use crate::mount::PreviewPane;
use crate::options::Options;

/// Payload shown when the form opens.
pub const DEFAULT_PAYLOAD: &str = "https://example.com";

/// One user interaction with the form.
///
/// Serialized as JSON objects tagged by `event`, e.g. `{"event":"set_dot_style","value":"dots"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    SetData { value: String },
    SetGradientStart { value: String },
    SetGradientEnd { value: String },
    SetBackground { value: String },
    SetRotation { value: f64 },
    SetDotStyle { value: DotStyle },
    SetCornerStyle { value: CornerStyle },
    /// Upload a logo from a file.
    SetLogo { path: PathBuf },
    ClearLogo,
    Download,
}

/// Current field values.
#[derive(Clone, Debug)]
pub struct FormState {
    config: RenderConfiguration,
}

impl Default for FormState {
    fn default() -> Self {
        Self::from_config(RenderConfiguration {
            payload: DEFAULT_PAYLOAD.to_string(),
            ..Default::default()
        })
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: RenderConfiguration) -> Self {
        Self { config }
    }

    /// A copy of the current values, for handing to the renderer.
    pub fn snapshot(&self) -> RenderConfiguration {
        self.config.clone()
    }

    /// Reads `path` and exposes it through a fresh handle in `registry`.
    ///
    /// The previous logo handle held by the form is dropped.
    pub fn upload_logo(&mut self, path: &Path, registry: &BlobRegistry) -> Result<()> {
        self.config.logo = Some(read_logo(path, registry)?);
        Ok(())
    }

    /// Applies a field edit. Returns `false` for events that do not edit a field.
    pub fn apply(&mut self, event: FormEvent, registry: &BlobRegistry) -> Result<bool> {
        let config = &mut self.config;
        match event {
            FormEvent::SetData { value } => config.payload = value,
            FormEvent::SetGradientStart { value } => config.gradient_start = value,
            FormEvent::SetGradientEnd { value } => config.gradient_end = value,
            FormEvent::SetBackground { value } => config.background_color = value,
            FormEvent::SetRotation { value } => config.gradient_rotation_degrees = value,
            FormEvent::SetDotStyle { value } => config.dot_style = value,
            FormEvent::SetCornerStyle { value } => config.corner_style = value,
            FormEvent::SetLogo { path } => config.logo = Some(read_logo(&path, registry)?),
            FormEvent::ClearLogo => config.logo = None,
            FormEvent::Download => return Ok(false),
        }
        Ok(true)
    }
}

fn read_logo(path: &Path, registry: &BlobRegistry) -> Result<ObjectUrl> {
    let bytes = fs::read(path)?;
    tracing::debug!("uploaded logo {} ({} bytes)", path.display(), bytes.len());
    Ok(registry.create_object_url(bytes))
}

type Construct = Box<dyn FnMut(Options) -> Result<StylingEngine>>;

/// The hosting view: form, preview pane and renderer living and dying together.
///
/// Dropping the session releases every logo handle it created.
pub struct Session {
    form: FormState,
    registry: BlobRegistry,
    pane: PreviewPane,
    adapter: RendererAdapter<StylingEngine, Construct>,
}

impl Session {
    /// Opens the view and renders the form's first snapshot.
    ///
    /// # Arguments
    ///
    /// * `form` - Initial field values.
    /// * `registry` - Where logo uploads are stored.
    /// * `download_dir` - Directory that downloads are written to.
    pub fn open(
        form: FormState,
        registry: BlobRegistry,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let download_dir = download_dir.into();
        let resolver = Rc::new(registry.clone());
        let construct: Construct = Box::new(move |options| {
            StylingEngine::new(options, resolver.clone(), download_dir.clone())
        });

        let mut session = Self {
            form,
            registry,
            pane: PreviewPane::new(),
            adapter: RendererAdapter::new(construct),
        };
        session.adapter.initialize(session.form.snapshot(), &mut session.pane)?;
        Ok(session)
    }

    /// Handles one event. Returns the written file for [`FormEvent::Download`].
    pub fn dispatch(&mut self, event: FormEvent) -> Result<Option<PathBuf>> {
        tracing::debug!("form event {:?}", event);
        if self.form.apply(event, &self.registry)? {
            self.adapter.synchronize(self.form.snapshot())?;
            Ok(None)
        } else {
            self.adapter.download()
        }
    }

    /// Replays JSON-lines events, skipping blank lines. Returns every file written.
    pub fn replay(&mut self, script: impl BufRead) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for line in script.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event: FormEvent = serde_json::from_str(line)?;
            if let Some(path) = self.dispatch(event)? {
                written.push(path);
            }
        }
        Ok(written)
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn registry(&self) -> &BlobRegistry {
        &self.registry
    }

    pub fn preview(&self) -> &PreviewPane {
        &self.pane
    }

    pub fn engine(&self) -> Option<&StylingEngine> {
        self.adapter.engine()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_opens_with_defaults() {
        let form = FormState::new();
        let config = form.snapshot();
        assert_eq!(config.payload, DEFAULT_PAYLOAD);
        assert_eq!(config.dot_style, DotStyle::Square);
        assert!(config.logo.is_none());
    }

    #[test]
    fn events_edit_single_fields() {
        let registry = BlobRegistry::new();
        let mut form = FormState::new();
        assert!(form.apply(FormEvent::SetDotStyle { value: DotStyle::Classy }, &registry).unwrap());
        assert!(form.apply(FormEvent::SetRotation { value: 90.0 }, &registry).unwrap());
        assert!(!form.apply(FormEvent::Download, &registry).unwrap());

        let config = form.snapshot();
        assert_eq!(config.dot_style, DotStyle::Classy);
        assert_eq!(config.gradient_rotation_degrees, 90.0);
        assert_eq!(config.payload, DEFAULT_PAYLOAD);
    }

    #[test]
    fn missing_logo_file_is_an_error() {
        let registry = BlobRegistry::new();
        let mut form = FormState::new();
        let event = FormEvent::SetLogo { path: "/definitely/not/here.png".into() };
        assert!(form.apply(event, &registry).is_err());
        assert_eq!(registry.live_handles(), 0);
    }

    #[test]
    fn events_parse_from_json() {
        let event: FormEvent =
            serde_json::from_str(r#"{"event":"set_dot_style","value":"extra-rounded"}"#).unwrap();
        assert_eq!(event, FormEvent::SetDotStyle { value: DotStyle::ExtraRounded });
        let event: FormEvent = serde_json::from_str(r#"{"event":"clear_logo"}"#).unwrap();
        assert_eq!(event, FormEvent::ClearLogo);
        let event: FormEvent =
            serde_json::from_str(r#"{"event":"set_logo","path":"logo.png"}"#).unwrap();
        assert_eq!(event, FormEvent::SetLogo { path: "logo.png".into() });
    }
}
