//! # qrforge
//!
//! A Rust library for rendering styled QR codes and keeping the rendering in step with a form.
//!
//! `qrforge` takes a [`RenderConfiguration`](config::RenderConfiguration) (payload, gradient
//! colors and rotation, background, dot and corner shapes, optional logo) and draws it through a
//! stateful rendering engine. The engine is created once and updated in place on every change,
//! so a preview attached to it always shows the latest configuration. The current image can be
//! downloaded as `qr-code.png` at any time.
//!
//! ## Features
//!
//! - Six dot shapes: square, dots, rounded, extra-rounded, classy, classy-rounded.
//! - Three finder pattern shapes: square, dot, extra-rounded.
//! - Linear and radial gradients with any rotation.
//! - Logo embedding with cleared background dots.
//! - Export as PNG, JPEG or SVG.
//! - Logo uploads are exposed through temporary handles that are released as soon as no
//!   snapshot refers to them.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrforge = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Open a session, change the dot style and download the result:
//!
//! ```rust,no_run
//! use qrforge::blob::BlobRegistry;
//! use qrforge::config::DotStyle;
//! use qrforge::form::{FormEvent, FormState, Session};
//!
//! let mut session = Session::open(FormState::new(), BlobRegistry::new(), "generated").unwrap();
//! session.dispatch(FormEvent::SetDotStyle { value: DotStyle::Dots }).unwrap();
//! let saved = session.dispatch(FormEvent::Download).unwrap();
//! assert!(saved.unwrap().ends_with("qr-code.png"));
//! ```
//!
//! ## Modules
//!
//! - [`config`]: The user-adjustable configuration snapshot.
//! - [`adapter`]: Construct-once, update-on-change synchronization with the engine.
//! - [`mapping`]: Snapshot to engine options translation.
//! - [`engine`]: The engine seam and the styled QR renderer.
//! - [`form`]: Form state, events and the hosting session.
//! - [`blob`]: Temporary handles for uploaded logos.
//! - [`helper`]: SVG and console output.

pub mod adapter;
pub mod blob;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod form;
pub mod helper;
pub mod mapping;
pub mod mount;
pub mod options;

pub use adapter::RendererAdapter;
pub use config::{CornerStyle, DotStyle, RenderConfiguration};
pub use error::{Result, StyleError};
