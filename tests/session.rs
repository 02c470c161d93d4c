use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrforge::adapter::RendererAdapter;
use qrforge::blob::BlobRegistry;
use qrforge::config::{DotStyle, RenderConfiguration};
use qrforge::engine::{RenderEngine, StylingEngine};
use qrforge::form::{FormEvent, FormState, Session};
use qrforge::form::DEFAULT_PAYLOAD;
use qrforge::mapping::CANVAS_SIZE;
use qrforge::mount::{Canvas, MountPoint};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("qrforge-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn write_logo(dir: &Path, name: &str, color: [u8; 4]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(24, 24, Rgba(color)))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    fs::write(&path, bytes).unwrap();
    path
}

/// Scans the canvas like a camera would and returns the first payload found.
fn scan(canvas: &Canvas) -> Option<String> {
    let gray = DynamicImage::ImageRgba8(canvas.snapshot()).to_luma8();
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
        gray.get_pixel(x as u32, y as u32).0[0]
    });
    prepared
        .detect_grids()
        .into_iter()
        .find_map(|grid| grid.decode().ok())
        .map(|(_, content)| content)
}

#[test]
fn example_url_downloads_qr_code_png() {
    let dir = scratch_dir("download");
    let mut session = Session::open(FormState::new(), BlobRegistry::new(), &dir).unwrap();

    let path = session.dispatch(FormEvent::Download).unwrap().unwrap();
    assert_eq!(path, dir.join("qr-code.png"));

    let saved = image::open(&path).unwrap();
    assert_eq!(saved.width(), CANVAS_SIZE);
    assert_eq!(saved.height(), CANVAS_SIZE);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn dot_style_change_keeps_the_mounted_canvas() {
    let dir = scratch_dir("restyle");
    let mut session = Session::open(FormState::new(), BlobRegistry::new(), &dir).unwrap();
    let mounted = session.preview().current().unwrap().clone();
    let before = mounted.snapshot();

    session.dispatch(FormEvent::SetDotStyle { value: DotStyle::Dots }).unwrap();

    assert_eq!(session.preview().children().len(), 1);
    assert!(session.preview().current().unwrap().same_surface(&mounted));
    assert_ne!(mounted.snapshot(), before);
    assert_eq!(session.engine().unwrap().options().dots_options.kind, DotStyle::Dots);
}

#[test]
fn uploading_twice_keeps_one_live_handle() {
    let dir = scratch_dir("logos");
    let red = write_logo(&dir, "red.png", [255, 0, 0, 255]);
    let blue = write_logo(&dir, "blue.png", [0, 0, 255, 255]);

    let registry = BlobRegistry::new();
    let mut session = Session::open(FormState::new(), registry.clone(), dir.join("out")).unwrap();

    session.dispatch(FormEvent::SetLogo { path: red }).unwrap();
    assert_eq!(session.registry().live_handles(), 1);
    let first = session.engine().unwrap().options().image.clone().unwrap();

    session.dispatch(FormEvent::SetLogo { path: blue }).unwrap();
    assert_eq!(registry.live_handles(), 1);
    assert!(!registry.contains(&first));
    let second = session.engine().unwrap().options().image.clone().unwrap();
    assert_ne!(first, second);
    assert!(registry.contains(&second));

    drop(session);
    assert_eq!(registry.live_handles(), 0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn clearing_the_logo_releases_it() {
    let dir = scratch_dir("clear");
    let logo = write_logo(&dir, "logo.png", [0, 128, 0, 255]);
    let registry = BlobRegistry::new();
    let mut session = Session::open(FormState::new(), registry.clone(), dir.join("out")).unwrap();

    session.dispatch(FormEvent::SetLogo { path: logo }).unwrap();
    session.dispatch(FormEvent::ClearLogo).unwrap();

    assert_eq!(registry.live_handles(), 0);
    assert!(session.engine().unwrap().options().image.is_none());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn download_before_initialize_does_nothing() {
    let dir = scratch_dir("early");
    let registry = Rc::new(BlobRegistry::new());
    let target = dir.clone();
    let adapter = RendererAdapter::new(move |options| {
        StylingEngine::new(options, registry.clone(), target.clone())
    });

    assert!(adapter.download().unwrap().is_none());
    assert!(!dir.exists());
}

#[test]
fn replayed_script_ends_in_the_last_state() {
    let dir = scratch_dir("replay");
    let mut session = Session::open(FormState::new(), BlobRegistry::new(), &dir).unwrap();

    let script = r##"
{"event":"set_data","value":"https://rust-lang.org"}
{"event":"set_gradient_start","value":"#123456"}
{"event":"set_rotation","value":90}

{"event":"set_corner_style","value":"extra-rounded"}
{"event":"download"}
"##;
    let written = session.replay(script.as_bytes()).unwrap();
    assert_eq!(written, vec![dir.join("qr-code.png")]);

    let config: RenderConfiguration = session.form().snapshot();
    assert_eq!(config.payload, "https://rust-lang.org");
    assert_eq!(config.gradient_start, "#123456");
    assert_eq!(config.gradient_rotation_degrees, 90.0);

    let options = session.engine().unwrap().options();
    assert_eq!(options.data, "https://rust-lang.org");
    let rotation = options.dots_options.gradient.as_ref().unwrap().rotation;
    assert!((rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-9);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn malformed_script_line_is_an_error() {
    let dir = scratch_dir("malformed");
    let mut session = Session::open(FormState::new(), BlobRegistry::new(), &dir).unwrap();
    assert!(session.replay("{\"event\":\"explode\"}".as_bytes()).is_err());
}

#[test]
fn rendered_code_scans_with_and_without_logo() {
    let dir = scratch_dir("scan");
    let logo = write_logo(&dir, "logo.png", [0, 0, 255, 255]);

    for style in [DotStyle::Square, DotStyle::Dots] {
        let mut session = Session::open(FormState::new(), BlobRegistry::new(), &dir).unwrap();
        session.dispatch(FormEvent::SetDotStyle { value: style }).unwrap();
        let canvas = session.preview().current().unwrap().clone();
        assert_eq!(scan(&canvas).as_deref(), Some(DEFAULT_PAYLOAD), "{style:?}");

        session.dispatch(FormEvent::SetLogo { path: logo.clone() }).unwrap();
        assert!(session.engine().unwrap().options().image.is_some());
        assert_eq!(scan(&canvas).as_deref(), Some(DEFAULT_PAYLOAD), "{style:?} with logo");
    }

    let _ = fs::remove_dir_all(&dir);
}
