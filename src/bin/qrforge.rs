use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use qrforge::adapter::DOWNLOAD_NAME;
use qrforge::blob::BlobRegistry;
use qrforge::engine::RenderEngine as _;
use qrforge::form::{FormEvent, FormState, Session, DEFAULT_PAYLOAD};
use qrforge::helper;
use qrforge::options::Extension;
use qrforge::{CornerStyle, DotStyle, RenderConfiguration};

#[derive(Parser, Debug)]
#[command(name = "qrforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one styled QR code.
    Render(RenderArgs),
    /// Replay a JSON-lines script of form events.
    Session(SessionArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Configuration JSON; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text or URL to encode.
    #[arg(long)]
    data: Option<String>,

    /// square, dots, rounded, extra-rounded, classy or classy-rounded.
    #[arg(long, value_parser = parse_style::<DotStyle>)]
    dot_style: Option<DotStyle>,

    /// square, dot or extra-rounded.
    #[arg(long, value_parser = parse_style::<CornerStyle>)]
    corner_style: Option<CornerStyle>,

    #[arg(long)]
    gradient_start: Option<String>,

    #[arg(long)]
    gradient_end: Option<String>,

    /// Gradient rotation in degrees.
    #[arg(long, allow_negative_numbers = true)]
    rotation: Option<f64>,

    #[arg(long)]
    background: Option<String>,

    /// Logo image to place in the center.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Output directory.
    #[arg(long, default_value = "generated")]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = FormatChoice::Png)]
    format: FormatChoice,

    /// Also print the code to the terminal.
    #[arg(long)]
    preview: bool,
}

#[derive(Parser, Debug)]
struct SessionArgs {
    /// Script to replay; standard input when omitted.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Output directory for downloads.
    #[arg(long, default_value = "generated")]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
    Svg,
}

impl From<FormatChoice> for Extension {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Png => Extension::Png,
            FormatChoice::Jpeg => Extension::Jpeg,
            FormatChoice::Svg => Extension::Svg,
        }
    }
}

fn parse_style<T: DeserializeOwned>(value: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("qrforge=info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Session(args) => cmd_session(args),
    }
}

fn load_config(args: &RenderArgs) -> anyhow::Result<RenderConfiguration> {
    let mut config = match &args.config {
        Some(path) => RenderConfiguration::from_json_file(path)
            .with_context(|| format!("read configuration '{}'", path.display()))?,
        None => RenderConfiguration {
            payload: DEFAULT_PAYLOAD.to_string(),
            ..Default::default()
        },
    };

    if let Some(data) = &args.data {
        config.payload = data.clone();
    }
    if let Some(style) = args.dot_style {
        config.dot_style = style;
    }
    if let Some(style) = args.corner_style {
        config.corner_style = style;
    }
    if let Some(color) = &args.gradient_start {
        config.gradient_start = color.clone();
    }
    if let Some(color) = &args.gradient_end {
        config.gradient_end = color.clone();
    }
    if let Some(degrees) = args.rotation {
        config.gradient_rotation_degrees = degrees;
    }
    if let Some(color) = &args.background {
        config.background_color = color.clone();
    }
    Ok(config)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let registry = BlobRegistry::new();
    let mut form = FormState::from_config(load_config(&args)?);
    if let Some(logo) = &args.logo {
        form.upload_logo(logo, &registry)
            .with_context(|| format!("read logo '{}'", logo.display()))?;
    }

    let mut session = Session::open(form, registry, args.out_dir.clone())?;

    if args.preview {
        match session.engine().and_then(|engine| engine.matrix()) {
            Some(matrix) => helper::print_qr(matrix),
            None => tracing::warn!("nothing to preview for an empty payload"),
        }
    }

    let saved = match Extension::from(args.format) {
        Extension::Png => session.dispatch(FormEvent::Download)?,
        other => {
            let engine = session.engine().context("renderer did not initialize")?;
            Some(engine.download(DOWNLOAD_NAME, other)?)
        }
    };
    if let Some(path) = saved {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_session(args: SessionArgs) -> anyhow::Result<()> {
    let mut session = Session::open(FormState::new(), BlobRegistry::new(), args.out_dir.clone())?;
    let written = match &args.script {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
            session.replay(BufReader::new(f))?
        }
        None => session.replay(io::stdin().lock())?,
    };
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
