//! Headless driver: load a folder, apply a filter, optionally clean up the
//! visible captions, and print the result.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use captag::caption::encode_caption;
use captag::{
    AppSettings, FilterSpec, NegativeMode, PositiveMode, SchemeCatalog, Scope, Session,
    SidecarCaptions,
};

#[derive(Parser, Debug)]
#[clap(
    name = "captag",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect and tidy comma-separated image captions"
)]
struct Cli {
    /// Folder of images with `.txt` caption sidecars.
    folder: PathBuf,
    /// Color scheme used for sorting (defaults to the last one used).
    #[clap(long)]
    scheme: Option<String>,
    /// Directory holding `.yaml`/`.csv` color schemes.
    #[clap(long)]
    schemes: Option<PathBuf>,
    /// Comma-separated tags an image must carry.
    #[clap(long, default_value = "")]
    filter: String,
    /// Show images carrying any filter tag instead of all of them.
    #[clap(long)]
    any: bool,
    /// Comma-separated tags an image must not carry.
    #[clap(long, default_value = "")]
    exclude: String,
    /// Only hide images carrying every excluded tag.
    #[clap(long)]
    exclude_any: bool,
    /// Sort the tags of the visible images and write them back.
    #[clap(long)]
    sort: bool,
    /// Drop duplicate tags of the visible images and write them back.
    #[clap(long)]
    dedupe: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_path = AppSettings::default_path();
    let settings = settings_path
        .as_deref()
        .and_then(AppSettings::load_from)
        .unwrap_or_default();

    env_logger::Builder::new()
        .filter_level(settings.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let scheme_dir = cli
        .schemes
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.scheme_dir));
    let catalog = SchemeCatalog::scan(&scheme_dir);

    let mut session = Session::new(Arc::new(SidecarCaptions), settings).with_catalog(catalog);
    if let Some(path) = settings_path {
        session = session.with_settings_path(path);
    }

    match &cli.scheme {
        Some(name) => {
            session
                .change_scheme(name)
                .with_context(|| format!("failed to load color scheme '{name}'"))?;
        }
        None => {
            if let Err(e) = session.restore_scheme() {
                log::warn!("Continuing without color scheme: {}", e);
            }
        }
    }

    session
        .open_folder(&cli.folder)
        .with_context(|| format!("failed to open {:?}", cli.folder))?;

    let positive_mode = if cli.any {
        PositiveMode::Any
    } else {
        PositiveMode::All
    };
    let negative_mode = if cli.exclude_any {
        NegativeMode::AnyAbsent
    } else {
        NegativeMode::AllAbsent
    };
    session.set_filter(
        FilterSpec::from_text(&cli.filter, &cli.exclude)
            .positive_mode(positive_mode)
            .negative_mode(negative_mode),
    );

    if cli.dedupe {
        let outcome = session.dedupe(Scope::Visible)?;
        log::info!("Deduplicated {} caption(s)", outcome.changed.len());
    }
    if cli.sort {
        let outcome = session.sort(Scope::Visible)?;
        log::info!("Sorted {} caption(s)", outcome.changed.len());
    }

    let mut out = std::io::stdout().lock();
    for image in session.visible() {
        writeln!(
            out,
            "{}: {}",
            image.file_name(),
            encode_caption(session.get_tags(image))
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} of {} image(s) visible, scheme: {}",
        session.visible().len(),
        session.store().len(),
        session.scheme_name()
    )?;
    for (tag, count) in session.frequency().ranked() {
        writeln!(out, "{count:>6}  {tag} ({})", session.tag_color(tag))?;
    }

    Ok(())
}
