#![warn(clippy::pedantic)]

pub mod config;
pub mod export;
pub mod import;

use anyhow::{Context, Result as AnyResult};
use clap::Parser;
use dotkit_core::{Argb, EditingSession, GestureOutcome, Point, Tool};
use std::path::PathBuf;

/// Headless pixel canvas: import, composite, and export documents.
#[derive(Parser, Debug)]
#[command(name = "dotkit", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Composite a JSON document and write it as PNG.
    Render {
        input: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Write a fresh default document as PNG.
    New {
        /// Defaults to the `default_width` preference.
        #[arg(long)]
        width: Option<u32>,
        /// Defaults to the `default_height` preference.
        #[arg(long)]
        height: Option<u32>,
        /// Flood the drawing layer with this color, `#RRGGBB` or `#AARRGGBB`.
        #[arg(long, value_name = "COLOR")]
        fill: Option<Argb>,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Print the preferences path and effective values.
    Config {
        /// Write the effective preferences back, creating the file if needed.
        #[arg(long)]
        save: bool,
    },
}

fn open_session(
    document: dotkit_core::CanvasDocument,
    prefs: &config::Preferences,
) -> EditingSession {
    let mut session = EditingSession::new(document, prefs.max_history);
    session.set_tool_size(prefs.brush_size);
    session
}

fn render(input: &std::path::Path, output: &std::path::Path, prefs: &config::Preferences) -> AnyResult<()> {
    let file = std::fs::File::open(input).with_context(|| format!("opening {input:?}"))?;
    let document = import::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("importing {input:?}"))?;
    log::info!(
        "loaded {input:?}: {}x{}, {} layers",
        document.width(),
        document.height(),
        document.layers().len()
    );
    let composite = open_session(document, prefs).composite()?;
    export::save_png(&composite, output)
}

fn new_document(
    width: u32,
    height: u32,
    fill: Option<Argb>,
    output: &std::path::Path,
    prefs: &config::Preferences,
) -> AnyResult<()> {
    let document = dotkit_core::CanvasDocument::create(width, height)?;
    let mut session = open_session(document, prefs);
    if let Some(color) = fill {
        session.set_primary_color(color);
        session.set_tool(Tool::Fill);
        session.pointer_down(Point::new(0, 0));
        match session.pointer_up(Point::new(0, 0))? {
            GestureOutcome::Committed => (),
            other => log::warn!("fill did nothing ({other:?})"),
        }
    }
    export::save_png(&session.composite()?, output)
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let cli = Cli::parse();
    let prefs = config::Preferences::load();

    match cli.command {
        Command::Render { input, output } => render(&input, &output, &prefs),
        Command::New {
            width,
            height,
            fill,
            output,
        } => new_document(
            width.unwrap_or(prefs.default_width),
            height.unwrap_or(prefs.default_height),
            fill,
            &output,
            &prefs,
        ),
        Command::Config { save } => {
            match config::Preferences::path() {
                Some(path) => println!("# {}", path.display()),
                None => println!("# no preferences directory"),
            }
            print!("{}", toml::ser::to_string_pretty(&prefs)?);
            if save {
                prefs.save()?;
            }
            Ok(())
        }
    }
}
