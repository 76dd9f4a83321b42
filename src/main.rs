use std::{fs, fs::File, path::PathBuf, thread};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, error, info};
use simplelog::{Config, WriteLogger};

use omnis::{
    app::App,
    assistant::AssistantMode,
    document::{DocumentCategory, markup::TagStripper},
    pdf::RenderPhase,
    session::ViewerMode,
    settings::{self, SettingsStore},
};

/// Open documents, page through them, and ask the offline assistant about them.
#[derive(Debug, Parser)]
#[command(name = "omnis", version, about)]
struct Args {
    /// Files to open, in tab order. The last one becomes active.
    files: Vec<PathBuf>,

    /// Question for the assistant about the active document.
    #[arg(long)]
    ask: Option<String>,

    /// Assistant mode (cloud or local); defaults to the saved preference.
    #[arg(long)]
    mode: Option<AssistantMode>,

    /// Text page to show in read mode.
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Lines per text page; defaults to the saved preference.
    #[arg(long)]
    page_size: Option<usize>,

    /// Print the whole buffer instead of one page.
    #[arg(long)]
    edit: bool,

    /// Latest published version; reported when newer than the last one seen.
    #[arg(long)]
    latest_version: Option<String>,

    /// Write debug-level entries to the log file.
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(level: LevelFilter) -> Result<PathBuf> {
    let dir = settings::data_dir();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("omnis.log");
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&path).with_context(|| format!("creating {}", path.display()))?,
    )?;
    Ok(path)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let log_path = init_logging(level)?;
    info!("starting omnis {} (log at {})", env!("CARGO_PKG_VERSION"), log_path.display());

    let mut app = App::new(SettingsStore::load());
    if let Some(latest) = args.latest_version.as_deref() {
        if app.note_available_version(latest) {
            println!("omnis {latest} is available");
        }
    }
    if let Some(mode) = args.mode {
        app.set_assistant_mode(mode);
    }
    if let Some(page_size) = args.page_size {
        app.session_mut().set_text_page_size(page_size);
    }

    for path in &args.files {
        if let Err(err) = app.open(path) {
            error!("{err}");
            eprintln!("{err}");
        }
    }
    let _ = app.tick();

    print_tabs(&app);
    print_active(&mut app, &args);

    if let Some(query) = args.ask.as_deref() {
        if let Some(delay) = app.response_delay() {
            thread::sleep(delay);
        }
        match app.ask(query) {
            Some(reply) => println!("\n{reply}"),
            None => eprintln!("the question is empty"),
        }
    }

    app.shutdown();
    Ok(())
}

fn print_tabs(app: &App) {
    let session = app.session();
    for doc in session.documents() {
        let marker = if session.active_id() == Some(doc.id()) { '>' } else { ' ' };
        println!("{marker} {} [{}]", doc.title(), doc.category().label());
    }
}

fn print_active(app: &mut App, args: &Args) {
    if args.edit {
        app.session_mut().set_viewer_mode(ViewerMode::Edit);
    }
    app.session_mut().set_text_page(args.page);

    let session = app.session();
    let Some(doc) = session.active_document() else {
        println!("No documents open.");
        return;
    };

    match doc.category() {
        DocumentCategory::Text => {
            if session.viewer_mode() == ViewerMode::View {
                if let Some(state) = session.text_pagination() {
                    println!(
                        "\n--- page {}/{} ({} lines) ---",
                        state.current_page, state.page_count, state.line_count
                    );
                }
            }
            if let Some(text) = session.visible_text() {
                println!("{text}");
            }
        }
        DocumentCategory::Pdf => {
            if let Some(pipeline) = session.render_pipeline() {
                match pipeline.phase() {
                    RenderPhase::Failed { message } => println!("\n{message}"),
                    _ => println!(
                        "\nPDF page {}/{} at {:.0}%",
                        pipeline.current_page(),
                        pipeline.total_pages(),
                        pipeline.scale() * 100.0
                    ),
                }
            }
        }
        DocumentCategory::RichText => {
            println!("\n{}", session.active_plain_text(&TagStripper));
        }
        DocumentCategory::Image => {
            if let Some(payload) = doc.content().payload() {
                println!("\n{} image, {} bytes", payload.mime(), payload.len());
            }
        }
        DocumentCategory::Binary | DocumentCategory::Unknown | DocumentCategory::Error => {
            if let Some(message) = doc.content().as_str() {
                println!("\n{message}");
            }
        }
    }
}
