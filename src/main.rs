use anyhow::{Context, Result, anyhow};
use boxmark::annotation::{ExportDocument, ImageId, export::to_json, export_file_name};
use boxmark::input::{Key, ScriptEvent, parse_script};
use boxmark::stats::SessionStats;
use boxmark::store::{AnnotationBackend, FileBackend};
use boxmark::{AnnotationSession, Config};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BOXMARK_GIT_HASH"), ")");

#[derive(Parser, Debug)]
#[command(name = "boxmark")]
#[command(version, long_version = LONG_VERSION, about = "Bounding-box image annotation editor")]
struct Cli {
    /// Config file (defaults to ~/.config/boxmark/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Image store directory (overrides [storage] base_dir)
    #[arg(long, value_name = "DIR", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored images with their annotation counts
    List,
    /// Add an image file to the store
    Add { file: PathBuf },
    /// Remove an image and its annotations
    Remove { id: String },
    /// Export an image's annotations as JSON
    Export {
        id: String,
        /// Output file or directory (stdout if omitted)
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Apply an event script to an image and print the resulting annotations
    Replay {
        id: String,
        script: PathBuf,
        /// Directory for exports requested by the script's export shortcut
        #[arg(long, value_name = "DIR")]
        export_dir: Option<PathBuf>,
    },
    /// Print label statistics across all images
    Stats,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(store) = &cli.store {
        config.storage.base_dir = Some(store.clone());
    }
    let store_dir = config.store_dir()?;
    log::debug!("Using store at {}", store_dir.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let backend: Arc<dyn AnnotationBackend> = Arc::new(FileBackend::new(store_dir));
    let handle = runtime.handle().clone();

    runtime.block_on(run(cli.command, &config, backend, handle))
}

async fn run(
    command: Command,
    config: &Config,
    backend: Arc<dyn AnnotationBackend>,
    handle: Handle,
) -> Result<()> {
    match command {
        Command::List => {
            let images = backend.list_images().await?;
            if images.is_empty() {
                println!("No images");
            }
            for image in images {
                println!(
                    "{}\t{}\t{}x{}\t{} boxes",
                    image.id, image.file_name, image.width, image.height, image.annotation_count
                );
            }
        }
        Command::Add { file } => {
            let mut session = AnnotationSession::new(config, backend, handle)?;
            let id = session
                .add_image(&file)
                .await
                .with_context(|| format!("Failed to add {}", file.display()))?;
            report_notices(&mut session);
            println!("{id}");
        }
        Command::Remove { id } => {
            let mut session = open_session(config, backend, handle).await?;
            let index = find_image(&session, &id)?;
            session.delete_image(index).await?;
            report_notices(&mut session);
        }
        Command::Export { id, output } => {
            let mut session = open_session(config, backend, handle).await?;
            let index = find_image(&session, &id)?;
            session.select_image(index).await;
            report_notices(&mut session);

            let document = session
                .export_document()
                .ok_or_else(|| anyhow!("No current image to export"))?;
            let json = to_json(&document).context("Failed to serialize export")?;
            match output {
                Some(path) => {
                    let target = export_target(&path);
                    fs::write(&target, json)
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                    println!("Exported to {}", target.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Replay {
            id,
            script,
            export_dir,
        } => {
            let source = fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let events = parse_script(&source)
                .with_context(|| format!("Invalid script {}", script.display()))?;

            let mut session = open_session(config, backend, handle).await?;
            let index = find_image(&session, &id)?;
            session.select_image(index).await;

            log::info!("Replaying {} events on {}", events.len(), id);
            for event in events {
                replay_event(&mut session, event);
                if let Some(document) = session.take_export() {
                    write_requested_export(&document, export_dir.as_deref())?;
                }
            }
            session.flush_saves().await;
            report_notices(&mut session);

            let document = session
                .export_document()
                .ok_or_else(|| anyhow!("No current image after replay"))?;
            println!("{}", to_json(&document)?);
        }
        Command::Stats => {
            let mut session = open_session(config, backend, handle).await?;
            for index in 0..session.images().len() {
                session.select_image(index).await;
            }
            report_notices(&mut session);
            print!("{}", SessionStats::from_session(&session));
        }
    }
    Ok(())
}

async fn open_session(
    config: &Config,
    backend: Arc<dyn AnnotationBackend>,
    handle: Handle,
) -> Result<AnnotationSession> {
    let mut session = AnnotationSession::new(config, backend, handle)?;
    session
        .load_images()
        .await
        .context("Failed to load images")?;
    Ok(session)
}

fn find_image(session: &AnnotationSession, id: &str) -> Result<usize> {
    let id = ImageId::from(id);
    session
        .images()
        .iter()
        .position(|image| image.id == id)
        .ok_or_else(|| anyhow!("No image with id {id}"))
}

/// A directory output gets a timestamped file name inside it.
fn export_target(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(export_file_name(chrono::Utc::now()))
    } else {
        path.to_path_buf()
    }
}

fn replay_event(session: &mut AnnotationSession, event: ScriptEvent) {
    match event {
        ScriptEvent::Press { button, x, y } => session.on_pointer_down(button, x, y),
        ScriptEvent::Move { x, y } => session.on_pointer_move(x, y),
        ScriptEvent::Release { button, x, y } => session.on_pointer_up(button, x, y),
        ScriptEvent::Type(text) => {
            for c in text.chars() {
                let key = if c == ' ' { Key::Space } else { Key::Char(c) };
                session.on_key_press(key);
                session.on_key_release(key);
            }
        }
        ScriptEvent::Key(key) => {
            session.on_key_press(key);
            session.on_key_release(key);
        }
        ScriptEvent::Chord { held, key } => {
            for modifier in &held {
                session.on_key_press(*modifier);
            }
            session.on_key_press(key);
            session.on_key_release(key);
            for modifier in held.iter().rev() {
                session.on_key_release(*modifier);
            }
        }
        ScriptEvent::Undo => {
            session.undo();
        }
        ScriptEvent::Redo => {
            session.redo();
        }
    }
}

fn write_requested_export(document: &ExportDocument, export_dir: Option<&Path>) -> Result<()> {
    let Some(dir) = export_dir else {
        eprintln!("Export requested; pass --export-dir to write it");
        return Ok(());
    };
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let target = dir.join(export_file_name(chrono::Utc::now()));
    let json = to_json(document).context("Failed to serialize export")?;
    fs::write(&target, json).with_context(|| format!("Failed to write {}", target.display()))?;
    eprintln!("Exported to {}", target.display());
    Ok(())
}

fn report_notices(session: &mut AnnotationSession) {
    for notice in session.drain_notices() {
        eprintln!("{notice}");
    }
}
