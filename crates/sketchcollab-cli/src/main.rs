//! SketchCollab command-line entry point.

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sketchcollab", version, about = "Work with SketchCollab scene files")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a scene: element counts, bounds and animation length.
    Info(InfoArgs),
    /// Export a scene as an SVG image.
    ExportSvg(ExportSvgArgs),
    /// Write the drawing animation as a numbered SVG sequence.
    Frames(FramesArgs),
    /// Manage saved scenes.
    #[command(subcommand)]
    Scenes(ScenesCommand),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportSvgArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Render style JSON (colors and grid).
    #[arg(long)]
    style: Option<PathBuf>,

    /// Margin around the drawing in world units.
    #[arg(long, default_value_t = 20.0)]
    padding: f64,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNNNN.svg` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Render style JSON (colors and grid).
    #[arg(long)]
    style: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ScenesCommand {
    /// List saved scenes, most recently updated first.
    List(StoreArgs),
    /// Save a scene file under a name; an existing name is updated.
    Save {
        #[command(flatten)]
        store: StoreArgs,
        /// Scene name.
        #[arg(long)]
        name: String,
        /// Input scene JSON.
        #[arg(long = "in")]
        in_path: PathBuf,
    },
    /// Write a saved scene to a file.
    Load {
        #[command(flatten)]
        store: StoreArgs,
        /// Scene id.
        #[arg(long)]
        id: String,
        /// Output scene JSON.
        #[arg(long)]
        out: PathBuf,
    },
    /// Delete a saved scene.
    Delete {
        #[command(flatten)]
        store: StoreArgs,
        /// Scene id.
        #[arg(long)]
        id: String,
    },
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Scene directory; defaults to the platform data directory.
    #[arg(long)]
    dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("{cli:?}");

    match cli.cmd {
        Command::Info(args) => {
            let info = commands::scene_info(&args.in_path)?;
            println!("{info}");
        }
        Command::ExportSvg(args) => {
            let style = commands::load_style(args.style.as_deref())?;
            commands::export_svg(&args.in_path, &args.out, style, args.padding)?;
            eprintln!("wrote {}", args.out.display());
        }
        Command::Frames(args) => {
            let style = commands::load_style(args.style.as_deref())?;
            let written = commands::write_frames(&args.in_path, &args.out_dir, args.fps, &style)?;
            eprintln!("wrote {written} frames to {}", args.out_dir.display());
        }
        Command::Scenes(cmd) => run_scenes(cmd)?,
    }
    Ok(())
}

fn run_scenes(cmd: ScenesCommand) -> anyhow::Result<()> {
    match cmd {
        ScenesCommand::List(store) => {
            let storage = commands::open_storage(store.dir)?;
            for summary in commands::list_scenes(&storage)? {
                println!("{}\t{}\t{}", summary.id, summary.updated_at, summary.name);
            }
        }
        ScenesCommand::Save {
            store,
            name,
            in_path,
        } => {
            let storage = commands::open_storage(store.dir)?;
            let record = commands::save_scene(&storage, &name, &in_path)?;
            println!("{}", record.id);
        }
        ScenesCommand::Load { store, id, out } => {
            let storage = commands::open_storage(store.dir)?;
            commands::load_scene(&storage, &id, &out)?;
            eprintln!("wrote {}", out.display());
        }
        ScenesCommand::Delete { store, id } => {
            let storage = commands::open_storage(store.dir)?;
            commands::delete_scene(&storage, &id)?;
            eprintln!("deleted {id}");
        }
    }
    Ok(())
}
