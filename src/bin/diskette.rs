//! Diskette CLI
//!
//! List, extract, and replace-in-place operations on legacy block-chained
//! disk images.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use diskette::{extract, list, list_json, replace_and_save, Image};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "diskette", version)]
#[command(about = "Inspect, extract and patch legacy block-chained disk images")]
struct Args {
    /// Per-step tracing to standard error (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the image tree with per-file metadata
    List {
        /// Path to the disk image
        image: PathBuf,

        /// Emit rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Recursively extract the image tree to the host filesystem
    Extract {
        /// Path to the disk image
        image: PathBuf,

        /// Directory the tree is extracted into (created if missing)
        output_dir: PathBuf,
    },

    /// Overwrite a file inside the image with new content
    Replace {
        /// Path to the disk image
        image: PathBuf,

        /// Host file providing the new content
        host_file: PathBuf,

        /// Name of the file inside the image; defaults to the host file's
        /// basename
        #[arg(long)]
        name: Option<String>,

        /// Rewrite the image at its original path instead of a .new sibling
        #[arg(long)]
        in_place: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .init();
}

/// Display name of the image file, used in the listing banner.
fn image_basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::List { image, json } => {
            let img = Image::open(&image)
                .with_context(|| format!("opening image {}", image.display()))?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if json {
                list_json(&img, &mut out)?;
            } else {
                list(&img, &image_basename(&image), &mut out)?;
            }
            out.flush()?;
        }

        Command::Extract { image, output_dir } => {
            let img = Image::open(&image)
                .with_context(|| format!("opening image {}", image.display()))?;
            extract(&img, &output_dir)
                .with_context(|| format!("extracting into {}", output_dir.display()))?;
            info!(dest = %output_dir.display(), "extraction complete");
        }

        Command::Replace {
            image,
            host_file,
            name,
            in_place,
        } => {
            let target = match name {
                Some(name) => name,
                None => match host_file.file_name() {
                    Some(base) => base.to_string_lossy().into_owned(),
                    None => bail!("cannot derive a target name from {}", host_file.display()),
                },
            };

            let content = std::fs::read(&host_file)
                .with_context(|| format!("reading {}", host_file.display()))?;
            let mut img = Image::load(&image)
                .with_context(|| format!("loading image {}", image.display()))?;

            let out = replace_and_save(&mut img, &target, &content, in_place)
                .with_context(|| format!("replacing \"{target}\""))?;
            info!(name = %target, out = %out.display(), "replacement complete");
        }
    }

    Ok(())
}
