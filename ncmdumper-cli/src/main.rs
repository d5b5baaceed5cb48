use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

use ncmdumper::{DumpOptions, dump_with};

mod settings;
use settings::Settings;

#[derive(Parser)]
#[command(name = "ncmdumper", version, about = "Convert NCM files to MP3/FLAC")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decrypt NCM files to MP3/FLAC
    Dump {
        /// NCM files to convert
        files: Vec<PathBuf>,
        /// Process all NCM files in directory
        #[arg(short, long, value_name = "PATH")]
        directory: Option<PathBuf>,
        /// Recursive directory traversal (with -d)
        #[arg(short, long)]
        recursive: bool,
        /// Output directory (defaults to the configured one, else the input's)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Name outputs "<artists> - <title>.<ext>" from the embedded metadata
        #[arg(short, long)]
        titled: bool,
        /// Remove source file after successful conversion
        #[arg(short = 'm', long = "remove")]
        remove: bool,
    },
    /// Show or change persistent settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings
    Show,
    /// Set the default output directory
    SetOutput {
        /// Output directory path
        path: PathBuf,
    },
    /// Enable or disable recursive file search by default
    SetFullScan {
        /// true or false
        enabled: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Dump {
            files,
            directory,
            recursive,
            output,
            titled,
            remove,
        } => cmd_dump(files, directory.as_ref(), recursive, output, titled, remove),
        Command::Config { action } => cmd_config(action),
    }
}

// ── dump ──

fn cmd_dump(
    mut files: Vec<PathBuf>,
    directory: Option<&PathBuf>,
    recursive: bool,
    output: Option<PathBuf>,
    titled: bool,
    remove: bool,
) -> Result<()> {
    let settings = Settings::load().unwrap_or_default();
    let recursive = recursive || settings.search_full_disk;

    if let Some(dir) = directory {
        if recursive {
            for entry in WalkDir::new(dir)
                .into_iter()
                .filter_map(std::result::Result::ok)
            {
                if is_ncm(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            for entry in std::fs::read_dir(dir).context("failed to read directory")? {
                let path = entry?.path();
                if is_ncm(&path) {
                    files.push(path);
                }
            }
        }
    }

    if files.is_empty() {
        eprintln!("No NCM files specified. Use --help for usage.");
        std::process::exit(1);
    }

    let options = DumpOptions {
        titled_output: titled,
    };
    let mut failures = 0usize;

    for file in &files {
        let out_dir = output
            .clone()
            .or_else(|| settings.output_path.clone())
            .or_else(|| file.parent().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let outcome = dump_with(file, &out_dir, options);
        match (&outcome.output, outcome.code) {
            (Some(out), ncmdumper::DumpCode::Success) => {
                println!("{} -> {}", file.display(), out.display());
            }
            (Some(out), code) => {
                // Soft failure: file written, a field is missing.
                println!("{} -> {} [{}]", file.display(), out.display(), code.name());
            }
            (None, code) => {
                failures += 1;
                eprintln!("error: {}: {}", file.display(), code.name());
            }
        }
        // The source is the only remaining copy of anything the dump could
        // not decode, so soft-failure outcomes keep it too.
        if remove && should_remove(outcome.code) {
            if let Err(e) = std::fs::remove_file(file) {
                eprintln!("warning: failed to remove {}: {e}", file.display());
            }
        }
    }

    if failures == files.len() {
        std::process::exit(1);
    }
    Ok(())
}

/// `--remove` only discards the source after a fully clean conversion.
fn should_remove(code: ncmdumper::DumpCode) -> bool {
    code == ncmdumper::DumpCode::Success
}

fn is_ncm(path: &std::path::Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("ncm"))
}

// ── config ──

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            match &settings.output_path {
                Some(p) => println!("output_path:      {}", p.display()),
                None => println!("output_path:      (next to input)"),
            }
            println!("search_full_disk: {}", settings.search_full_disk);
        }
        ConfigAction::SetOutput { path } => {
            let mut settings = Settings::load().unwrap_or_default();
            settings.output_path = Some(path);
            settings.save()?;
            println!("Settings saved.");
        }
        ConfigAction::SetFullScan { enabled } => {
            let mut settings = Settings::load().unwrap_or_default();
            settings.search_full_disk = enabled;
            settings.save()?;
            println!("Settings saved.");
        }
    }
    Ok(())
}
