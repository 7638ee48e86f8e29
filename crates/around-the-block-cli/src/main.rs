use anyhow::{Context, Result, bail};
use around_the_block_config::Config;
use around_the_block_engine::Document;
use std::{
    env,
    path::{Path, PathBuf},
    process,
};

const USAGE: &str = "Usage: around-the-block <file> <line> [--in-place|--stdout] [--force]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    /// Whatever the config file says
    Configured,
    InPlace,
    Stdout,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    file: PathBuf,
    /// 0-based cursor line
    cursor_line: usize,
    output: Output,
    force: bool,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut positional = Vec::new();
    let mut output = Output::Configured;
    let mut force = false;

    for arg in args {
        match arg.as_str() {
            "--in-place" | "-i" => output = Output::InPlace,
            "--stdout" => output = Output::Stdout,
            "--force" | "-f" => force = true,
            flag if flag.starts_with('-') && flag.len() > 1 => bail!("Unknown option: {flag}"),
            _ => positional.push(arg),
        }
    }

    let [file, line] = positional.as_slice() else {
        bail!("Expected a file and a line number");
    };
    let line: usize = line
        .parse()
        .with_context(|| format!("Line number must be a positive integer, got {line:?}"))?;
    if line == 0 {
        bail!("Line numbers start at 1");
    }

    Ok(Args {
        file: PathBuf::from(file.as_str()),
        cursor_line: line - 1,
        output,
        force,
    })
}

/// What a successful run produced
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    text: String,
    written: bool,
    /// 1-based line to put the cursor on afterwards
    cursor_line: usize,
}

fn run(args: &Args, config: &Config) -> Result<Outcome> {
    if !args.force && !config.accepts(&args.file) {
        bail!(
            "{} does not match any configured file pattern (use --force to toggle anyway)",
            args.file.display()
        );
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let mut document = Document::from_bytes(&bytes)
        .with_context(|| format!("{} is not valid UTF-8", args.file.display()))?;

    let patch = document
        .toggle_block_at(args.cursor_line)
        .with_context(|| format!("Cannot toggle block at line {}", args.cursor_line + 1))?;
    log::info!(
        "Replaced lines {}-{} with {} line(s)",
        patch.toggled.start_line + 1,
        patch.toggled.end_line + 1,
        patch.toggled.replacement_lines.len()
    );

    let cursor_line = if patch.toggled.replacement_lines.len() == 1 {
        patch.toggled.start_line + 1
    } else {
        args.cursor_line + 1
    };

    let in_place = match args.output {
        Output::Configured => config.in_place,
        Output::InPlace => true,
        Output::Stdout => false,
    };

    let text = document.text();
    if in_place {
        if let Some(backup_dir) = &config.backup_dir {
            backup(&args.file, backup_dir)?;
        }
        std::fs::write(&args.file, &text)
            .with_context(|| format!("Failed to write {}", args.file.display()))?;
        log::info!("Wrote {}", args.file.display());
    }

    Ok(Outcome {
        text,
        written: in_place,
        cursor_line,
    })
}

fn backup(file: &Path, backup_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(backup_dir)
        .with_context(|| format!("Failed to create backup dir {}", backup_dir.display()))?;
    let file_name = file
        .file_name()
        .with_context(|| format!("{} has no file name", file.display()))?;
    let backup_path = backup_dir.join(file_name);
    std::fs::copy(file, &backup_path)
        .with_context(|| format!("Failed to back up {}", file.display()))?;
    log::info!("Backed up original to {}", backup_path.display());
    Ok(backup_path)
}

fn main() {
    // Info by default; RUST_LOG overrides
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    match run(&args, &config) {
        Ok(outcome) => {
            if !outcome.written {
                print!("{}", outcome.text);
            }
            log::info!("Cursor line: {}", outcome.cursor_line);
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
