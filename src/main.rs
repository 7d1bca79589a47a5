use clap::{Parser, ValueEnum};
use formgen::config::{ConfigError, FormgenConfig};
use formgen::document::{self, ImportError};
use formgen::install::{self, InstallCommand, Shell};
use formgen::{generate_artifacts, Artifacts};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Generate a React form component, zod schema and setup code from a form
/// document exported by the editor
#[derive(Parser, Debug)]
#[command(name = "formgen", version, about, long_about = None)]
struct Cli {
    /// Form document (JSON)
    input: PathBuf,

    /// Project directory to write the artifacts into (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit a single artifact
    #[arg(long, value_enum)]
    only: Option<ArtifactKind>,

    /// Print an install command for bash or powershell instead
    #[arg(long)]
    install: Option<Shell>,

    /// Configuration file (default: formgen.toml if present)
    #[arg(short, long, env = "FORMGEN_CONFIG")]
    config: Option<PathBuf>,

    /// More logging; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ArtifactKind {
    Component,
    Schema,
    Setup,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Import error: {0}")]
    Import(#[from] ImportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    let write_err = |source| CliError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn selected<'a>(artifacts: &'a Artifacts, config: &'a FormgenConfig, only: Option<ArtifactKind>) -> Vec<(&'a str, &'a str)> {
    let all = [
        (ArtifactKind::Component, config.output.component.as_str(), artifacts.component.as_str()),
        (ArtifactKind::Schema, config.output.schema.as_str(), artifacts.schema.as_str()),
        (ArtifactKind::Setup, config.output.setup.as_str(), artifacts.setup.as_str()),
    ];
    all.into_iter()
        .filter(|(kind, _, _)| only.is_none_or(|o| o == *kind))
        .map(|(_, path, text)| (path, text))
        .collect()
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = FormgenConfig::load(cli.config.as_deref())?;

    let input = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    let (model, _) = document::import(&input)?;
    let artifacts = generate_artifacts(&model, &config.codegen);

    if let Some(shell) = cli.install {
        match install::command(&artifacts, &config.output, shell, config.install.max_inline_length) {
            InstallCommand::Inline(command) => println!("{}", command),
            InstallCommand::Script {
                script_name,
                script,
                command,
            } => {
                let dir = cli.output.unwrap_or_else(|| PathBuf::from("."));
                write_file(&dir.join(&script_name), &script)?;
                println!("{}", command);
            }
        }
        return Ok(());
    }

    let files = selected(&artifacts, &config, cli.only);
    match cli.output {
        Some(dir) => {
            for (path, text) in files {
                write_file(&dir.join(path), text)?;
            }
        }
        None if files.len() == 1 => print!("{}", files[0].1),
        None => {
            for (i, (path, text)) in files.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("// {}", path);
                print!("{}", text);
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
