use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sandfm::{SandboxBuilder, SandboxConfig, SandboxedFileService};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Browse and edit files inside a sandbox directory
#[derive(Parser)]
#[command(name = "sandfm", version, about)]
struct Cli {
    /// Sandbox root (overrides SANDFM_ROOT and the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// TOML config file with `root` and `create_root`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print listings as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the sandbox root
    Root,
    /// List a directory (defaults to the root)
    Ls { dir: Option<PathBuf> },
    /// Print a text file
    Cat { file: PathBuf },
    /// Overwrite a file with the given text, or stdin when omitted
    Write {
        file: PathBuf,
        content: Option<String>,
    },
    /// Create a directory inside a parent
    Mkdir { parent: PathBuf, name: String },
    /// Create a file inside a parent, optionally with initial text
    Touch {
        parent: PathBuf,
        name: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Rename a file or directory
    Mv { target: PathBuf, new_name: String },
    /// Delete a file or directory (recursively)
    Rm { target: PathBuf },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let service = open_sandbox(&cli)?;
    debug!(root = %service.start_directory().display(), "sandbox opened");

    match cli.command {
        Command::Root => println!("{}", service.start_directory().display()),
        Command::Ls { dir } => {
            let dir = dir.unwrap_or_else(|| service.start_directory().to_path_buf());
            let entries = service.list(&dir)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!(
                        "{:>10}  {}  {}",
                        entry.size,
                        entry.modified.format("%Y-%m-%d %H:%M"),
                        entry
                    );
                }
            }
        }
        Command::Cat { file } => print!("{}", service.read(&file)?),
        Command::Write { file, content } => {
            let content = match content {
                Some(content) => content,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read content from stdin")?;
                    buf
                }
            };
            service.write(&file, &content)?;
        }
        Command::Mkdir { parent, name } => {
            println!("{}", service.create_directory(&parent, &name)?.display());
        }
        Command::Touch {
            parent,
            name,
            content,
        } => {
            println!("{}", service.create_file(&parent, &name, &content)?.display());
        }
        Command::Mv { target, new_name } => {
            println!("{}", service.rename(&target, &new_name)?.display());
        }
        Command::Rm { target } => service.delete(&target)?,
    }

    Ok(())
}

fn open_sandbox(cli: &Cli) -> Result<SandboxedFileService> {
    let mut config = match &cli.config {
        Some(path) => SandboxConfig::from_file(path)?,
        None => SandboxConfig::default(),
    }
    .with_env_overrides();

    if let Some(root) = &cli.root {
        config.root = root.clone();
    }

    let root = config.root.clone();
    SandboxBuilder::from_config(config)
        .build()
        .with_context(|| format!("Failed to open sandbox at {}", root.display()))
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
