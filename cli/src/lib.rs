//! Command-line access to the neighborhood vendor directory.
//!
//! `format` and `categories` work offline; every other command talks to
//! the configured backend.

mod directory_cmd;
mod format_cmd;

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use neighborly_backend::BackendConfig;
use neighborly_backend::RestBackend;
use neighborly_directory::Directory;
use tracing::debug;

pub use directory_cmd::DirectoryCommand;
pub use directory_cmd::execute;
pub use format_cmd::FormatCli;
pub use format_cmd::FormatKind;
pub use format_cmd::render_categories;

/// Config file picked up from the working directory when `--config` is
/// not given.
pub const DEFAULT_CONFIG_FILE: &str = "neighborly.toml";

#[derive(Debug, Parser)]
#[command(name = "neighborly", version, about = "Neighborhood vendor directory")]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./neighborly.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Format a value the way the directory displays it.
    Format(FormatCli),

    /// List vendor categories with their emoji and icon.
    Categories(ListArgs),

    #[command(flatten)]
    Directory(DirectoryCommand),
}

#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    let output = match cli.command {
        Command::Format(format) => format_cmd::render(&format.kind),
        Command::Categories(args) => render_categories(args.json)?,
        Command::Directory(command) => {
            let directory = open_directory(cli.config.as_deref())?;
            execute(&directory, &command).await?
        }
    };
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Build a [`Directory`] over the REST backend described by `config`,
/// falling back to [`DEFAULT_CONFIG_FILE`] and the environment.
pub fn open_directory(config: Option<&Path>) -> Result<Directory> {
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let path = config.or_else(|| default_path.exists().then_some(default_path));
    debug!("loading backend config from {path:?}");

    let config = BackendConfig::load(path)?;
    let backend = RestBackend::new(config)?;
    Ok(Directory::new(Arc::new(backend)))
}
