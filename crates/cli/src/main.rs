mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mention-kit")]
#[command(version, about = "Webmention cache tooling for static blogs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Initialize new site directory
    Init {
        /// Path to create site directory
        path: PathBuf,
    },

    /// Validate site configuration
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Fetch webmentions from the aggregator and refresh the cache
    Fetch {
        /// Path to site directory
        path: PathBuf,

        /// Ignore lastFetched and pull the full mention history
        #[arg(long)]
        full: bool,
    },

    /// Show webmention cache statistics
    Status {
        /// Path to site directory
        path: PathBuf,
    },

    /// Print the heading outline of each markdown file
    Toc {
        /// Path to content directory
        path: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init { path } => commands::init::run(path).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Fetch { path, full } => commands::fetch::run(path, full).await,
        Command::Status { path } => commands::status::run(path).await,
        Command::Toc { path } => commands::toc::run(path).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "mention-kit", &mut io::stdout());
            Ok(())
        }
    }
}
