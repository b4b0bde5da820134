mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::apply::ApplyArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "nudge",
    about = "Nudge selected feature columns by a small random delta and keep a history of every nudge",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: nearest ancestor holding .nudge/, else cwd)
    #[arg(long, global = true, env = "NUDGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .nudge/config.yaml and the history database
    Init,

    /// List the identifier, feature, and renamable columns of a CSV or .xlsx file
    Columns {
        file: PathBuf,

        /// Treat the first line as the header row
        #[arg(long)]
        no_banner: bool,
    },

    /// Apply one random adjustment to the selected columns
    Apply(ApplyArgs),

    /// Show the most recent adjustments, newest first
    History {
        /// Number of entries to show (default: history_limit from config)
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Columns { file, no_banner } => {
            cmd::columns::run(&root, &file, no_banner, cli.json)
        }
        Commands::Apply(args) => cmd::apply::run(&root, args, cli.json),
        Commands::History { limit } => cmd::history::run(&root, limit, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
