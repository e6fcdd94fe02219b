mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ocular_core::{DependencySource, MissingDependencyPolicy};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::WorkspaceOptions;

#[derive(Parser)]
#[command(name = "ocular")]
#[command(about = "Resolves the build order of packages in a JavaScript/TypeScript monorepo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory with one subdirectory per package [default: modules]
    #[arg(long, global = true)]
    modules_dir: Option<PathBuf>,

    /// Workspace config file [default: nearest ocular.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How to treat dependencies on packages outside the modules directory
    #[arg(long, value_enum, global = true)]
    missing_deps: Option<MissingDepsArg>,

    /// Where to read package dependencies from (repeatable)
    #[arg(long = "source", value_enum, global = true)]
    sources: Vec<SourceArg>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(short, long, action, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print package ids in dependency order on one line
    BuildOrder,
    /// Show packages grouped by dependency depth
    Levels {
        #[arg(long, action)]
        json: bool,
    },
    /// List discovered packages and their dependencies
    Scan {
        #[arg(long, action)]
        json: bool,
    },
    /// Show what a package depends on and what depends on it
    Why { package: String },
    /// Show packages affected by changes to the given packages
    Affected {
        #[arg(required = true)]
        packages: Vec<String>,
        #[arg(long, action)]
        json: bool,
    },
    /// Check that the packages can be ordered
    Validate {
        #[arg(long, action)]
        json: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum MissingDepsArg {
    Ignore,
    Error,
}

impl From<MissingDepsArg> for MissingDependencyPolicy {
    fn from(arg: MissingDepsArg) -> Self {
        match arg {
            MissingDepsArg::Ignore => MissingDependencyPolicy::Ignore,
            MissingDepsArg::Error => MissingDependencyPolicy::Error,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum SourceArg {
    Tsconfig,
    PackageJson,
}

impl From<SourceArg> for DependencySource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Tsconfig => DependencySource::Tsconfig,
            SourceArg::PackageJson => DependencySource::PackageJson,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        LevelFilter::ERROR
    } else {
        match cli.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // stdout carries the build order; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let options = WorkspaceOptions {
        modules_dir: cli.modules_dir,
        config: cli.config,
        missing_deps: cli.missing_deps.map(Into::into),
        sources: cli.sources.into_iter().map(Into::into).collect(),
    };

    match cli.command {
        Commands::BuildOrder => commands::cmd_build_order(&options)?,
        Commands::Levels { json } => commands::cmd_levels(&options, json)?,
        Commands::Scan { json } => commands::cmd_scan(&options, json)?,
        Commands::Why { package } => commands::cmd_why(&options, &package)?,
        Commands::Affected { packages, json } => {
            commands::cmd_affected(&options, &packages, json)?
        }
        Commands::Validate { json } => commands::cmd_validate(&options, json)?,
    }

    Ok(())
}
