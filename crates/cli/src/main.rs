use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokens_cli::{report, AppConfig, SyncRequest, Workspace};
use tokens_protocol::serialize_json_pretty;
use tokens_search::DEFAULT_LIMIT;

#[derive(Parser)]
#[command(name = "design-tokens")]
#[command(about = "Sync design-tool token exports into token packages and regenerate artifacts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Repository root containing packages/
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// TOML configuration (overrides DESIGN_TOKENS_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a design-tool export into the token packages
    Sync(SyncArgs),

    /// Regenerate CSS and Dart artifacts from the JSON token files
    Generate(PackageArgs),

    /// Rewrite primitive files in canonical key order
    Sort(PackageArgs),

    /// Search tokens by path or value
    Search(SearchArgs),

    /// Show one token by its dotted path
    Lookup(LookupArgs),

    /// List packages and their token files
    Packages(OutputArgs),
}

#[derive(Args)]
struct OutputArgs {
    /// Output as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SyncArgs {
    /// Design-tool export (JSON)
    #[arg(long)]
    source: PathBuf,

    /// Classify and report without writing token files or artifacts
    #[arg(long)]
    dry_run: bool,

    /// Write the full classified diff here
    #[arg(long)]
    diff_out: Option<PathBuf>,

    /// Write the change manifest here
    #[arg(long)]
    manifest_out: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct PackageArgs {
    /// Restrict to one package
    #[arg(long)]
    package: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct SearchArgs {
    query: String,

    /// color | typography | spacing | radius | other
    #[arg(long)]
    domain: Option<String>,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct LookupArgs {
    /// Dotted path, e.g. semantic.color.surface.default
    path: String,

    #[command(flatten)]
    output: OutputArgs,
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Self::Sync(args) => args.output.json,
            Self::Generate(args) | Self::Sort(args) => args.output.json,
            Self::Search(args) => args.output.json,
            Self::Lookup(args) => args.output.json,
            Self::Packages(args) => args.json,
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        print!("{}", serialize_json_pretty(value)?);
    } else {
        print!("{}", human(value));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout is reserved for JSON
    let json = cli.command.json();
    if json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = AppConfig::load(cli.config.as_deref()).await?;
    let workspace = Workspace::new(cli.root, config);

    let io_failed = match cli.command {
        Commands::Sync(args) => {
            let request = SyncRequest {
                source: args.source,
                dry_run: args.dry_run,
                diff_out: args.diff_out,
                manifest_out: args.manifest_out,
            };
            let summary = workspace.sync(&request).await?;
            emit(json, &summary, |summary| report::sync_summary("Sync complete", summary))?;
            summary.has_io_errors()
        }
        Commands::Generate(args) => {
            let summary = workspace.generate(args.package.as_deref()).await?;
            emit(json, &summary, report::generate_summary)?;
            summary.has_io_errors()
        }
        Commands::Sort(args) => {
            let summary = workspace.sort(args.package.as_deref()).await?;
            emit(json, &summary, |summary| report::sync_summary("Sort complete", summary))?;
            summary.has_io_errors()
        }
        Commands::Search(args) => {
            let response = workspace
                .search(&args.query, args.domain.as_deref(), args.limit)
                .await?;
            emit(json, &response, report::search_response)?;
            false
        }
        Commands::Lookup(args) => {
            let hit = workspace.lookup(&args.path).await?;
            emit(json, &hit, report::token_hit)?;
            false
        }
        Commands::Packages(_) => {
            let packages = workspace.packages().await?;
            emit(json, &packages, |packages| report::package_listing(packages))?;
            false
        }
    };

    if io_failed {
        eprintln!("Error: some files could not be read or written");
        std::process::exit(1);
    }
    Ok(())
}
