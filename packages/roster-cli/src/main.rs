use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roster::{Config, JoinPolicy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod context;
mod dialog;
mod edit;
mod policy;
mod render;

use context::AppContext;

#[derive(Parser)]
#[command(name = "roster-admin")]
#[command(about = "Review and bulk-edit an organization's membership roster")]
struct Cli {
    /// Organization slug (defaults to ROSTER_ORG_SLUG)
    #[arg(long, global = true)]
    org: Option<String>,

    /// Skip confirmations and decorative output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current roster
    List,
    /// Open an interactive edit session
    Edit,
    /// Apply a join-policy change to pending requests
    Policy {
        /// Policy before the change (OPEN, APPLY, CLOSED)
        from: JoinPolicy,
        /// Policy after the change
        to: JoinPolicy,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,roster=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(org) = cli.org {
        config.org_slug = org;
    }

    let ctx = AppContext::new(config, cli.quiet);

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => {
            let store = ctx.load_roster().await?;
            render::print_roster(&store.snapshot());
        }
        Commands::Edit => edit::run(&ctx).await?,
        Commands::Policy { from, to } => policy::run(&ctx, from, to).await?,
    }

    Ok(())
}
