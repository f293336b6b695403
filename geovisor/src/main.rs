//! Point d'entrée CLI pour geovisor

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Charger les couches GeoServer, rechercher et s'inscrire sur une station
#[derive(Parser)]
#[command(name = "geovisor")]
#[command(author, version)]
#[command(about = "Visualiseur GeoServer: couches WFS, recherche et inscription sur les stations")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Layers {
            layer,
            preset,
            sequential,
            output,
            report,
            server,
        } => {
            info!(preset = %preset, layers = layer.len(), "Loading layers");
            cli::cmd_layers(
                &layer,
                &preset,
                sequential,
                output.as_deref(),
                report.as_deref(),
                server,
            )
            .await?;
        }
        Commands::Search { term, all, server } => {
            info!(term = %term, "Searching station");
            cli::cmd_search(&term, all, server).await?;
        }
        Commands::Register(args) => {
            info!(email = %args.email, "Registering at station");
            cli::cmd_register(args).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
