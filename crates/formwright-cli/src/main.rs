//! formwright CLI
//!
//! Renders and validates declarative form schemas.

mod commands;

use clap::{Parser, Subcommand};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{RenderArgs, ScaffoldArgs, ValidateArgs};

/// Build, validate and render forms from YAML or JSON schemas.
#[derive(Parser)]
#[command(name = "formwright")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a form as HTML, JSON or XML.
    Render(RenderArgs),

    /// Validate submitted data. Exits with status 1 when invalid.
    Validate(ValidateArgs),

    /// Print a form schema describing a database table.
    Scaffold(ScaffoldArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Render(args) => {
            println!("{}", commands::render(&args)?);
        }

        Commands::Validate(args) => {
            let outcome = commands::validate(&args)?;
            println!("{}", outcome.report);
            if !outcome.valid {
                warn!("Submitted data is invalid.");
                std::process::exit(1);
            }
        }

        Commands::Scaffold(args) => {
            print!("{}", commands::scaffold(&args).await?);
        }
    }

    Ok(())
}
