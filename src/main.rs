//! CLI entry point for showcase-rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "showcase-rs")]
#[command(version)]
#[command(about = "A portfolio and blog site rendered from a headless content store", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every page into the public folder
    #[command(alias = "g")]
    Generate,

    /// Serve pages live, re-rendering them periodically
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Clean the public folder
    Clean,

    /// List content from the store
    List {
        /// Type of content to list (post, project, team)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "showcase_rs=debug,tower_http=debug,info"
    } else {
        "showcase_rs=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot read current directory")?,
    };

    match cli.command {
        Commands::Generate => {
            let site = showcase_rs::Site::new(&base_dir)?;
            tracing::info!("Generating static files...");
            let written = site.generate().await?;
            println!("Generated {} pages into {:?}", written, site.public_dir);
        }

        Commands::Server { port, ip } => {
            let site = showcase_rs::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            showcase_rs::server::start(&site, &ip, port).await?;
        }

        Commands::Clean => {
            let site = showcase_rs::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = showcase_rs::Site::new(&base_dir)?;
            showcase_rs::commands::list::run(&site, &r#type).await?;
        }

        Commands::Version => {
            println!("showcase-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
