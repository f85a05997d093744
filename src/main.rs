//! CLI entry point for press-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use press_rs::Press;

#[derive(Parser)]
#[command(name = "press-rs")]
#[command(version)]
#[command(about = "A read-only publisher for content-lake articles", long_about = None)]
struct Cli {
    /// Site configuration file
    #[arg(short, long, global = true, default_value = "press.yml")]
    config: PathBuf,

    /// Serve content from a local JSON/NDJSON dataset instead of the remote store
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the page server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List site content
    List {
        /// Type of content to list (articles, categories, slugs)
        #[arg(default_value = "articles")]
        r#type: String,

        /// Page of the article listing
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show an article with related content and its rendered body
    Show {
        /// Article slug
        slug: String,
    },

    /// Render a rich-text JSON file to HTML
    Render {
        /// File holding a block array or a document with a body
        file: PathBuf,

        /// Print plain text instead of HTML
        #[arg(long)]
        plain: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "press_rs=debug,info"
    } else {
        "press_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, ip } => {
            let press = Press::load(&cli.config, cli.dataset.as_deref())?;
            press.serve(&ip, port).await?;
        }

        Commands::List { r#type, page } => {
            let press = Press::load(&cli.config, cli.dataset.as_deref())?;
            press_rs::commands::list::run(&press, &r#type, page).await?;
        }

        Commands::Show { slug } => {
            let press = Press::load(&cli.config, cli.dataset.as_deref())?;
            press_rs::commands::show::run(&press, &slug).await?;
        }

        Commands::Render { file, plain } => {
            // Rendering needs no store; images resolve against the configured project
            let config = press_rs::config::SiteConfig::load_or_default(&cli.config)?;
            let renderer = press_rs::body_renderer(&config);
            press_rs::commands::render::run(&renderer, &file, plain)?;
        }

        Commands::Version => {
            println!("press-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
