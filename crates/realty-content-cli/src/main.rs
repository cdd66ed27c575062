use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use realty_content::{FetcherConfig, PostSource};
use realty_content_cli::cli;
use realty_content_cli::cli::mortgage_cmd::MortgageArgs;
use realty_content_cli::logging;

#[derive(Parser)]
#[command(
    name = "realty-content",
    about = "Blog content and site utilities for a real estate agent site",
    version,
    after_help = "Run 'realty-content <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    /// Override the WordPress REST base (else WORDPRESS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch recent posts through the source fallback chain
    Fetch {
        /// Source to use (auto, api, rss, scraping, fallback)
        #[arg(long, default_value = "auto")]
        source: PostSource,
        /// Maximum number of posts
        #[arg(long, default_value = "10")]
        max: usize,
    },
    /// Show a single post by slug
    Post {
        /// Post slug
        slug: String,
    },
    /// List posts sharing categories with a post
    Related {
        /// Post slug
        slug: String,
        /// Maximum number of related posts
        #[arg(long, default_value = "3")]
        limit: usize,
    },
    /// List every published post slug
    Slugs {
        /// Maximum number of result pages to walk
        #[arg(long, default_value = "10")]
        max_pages: u32,
    },
    /// List blog categories
    Categories {
        /// Include categories with no posts
        #[arg(long)]
        include_empty: bool,
    },
    /// Check which content sources respond
    Probe {
        /// Per-source timeout in milliseconds
        #[arg(long, default_value = "5000")]
        timeout: u64,
    },
    /// Validate JSON-LD structured data in .json or .html files
    ValidateSchema {
        /// Files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Compute a monthly mortgage payment
    Mortgage {
        /// Loan amount
        #[arg(long, conflicts_with = "price")]
        principal: Option<f64>,
        /// Purchase price (used with --down)
        #[arg(long)]
        price: Option<f64>,
        /// Down payment as a percentage of the price
        #[arg(long, default_value = "20")]
        down: f64,
        /// Annual interest rate in percent (e.g. 6.5)
        #[arg(long)]
        rate: f64,
        /// Loan term in years
        #[arg(long, default_value = "30")]
        years: u32,
        /// Print a yearly amortization schedule
        #[arg(long)]
        schedule: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Global flags travel as environment variables so every command sees them
    if cli.json {
        std::env::set_var(cli::output::JSON_VAR, "1");
    }
    if cli.quiet {
        std::env::set_var(cli::output::QUIET_VAR, "1");
    }
    logging::init(
        &logging::level_for(&cli.log_level, cli.verbose, cli.quiet),
        cli.log_json,
    );

    let mut config = FetcherConfig::from_env();
    if let Some(url) = cli.api_url.as_deref() {
        config.wordpress = config.wordpress.with_api_url(url);
    }
    tracing::debug!(
        api_url = %config.wordpress.api_url,
        rss_url = %config.rss_url,
        authenticated = config.wordpress.credentials.is_some(),
        "resolved configuration"
    );

    let result = match cli.command {
        Commands::Fetch { source, max } => cli::fetch_cmd::run(&config, source, max).await,
        Commands::Post { slug } => cli::post_cmd::run(&config.wordpress, &slug).await,
        Commands::Related { slug, limit } => cli::post_cmd::run_related(&config, &slug, limit).await,
        Commands::Slugs { max_pages } => cli::post_cmd::run_slugs(&config.wordpress, max_pages).await,
        Commands::Categories { include_empty } => {
            cli::categories_cmd::run(&config.wordpress, include_empty).await
        }
        Commands::Probe { timeout } => cli::probe_cmd::run(&config, timeout).await,
        Commands::ValidateSchema { files } => cli::schema_cmd::run(&files),
        Commands::Mortgage {
            principal,
            price,
            down,
            rate,
            years,
            schedule,
        } => cli::mortgage_cmd::run(&MortgageArgs {
            principal,
            price,
            down_percent: down,
            rate,
            years,
            schedule,
        }),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "realty-content", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else if !cli::output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
