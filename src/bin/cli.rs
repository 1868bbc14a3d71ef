//! mhlw-cases CLI
//!
//! Local execution entry point. For AWS Lambda, use `mhlw-cases-crawl`
//! and `mhlw-cases-fulfillment`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mhlw_cases::{
    error::Result,
    fulfillment::{self, Intent, Locale, Turn},
    models::Config,
    pipeline::{self, CrawlSummary},
    storage::{CaseRepository, JsonDocumentStore, LocalStorage, StoreOutcome},
    utils::http::HttpSource,
};

/// mhlw-cases - COVID-19 case counts from MHLW press releases
#[derive(Parser, Debug)]
#[command(
    name = "mhlw-cases",
    version,
    about = "MHLW case-count crawler and fulfillment"
)]
struct Cli {
    /// Path to storage directory holding config and collections
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Path to config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the latest release and store its counts
    Crawl {
        /// Parse and report without storing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the latest stored release and its counts
    Latest,

    /// Answer a category question the way the voice assistant would
    Ask {
        /// Category (prefecture) name, e.g. 東京都
        category: String,

        /// Locale tag of the simulated request
        #[arg(long, default_value = "ja-JP")]
        locale: String,

        /// Simulate a device without a screen
        #[arg(long)]
        no_screen: bool,

        /// Print the webhook response body instead of the speech
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));
    let config = Config::load_or_default(&config_path);

    init_logging(cli.verbose, &config.logging.level);
    log::info!("mhlw-cases starting...");
    log::debug!("Configuration from {}", config_path.display());

    let repository = CaseRepository::new(JsonDocumentStore::new(LocalStorage::new(
        &cli.storage_dir,
    )));
    let site = &config.site;

    match cli.command {
        Command::Crawl { dry_run } => {
            config.validate()?;
            let source = HttpSource::from_config(&config.crawler)?;

            if dry_run {
                match pipeline::crawl(&source, site).await? {
                    Some(result) => {
                        println!("{} ({})", result.link.title, result.link.date);
                        for (category, count) in result.groups.counts() {
                            println!("  {category}: {count}");
                        }
                        println!("  total: {}", result.groups.total_rows());
                    }
                    None => println!("No case-count release listed this month"),
                }
                return Ok(());
            }

            match pipeline::run_crawler(&source, site, &repository).await? {
                CrawlSummary::NothingToDo => log::info!("Nothing to do"),
                CrawlSummary::Completed { link, outcome } => match outcome {
                    StoreOutcome::Stored {
                        key,
                        categories,
                        total,
                    } => log::info!(
                        "Stored {} ({}): {} categories, {} cases [{}]",
                        link.title,
                        link.date,
                        categories,
                        total,
                        key
                    ),
                    StoreOutcome::AlreadyStored { key } => {
                        log::info!("Release of {} already stored [{}]", link.date, key)
                    }
                },
            }

            log::info!("Crawl complete!");
        }

        Command::Latest => {
            let Some(link) = repository.fetch_latest_link().await? else {
                println!("No release stored yet");
                return Ok(());
            };

            println!("{} ({})", link.title, link.date);
            println!("  {}", link.url(&site.origin));
            for count in repository.fetch_category_counts(&link).await? {
                println!("  {}: {}", count.category, count.count);
            }
            if let Some(total) = repository.fetch_total(&link).await? {
                println!("  total: {total}");
            }
        }

        Command::Ask {
            category,
            locale,
            no_screen,
            json,
        } => {
            let turn = Turn {
                intent: Intent::Category(Some(category)),
                locale: Locale::from_tag(&locale),
                screen: !no_screen,
                web_browser: !no_screen,
            };
            let reply = fulfillment::respond(&repository, &turn, site.today(), &site.origin).await?;

            if json {
                let body = fulfillment::render(&reply);
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", reply.speech());
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
