//! entn CLI - checkpointed English→Tunisian translation scraping.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use entn::{
    Config, DebugLog, KlemyClient, RateLimiter, RetryFailedPipeline, ScrapePipeline, Translator,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "entn")]
#[command(version)]
#[command(about = "Checkpointed English-Tunisian translation scraper for the Klemy service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (compiled-in defaults are used if absent)
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the main scrape pipeline, resuming from the checkpoint
    Scrape,

    /// Replay previously failed translations through the same retry policy
    RetryFailed,

    /// Copy the input table from a given id onwards into a new file
    Split {
        /// First id to keep
        #[arg(long)]
        from_id: u64,

        /// Input table (defaults to the configured input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate the configuration file
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# entn configuration file

[service]
url = "https://klemy.qodek.net/staging"
timeout_secs = 30

[pacing]
request_delay_secs = 5.0
max_retries = 3
retry_delay_secs = 5.0

[files]
input = "eng_sentences.tsv"
# Tatoeba exports carry a language column between id and text:
# lang_filter = "eng"
pairs = "en_tn_couples.csv"
failed = "failed_translations.csv"
checkpoint = ".scraper_checkpoint.txt"
retry_log = "retry_results.csv"
debug_log = "scraper_debug.log"
"#;
    println!("{example}");
}

/// A flag the drivers poll between records. The in-flight write/checkpoint
/// sequence always finishes before the loop observes the interrupt.
fn watch_interrupt() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handle = Arc::clone(&flag);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the in-flight record");
            handle.store(true, Ordering::SeqCst);
        }
    });
    flag
}

fn build_translator(config: &Config) -> Result<Translator<KlemyClient>> {
    let client = KlemyClient::new(config.service.url.clone(), config.timeout())
        .context("Failed to build HTTP client")?;
    let limiter = RateLimiter::new(config.request_delay());
    let debug_log = DebugLog::open(&config.files.debug_log);

    Ok(Translator::new(
        client,
        limiter,
        config.pacing.max_retries,
        config.retry_delay(),
        debug_log,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
            return Ok(());
        }

        Commands::Validate => {
            let config = Config::from_file(&cli.config)
                .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
            config.validate()?;

            info!("Configuration is valid");
            info!("  Service: {}", config.service.url);
            info!(
                "  Pacing: {:.1}s between requests, {} attempts every {:.1}s",
                config.pacing.request_delay_secs,
                config.pacing.max_retries,
                config.pacing.retry_delay_secs
            );
            return Ok(());
        }

        Commands::Split {
            from_id,
            input,
            output,
        } => {
            let config = Config::load_or_default(&cli.config)?;
            let input = input.unwrap_or_else(|| config.files.input.clone());
            let written = entn::io::split_from_id(&input, &output, from_id)
                .context("Split failed")?;
            info!(rows = written, output = %output.display(), "Split complete");
            return Ok(());
        }

        Commands::Scrape => {
            let config = Config::load_or_default(&cli.config)?;
            config.validate()?;

            let translator = build_translator(&config)?;
            let interrupt = watch_interrupt();
            let mut pipeline = ScrapePipeline::new(config, translator, interrupt);
            let stats = pipeline.run().await?;

            println!("\n=== Scrape Complete ===");
            println!("Translated: {}", stats.translated);
            println!("Failed:     {}", stats.failed);
            println!("Skipped:    {}", stats.skipped);
            println!("Runtime:    {:.1}s", stats.runtime_secs);

            if stats.interrupted {
                anyhow::bail!("interrupted before the input was exhausted; run again to resume");
            }
        }

        Commands::RetryFailed => {
            let config = Config::load_or_default(&cli.config)?;
            config.validate()?;

            let translator = build_translator(&config)?;
            let interrupt = watch_interrupt();
            let mut pipeline = RetryFailedPipeline::new(config, translator, interrupt);
            let stats = pipeline.run().await?;

            println!("\n=== Retry Complete ===");
            println!("Recovered:    {}", stats.recovered);
            println!("Still failed: {}", stats.still_failed);
            println!("Runtime:      {:.1}s", stats.runtime_secs);

            if stats.interrupted {
                anyhow::bail!("interrupted before the failure rows were exhausted");
            }
        }
    }

    Ok(())
}
