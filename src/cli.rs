//! CLI parsing and orchestration. Lists or searches the seed catalog, or scrapes live listings first.
//! Maps errors to exit codes.

use crate::catalog::{fetch_record, StoreCatalog, RECORD_TIMEOUT_SECS};
use crate::config::{self, Config};
use crate::model::StoreRecord;
use crate::scraper::{
    parse_site_list, Aggregate, Aggregator, HttpFetcher, RetryingFetcher, ScraperError, Site,
    SourceEvent, SourceObserver, TracingObserver, DEFAULT_TIMEOUT_SECS,
};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Output(_) => 3,
        }
    }
}

/// Output format for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "netcafe")]
#[command(about = "List, search, or scrape Tokyo internet cafe store information")]
#[command(
    after_help = "Config file keys (user_agent, timeout_secs, retry_count, retry_backoff_secs, concurrent, sources) are read from ./netcafe.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// Keyword to search in store names and addresses (case-insensitive). Omit to list all.
    pub keyword: Vec<String>,

    /// Fetch the latest store information from the chains' websites.
    #[arg(long)]
    pub scrape: bool,

    /// Comma-separated sources to scrape: kaikatsu, jiqoo, manboo (overrides config).
    #[arg(long)]
    pub sources: Option<String>,

    /// Fetch one store record as JSON from this URL and print it.
    #[arg(long, conflicts_with = "scrape")]
    pub record_url: Option<String>,

    /// Output format: text or json.
    #[arg(long, default_value = "text", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Per-source request timeout in seconds (overrides config; default 15).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Scrape sources one at a time instead of in parallel.
    #[arg(long)]
    pub sequential: bool,

    /// Suppress progress output (errors only).
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and the full error chain.
    #[arg(long)]
    pub verbose: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" | "txt" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid --format value: '{}'. Use text or json.",
            s
        )),
    }
}

/// Settings after merging CLI flags over config over defaults.
#[derive(Debug, PartialEq)]
struct Settings {
    sites: Vec<Site>,
    timeout_secs: u64,
    user_agent: Option<String>,
    retry_count: u32,
    retry_backoff_secs: Vec<u64>,
    concurrent: bool,
}

fn resolve_settings(args: &Args, config: Option<&Config>) -> Result<Settings, CliRunError> {
    const DEFAULT_RETRY_COUNT: u32 = 1;
    let config_sites = match config {
        Some(c) => c.sites().map_err(CliRunError::InvalidInput)?,
        None => None,
    };
    let flag_sites = match &args.sources {
        Some(list) => Some(parse_site_list(list).map_err(CliRunError::InvalidInput)?),
        None => None,
    };
    let sites = flag_sites
        .or(config_sites)
        .unwrap_or_else(|| Site::ALL.to_vec());
    let timeout_secs = args
        .timeout
        .or_else(|| config.and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(CliRunError::InvalidInput(
            "Timeout must be at least 1 second.".to_string(),
        ));
    }
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.and_then(|c| c.user_agent.clone()));
    let retry_count = config
        .and_then(|c| c.retry_count)
        .unwrap_or(DEFAULT_RETRY_COUNT)
        .max(1);
    let retry_backoff_secs = config
        .and_then(|c| c.retry_backoff_secs.clone())
        .unwrap_or_else(|| vec![1, 2, 4]);
    let concurrent = !args.sequential && config.and_then(|c| c.concurrent).unwrap_or(true);
    Ok(Settings {
        sites,
        timeout_secs,
        user_agent,
        retry_count,
        retry_backoff_secs,
        concurrent,
    })
}

fn build_fetcher(settings: &Settings) -> Result<RetryingFetcher<HttpFetcher>, CliRunError> {
    let mut builder = HttpFetcher::builder().timeout_secs(settings.timeout_secs);
    if let Some(ua) = &settings.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    let http = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;
    let backoff = settings
        .retry_backoff_secs
        .iter()
        .map(|&s| Duration::from_secs(s))
        .collect();
    Ok(RetryingFetcher::new(http, settings.retry_count).with_backoff(backoff))
}

/// Progress bar over sources; also forwards every event to the tracing log.
struct ProgressObserver {
    bar: indicatif::ProgressBar,
}

impl ProgressObserver {
    fn new(total: usize) -> Self {
        let bar = indicatif::ProgressBar::new(total as u64);
        if let Ok(style) =
            indicatif::ProgressStyle::default_bar().template("{spinner} {msg} [{bar:30}] {pos}/{len}")
        {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
        }
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}

impl SourceObserver for ProgressObserver {
    fn on_event(&self, event: &SourceEvent<'_>) {
        TracingObserver.on_event(event);
        match event {
            SourceEvent::Started { label, .. } => {
                self.bar.set_message(format!("Fetching {}", label));
            }
            SourceEvent::Succeeded { label, count } => {
                self.bar.println(format!("  {}: {} stores", label, count));
                self.bar.inc(1);
            }
            SourceEvent::Failed { label, .. } => {
                self.bar.println(format!("  {}: failed", label));
                self.bar.inc(1);
            }
        }
    }
}

fn scrape(args: &Args, settings: &Settings) -> Result<Aggregate, CliRunError> {
    let fetcher = build_fetcher(settings)?;
    let progress = (!args.quiet).then(|| ProgressObserver::new(settings.sites.len()));
    let observer: &dyn SourceObserver = match &progress {
        Some(p) => p,
        None => &TracingObserver,
    };
    let aggregate = Aggregator::new(fetcher)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .concurrent(settings.concurrent)
        .observer(observer)
        .run_all(&settings.sites);
    if let Some(p) = &progress {
        p.finish();
    }
    Ok(aggregate)
}

/// One record as a labeled text block.
fn format_record(record: &StoreRecord) -> String {
    format!(
        "{}\n店舗名: {}\n場所:   {}\n営業時間: {}\n電話番号: {}\nURL:    {}\n",
        "=".repeat(50),
        record.name,
        record.location,
        record.hours,
        record.phone,
        record.url
    )
}

fn write_records<W: Write>(
    out: &mut W,
    records: &[&StoreRecord],
    format: OutputFormat,
) -> Result<(), CliRunError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records).map_err(std::io::Error::from)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for record in records {
                write!(out, "{}", format_record(record))?;
            }
        }
    }
    Ok(())
}

/// A malformed `--record-url` is the caller's mistake; everything else is a fetch failure.
fn record_url_error(e: ScraperError) -> CliRunError {
    match e {
        ScraperError::InvalidUrl { input, reason } => CliRunError::InvalidInput(format!(
            "Expected an absolute http(s) record URL. Invalid: {}: {}",
            input, reason
        )),
        other => CliRunError::Scraper(other),
    }
}

/// Entry point for the CLI. Writes listings to stdout and diagnostics to stderr.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let stdout = std::io::stdout();
    run_with_output(args, &mut stdout.lock())
}

/// Same as [run] with the listing written to `out`.
pub fn run_with_output<W: Write>(args: &Args, out: &mut W) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;
    let settings = resolve_settings(args, config.as_ref())?;

    if let Some(url) = &args.record_url {
        let fetcher = build_fetcher(&settings)?;
        let record = fetch_record(&fetcher, url, Duration::from_secs(RECORD_TIMEOUT_SECS))
            .map_err(record_url_error)?;
        return write_records(out, &[&record], args.format);
    }

    let catalog = if args.scrape {
        let aggregate = scrape(args, &settings)?;
        if !aggregate.failures.is_empty() {
            eprintln!("Sources that could not be scraped:");
            for failure in &aggregate.failures {
                eprintln!("  - {}", failure);
            }
        }
        if aggregate.is_empty() {
            eprintln!("No stores scraped; using built-in sample data.");
            StoreCatalog::seeded()
        } else {
            if !args.quiet {
                eprintln!("Scraped {} stores.", aggregate.records.len());
            }
            StoreCatalog::new(aggregate.records)
        }
    } else {
        StoreCatalog::seeded()
    };

    let keyword = args.keyword.join(" ");
    let matches = catalog.search(&keyword);
    if !keyword.is_empty() && !args.quiet {
        if matches.is_empty() {
            eprintln!("No stores matched \"{}\".", keyword);
        } else {
            eprintln!("{} stores matched \"{}\":", matches.len(), keyword);
        }
    }
    write_records(out, &matches, args.format)
}
