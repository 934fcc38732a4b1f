//! Block Check CLI Application
//!
//! Command-line front end for block-check-lib: it resolves settings from
//! flags, environment variables, and config files, acquires the browser
//! session pool, runs one full check, and reports the outcome.

mod ui;

use async_trait::async_trait;
use block_check_lib::{
    encode_jsonl, load_env_config, merge_configs, parse_timeout_string, BlockChecker,
    BrowserSession, CheckResult, ConfigManager, FileConfig, FileProvider, FileSink, ResultSink,
    RunConfig, SheetsAuth, SheetsProvider, TargetProvider, S3Sink, WebDriverConfig,
    WebDriverSession,
};
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use futures::future::try_join_all;
use std::process;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for block-check
#[derive(Parser, Debug)]
#[command(name = "block-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check domains for content-filter blocking with browser-driven workers")]
#[command(
    long_about = "Fetch a domain list from a Google spreadsheet or a local file, check every \
domain through a fixed pool of WebDriver browser sessions, and upload the aggregated results \
as JSON Lines to S3, a file, or stdout."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Input file with targets (one `domain[,source]` per line)
    #[arg(short = 'f', long = "file", value_name = "FILE", help_heading = "Target Source")]
    pub file: Option<String>,

    /// Google spreadsheet id to read targets from
    #[arg(long = "sheet", value_name = "ID", help_heading = "Target Source")]
    pub sheet: Option<String>,

    /// Worksheet name inside the spreadsheet
    #[arg(long = "worksheet", value_name = "NAME", help_heading = "Target Source")]
    pub worksheet: Option<String>,

    /// Sheets API key (or set GOOGLE_API_KEY)
    #[arg(long = "api-key", value_name = "KEY", help_heading = "Target Source")]
    pub api_key: Option<String>,

    /// S3 bucket holding the Sheets API key object
    #[arg(long = "api-key-s3-bucket", value_name = "BUCKET", help_heading = "Target Source")]
    pub api_key_s3_bucket: Option<String>,

    /// S3 key of the Sheets API key object
    #[arg(long = "api-key-s3-key", value_name = "KEY", help_heading = "Target Source")]
    pub api_key_s3_key: Option<String>,

    /// Number of concurrent browser workers (default: 10, max: 100)
    #[arg(short = 'w', long = "workers", value_name = "N", help_heading = "Performance")]
    pub workers: Option<usize>,

    /// WebDriver endpoint URL
    #[arg(long = "webdriver", value_name = "URL", help_heading = "Browser")]
    pub webdriver: Option<String>,

    /// Per-navigation timeout (e.g. "30s", "2m")
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Browser")]
    pub timeout: Option<String>,

    /// Tag name of the content-blocked indicator element
    #[arg(long = "block-indicator", value_name = "TAG", help_heading = "Browser")]
    pub block_indicator: Option<String>,

    /// Browser label stamped into result records
    #[arg(long = "browser", value_name = "LABEL", help_heading = "Browser")]
    pub browser: Option<String>,

    /// Write results to a local JSONL file
    #[arg(short = 'o', long = "output", value_name = "FILE", help_heading = "Result Upload")]
    pub output: Option<String>,

    /// Upload results to this S3 bucket
    #[arg(long = "s3-bucket", value_name = "BUCKET", help_heading = "Result Upload")]
    pub s3_bucket: Option<String>,

    /// Upload results under this S3 key
    #[arg(long = "s3-key", value_name = "KEY", help_heading = "Result Upload")]
    pub s3_key: Option<String>,

    /// List the targets that would be checked, then exit
    #[arg(long = "dry-run", help_heading = "Configuration")]
    pub dry_run: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Where the target list comes from, after resolution.
#[derive(Debug)]
enum SourceSpec {
    File(String),
    Sheet {
        spreadsheet_id: String,
        worksheet: String,
        key: SheetKey,
    },
}

/// How the Sheets API credential is supplied.
#[derive(Debug)]
enum SheetKey {
    Inline(String),
    S3 { bucket: String, key: String },
}

/// Where the result batch goes, after resolution.
enum SinkSpec {
    File(String),
    S3 { bucket: String, key: String },
    Stdout,
}

/// Sink that prints the JSONL batch to stdout.
struct StdoutSink;

#[async_trait]
impl ResultSink for StdoutSink {
    async fn persist(&self, records: &[CheckResult]) -> block_check_lib::Result<()> {
        let body = encode_jsonl(records)?;
        if !body.is_empty() {
            println!("{}", body);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(2);
    }

    init_tracing(args.verbose);

    match run_block_check(args).await {
        Ok(persisted) => {
            if !persisted {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "block_check=debug,block_check_lib=debug"
    } else {
        "block_check=info,block_check_lib=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Validate command line arguments.
fn validate_args(args: &Args) -> Result<(), String> {
    if args.file.is_some() && args.sheet.is_some() {
        return Err("Cannot specify both --file and --sheet as the target source".to_string());
    }

    if args.output.is_some() && (args.s3_bucket.is_some() || args.s3_key.is_some()) {
        return Err("Cannot specify both --output and --s3-bucket/--s3-key".to_string());
    }

    if args.s3_bucket.is_some() != args.s3_key.is_some() {
        return Err("S3 upload needs both --s3-bucket and --s3-key".to_string());
    }

    if args.api_key_s3_bucket.is_some() != args.api_key_s3_key.is_some() {
        return Err(
            "Fetching the API key from S3 needs both --api-key-s3-bucket and --api-key-s3-key"
                .to_string(),
        );
    }

    if let Some(workers) = args.workers {
        if workers == 0 || workers > 100 {
            return Err("Worker count must be between 1 and 100".to_string());
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    Ok(())
}

/// Main checking logic. Returns whether the result batch was persisted.
async fn run_block_check(args: Args) -> Result<bool, Box<dyn std::error::Error>> {
    let config = load_layered_config(&args)?;

    let run_config = resolve_run_config(&args, &config);
    let driver_config = resolve_driver_config(&args, &config);
    let source = resolve_source(&args, &config)?;
    let sink = resolve_sink(&args, &config);

    let provider = build_provider(source).await?;

    if args.dry_run {
        let targets = provider.fetch_targets().await?;
        ui::print_dry_run(&targets);
        return Ok(true);
    }

    if args.verbose {
        eprintln!(
            "🔧 block-check v{} — {} workers via {}",
            env!("CARGO_PKG_VERSION"),
            run_config.workers,
            driver_config.endpoint
        );
    }

    // Acquire the whole session pool up front; the run owns each session
    // exclusively until every worker has finished.
    let pool = try_join_all(
        (0..run_config.workers).map(|_| WebDriverSession::connect(&driver_config)),
    )
    .await
    .map_err(|e| format!("failed to acquire browser session pool: {}", e))?;
    let sessions: Vec<Box<dyn BrowserSession>> = pool
        .into_iter()
        .map(|session| Box::new(session) as Box<dyn BrowserSession>)
        .collect();

    let checker = BlockChecker::with_config(run_config);
    let report = match sink {
        SinkSpec::File(path) => {
            checker.run(provider.as_ref(), sessions, &FileSink::new(path)).await?
        }
        SinkSpec::S3 { bucket, key } => {
            let s3 = S3Sink::new(bucket, key).await;
            checker.run(provider.as_ref(), sessions, &s3).await?
        }
        SinkSpec::Stdout => checker.run(provider.as_ref(), sessions, &StdoutSink).await?,
    };

    ui::print_run_summary(&report);
    Ok(report.persisted)
}

/// Config files (discovered or explicit), with the environment layered on
/// top. CLI flags are applied later, during resolution.
fn load_layered_config(args: &Args) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let manager = ConfigManager::new(args.verbose);
    let file_config = match &args.config {
        Some(path) => manager.load_file(path)?,
        None => manager.discover_and_load()?,
    };
    Ok(merge_configs(file_config, load_env_config()))
}

fn resolve_run_config(args: &Args, config: &FileConfig) -> RunConfig {
    let defaults = config.defaults.as_ref();
    let mut run_config = RunConfig::default();

    if let Some(workers) = args.workers.or(defaults.and_then(|d| d.workers)) {
        run_config = run_config.with_workers(workers);
    }
    if let Some(browser) = args
        .browser
        .clone()
        .or_else(|| defaults.and_then(|d| d.browser.clone()))
    {
        run_config = run_config.with_browser_label(browser);
    }

    run_config
}

fn resolve_driver_config(args: &Args, config: &FileConfig) -> WebDriverConfig {
    let defaults = config.defaults.as_ref();
    let mut driver = WebDriverConfig::default();

    if let Some(endpoint) = args
        .webdriver
        .clone()
        .or_else(|| defaults.and_then(|d| d.webdriver_url.clone()))
    {
        driver.endpoint = endpoint;
    }
    if let Some(timeout) = args
        .timeout
        .as_deref()
        .or(defaults.and_then(|d| d.nav_timeout.as_deref()))
        .and_then(parse_timeout_string)
    {
        driver.nav_timeout = timeout;
    }
    if let Some(indicator) = args
        .block_indicator
        .clone()
        .or_else(|| defaults.and_then(|d| d.block_indicator.clone()))
    {
        driver.block_indicator = indicator;
    }

    driver
}

fn resolve_source(args: &Args, config: &FileConfig) -> Result<SourceSpec, String> {
    let source = config.source.as_ref();

    if let Some(file) = args
        .file
        .clone()
        .or_else(|| source.and_then(|s| s.file.clone()))
    {
        return Ok(SourceSpec::File(file));
    }

    let spreadsheet_id = args
        .sheet
        .clone()
        .or_else(|| source.and_then(|s| s.spreadsheet_id.clone()));

    if let Some(spreadsheet_id) = spreadsheet_id {
        let worksheet = args
            .worksheet
            .clone()
            .or_else(|| source.and_then(|s| s.worksheet.clone()))
            .ok_or("A spreadsheet source needs a worksheet name (--worksheet)")?;

        let inline_key = args
            .api_key
            .clone()
            .or_else(|| source.and_then(|s| s.api_key.clone()));

        let s3_key = match (
            args.api_key_s3_bucket
                .clone()
                .or_else(|| source.and_then(|s| s.api_key_s3_bucket.clone())),
            args.api_key_s3_key
                .clone()
                .or_else(|| source.and_then(|s| s.api_key_s3_key.clone())),
        ) {
            (Some(bucket), Some(key)) => Some(SheetKey::S3 { bucket, key }),
            _ => None,
        };

        let key = match inline_key.map(SheetKey::Inline).or(s3_key) {
            Some(key) => key,
            None => {
                return Err(
                    "A spreadsheet source needs an API key (--api-key, GOOGLE_API_KEY, or \
                     --api-key-s3-bucket/--api-key-s3-key)"
                        .to_string(),
                )
            }
        };

        return Ok(SourceSpec::Sheet {
            spreadsheet_id,
            worksheet,
            key,
        });
    }

    Err("No target source configured. Use --file or --sheet (or a config file)".to_string())
}

fn resolve_sink(args: &Args, config: &FileConfig) -> SinkSpec {
    let upload = config.upload.as_ref();

    if let Some(output) = args
        .output
        .clone()
        .or_else(|| upload.and_then(|u| u.file.clone()))
    {
        return SinkSpec::File(output);
    }

    let bucket = args
        .s3_bucket
        .clone()
        .or_else(|| upload.and_then(|u| u.s3_bucket.clone()));
    let key = args
        .s3_key
        .clone()
        .or_else(|| upload.and_then(|u| u.s3_key.clone()));

    match (bucket, key) {
        (Some(bucket), Some(key)) => SinkSpec::S3 { bucket, key },
        _ => SinkSpec::Stdout,
    }
}

async fn build_provider(
    source: SourceSpec,
) -> Result<Box<dyn TargetProvider>, Box<dyn std::error::Error>> {
    match source {
        SourceSpec::File(path) => Ok(Box::new(FileProvider::new(path))),
        SourceSpec::Sheet {
            spreadsheet_id,
            worksheet,
            key,
        } => {
            let api_key = match key {
                SheetKey::Inline(key) => key,
                SheetKey::S3 { bucket, key } => {
                    SheetsProvider::api_key_from_s3(&bucket, &key).await?
                }
            };

            Ok(Box::new(SheetsProvider::new(
                spreadsheet_id,
                worksheet,
                SheetsAuth::ApiKey(api_key),
            )?))
        }
    }
}
