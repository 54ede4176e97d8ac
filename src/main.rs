//! # Recruiter Sleuth CLI
//!
//! Command-line interface for the `recruiter_sleuth_core` library. Parses arguments,
//! builds the configuration, initializes the sleuth and runs one operation, a batch
//! file, or the HTTP server.

use recruiter_sleuth_core::{
    check_smtp_connectivity, initialize_sleuth, process_contacts, server, Config, ConfigBuilder,
    Contact, ContactReport, ProcessingResult, RecruiterSleuth, SubjectProfile,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Finds recruiters, job postings and contact details for a company.",
    long_about = "Recruiter Sleuth searches the public web for LinkedIn recruiter profiles and job postings, guesses and SMTP-verifies email addresses, and looks for published phone numbers."
)]
struct AppArgs {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Command,
}

/// Settings shared by every subcommand. CLI values override the config file.
#[derive(Args, Debug)]
struct SettingsArgs {
    /// Path to a configuration file (TOML format).
    #[arg(long, global = true, env = "RECRUITER_SLEUTH_CONFIG")]
    config_file: Option<String>,

    /// Search API key.
    #[arg(long, global = true, env = "GOOGLE_CUSTOM_SEARCH_API_KEY", hide_env_values = true)]
    search_api_key: Option<String>,

    /// Search engine (cx) identifier.
    #[arg(long, global = true, env = "GOOGLE_CUSTOM_SEARCH_ENGINE_ID", hide_env_values = true)]
    search_engine_id: Option<String>,

    /// Maximum number of concurrent contacts in batch mode.
    #[arg(short, long, global = true, env = "RECRUITER_SLEUTH_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Sender address used in SMTP probes; its domain is the HELO name.
    #[arg(long, global = true, env = "RECRUITER_SLEUTH_SMTP_SENDER")]
    smtp_sender: Option<String>,

    /// SMTP port to probe mail exchangers on.
    #[arg(long, global = true, env = "RECRUITER_SLEUTH_SMTP_PORT")]
    smtp_port: Option<u16>,

    /// SMTP connection/command timeout in seconds.
    #[arg(long, global = true, env = "RECRUITER_SLEUTH_SMTP_TIMEOUT")]
    smtp_timeout: Option<u64>,

    /// HTTP request timeout in seconds.
    #[arg(long, global = true, env = "RECRUITER_SLEUTH_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// DNS resolution timeout in seconds.
    #[arg(long, global = true, env = "RECRUITER_SLEUTH_DNS_TIMEOUT")]
    dns_timeout: Option<u64>,

    /// Comma-separated list of DNS servers to use for lookups.
    #[arg(long, global = true, value_delimiter = ',', env = "RECRUITER_SLEUTH_DNS_SERVERS")]
    dns_servers: Option<Vec<String>>,

    /// Write JSON output to this file instead of standard output.
    #[arg(short, long, global = true)]
    output: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search LinkedIn recruiter profiles, e.g. "Google India".
    Recruiters {
        query: String,
        #[arg(short, long)]
        max_results: Option<usize>,
    },
    /// Search job postings for a company.
    Jobs {
        company: String,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long)]
        max_results: Option<usize>,
    },
    /// Guess and SMTP-verify email addresses for a person.
    Emails {
        first_name: String,
        last_name: String,
        domain: String,
    },
    /// Email guessing and phone search together.
    Contact {
        first_name: String,
        last_name: String,
        domain: String,
        #[arg(long)]
        company: Option<String>,
    },
    /// Search published phone numbers for a person at a company.
    Phones {
        first_name: String,
        last_name: String,
        company: String,
    },
    /// Recommend recruiters for a subject profile stored as JSON.
    Recommend {
        profile: String,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long)]
        max_results: Option<usize>,
    },
    /// Run contact discovery over a JSON array of contacts.
    Batch {
        #[arg(short, long, default_value = "input.json", env = "RECRUITER_SLEUTH_INPUT")]
        input: String,
    },
    /// Serve the HTTP API.
    Serve {
        #[arg(long, env = "RECRUITER_SLEUTH_HOST")]
        host: Option<String>,
        #[arg(long, env = "PORT")]
        port: Option<u16>,
        /// Include internal error details in 500 responses.
        #[arg(long)]
        debug: bool,
    },
    /// Check outbound SMTP reachability and search configuration.
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: failed to read .env file: {}", e);
        }
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Setting up tracing subscriber failed")?;

    tracing::info!("Recruiter Sleuth CLI v{} starting...", env!("CARGO_PKG_VERSION"));

    let args = AppArgs::parse();

    let mut config_builder = settings_to_builder(&args.settings);
    if let Command::Serve { host, port, debug } = &args.command {
        if let Some(host) = host {
            config_builder = config_builder.server_host(host);
        }
        if let Some(port) = port {
            config_builder = config_builder.server_port(*port);
        }
        if *debug {
            config_builder = config_builder.debug(true);
        }
    }

    let config = match config_builder.build() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return Err(anyhow::anyhow!("Failed to build configuration: {}", e));
        }
    };
    tracing::debug!("Effective configuration loaded: {:?}", *config);

    let sleuth = Arc::new(
        initialize_sleuth(&config).context("Failed to initialize RecruiterSleuth core")?,
    );
    let output = args.settings.output.as_deref();
    let start_time = Instant::now();

    match args.command {
        Command::Recruiters { query, max_results } => {
            let limit = max_results.unwrap_or(config.default_recruiter_results);
            let outcome = sleuth.search_recruiters(&query, limit).await?;
            emit(&outcome, output)?;
        }
        Command::Jobs {
            company,
            location,
            max_results,
        } => {
            let limit = max_results.unwrap_or(config.default_job_results);
            let outcome = sleuth.search_jobs(&company, location.as_deref(), limit).await?;
            emit(&outcome, output)?;
        }
        Command::Emails {
            first_name,
            last_name,
            domain,
        } => {
            let report = sleuth.guess_emails(&first_name, &last_name, &domain).await?;
            emit(&report, output)?;
        }
        Command::Contact {
            first_name,
            last_name,
            domain,
            company,
        } => {
            let report = sleuth
                .find_contact(&first_name, &last_name, &domain, company.as_deref())
                .await?;
            match output {
                Some(path) => save_json(&report, path)?,
                None => print_contact(&first_name, &last_name, &report),
            }
        }
        Command::Phones {
            first_name,
            last_name,
            company,
        } => {
            let report = sleuth.find_phones(&first_name, &last_name, &company).await?;
            emit(&report, output)?;
        }
        Command::Recommend {
            profile,
            location,
            max_results,
        } => {
            let subject = load_profile(&profile)?;
            let matches = sleuth
                .recommend_recruiters(&subject, location.as_deref(), max_results)
                .await?;
            emit(&matches, output)?;
        }
        Command::Batch { input } => {
            let output = output.unwrap_or("results.json");
            process_file_mode(Arc::clone(&config), sleuth, &input, output, start_time).await?;
        }
        Command::Serve { .. } => {
            tracing::info!("Starting HTTP API on {}:{}", config.server_host, config.server_port);
            server::serve(&config, sleuth).await?;
        }
        Command::Doctor => run_doctor(&config).await?,
    }

    tracing::info!("Finished. Total duration: {:.2?}", start_time.elapsed());
    Ok(())
}

fn settings_to_builder(args: &SettingsArgs) -> ConfigBuilder {
    let mut config_builder = ConfigBuilder::new();

    if let Some(ref path) = args.config_file {
        config_builder = config_builder.config_file(path);
    }
    if let Some(ref key) = args.search_api_key {
        config_builder = config_builder.search_api_key(key);
    }
    if let Some(ref cx) = args.search_engine_id {
        config_builder = config_builder.search_engine_id(cx);
    }
    if let Some(c) = args.concurrency {
        config_builder = config_builder.max_concurrency(c);
    }
    if let Some(ref s) = args.smtp_sender {
        config_builder = config_builder.smtp_sender_email(s);
    }
    if let Some(port) = args.smtp_port {
        config_builder = config_builder.smtp_port(port);
    }
    if let Some(t) = args.smtp_timeout {
        config_builder = config_builder.smtp_timeout(Duration::from_secs(t));
    }
    if let Some(t) = args.request_timeout {
        config_builder = config_builder.request_timeout(Duration::from_secs(t));
    }
    if let Some(t) = args.dns_timeout {
        config_builder = config_builder.dns_timeout(Duration::from_secs(t));
    }
    if let Some(ref servers) = args.dns_servers {
        if !servers.is_empty() {
            config_builder = config_builder.dns_servers(servers.clone());
        }
    }
    config_builder
}

async fn run_doctor(config: &Config) -> Result<()> {
    let mut healthy = true;

    match check_smtp_connectivity(config).await {
        Ok(_) => tracing::info!(
            "SMTP connectivity test passed (outbound port {} likely open).",
            config.smtp_port
        ),
        Err(e) => {
            healthy = false;
            tracing::error!("SMTP connectivity test failed: {}", e);
            tracing::warn!("Email verification may fail or be unreliable.");
            tracing::warn!("Check firewall rules or ISP restrictions on outbound port {}.", config.smtp_port);
        }
    }

    if config.has_search_credentials() {
        tracing::info!("Search API credentials are configured.");
    } else {
        healthy = false;
        tracing::warn!(
            "Search API credentials missing. Set GOOGLE_CUSTOM_SEARCH_API_KEY and GOOGLE_CUSTOM_SEARCH_ENGINE_ID."
        );
    }

    if healthy {
        Ok(())
    } else {
        Err(anyhow::anyhow!("One or more checks failed"))
    }
}

async fn process_file_mode(
    config: Arc<Config>,
    sleuth: Arc<RecruiterSleuth>,
    input: &str,
    output: &str,
    start_time: Instant,
) -> Result<()> {
    tracing::info!("Running in batch mode. Input: '{}', Output: '{}'", input, output);
    let input_path = Path::new(input);
    let output_path = Path::new(output);

    if !input_path.is_file() {
        return Err(anyhow::anyhow!("Input file not found or is not a file: {}", input));
    }
    if let Some(parent_dir) = output_path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            tracing::debug!("Creating output directory: {}", parent_dir.display());
            std::fs::create_dir_all(parent_dir).with_context(|| {
                format!("Failed to create output directory '{}'", parent_dir.display())
            })?;
        }
    }

    let contacts = load_contacts(input)?;
    let total_records_loaded = contacts.len();
    if total_records_loaded == 0 {
        tracing::warn!("Input file '{}' contains no contacts. Saving empty results file.", input);
        save_json(&Vec::<ProcessingResult>::new(), output)?;
        return Ok(());
    }
    tracing::info!(
        "Starting contact discovery for {} records (Concurrency: {})...",
        total_records_loaded,
        config.max_concurrency
    );

    let pb = ProgressBar::new(total_records_loaded as u64);
    pb.set_style(ProgressStyle::default_bar()
         .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta} | {msg}")
         .context("Failed to set progress bar template")?
         .progress_chars("=> "));
    pb.set_message("Processing contacts...");

    let mut processed_results = process_contacts(Arc::clone(&config), sleuth, contacts).await;

    pb.set_position(processed_results.len() as u64);
    pb.finish_with_message(format!("Processed {} records", processed_results.len()));

    processed_results.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    save_json(&processed_results, output)?;
    tracing::info!("Results saved to '{}'.", output);

    log_summary(&processed_results, total_records_loaded, start_time.elapsed());
    Ok(())
}

fn sort_key(result: &ProcessingResult) -> (&str, &str, &str, &str) {
    let contact = &result.contact_input;
    (
        contact
            .domain
            .as_deref()
            .or(contact.company_domain.as_deref())
            .unwrap_or(""),
        contact.last_name.as_deref().unwrap_or(""),
        contact.first_name.as_deref().unwrap_or(""),
        contact.full_name.as_deref().unwrap_or(""),
    )
}

fn load_contacts(file_path: &str) -> Result<Vec<Contact>> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open input file '{}'", file_path))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| {
        format!(
            "Failed to parse JSON from '{}'. Ensure it's an array of contact objects.",
            file_path
        )
    })
}

fn load_profile(file_path: &str) -> Result<SubjectProfile> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open profile file '{}'", file_path))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse subject profile from '{}'", file_path))
}

fn emit<T: Serialize>(value: &T, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            save_json(value, path)?;
            tracing::info!("Results saved to '{}'.", path);
        }
        None => println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to serialize results")?
        ),
    }
    Ok(())
}

/// Pretty-printed JSON, truncating any existing file.
fn save_json<T: Serialize + ?Sized>(value: &T, file_path: &str) -> Result<()> {
    let file = File::create(file_path)
        .with_context(|| format!("Failed to create/truncate output file '{}'", file_path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to serialize results to JSON for '{}'", file_path))
}

fn log_summary(processed_results: &[ProcessingResult], original_total: usize, duration: Duration) {
    let attempted = processed_results.len();
    let with_email = processed_results.iter().filter(|r| r.found_email()).count();
    let with_phone = processed_results.iter().filter(|r| r.found_phone()).count();
    let skipped_input = processed_results.iter().filter(|r| r.skipped).count();
    let processing_errors = processed_results.iter().filter(|r| r.error.is_some()).count();

    tracing::info!("-------------------- Processing Summary --------------------");
    tracing::info!("Total Records in Input File : {}", original_total);
    tracing::info!("Records Processed/Attempted : {}", attempted);
    tracing::info!("  - Verified Email Found    : {}", with_email);
    tracing::info!("  - Phone Number Found      : {}", with_phone);
    tracing::info!("  - Skipped (Invalid Input) : {}", skipped_input);
    tracing::info!("  - Errors During Processing: {}", processing_errors);
    tracing::info!("Total Time Taken            : {:.2?}", duration);
    if duration.as_secs_f64() > 0.01 && attempted > 0 {
        let rate = (attempted as f64) / duration.as_secs_f64();
        tracing::info!("Processing Rate             : {:.2} records/sec", rate);
    }
    tracing::info!("----------------------------------------------------------");
}

fn print_contact(first_name: &str, last_name: &str, report: &ContactReport) {
    const BLUE: &str = "\x1b[34m";
    const GREEN: &str = "\x1b[32m";
    const YELLOW: &str = "\x1b[33m";
    const RESET: &str = "\x1b[0m";

    let email = &report.email;
    println!("\n{BLUE}===== Recruiter Sleuth Contact ====={RESET}");
    println!("Name:    {} {}", first_name, last_name);
    println!("Domain:  {}", email.domain);
    if email.domain != email.original_domain {
        println!("         (searched {} first)", email.original_domain);
    }
    if let Some(ref company) = report.company {
        println!("Company: {}", company);
    }

    if email.valid_emails.is_empty() {
        println!("\n{YELLOW}No email accepted by the mail servers{RESET} ({} patterns tested)", email.total_patterns_tested);
    } else {
        println!("\n{GREEN}Accepted emails:{RESET}");
        for address in &email.valid_emails {
            println!("- {GREEN}{}{RESET}", address);
        }
    }
    if let Some(ref message) = email.message {
        println!("Note: {}", message);
    }

    let phones = &report.phones;
    if phones.phone_numbers.is_empty() {
        println!("\n{YELLOW}No published phone numbers found{RESET}");
    } else {
        println!("\n{GREEN}Phone numbers:{RESET}");
        for number in &phones.phone_numbers {
            println!("- {}", number);
        }
    }
    println!("Search queries used: {}", phones.search_queries_used);
    println!("{BLUE}===================================={RESET}\n");
}
