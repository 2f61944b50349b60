// # recsync - declarative DNSPod record management
//
// This binary is a THIN integration layer:
// 1. Parsing the command line
// 2. Initializing logging and the runtime
// 3. Loading the config file and connecting the engine
// 4. Printing what the engine did
//
// All reconciliation logic lives in recsync-core.
//
// ## Config File
//
// ```ini
// [auth]
// login_token = 12345,0123456789abcdef
//
// [example.com]
// new = www A default 1.2.3.4, mail MX default mx.example.com. mx:10
// ftp A default 1.2.3.4 = ftp A default 5.6.7.8
// ```
//
// ## Example
//
// ```bash
// recsync dns.conf -c      # show what would change
// recsync dns.conf -a      # create, then modify
// ```
//
// ## Environment
//
// - `RECSYNC_API_BASE`: API base URL (default https://dnsapi.cn)
// - `RECSYNC_LOG_LEVEL`: trace, debug, info, warn or error (default info)

use anyhow::{Context, Result};
use clap::{Args, Parser};
use recsync_core::engine::{DomainOutcome, Mode, RunSummary, SyncEngine};
use recsync_core::reconcile::{
    Action, CreatePolicy, Enforcement, Plan, ReconcileOptions, Violation,
};
use recsync_core::traits::{ProviderDomain, ProviderRecord};
use recsync_core::SyncConfig;
use recsync_provider_dnspod::{DnspodProvider, DNSPOD_API_BASE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// Argument errors are reported by clap with its own usage status.
#[derive(Debug, Clone, Copy)]
enum RecsyncExitCode {
    /// Everything succeeded
    Success = 0,
    /// Config, provider or reconciliation failure
    Failure = 1,
}

impl From<RecsyncExitCode> for ExitCode {
    fn from(code: RecsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Manage DNSPod records from a declarative config file
#[derive(Debug, Parser)]
#[command(name = "recsync", version, about, long_about = None)]
struct Cli {
    /// Config file with an [auth] section and one section per domain
    #[arg(value_name = "CONFIGFILE")]
    configfile: PathBuf,

    #[command(flatten)]
    action: ActionArgs,

    /// Warn instead of aborting a domain when preconditions do not hold
    #[arg(long)]
    no_enforce: bool,

    /// Send create calls even for records that already exist
    #[arg(long, requires = "no_enforce")]
    always_create: bool,

    /// DNSPod API base URL
    #[arg(long, env = "RECSYNC_API_BASE", default_value = DNSPOD_API_BASE)]
    api_base: String,

    /// Log level
    #[arg(
        long,
        env = "RECSYNC_LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    log_level: String,
}

/// Exactly one operation per invocation
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct ActionArgs {
    /// Show all domains on the account
    #[arg(short = 'd', long = "show-domains")]
    show_domains: bool,

    /// Show all records of all domains
    #[arg(short = 'r', long = "show-records")]
    show_records: bool,

    /// Show what the config would change, without changing it
    #[arg(short = 'c', long = "check-action")]
    check_action: bool,

    /// Create records declared under `new` that do not exist yet
    #[arg(short = 'n', long = "new-records")]
    new_records: bool,

    /// Rewrite old records into new ones where the old exists and the new does not
    #[arg(short = 'm', long = "modify-records")]
    modify_records: bool,

    /// Create, then modify
    #[arg(short = 'a', long = "all-action")]
    all_action: bool,
}

/// What the invocation does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    ShowDomains,
    ShowRecords,
    Reconcile(Mode),
}

impl ActionArgs {
    fn command(&self) -> Command {
        if self.show_domains {
            Command::ShowDomains
        } else if self.show_records {
            Command::ShowRecords
        } else if self.check_action {
            Command::Reconcile(Mode::Preview)
        } else if self.new_records {
            Command::Reconcile(Mode::Create)
        } else if self.modify_records {
            Command::Reconcile(Mode::Modify)
        } else {
            Command::Reconcile(Mode::Apply)
        }
    }
}

impl Cli {
    fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            enforcement: if self.no_enforce {
                Enforcement::Lenient
            } else {
                Enforcement::Strict
            },
            create_policy: if self.always_create {
                CreatePolicy::AlwaysAttempt
            } else {
                CreatePolicy::SkipExisting
            },
        }
    }

    fn log_level(&self) -> Level {
        match self.log_level.as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RecsyncExitCode::Failure.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RecsyncExitCode::Failure.into();
        }
    };

    match rt.block_on(run(&cli)) {
        Ok(code) => code.into(),
        Err(e) => {
            error!("{:#}", e);
            RecsyncExitCode::Failure.into()
        }
    }
}

/// Run one invocation
async fn run(cli: &Cli) -> Result<RecsyncExitCode> {
    let config = SyncConfig::load(&cli.configfile)
        .with_context(|| format!("loading {}", cli.configfile.display()))?;
    info!("Configuration loaded: {} domain(s)", config.domains.len());

    let provider = DnspodProvider::with_base_url(&cli.api_base)?;
    let engine = SyncEngine::connect(Box::new(provider), config, cli.reconcile_options()).await?;

    match cli.action.command() {
        Command::ShowDomains => {
            for line in domain_lines(engine.domains()) {
                println!("{}", line);
            }
            Ok(RecsyncExitCode::Success)
        }
        Command::ShowRecords => {
            for (domain, records) in engine.records().await? {
                for line in record_lines(&domain, &records) {
                    println!("{}", line);
                }
            }
            Ok(RecsyncExitCode::Success)
        }
        Command::Reconcile(mode) => {
            let summary = engine.run(mode).await;
            for line in summary_lines(&summary) {
                println!("{}", line);
            }
            if summary.has_failures() {
                Ok(RecsyncExitCode::Failure)
            } else {
                Ok(RecsyncExitCode::Success)
            }
        }
    }
}

fn domain_lines(domains: &[ProviderDomain]) -> Vec<String> {
    domains
        .iter()
        .map(|d| format!("id: {} name: {}", d.id, d.name))
        .collect()
}

fn record_lines(domain: &ProviderDomain, records: &[ProviderRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            format!(
                "domain: {} name: {} type: {} line: {} value: {} status: {}",
                domain.name,
                r.name,
                r.record_type,
                r.line,
                r.value,
                if r.enabled { "enable" } else { "disable" }
            )
        })
        .collect()
}

fn plan_lines(plan: &Plan) -> Vec<String> {
    plan.actions
        .iter()
        .map(|action| match action {
            Action::Create(record) => format!("will create record: {}", record),
            Action::Modify { old, new, .. } => format!("will modify record: {} to {}", old, new),
        })
        .collect()
}

fn warning_lines(domain: &str, warnings: &[Violation]) -> Vec<String> {
    warnings
        .iter()
        .map(|w| format!("warning: domain {}: {}", domain, w))
        .collect()
}

fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for result in &summary.results {
        match &result.outcome {
            Ok(DomainOutcome::Planned(plan)) => {
                lines.extend(warning_lines(&result.domain, &plan.warnings));
                lines.extend(plan_lines(plan));
            }
            Ok(DomainOutcome::Applied(report)) => {
                lines.extend(warning_lines(&result.domain, &report.warnings));
                lines.extend(report.outcomes.iter().map(ToString::to_string));
            }
            // Already logged by the engine
            Err(_) => {}
        }
    }
    lines
}
