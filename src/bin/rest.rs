//! Rest CLI - Command-line interface for BetterRest
//!
//! Commands:
//! - estimate: Recommended bedtime for one set of form values
//! - sweep: Bedtime for every desired-sleep value the form offers
//! - format: Duration label for a fractional hour count
//! - doctor: Check the model artifact and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use better_rest::config::{EstimatorConfig, InputPolicy};
use better_rest::estimator::BedtimeEstimator;
use better_rest::formatter::{DurationFormatter, PluralRule};
use better_rest::model::{ArtifactPredictor, LinearSleepModel, MODEL_FORMAT_VERSION};
use better_rest::presentation::{cups_label, Alert};
use better_rest::report::{EstimateReport, EstimateRequest, ReportEncoder, ReportOutcome};
use better_rest::types::WakeTime;
use better_rest::{PRODUCER_NAME, REST_VERSION};

/// Rest - Bedtime estimation from wake time, sleep goal and coffee intake
#[derive(Parser)]
#[command(name = "rest")]
#[command(author = "BetterRest Contributors")]
#[command(version = REST_VERSION)]
#[command(about = "Estimate a recommended bedtime", long_about = None)]
struct Cli {
    /// Log estimation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommended bedtime for one set of form values
    Estimate {
        /// Wake-up time (HH:MM or H:MM AM/PM)
        #[arg(short, long)]
        wake: Option<WakeTime>,

        /// Desired sleep in hours
        #[arg(short, long)]
        sleep: Option<f64>,

        /// Cups of coffee per day
        #[arg(short, long)]
        coffee: Option<i64>,

        /// Sleep model artifact
        #[arg(short, long, default_value = "models/sleep_hours.json")]
        model: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },

    /// Bedtime for every desired-sleep value the form offers
    Sweep {
        /// Wake-up time (HH:MM or H:MM AM/PM)
        #[arg(short, long)]
        wake: Option<WakeTime>,

        /// Cups of coffee per day
        #[arg(short, long)]
        coffee: Option<i64>,

        /// Sleep model artifact
        #[arg(short, long, default_value = "models/sleep_hours.json")]
        model: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },

    /// Duration label for a fractional hour count
    Format {
        hours: f64,

        /// Pluralization rule
        #[arg(long, value_enum, default_value = "legacy")]
        plural_rule: PluralRuleArg,
    },

    /// Check the model artifact and configuration
    Doctor {
        /// Sleep model artifact
        #[arg(short, long, default_value = "models/sleep_hours.json")]
        model: PathBuf,

        /// Estimator config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct Settings {
    /// Estimator config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to do with out-of-range input
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Pluralization rule for duration labels
    #[arg(long, value_enum)]
    plural_rule: Option<PluralRuleArg>,

    /// Output as JSON (default when stdout is not a terminal)
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Pull values into range
    Clamp,
    /// Fail on out-of-range values
    Reject,
}

impl From<PolicyArg> for InputPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Clamp => InputPolicy::Clamp,
            PolicyArg::Reject => InputPolicy::Reject,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PluralRuleArg {
    /// Singular for 1, 21, 31, ... but not 11
    Legacy,
    /// Singular for 1 only
    English,
}

impl From<PluralRuleArg> for PluralRule {
    fn from(arg: PluralRuleArg) -> Self {
        match arg {
            PluralRuleArg::Legacy => PluralRule::Legacy,
            PluralRuleArg::English => PluralRule::English,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), RestCliError> {
    match cli.command {
        Commands::Estimate {
            wake,
            sleep,
            coffee,
            model,
            settings,
        } => cmd_estimate(wake, sleep, coffee, &model, &settings),

        Commands::Sweep {
            wake,
            coffee,
            model,
            settings,
        } => cmd_sweep(wake, coffee, &model, &settings),

        Commands::Format { hours, plural_rule } => {
            println!("{}", DurationFormatter::new(plural_rule.into()).format(hours));
            Ok(())
        }

        Commands::Doctor {
            model,
            config,
            json,
        } => cmd_doctor(&model, config.as_deref(), json),
    }
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(settings: &Settings) -> Result<EstimatorConfig, RestCliError> {
    let mut config = match &settings.config {
        Some(path) => EstimatorConfig::from_path(path)?,
        None => EstimatorConfig::default(),
    };

    if let Some(policy) = settings.policy {
        config.input_policy = policy.into();
    }
    if let Some(rule) = settings.plural_rule {
        config.plural_rule = rule.into();
    }

    Ok(config)
}

fn wants_json(settings: &Settings) -> bool {
    settings.json || !atty::is(atty::Stream::Stdout)
}

fn cmd_estimate(
    wake: Option<WakeTime>,
    sleep: Option<f64>,
    coffee: Option<i64>,
    model: &Path,
    settings: &Settings,
) -> Result<(), RestCliError> {
    let config = load_config(settings)?;
    let request = EstimateRequest {
        wake_time: wake.unwrap_or(config.defaults.wake_time),
        sleep_hours: sleep.unwrap_or(config.defaults.sleep_hours),
        coffee_cups: coffee.unwrap_or(i64::from(config.defaults.coffee_cups)),
    };

    let estimator = BedtimeEstimator::with_config(ArtifactPredictor::new(model), config)?;
    let encoder = ReportEncoder::new(estimator.formatter());

    let result =
        estimator.estimate_detailed(request.wake_time, request.sleep_hours, request.coffee_cups);
    let report = encoder.encode(request, &result);

    if wants_json(settings) {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let alert = Alert::from_result(&result.map(|estimate| estimate.bedtime));
        println!("{}", alert.title);
        println!("{}", alert.message);
    }

    ensure_ok(&report)
}

fn cmd_sweep(
    wake: Option<WakeTime>,
    coffee: Option<i64>,
    model: &Path,
    settings: &Settings,
) -> Result<(), RestCliError> {
    let config = load_config(settings)?;
    let wake_time = wake.unwrap_or(config.defaults.wake_time);
    let coffee_cups = coffee.unwrap_or(i64::from(config.defaults.coffee_cups));
    let hours_range = config.sleep_hours;
    let accepted_cups = config.coffee_cups.clamp(coffee_cups);

    // Loaded once for the whole sweep; an unreadable artifact fails up front
    let model = LinearSleepModel::from_path(model)?;
    let estimator = BedtimeEstimator::with_config(model, config)?;
    let encoder = ReportEncoder::new(estimator.formatter());
    let formatter = estimator.formatter();

    let reports: Vec<EstimateReport> = hours_range
        .values()
        .map(|sleep_hours| {
            let request = EstimateRequest {
                wake_time,
                sleep_hours,
                coffee_cups,
            };
            let result = estimator.estimate_detailed(wake_time, sleep_hours, coffee_cups);
            encoder.encode(request, &result)
        })
        .collect();

    if wants_json(settings) {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("Wake up at {wake_time}, {}", cups_label(accepted_cups));
        println!();
        for report in &reports {
            let label = formatter.format(report.request.sleep_hours);
            match &report.outcome {
                ReportOutcome::Ok { display, .. } => println!("  {label:<22} {display}"),
                ReportOutcome::Error { message, .. } => println!("  {label:<22} {message}"),
            }
        }
    }

    reports.iter().try_for_each(ensure_ok)
}

fn ensure_ok(report: &EstimateReport) -> Result<(), RestCliError> {
    match &report.outcome {
        ReportOutcome::Ok { .. } => Ok(()),
        ReportOutcome::Error { reason, .. } => Err(RestCliError::PredictionFailed(reason.clone())),
    }
}

fn cmd_doctor(model: &Path, config: Option<&Path>, json: bool) -> Result<(), RestCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "rest_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("BetterRest version {}", REST_VERSION),
    });

    checks.push(DoctorCheck {
        name: "model_format".to_string(),
        status: CheckStatus::Ok,
        message: format!("Supported model format: v{}", MODEL_FORMAT_VERSION),
    });

    // Check model artifact
    let model_check = if !model.exists() {
        DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Error,
            message: format!("Model artifact {} does not exist", model.display()),
        }
    } else {
        match LinearSleepModel::from_path(model) {
            Ok(m) => DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Ok,
                message: format!("Model '{}' loaded from {}", m.name, model.display()),
            },
            Err(e) => DoctorCheck {
                name: "model".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        }
    };
    checks.push(model_check);

    // Check config file if provided
    if let Some(config_path) = config {
        let config_check = match EstimatorConfig::from_path(config_path) {
            Ok(c) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid (sleep {}..={} h, coffee {}..={} cups)",
                    c.sleep_hours.min, c.sleep_hours.max, c.coffee_cups.min, c.coffee_cups.max
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        };
        checks.push(config_check);
    } else {
        checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "No config file given, using form defaults".to_string(),
        });
    }

    let tty_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (human-readable output)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a pipe (JSON output)".to_string(),
        }
    };
    checks.push(tty_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: REST_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Rest Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(RestCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum RestCliError {
    Model(better_rest::ModelError),
    Config(better_rest::ConfigError),
    Json(serde_json::Error),
    PredictionFailed(String),
    DoctorFailed,
}

impl From<better_rest::ModelError> for RestCliError {
    fn from(e: better_rest::ModelError) -> Self {
        RestCliError::Model(e)
    }
}

impl From<better_rest::ConfigError> for RestCliError {
    fn from(e: better_rest::ConfigError) -> Self {
        RestCliError::Config(e)
    }
}

impl From<serde_json::Error> for RestCliError {
    fn from(e: serde_json::Error) -> Self {
        RestCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RestCliError> for CliError {
    fn from(e: RestCliError) -> Self {
        match e {
            RestCliError::Model(e) => CliError {
                code: "MODEL_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'rest doctor' to check the model artifact".to_string()),
            },
            RestCliError::Config(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the config file syntax and ranges".to_string()),
            },
            RestCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            RestCliError::PredictionFailed(reason) => CliError {
                code: "PREDICTION_FAILED".to_string(),
                message: format!("Could not calculate the bedtime: {}", reason),
                hint: Some("Run 'rest doctor' to check the model artifact".to_string()),
            },
            RestCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
