//! vvp-demo: walk one applicant through a verification session from the
//! command line.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use vvp_types::{Stage, WorkflowParams};
use vvp_utils::{format_duration, format_millis, LogFormat};
use vvp_workflow::{
    IdentityOutcome, IntakeForm, MobilityDecision, ProgressEvent, Session, SessionConfig,
};

#[derive(Parser)]
#[command(name = "vvp-demo", about = "Voter verification portal walkthrough")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "VVP_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VVP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VVP_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Cut every simulated delay down.
    #[arg(long, env = "VVP_FAST")]
    fast: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a session for one applicant.
    Run(Applicant),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(clap::Args)]
struct Applicant {
    #[arg(long, default_value = "Asha Rao")]
    name: String,

    #[arg(long, default_value = "1990-04-12")]
    dob: String,

    /// 12-digit national identity number.
    #[arg(long, default_value = "123456789012")]
    national_id: String,

    #[arg(long)]
    voter_id: Option<String>,

    #[arg(long, default_value = "central")]
    region: String,

    #[arg(long, default_value = "central-1")]
    sub_region: String,

    #[arg(long, default_value = "")]
    email: String,

    /// 10-digit mobile number.
    #[arg(long, default_value = "9876543210")]
    phone: String,

    /// Verification code to submit. The configured sentinel always passes.
    #[arg(long, default_value = "000000")]
    code: String,

    /// Move the registration, as "region/sub-region".
    #[arg(long)]
    relocate: Option<String>,

    /// Withhold consent (the session stops at intake).
    #[arg(long)]
    no_consent: bool,
}

impl Applicant {
    fn form(&self) -> IntakeForm {
        IntakeForm {
            full_name: self.name.clone(),
            date_of_birth: self.dob.clone(),
            national_id: self.national_id.clone(),
            voter_id: self.voter_id.clone(),
            region: self.region.clone(),
            sub_region: self.sub_region.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            consent_given: !self.no_consent,
        }
    }

    fn mobility(&self) -> anyhow::Result<MobilityDecision> {
        match self.relocate.as_deref() {
            None => Ok(MobilityDecision::Stay),
            Some(target) => {
                let (region, sub_region) = target
                    .split_once('/')
                    .with_context(|| format!("--relocate expects region/sub-region, got {target:?}"))?;
                Ok(MobilityDecision::relocate(region, sub_region))
            }
        }
    }
}

/// Rounds of fresh codes before giving up on identity.
const MAX_CODE_ROUNDS: u32 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => SessionConfig::from_toml_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if cli.fast {
        config.params = WorkflowParams::fast();
    }
    config.validate()?;

    vvp_utils::init_logging(config.log_format, &config.log_level);
    if let Some(ref path) = cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Run(applicant) => run(&config, &applicant).await,
    }
}

async fn run(config: &SessionConfig, applicant: &Applicant) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut session = Session::from_config(config);
    let printer = tokio::spawn(print_progress(session.progress()));

    session.submit_intake(&applicant.form())?;
    println!("record accepted for {}", session.record().binding);

    verify_identity(&mut session, &applicant.code).await?;
    session.run_biometrics().await?;

    let scan = session.run_duplicate_scan().await?;
    if let Some(case) = session.flagged_case() {
        println!(
            "flagged for manual review: case {} ({}% confidence)",
            case.case_id, case.confidence_score
        );
        println!("  {}", case.reason);
    } else {
        println!(
            "no duplicate found across {} partitions ({} records)",
            scan.partitions_scanned, scan.records_checked
        );
        session.decide_mobility(applicant.mobility()?).await?;
    }

    if let Some(result) = session.verification_result() {
        println!(
            "verification id {} ({:?}), constituency {}",
            result.verification_id, result.outcome, result.snapshot.binding
        );
    }
    tracing::info!(
        stage = %session.stage(),
        elapsed = %format_millis(started.elapsed().as_millis() as u64),
        "session finished"
    );

    drop(session);
    printer.await?;
    Ok(())
}

/// Send codes and submit `code` until identity passes, resending after the
/// cooldown when attempts run out.
async fn verify_identity(session: &mut Session, code: &str) -> anyhow::Result<()> {
    for round in 1..=MAX_CODE_ROUNDS {
        let wait = session.resend_available_in();
        if wait > 0 {
            println!("waiting {} before requesting a new code", format_duration(wait));
            tokio::time::sleep(Duration::from_secs(wait)).await;
        }
        session.send_code().await?;

        loop {
            match session.submit_code(code).await? {
                IdentityOutcome::Verified => return Ok(()),
                IdentityOutcome::Rejected {
                    attempts_remaining: 0,
                } => break,
                IdentityOutcome::Rejected { .. } => continue,
            }
        }
        tracing::warn!(round, "code attempts exhausted");
    }
    bail!("identity not verified after {MAX_CODE_ROUNDS} rounds of codes")
}

async fn print_progress(mut rx: tokio::sync::broadcast::Receiver<ProgressEvent>) {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(n)) => {
                tracing::debug!(skipped = n, "progress printer lagged");
                continue;
            }
            Err(RecvError::Closed) => break,
        };
        match event {
            ProgressEvent::StageEntered(stage) => {
                println!("[{}/{}] {}", stage.index() + 1, Stage::ALL.len(), stage)
            }
            ProgressEvent::CodeSent { resend_after_secs } => println!(
                "  code sent, resend available in {}",
                format_duration(resend_after_secs)
            ),
            ProgressEvent::CodeRejected { attempts_remaining } => {
                println!("  code rejected, {attempts_remaining} attempts left")
            }
            ProgressEvent::CodeAccepted => println!("  code accepted"),
            ProgressEvent::CaptureProgress { kind, progress } if progress % 50 == 0 => {
                println!("  {kind} capture {progress}%")
            }
            ProgressEvent::CaptureSucceeded { kind } => println!("  {kind} captured"),
            ProgressEvent::ScanProgress {
                partitions_scanned,
                progress,
                ..
            } if partitions_scanned % 7 == 0 => {
                println!("  scanning partitions: {partitions_scanned} ({progress}%)")
            }
            ProgressEvent::ScanFinished {
                verdict,
                confidence_score,
            } => println!("  scan finished: {verdict:?} at {confidence_score}%"),
            ProgressEvent::Relocated { binding } => println!("  moved to {binding}"),
            _ => {}
        }
    }
}
