//! claimguard command line
//!
//! One-shot commands for scripting plus an interactive shell that drives the
//! same page flows a graphical front end would.
//!
//! # Usage
//!
//! ```bash
//! # Current time in the reference format
//! claimguard now
//!
//! # Look up a policy and score a claim against it
//! claimguard lookup POL-1001
//! claimguard predict POL-1001 --incident "2024-03-01 09:15 AM IST" --drunk no
//!
//! # Upload a dataset and show its report
//! claimguard upload claims_march.csv
//! claimguard summary claims_march
//!
//! # Parse a saved report
//! claimguard parse-report --file report.txt --json
//!
//! # Interactive shell (empty line = Enter)
//! claimguard shell
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use rustyline::error::ReadlineError;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claimguard::app::{App, KeyOutcome, Page};
use claimguard::client::HttpPredictionClient;
use claimguard::config::ClientConfig;
use claimguard::flow::{
    elapsed_hours, ClaimEdit, ClaimFlow, ClaimState, Dialog, SubmitOutcome, SummaryFlow,
    SummaryState, UploadFlow, UploadState,
};
use claimguard::keys::Key;
use claimguard::report::{self, SummaryPresentation};
use claimguard::session::Session;
use claimguard::time;
use claimguard::verdict::{Tone, VerdictCard};
use claimguard::YesNo;

#[derive(Parser)]
#[command(name = "claimguard")]
#[command(version)]
#[command(about = "Claim fraud scoring client for the Prediction Service")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML config file
    #[arg(long, global = true, env = "CLAIMGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Prediction Service base URL (overrides config and environment)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides config and environment)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current time in the reference format
    Now,

    /// Check a timestamp against now (or --now)
    CheckTime {
        text: String,

        /// Reference "now" instead of the system clock
        #[arg(long)]
        now: Option<String>,
    },

    /// Fetch and show a policy record
    Lookup { policy_id: String },

    /// Score a claim for a policy
    Predict {
        policy_id: String,

        /// Incident time, e.g. "2024-03-01 09:15 AM IST"
        #[arg(long)]
        incident: String,

        /// Override the number of previous claims
        #[arg(long)]
        previous_claims: Option<u32>,

        /// FIR filed (yes/no)
        #[arg(long)]
        fir: Option<YesNo>,

        /// Valid license (yes/no)
        #[arg(long)]
        license: Option<YesNo>,

        /// Drunk driving (yes/no)
        #[arg(long)]
        drunk: Option<YesNo>,
    },

    /// Upload a CSV dataset and show its report
    Upload { file: PathBuf },

    /// Show the report for a dataset (default report when omitted)
    Summary { dataset: Option<String> },

    /// Parse report text from a file or stdin
    ParseReport {
        /// Input file (reads stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Interactive shell
    Shell,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claimguard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Now => {
            println!("{}", time::format_now());
            return Ok(());
        }
        Commands::CheckTime { ref text, ref now } => return cmd_check_time(text, now.as_deref()),
        Commands::ParseReport { ref file } => return cmd_parse_report(file.clone(), json),
        _ => {}
    }

    let session = connect(&cli)?;
    match cli.command {
        Commands::Lookup { policy_id } => cmd_lookup(&session, &policy_id, json).await,
        Commands::Predict {
            policy_id,
            incident,
            previous_claims,
            fir,
            license,
            drunk,
        } => {
            let mut edits = vec![ClaimEdit::IncidentTime(incident)];
            edits.extend(previous_claims.map(ClaimEdit::PreviousClaims));
            edits.extend(fir.map(ClaimEdit::FirFiled));
            edits.extend(license.map(ClaimEdit::License));
            edits.extend(drunk.map(ClaimEdit::DrunkDriving));
            cmd_predict(&session, &policy_id, edits, json).await
        }
        Commands::Upload { file } => cmd_upload(&session, file, json).await,
        Commands::Summary { dataset } => cmd_summary(&session, dataset, json).await,
        Commands::Shell => cmd_shell(session).await,
        Commands::Now | Commands::CheckTime { .. } | Commands::ParseReport { .. } => Ok(()),
    }
}

/// Resolve config (file, env, flags) and build a session.
fn connect(cli: &Cli) -> Result<Session> {
    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }
    config.validate().context("Invalid configuration")?;

    let client = HttpPredictionClient::new(&config)?;
    tracing::debug!(
        base_url = %client.base_url(),
        timeout_secs = config.timeout_secs,
        "Prediction Service client ready"
    );
    Ok(Session::new(Arc::new(client), config.timeout()))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_check_time(text: &str, now: Option<&str>) -> Result<()> {
    let now = now.map(str::to_string).unwrap_or_else(time::format_now);
    let check = time::validate_not_future(text, &now);
    if check.valid {
        println!("{} {}", "OK".green().bold(), check.message);
        Ok(())
    } else {
        bail!("{}", check.message)
    }
}

fn cmd_parse_report(file: Option<PathBuf>, json: bool) -> Result<()> {
    let text = read_input(file)?;
    let parsed = report::parse_with_diagnostics(&text);
    if !parsed.missing_labels.is_empty() {
        tracing::warn!(
            missing = ?parsed.missing_labels,
            "Report is missing labels; defaulting them to zero"
        );
    }

    if json {
        let output = serde_json::json!({
            "metrics": parsed.metrics,
            "fraudRate": report::fraud_rate(&parsed.metrics),
            "missingLabels": parsed.missing_labels,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let presentation = SummaryPresentation::from_metrics(&parsed.metrics);
        print!("{}", presentation.render_text("Report"));
    }
    Ok(())
}

async fn cmd_lookup(session: &Session, policy_id: &str, json: bool) -> Result<()> {
    let flow = session.open_claim(policy_id).await;
    let ClaimState::Ready { draft, .. } = flow.state() else {
        return Err(page_error(&flow));
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&draft.record)?);
    } else {
        print_claim(&flow);
    }
    Ok(())
}

async fn cmd_predict(
    session: &Session,
    policy_id: &str,
    edits: Vec<ClaimEdit>,
    json: bool,
) -> Result<()> {
    let mut flow = session.open_claim(policy_id).await;
    if !matches!(flow.state(), ClaimState::Ready { .. }) {
        return Err(page_error(&flow));
    }
    for edit in edits {
        flow.edit(edit);
    }

    let payload = match session.submit_claim(&mut flow).await {
        SubmitOutcome::Send(payload) => payload,
        SubmitOutcome::Rejected(err) => bail!("{}: {}", err.field(), err),
        SubmitOutcome::Ignored => bail!("Claim was not submitted"),
    };
    let elapsed = elapsed_hours(&payload);

    match flow.state() {
        ClaimState::Resolved { card, .. } => {
            if json {
                let output = serde_json::json!({
                    "verdict": card,
                    "hoursSinceIncident": elapsed,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_verdict(card);
                if let Some(hours) = elapsed {
                    println!("  {:<22} {:.2}", "Hours Since Incident", hours);
                }
            }
            Ok(())
        }
        _ => Err(page_error(&flow)),
    }
}

async fn cmd_upload(session: &Session, file: PathBuf, json: bool) -> Result<()> {
    let mut flow = UploadFlow::new();
    flow.select_file(file);
    let Some(dataset) = session.upload(&mut flow).await else {
        let message = flow
            .dialog()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| "Upload did not start".to_string());
        bail!("Upload failed: {message}");
    };
    if !json {
        println!("{} Uploaded dataset {}", "OK".green().bold(), dataset.bold());
    }
    cmd_summary(session, Some(dataset), json).await
}

async fn cmd_summary(session: &Session, dataset: Option<String>, json: bool) -> Result<()> {
    let flow = session.open_summary(dataset).await;
    match flow.state() {
        SummaryState::Ready {
            report,
            presentation,
        } => {
            if json {
                let output = serde_json::json!({
                    "dataset": flow.dataset(),
                    "metrics": report.metrics,
                    "missingLabels": report.missing_labels,
                    "presentation": presentation,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", presentation.render_text(&flow.title()));
            }
            Ok(())
        }
        SummaryState::Failed { dialog } => bail!("{}", dialog.message),
        SummaryState::Loading => bail!("Summary did not load"),
    }
}

// =============================================================================
// SHELL
// =============================================================================

const SHELL_HELP: &str = "\
  <policy id>          search (home page)
  <empty line>         Enter: primary action of the visible view
  :incident <time>     set incident time (YYYY-MM-DD HH:MM AM/PM IST)
  :claims <n>          set previous claims
  :fir|:license|:drunk <yes|no>
  :upload              open the upload page
  :file <path>         choose the dataset file
  :summary [dataset]   open a summary page
  :home                back to home (Escape)
  :now                 current reference time
  :help, :quit";

async fn cmd_shell(session: Session) -> Result<()> {
    let mut app = App::new(session);
    let mut rl = rustyline::DefaultEditor::new().context("Failed to start line editor")?;

    println!("{}", "claimguard shell".bold());
    println!("{SHELL_HELP}");
    render(&app);

    loop {
        let line = match rl.readline("claimguard> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        let line = line.trim();
        if !line.is_empty() {
            let _ = rl.add_history_entry(line);
        }

        if line == ":quit" || line == ":q" {
            break;
        }
        if let Err(e) = shell_command(&mut app, line).await {
            eprintln!("{}: {}", "error".red().bold(), e);
        }
        render(&app);
    }
    Ok(())
}

async fn shell_command(app: &mut App, line: &str) -> Result<()> {
    if line.is_empty() {
        if app.press(Key::Enter).await == KeyOutcome::NeedsFile {
            println!("Choose a file with :file <path>");
        }
        return Ok(());
    }

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };
    let edited = match command {
        ":help" => {
            println!("{SHELL_HELP}");
            return Ok(());
        }
        ":now" => {
            println!("{}", app.session().clock().format_now());
            return Ok(());
        }
        ":home" => {
            app.press(Key::Escape).await;
            return Ok(());
        }
        ":upload" => {
            app.open_upload();
            return Ok(());
        }
        ":summary" => {
            let dataset = (!arg.is_empty()).then(|| arg.to_string());
            app.open_summary(dataset).await;
            return Ok(());
        }
        ":file" => {
            if arg.is_empty() {
                bail!("usage: :file <path>");
            }
            app.select_file(arg)
        }
        ":incident" => app.edit_claim(ClaimEdit::IncidentTime(arg.to_string())),
        ":claims" => {
            let n = arg.parse().context("previous claims must be a whole number")?;
            app.edit_claim(ClaimEdit::PreviousClaims(n))
        }
        ":fir" => app.edit_claim(ClaimEdit::FirFiled(arg.parse()?)),
        ":license" => app.edit_claim(ClaimEdit::License(arg.parse()?)),
        ":drunk" => app.edit_claim(ClaimEdit::DrunkDriving(arg.parse()?)),
        other if other.starts_with(':') => bail!("unknown command {other}; try :help"),
        _ => {
            if !matches!(app.page(), Page::Home) {
                bail!("search is only available on the home page (:home)");
            }
            app.set_search(line);
            app.press(Key::Enter).await;
            return Ok(());
        }
    };
    if !edited {
        bail!("nothing to edit on this page");
    }
    Ok(())
}

// =============================================================================
// RENDERING
// =============================================================================

fn render(app: &App) {
    match app.page() {
        Page::Home => println!(
            "{} enter a policy id, or :upload / :summary",
            "[home]".dimmed()
        ),
        Page::Claim(flow) => print_claim(flow),
        Page::Upload(flow) => print_upload(flow),
        Page::Summary(flow) => print_summary(flow),
    }
}

fn print_claim(flow: &ClaimFlow) {
    println!(
        "{} policy {} ({})",
        "[claim]".dimmed(),
        flow.policy_id().bold(),
        flow.phase()
    );
    if let Some(draft) = flow.draft() {
        let r = &draft.record;
        let f = &draft.form;
        println!("  {:<22} {}", "Policy Status", r.policy_status);
        println!("  {:<22} {}", "Driver Age", r.driver_age);
        println!("  {:<22} {}", "Model", r.model);
        println!("  {:<22} {}", "Fuel Type", r.fuel_type);
        println!("  {:<22} {}", "Transmission", r.transmission_type);
        let incident = if f.time_of_incident.is_empty() {
            time::FORMAT_HINT.dimmed().to_string()
        } else {
            f.time_of_incident.clone()
        };
        println!("  {:<22} {}", "Time of Incident", incident);
        if let Some(err) = flow.field_error() {
            println!("  {:<22} {}", "", err.to_string().red());
        }
        println!("  {:<22} {}", "Previous Claims", f.no_previous_claims);
        println!("  {:<22} {}", "FIR Filed", f.fir_filed);
        println!("  {:<22} {}", "License", f.license);
        println!("  {:<22} {}", "Drunk Driving", f.drunk_driving);
    }
    match flow.state() {
        ClaimState::Resolved { card, .. } => print_verdict(card),
        ClaimState::Ready {
            overlay: Some(dialog),
            ..
        }
        | ClaimState::Failed { dialog } => print_dialog(dialog),
        _ => {}
    }
}

fn print_upload(flow: &UploadFlow) {
    let status = match flow.state() {
        UploadState::Idle => "no file selected".to_string(),
        UploadState::Selected(file) => {
            format!("{} (dataset {})", file.path.display(), file.dataset)
        }
        UploadState::Uploading(file) => format!("uploading {}...", file.path.display()),
        UploadState::Uploaded { dataset } => format!("uploaded {dataset}"),
    };
    println!("{} {}", "[upload]".dimmed(), status);
    if let Some(dialog) = flow.dialog() {
        print_dialog(dialog);
    }
}

fn print_summary(flow: &SummaryFlow) {
    match flow.state() {
        SummaryState::Loading => println!("{} loading...", "[summary]".dimmed()),
        SummaryState::Ready { presentation, .. } => {
            print!("{}", presentation.render_text(&flow.title()))
        }
        SummaryState::Failed { dialog } => print_dialog(dialog),
    }
}

fn print_verdict(card: &VerdictCard) {
    println!();
    println!("  {}", paint(card.title(), card.tone));
    println!("  {}", card.genuine_line());
    println!("  {}", card.fraud_line());
    println!();
}

fn print_dialog(dialog: &Dialog) {
    println!();
    println!("  {}", paint(&dialog.title, dialog.tone));
    println!("  {}", dialog.message);
    println!("  {}", "(Enter to dismiss)".dimmed());
    println!();
}

fn paint(text: &str, tone: Tone) -> ColoredString {
    match tone {
        Tone::Green => text.green().bold(),
        Tone::Orange => text.truecolor(255, 165, 0).bold(),
        Tone::Red => text.red().bold(),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// The dialog a claim page is showing, as an error.
fn page_error(flow: &ClaimFlow) -> anyhow::Error {
    match flow.state() {
        ClaimState::Failed { dialog }
        | ClaimState::Ready {
            overlay: Some(dialog),
            ..
        } => anyhow::anyhow!("{}", dialog.message),
        other => anyhow::anyhow!("Claim page ended in {} state", other.phase()),
    }
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}
