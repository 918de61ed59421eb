#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use dfir_core::config;
use dfir_core::error::ErrorCode;
use output::{CliError, OutputMode};
use std::env;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "dfir: digital FIR filing and case tracking",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Wallet account to act as (defaults to the user config, then the demo
    /// wallet).
    #[arg(long, global = true, value_name = "ADDRESS")]
    account: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize a dfir project",
        long_about = "Create .dfir/config.toml and an empty case snapshot in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    dfir init\n\n    # Rewrite the default config\n    dfir init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Complainant",
        about = "File a new FIR",
        long_about = "Validate and file a new report from the connected wallet, uploading any evidence first.",
        after_help = "EXAMPLES:\n    # File a theft report\n    dfir file --name \"Raj Kumar\" --identity 1234-5678-9012 \\\n        --address \"12 Residency Road\" --category theft --date 2024-06-08 \\\n        --time 14:30 --location \"MG Road\" --description \"Phone stolen\"\n\n    # Attach evidence\n    dfir file ... --evidence photo.jpg"
    )]
    File(cmd::file::FileArgs),

    #[command(
        next_help_heading = "Complainant",
        about = "Track a FIR",
        long_about = "Look up a FIR by ID or by the wallet address that filed it, and show its timeline.",
        after_help = "EXAMPLES:\n    # Track by FIR ID\n    dfir status FIR1717857900000\n\n    # Emit machine-readable output\n    dfir status FIR1717857900000 --json"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Admin",
        about = "Move a FIR to a later stage",
        after_help = "EXAMPLES:\n    # Start the investigation\n    dfir update FIR1717857900000 investigation"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Admin",
        about = "Assign an officer to a FIR",
        after_help = "EXAMPLES:\n    dfir assign FIR1717857900000 \"Inspector Sharma\""
    )]
    Assign(cmd::assign::AssignArgs),

    #[command(
        next_help_heading = "Admin",
        about = "List FIRs",
        after_help = "EXAMPLES:\n    # Everything, newest first\n    dfir list\n\n    # Search and filter\n    dfir list --search raj --status under-review"
    )]
    List(cmd::list::ListArgs),

    #[command(next_help_heading = "Read", about = "Show case counts")]
    Stats,

    #[command(
        next_help_heading = "Tools",
        about = "Print the display fingerprint of an identifier"
    )]
    Fingerprint(cmd::identity::FingerprintArgs),

    #[command(
        next_help_heading = "Tools",
        about = "Check an Aadhar number's format"
    )]
    ValidateId(cmd::identity::ValidateIdArgs),

    #[command(
        next_help_heading = "Project",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    dfir completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("DFIR_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "dfir=debug,info"
        } else {
            "dfir=info,warn"
        })
    });

    let format = env::var("DFIR_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user_output = config::load_user_config()
        .ok()
        .and_then(|user| user.output);
    let output = output::resolve_output_mode(cli.format, cli.json, user_output.as_deref());

    match run(&cli, output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !output::is_reported(&err) {
                let unexpected = CliError::from_code(ErrorCode::InternalUnexpected, format!("{err:#}"));
                if output::render_error(output, &unexpected).is_err() {
                    eprintln!("error: {err:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    let account = cli.account.as_deref();

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, output, &project_root),
        Commands::File(args) => cmd::file::run_file(args, account, output, &project_root).await,
        Commands::Status(args) => cmd::status::run_status(args, output, &project_root).await,
        Commands::Update(args) => {
            cmd::update::run_update(args, account, output, &project_root).await
        }
        Commands::Assign(args) => {
            cmd::assign::run_assign(args, account, output, &project_root).await
        }
        Commands::List(args) => cmd::list::run_list(args, account, output, &project_root).await,
        Commands::Stats => cmd::stats::run_stats(output, &project_root).await,
        Commands::Fingerprint(args) => cmd::identity::run_fingerprint(args, output),
        Commands::ValidateId(args) => cmd::identity::run_validate_id(args, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
