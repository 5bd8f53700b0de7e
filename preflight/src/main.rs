//! NTT deployment pre-flight verifier.
//!
//! `verify` runs a profile's checks and writes `report.json`; `plan` writes a
//! remediation plan as `tx-plan.md` and `tx-plan.json`. Nothing is signed or
//! submitted.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use ntt_preflight::checks::RuntimeOptions;
use ntt_preflight::checks::context::{
    DEFAULT_CONFIG_PATH, DEFAULT_EXECUTOR_CAPABILITIES_PATH, DEFAULT_EXECUTOR_HEALTH_PATH,
    DEFAULT_EXECUTOR_QUOTE_PATH, DEFAULT_MOCK_CHAIN_PATH, DEFAULT_OUTPUT_DIR,
};
use ntt_preflight::core::types::{FailOn, ProfileName};
use ntt_preflight::exit_codes;
use ntt_preflight::io::settings::{VerifierSettings, load_settings};
use ntt_preflight::logging;
use ntt_preflight::verify::{build_context, run_plan, run_verify};

#[derive(Parser)]
#[command(
    name = "ntt-preflight",
    version,
    about = "Read-only pre-flight verifier for NTT bridge deployments"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the profile's checks and write `report.json`.
    Verify(RunArgs),
    /// Write a remediation plan (`tx-plan.md`, `tx-plan.json`).
    Plan(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Deployment profile selecting the check list.
    #[arg(long, value_enum)]
    profile: ProfileName,
    /// Solana JSON-RPC endpoint.
    #[arg(long)]
    rpc_url: String,
    /// Deployment intent config.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    /// EVM JSON-RPC endpoint (accepted, currently unused).
    #[arg(long)]
    rpc_evm: Option<String>,
    /// Executor base URL; `mock://executor/...` selects canned responses with --mock-chain.
    #[arg(long)]
    executor_url: Option<String>,
    #[arg(long, default_value = DEFAULT_EXECUTOR_HEALTH_PATH)]
    executor_health_path: String,
    #[arg(long, default_value = DEFAULT_EXECUTOR_CAPABILITIES_PATH)]
    executor_capabilities_path: String,
    #[arg(long, default_value = DEFAULT_EXECUTOR_QUOTE_PATH)]
    executor_quote_path: String,
    /// Read registrations from a fixture instead of Solana RPC.
    #[arg(
        long,
        value_name = "FIXTURE",
        num_args = 0..=1,
        default_missing_value = DEFAULT_MOCK_CHAIN_PATH
    )]
    mock_chain: Option<String>,
    /// Accepted, currently unused.
    #[arg(long)]
    deep: bool,
    /// Output directory for artifacts.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,
    /// Which failures make `ci_should_fail` true.
    #[arg(long, value_enum, default_value_t = FailOn::Blocking)]
    fail_on: FailOn,
    /// Verifier settings (TOML). Built-in defaults apply when omitted.
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl RunArgs {
    fn into_parts(self) -> Result<(RuntimeOptions, VerifierSettings)> {
        let settings = match &self.settings {
            Some(path) => load_settings(path)?,
            None => VerifierSettings::default(),
        };
        let mut options = RuntimeOptions::new(self.profile, self.rpc_url);
        options.config_path = self.config;
        options.rpc_evm = self.rpc_evm;
        options.executor_url = self.executor_url;
        options.executor_health_path = self.executor_health_path;
        options.executor_capabilities_path = self.executor_capabilities_path;
        options.executor_quote_path = self.executor_quote_path;
        if let Some(path) = self.mock_chain {
            options.mock_chain = true;
            options.mock_chain_path = path;
        }
        options.deep = self.deep;
        options.output_dir = self.output;
        options.fail_on = self.fail_on;
        Ok((options, settings))
    }
}

#[tokio::main]
async fn main() {
    logging::init();
    if let Err(err) = run().await {
        eprintln!("[error] {:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

async fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            err.print()?;
            std::process::exit(exit_codes::OK);
        }
        Err(err) => return Err(err.into()),
    };
    match cli.command {
        Command::Verify(args) => cmd_verify(args).await,
        Command::Plan(args) => cmd_plan(args).await,
    }
}

async fn cmd_verify(args: RunArgs) -> Result<()> {
    let (options, settings) = args.into_parts()?;
    let ctx = build_context(options, settings)?;
    let outcome = run_verify(&ctx).await?;
    println!("{}", outcome.report.summary_line());
    println!("[verify] report written to {}", outcome.report_path.display());
    Ok(())
}

async fn cmd_plan(args: RunArgs) -> Result<()> {
    let (options, settings) = args.into_parts()?;
    let ctx = build_context(options, settings)?;
    let outcome = run_plan(&ctx).await?;
    println!(
        "[plan] tx plan written to {} and {}",
        outcome.markdown_path.display(),
        outcome.json_path.display()
    );
    Ok(())
}
