//! Orchestration for `ntt-preflight verify` and `ntt-preflight plan`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::checks::{CheckContext, RuntimeOptions};
use crate::engine::run_check_lifecycle;
use crate::io::adapters::create_adapters;
use crate::io::artifacts::{REPORT_FILE, artifact_path, write_json};
use crate::io::settings::VerifierSettings;
use crate::io::source::now_timestamp;
use crate::plan::{TxPlan, build_from_results, build_skeleton, write_tx_plan_artifacts};
use crate::registry::profile_checks;
use crate::report::VerifyReport;

/// Report of a finished `verify` and where it was written.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub report: VerifyReport,
    pub report_path: PathBuf,
}

/// Plan of a finished `plan` and where it was written.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: TxPlan,
    pub markdown_path: PathBuf,
    pub json_path: PathBuf,
}

/// Context with the production adapters.
pub fn build_context(options: RuntimeOptions, settings: VerifierSettings) -> Result<CheckContext> {
    let adapters = create_adapters(&options.rpc_url, &settings)?;
    if options.rpc_evm.is_some() {
        debug!("--rpc-evm accepted; no check reads EVM state");
    }
    if options.deep {
        debug!("--deep accepted; no deep checks are registered");
    }
    Ok(CheckContext {
        options,
        adapters,
        settings,
    })
}

/// Run the profile's checks and write `report.json`.
///
/// Every profile needs a readable config file; without one nothing runs.
#[instrument(skip_all, fields(profile = %ctx.options.profile))]
pub async fn run_verify(ctx: &CheckContext) -> Result<VerifyOutcome> {
    let options = &ctx.options;
    let read = ctx.adapters.config_source.read_config(&options.config_path).await;
    if let Err(failure) = read.outcome {
        bail!(
            "Required config precondition failed for profile {}: {} ({}) - {}",
            options.profile,
            failure.reason_code,
            options.config_path,
            failure.details
        );
    }

    let checks = profile_checks(options.profile);
    let results = run_check_lifecycle(ctx, &checks)
        .await
        .context("run verification checks")?;
    let report = VerifyReport::new(now_timestamp(), options.profile, options.fail_on, results);
    let report_path = artifact_path(&options.output_dir, REPORT_FILE);
    write_json(&report_path, &report)?;
    info!(
        report = %report_path.display(),
        ci_should_fail = report.summary.ci_should_fail,
        "verify finished"
    );
    Ok(VerifyOutcome {
        report,
        report_path,
    })
}

/// Write `tx-plan.md` and `tx-plan.json`.
///
/// Checks run only with `--mock-chain`; otherwise the plan is a skeleton.
#[instrument(skip_all, fields(profile = %ctx.options.profile, mock_chain = ctx.options.mock_chain))]
pub async fn run_plan(ctx: &CheckContext) -> Result<PlanOutcome> {
    let options = &ctx.options;
    let plan = if options.mock_chain {
        let checks = profile_checks(options.profile);
        let results = run_check_lifecycle(ctx, &checks)
            .await
            .context("run plan checks")?;
        build_from_results(now_timestamp(), options.profile, &results)
    } else {
        build_skeleton(now_timestamp(), options.profile)
    };
    let (markdown_path, json_path) = write_tx_plan_artifacts(&options.output_dir, &plan)?;
    debug!(steps = plan.steps.len(), "plan written");
    Ok(PlanOutcome {
        plan,
        markdown_path,
        json_path,
    })
}
