use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tfaudit_core::audit;
use tfaudit_core::reporter::{IssueReporter, ReporterConfig};
use tfaudit_core::Error;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Audit Terraform modules for unset provider schema attributes", long_about = None)]
pub struct Opts {
    /// Path to the Terraform module under audit
    #[arg(long = "root", short = 'r', env = "TERRAFORM_ROOT", default_value = ".")]
    pub root: PathBuf,
}

pub fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tfaudit_core=info,tfaudit_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            println!("{e}");
            process::exit(1);
        }
    };

    // The audit is sequential by design; one thread is enough.
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            process::exit(1);
        }
    };

    match runtime.block_on(run(&opts)) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

/// Runs the audit and returns whether the tree came back clean.
async fn run(opts: &Opts) -> Result<bool, Error> {
    let report = audit::audit_root(&opts.root).await?;

    for finding in &report.findings {
        warn!("{finding}");
    }

    if !report.findings.is_empty() {
        match ReporterConfig::from_env() {
            Some(config) => report_findings(config, &report.findings).await,
            None => tracing::debug!("issue reporting disabled: incomplete credentials"),
        }
    }

    Ok(report.findings.is_empty() && report.submodule_failures.is_empty())
}

async fn report_findings(config: ReporterConfig, findings: &[tfaudit_core::Finding]) {
    let reporter = match IssueReporter::new(config) {
        Ok(reporter) => reporter,
        Err(e) => {
            warn!("{e}");
            return;
        }
    };
    if let Err(e) = reporter.create_or_update_issue(findings).await {
        warn!("{e}");
    }
}
