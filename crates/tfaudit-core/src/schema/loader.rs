//! Invokes the Terraform toolchain to obtain the provider schema catalog.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::Instant;

use crate::errors::Error;

use super::SchemaCatalog;

pub const TOOLCHAIN_BINARY: &str = "terraform";

/// Wall-clock deadline shared by `init` and the schema dump.
pub const TOOLCHAIN_DEADLINE: Duration = Duration::from_secs(60);

/// Runs `terraform init` then `terraform providers schema -json` in `dir`
/// and deserializes the captured stdout.
pub async fn load_schema(dir: &Path) -> Result<SchemaCatalog, Error> {
    let deadline = Instant::now() + TOOLCHAIN_DEADLINE;
    run_toolchain(dir, &["init"], deadline).await?;
    let output = run_toolchain(dir, &["providers", "schema", "-json"], deadline).await?;
    serde_json::from_slice(&output.stdout)
        .map_err(|source| Error::SchemaDecode { dir: dir.to_path_buf(), source })
}

async fn run_toolchain(dir: &Path, args: &[&str], deadline: Instant) -> Result<Output, Error> {
    let command = format!("{TOOLCHAIN_BINARY} {}", args.join(" "));
    let remaining = deadline.saturating_duration_since(Instant::now());

    let result = tokio::time::timeout(
        remaining,
        Command::new(TOOLCHAIN_BINARY)
            .args(args)
            .current_dir(dir)
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| Error::Toolchain {
        dir: dir.to_path_buf(),
        command: command.clone(),
        status: None,
        output: format!("deadline of {}s exceeded", TOOLCHAIN_DEADLINE.as_secs()),
    })?;

    let output = result.map_err(|e| Error::io(format!("failed to spawn `{command}`"), e))?;
    if !output.status.success() {
        return Err(Error::Toolchain {
            dir: dir.to_path_buf(),
            command,
            status: output.status.code(),
            output: combined_output(&output),
        });
    }
    Ok(output)
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}").trim().to_string()
}

/// Removes the artifacts the toolchain leaves behind in an audited
/// directory. Failures are swallowed; cleanup is best-effort on every exit
/// path.
pub fn cleanup_artifacts(dir: &Path) {
    let _ = std::fs::remove_dir_all(dir.join(".terraform"));
    let _ = std::fs::remove_file(dir.join("terraform.tfstate"));
    let _ = std::fs::remove_file(dir.join(".terraform.lock.hcl"));
}
