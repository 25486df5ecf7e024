//! Shell invocation for the operator-supplied directory scripts.

use std::path::Path;
use std::process::Output;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{DirectoryError, DirectoryResult};

/// Execution-policy values that prevent script execution outright.
const BLOCKING_POLICIES: &[&str] = &["Restricted", "Undefined"];

/// The shell that runs directory scripts.
///
/// Defaults to PowerShell with `-File` dispatch; tests and non-Windows
/// deployments substitute a plain POSIX shell.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptShell {
    /// Shell program.
    pub program: String,
    /// Arguments placed before the script path.
    #[serde(default)]
    pub leading_args: Vec<String>,
}

impl Default for ScriptShell {
    fn default() -> Self {
        Self {
            program: "powershell.exe".to_string(),
            leading_args: vec!["-NoProfile".to_string(), "-File".to_string()],
        }
    }
}

impl ScriptShell {
    /// A POSIX `sh` shell, for tests and non-Windows use.
    #[must_use]
    pub fn sh() -> Self {
        Self {
            program: "sh".to_string(),
            leading_args: Vec::new(),
        }
    }

    /// Run a script with extra arguments and capture its output.
    /// Non-zero exit becomes `ScriptFailed` with the captured stderr.
    pub async fn run(&self, script: &Path, args: &[String]) -> DirectoryResult<Output> {
        let script_name = script.display().to_string();
        debug!(shell = %self.program, script = %script_name, "running directory script");

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(script)
            .args(args)
            .output()
            .await
            .map_err(|source| DirectoryError::Launch {
                script: script_name.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DirectoryError::ScriptFailed {
                script: script_name,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Check the shell's execution policy before running anything.
    ///
    /// PowerShell deployments commonly fail here rather than at the first
    /// script, so the preflight produces a pointed error.
    pub async fn verify_execution_policy(&self) -> DirectoryResult<()> {
        let output = Command::new(&self.program)
            .args(["-Command", "Get-ExecutionPolicy"])
            .output()
            .await
            .map_err(|source| DirectoryError::Launch {
                script: "Get-ExecutionPolicy".to_string(),
                source,
            })?;

        let policy = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if BLOCKING_POLICIES.contains(&policy.as_str()) {
            return Err(DirectoryError::ExecutionPolicy { policy });
        }
        debug!(policy = %policy, "execution policy verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{body}").unwrap();
        path
    }

    #[tokio::test]
    async fn test_successful_script_output_captured() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "ok.sh", "echo hello");

        let output = ScriptShell::sh().run(&script, &[]).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn test_failing_script_captures_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "fail.sh", "echo broken >&2; exit 3");

        let err = ScriptShell::sh().run(&script, &[]).await.unwrap_err();
        match err {
            DirectoryError::ScriptFailed { stderr, status, .. } => {
                assert_eq!(stderr, "broken");
                assert!(status.contains('3'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_arguments_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "args.sh", r#"printf '%s|%s' "$1" "$2""#);

        let output = ScriptShell::sh()
            .run(&script, &["-user".to_string(), "jdoe".to_string()])
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "-user|jdoe");
    }

    #[tokio::test]
    async fn test_missing_shell_is_a_launch_error() {
        let shell = ScriptShell {
            program: "definitely-not-a-shell".to_string(),
            leading_args: Vec::new(),
        };
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(&dir, "ok.sh", "exit 0");

        let err = shell.run(&script, &[]).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Launch { .. }));
    }
}
