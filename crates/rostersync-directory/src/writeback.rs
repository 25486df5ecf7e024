//! Identifier write-back via the edit script.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use rostersync_core::{WriteBackError, WriteBackService};

use crate::script::ScriptShell;

/// Credentials the edit script authenticates with.
#[derive(Clone)]
pub struct EditCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for EditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Write-back collaborator that shells out to the edit script per account.
///
/// Invocations are sequential by construction: the engine issues one
/// write-back at a time and waits for completion.
#[derive(Debug, Clone)]
pub struct ScriptWriteBack {
    shell: ScriptShell,
    edit_script: PathBuf,
    credentials: EditCredentials,
}

impl ScriptWriteBack {
    #[must_use]
    pub fn new(
        shell: ScriptShell,
        edit_script: impl Into<PathBuf>,
        credentials: EditCredentials,
    ) -> Self {
        Self {
            shell,
            edit_script: edit_script.into(),
            credentials,
        }
    }
}

#[async_trait]
impl WriteBackService for ScriptWriteBack {
    async fn set_identifier(
        &self,
        sam_account_name: &str,
        external_id: i64,
    ) -> Result<(), WriteBackError> {
        let args = vec![
            "-user".to_string(),
            sam_account_name.to_string(),
            "-attrib".to_string(),
            external_id.to_string(),
            "-credUser".to_string(),
            self.credentials.username.clone(),
            "-credPass".to_string(),
            self.credentials.password.clone(),
        ];

        self.shell
            .run(&self.edit_script, &args)
            .await
            .map_err(|err| err.into_write_back(sam_account_name))?;

        info!(
            account = %sam_account_name,
            external_id,
            "identifier written to directory account"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> EditCredentials {
        EditCredentials {
            username: "svc_sync".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", credentials());
        assert!(rendered.contains("svc_sync"));
        assert!(!rendered.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_arguments_reach_the_script() {
        let dir = tempfile::tempdir().unwrap();
        let capture = dir.path().join("capture.txt");
        let script = dir.path().join("edit.sh");
        std::fs::write(&script, format!("printf '%s ' \"$@\" > {}", capture.display())).unwrap();

        let writer = ScriptWriteBack::new(ScriptShell::sh(), &script, credentials());
        writer.set_identifier("jdoe", 42).await.unwrap();

        let captured = std::fs::read_to_string(&capture).unwrap();
        assert_eq!(
            captured.trim(),
            "-user jdoe -attrib 42 -credUser svc_sync -credPass hunter2"
        );
    }

    #[tokio::test]
    async fn test_script_failure_becomes_write_back_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("edit.sh");
        std::fs::write(&script, "echo cannot bind >&2; exit 1").unwrap();

        let writer = ScriptWriteBack::new(ScriptShell::sh(), &script, credentials());
        let err = writer.set_identifier("jdoe", 42).await.unwrap_err();

        match err {
            WriteBackError::ScriptFailed { account, message } => {
                assert_eq!(account, "jdoe");
                assert!(message.contains("cannot bind"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
