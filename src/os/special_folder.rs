//! Windows special folder lookup.
//!
//! A special folder is named by an identifier like `MyDocuments` or `LocalApplicationData`
//! and resolved by the OS instead of by an environmental variable. The lookup is a
//! capability, so the resolver can be handed a fake in tests.

use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::os::command_ext::CommandExt;

/// Capability of turning a special folder identifier into a path.
#[async_trait]
pub trait SpecialFolderQuery: Send + Sync + fmt::Debug {
    /// Look up `identifier`.
    ///
    /// # Returns
    /// Trimmed path, or [`None`] if the folder has no value.
    async fn query(&self, identifier: &str) -> Option<String>;
}

#[async_trait]
impl<T: SpecialFolderQuery + ?Sized> SpecialFolderQuery for Arc<T> {
    async fn query(&self, identifier: &str) -> Option<String> {
        (**self).query(identifier).await
    }
}

/// Placeholder in [`ShellQuery`] arguments replaced with the identifier.
pub const IDENTIFIER_PLACEHOLDER: &str = "{}";

/// Queries special folders by spawning an external program and reading its stdout.
///
/// Every argument has [`IDENTIFIER_PLACEHOLDER`] replaced with the queried identifier.
/// Identifiers have to be non-empty ASCII alphanumeric, anything else is rejected without
/// spawning.
#[derive(Debug, Clone)]
pub struct ShellQuery {
    program: OsString,
    args: Vec<String>,
    timeout: Duration,
}

impl ShellQuery {
    /// Timeout applied unless changed with [`ShellQuery::with_timeout`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Run `program` with `args` for every query.
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// `powershell -Command [Environment]::GetFolderPath('<identifier>')`, with stdout
    /// switched to UTF-8 instead of the console code page.
    pub fn powershell() -> Self {
        Self::new(
            "powershell",
            [
                "-NoProfile",
                "-NonInteractive",
                "-Command",
                "[Console]::OutputEncoding=[Text.Encoding]::UTF8;\
                 [Environment]::GetFolderPath('{}')",
            ],
        )
    }

    /// Kill the program if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn is_valid_identifier(identifier: &str) -> bool {
        !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    fn command(&self, identifier: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(
            self.args
                .iter()
                .map(|arg| arg.replace(IDENTIFIER_PLACEHOLDER, identifier)),
        );
        #[cfg(windows)]
        command.creation_flags(0x08000000); // CREATE_NO_WINDOW
        command
    }
}

impl Default for ShellQuery {
    fn default() -> Self {
        Self::powershell()
    }
}

#[async_trait]
impl SpecialFolderQuery for ShellQuery {
    async fn query(&self, identifier: &str) -> Option<String> {
        if !Self::is_valid_identifier(identifier) {
            warn!(identifier, "refusing to query malformed special folder identifier");
            return None;
        }
        let output = match self.command(identifier).output_within(self.timeout).await {
            Ok(output) => output,
            Err(err) => {
                warn!(identifier, program = ?self.program, %err, "special folder query failed");
                return None;
            }
        };
        if !output.status.success() {
            debug!(
                identifier,
                status = %output.status,
                "special folder query exited unsuccessfully"
            );
            return None;
        }
        let stdout = match String::from_utf8(output.stdout) {
            Ok(stdout) => stdout,
            Err(err) => {
                debug!(identifier, %err, "special folder query printed non UTF-8 output");
                return None;
            }
        };
        let path = stdout.trim();
        if path.is_empty() {
            None
        } else {
            Some(path.to_owned())
        }
    }
}
