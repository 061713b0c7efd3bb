use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

mod sealed {
    use tokio::process::Command;
    pub trait Sealed {}
    impl Sealed for Command {}
}

/// Adds deadline-bound [`output_within`](CommandExt::output_within) to the [`Command`].
pub trait CommandExt: sealed::Sealed {
    /// Run command to completion, capturing stdout and stderr.
    ///
    /// # Returns
    /// [`Err`](io::Error) variant means, that spawning failed or that `limit` elapsed before
    /// the child exited. In the latter case error kind is [`io::ErrorKind::TimedOut`] and the
    /// child is killed.
    fn output_within(
        &mut self,
        limit: Duration,
    ) -> impl Future<Output = io::Result<Output>> + Send + '_;
}

impl CommandExt for Command {
    fn output_within(
        &mut self,
        limit: Duration,
    ) -> impl Future<Output = io::Result<Output>> + Send + '_ {
        self.stdin(Stdio::null()).kill_on_drop(true);
        async move {
            tokio::time::timeout(limit, self.output())
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("process did not exit within {limit:?}"),
                    )
                })?
        }
    }
}
