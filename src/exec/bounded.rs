//! @ai:module:intent Run one benchmark process under a wall-clock bound
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChildProcess, ProcessLauncher, SystemLauncher, RunPolicy, RunFailure, run_bounded, launch_bounded
//! @ai:module:stateless true

use crate::exec::sink::ResultsSink;
use crate::exec::Invocation;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Upper bound for one normal-mode benchmark run. Long variants take about
/// ten minutes, short ones about one.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// @ai:intent How long the runner waits before giving up on a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPolicy {
    /// Block until the process exits.
    UntilExit,
    /// Race the process against a timer and kill it when the timer wins.
    Deadline(Duration),
}

impl RunPolicy {
    /// @ai:intent Short mode blocks; normal mode is bounded by `limit`
    /// @ai:effects pure
    pub fn for_mode(short: bool, limit: Duration) -> Self {
        if short {
            RunPolicy::UntilExit
        } else {
            RunPolicy::Deadline(limit)
        }
    }
}

/// @ai:intent Why a benchmark process did not finish successfully
#[derive(Error, Debug)]
pub enum RunFailure {
    #[error("failed to start process: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed waiting for process: {0}")]
    Wait(#[source] io::Error),

    #[error("process exited with {0}")]
    Exit(ExitStatus),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The timer fired and the process could not be killed; it may still be
    /// running.
    #[error("timeout after {after:?}, error killing process: {source}")]
    Kill {
        after: Duration,
        #[source]
        source: io::Error,
    },
}

impl RunFailure {
    /// @ai:effects pure
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunFailure::Timeout(_))
    }

    /// @ai:effects pure
    pub fn is_kill_failure(&self) -> bool {
        matches!(self, RunFailure::Kill { .. })
    }
}

/// @ai:intent A live child process owned by exactly one run
#[allow(async_fn_in_trait)]
pub trait ChildProcess: Send {
    /// @ai:intent Wait for the process to exit
    async fn wait(&mut self) -> io::Result<ExitStatus>;

    /// @ai:intent Forcibly terminate the process
    async fn kill(&mut self) -> io::Result<()>;
}

impl ChildProcess for tokio::process::Child {
    async fn wait(&mut self) -> io::Result<ExitStatus> {
        tokio::process::Child::wait(self).await
    }

    async fn kill(&mut self) -> io::Result<()> {
        tokio::process::Child::kill(self).await
    }
}

/// @ai:intent Starts prepared invocations with output wired to a sink
pub trait ProcessLauncher: Send + Sync {
    type Child: ChildProcess;

    /// @ai:intent Spawn `invocation` with stdout and stderr sent to `sink`
    fn launch(&self, invocation: &Invocation, sink: &ResultsSink) -> io::Result<Self::Child>;
}

/// @ai:intent Launcher backed by tokio processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for SystemLauncher {
    type Child = tokio::process::Child;

    /// @ai:effects io
    fn launch(&self, invocation: &Invocation, sink: &ResultsSink) -> io::Result<Self::Child> {
        invocation.trace();

        let (stdout, stderr) = sink.stdio()?;
        let mut cmd = tokio::process::Command::from(invocation.to_command());
        cmd.stdin(std::process::Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);

        cmd.spawn()
    }
}

/// @ai:intent Drive an already running child to completion under `policy`
/// @ai:post kill is only issued when the deadline elapses first
/// @ai:effects io, time
pub async fn run_bounded<C: ChildProcess>(
    child: &mut C,
    policy: RunPolicy,
) -> Result<(), RunFailure> {
    let limit = match policy {
        RunPolicy::UntilExit => return exit_result(child.wait().await),
        RunPolicy::Deadline(limit) => limit,
    };

    // Completion wins a tie with the timer.
    let finished = tokio::select! {
        biased;
        status = child.wait() => Some(status),
        () = tokio::time::sleep(limit) => None,
    };

    match finished {
        Some(status) => exit_result(status),
        None => {
            tracing::warn!("Process exceeded {:?}; killing", limit);
            child
                .kill()
                .await
                .map_err(|source| RunFailure::Kill { after: limit, source })?;
            Err(RunFailure::Timeout(limit))
        }
    }
}

/// @ai:intent Spawn one invocation and run it under `policy`
/// @ai:effects io, time
pub async fn launch_bounded<L: ProcessLauncher>(
    launcher: &L,
    invocation: &Invocation,
    sink: &ResultsSink,
    policy: RunPolicy,
) -> Result<(), RunFailure> {
    let mut child = launcher
        .launch(invocation, sink)
        .map_err(RunFailure::Spawn)?;

    run_bounded(&mut child, policy).await
}

fn exit_result(status: io::Result<ExitStatus>) -> Result<(), RunFailure> {
    let status = status.map_err(RunFailure::Wait)?;

    if status.success() {
        Ok(())
    } else {
        Err(RunFailure::Exit(status))
    }
}
