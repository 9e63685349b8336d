//! @ai:module:intent External command description and blocking execution
//! @ai:module:layer infrastructure
//! @ai:module:public_api Invocation, CommandRunner, SystemRunner, CommandError, ResultsSink

pub mod bounded;
pub mod sink;
#[cfg(test)]
pub(crate) mod testing;

pub use bounded::{
    launch_bounded, run_bounded, ChildProcess, ProcessLauncher, RunFailure, RunPolicy,
    SystemLauncher, RUN_TIMEOUT,
};
pub use sink::ResultsSink;

use crate::env::Env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// @ai:intent Failure of a blocking external command
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },

    /// Failure reported by a non-process runner (test doubles, wrappers).
    #[error("{program}: {message}")]
    Other { program: String, message: String },
}

/// @ai:intent A fully prepared external command: program, args, cwd, env
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
    /// `None` inherits the harness process environment.
    pub env: Option<Env>,
}

impl Invocation {
    /// @ai:intent Start describing a command for `program`
    /// @ai:effects pure
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env: None,
        }
    }

    /// @ai:effects pure
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// @ai:effects pure
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// @ai:effects pure
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// @ai:effects pure
    pub fn env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    /// @ai:intent Short program name used in logs and errors
    /// @ai:effects pure
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .to_string()
    }

    /// @ai:intent True when any argument equals `needle`
    /// @ai:effects pure
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }

    /// @ai:intent Arguments as lossy strings, for matching and display
    /// @ai:effects pure
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    /// @ai:intent Build a std command from this description
    /// @ai:effects pure
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        if let Some(env) = &self.env {
            cmd.env_clear();
            cmd.envs(env.collapse());
        }

        cmd
    }

    /// @ai:intent Log the command the way it would be typed in a shell
    /// @ai:effects io
    pub fn trace(&self) {
        match &self.current_dir {
            Some(dir) => tracing::info!("[{}] {}", dir.display(), self),
            None => tracing::info!("{}", self),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(env) = &self.env {
            for op in env.layers() {
                write!(f, "{op} ")?;
            }
        }

        write!(f, "{}", self.program.display())?;

        for arg in &self.args {
            let arg = arg.to_string_lossy();

            if arg.contains(' ') {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }

        Ok(())
    }
}

/// @ai:intent Runs build-phase commands to completion
///
/// Implementations block until the command exits. There is no timeout: a
/// hung build is aborted at the process level by whoever drives the harness.
pub trait CommandRunner: Send + Sync {
    /// @ai:intent Run `invocation`, success only on a zero exit status
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError>;
}

/// @ai:intent Runner that spawns real processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    /// @ai:effects io
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        invocation.trace();

        let status = invocation
            .to_command()
            .status()
            .map_err(|source| CommandError::Spawn {
                program: invocation.program_name(),
                source,
            })?;

        check_status(invocation, status)
    }
}

fn check_status(invocation: &Invocation, status: ExitStatus) -> Result<(), CommandError> {
    if status.success() {
        Ok(())
    } else {
        Err(CommandError::Exit {
            program: invocation.program_name(),
            status,
        })
    }
}
