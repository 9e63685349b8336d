//! @ai:module:intent Define error types for harness operations
//! @ai:module:layer domain
//! @ai:module:public_api HarnessError, ErrorKind, Result
//! @ai:module:stateless true

use crate::exec::{CommandError, RunFailure};
use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for prerequisite, get, build and run
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("unsupported environment: {0}")]
    Unsupported(String),

    #[error("failed to acquire source into {dir}: {source}")]
    Acquisition {
        dir: PathBuf,
        #[source]
        source: CommandError,
    },

    #[error("error building {tool}: {source}")]
    ToolchainInstall {
        tool: String,
        #[source]
        source: CommandError,
    },

    #[error("build step `{step}` failed: {source}")]
    BuildStep {
        step: &'static str,
        #[source]
        source: CommandError,
    },

    /// Both the flagged and the unflagged compile attempt failed.
    #[error("compile failed with {flag}: {with_flag}\nand without it: {without_flag}")]
    Compile {
        flag: &'static str,
        with_flag: CommandError,
        without_flag: CommandError,
    },

    #[error("failed to stage {from} as {to}: {source}")]
    Stage {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("benchmark {variant}: {source}")]
    Run {
        variant: String,
        #[source]
        source: RunFailure,
    },

    #[error("failed to clear {dir}: {source}")]
    TmpPurge {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// @ai:intent Coarse category of a harness failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unsupported,
    Acquisition,
    ToolchainInstall,
    BuildStep,
    Compile,
    Stage,
    RunProcess,
    RunTimeout,
    RunKill,
    TmpPurge,
}

impl HarnessError {
    /// @ai:intent Classify the error for callers that only need the category
    /// @ai:effects pure
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarnessError::Unsupported(_) => ErrorKind::Unsupported,
            HarnessError::Acquisition { .. } => ErrorKind::Acquisition,
            HarnessError::ToolchainInstall { .. } => ErrorKind::ToolchainInstall,
            HarnessError::BuildStep { .. } => ErrorKind::BuildStep,
            HarnessError::Compile { .. } => ErrorKind::Compile,
            HarnessError::Stage { .. } => ErrorKind::Stage,
            HarnessError::Run { source, .. } => match source {
                RunFailure::Timeout(_) => ErrorKind::RunTimeout,
                RunFailure::Kill { .. } => ErrorKind::RunKill,
                RunFailure::Spawn(_) | RunFailure::Wait(_) | RunFailure::Exit(_) => {
                    ErrorKind::RunProcess
                }
            },
            HarnessError::TmpPurge { .. } => ErrorKind::TmpPurge,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
