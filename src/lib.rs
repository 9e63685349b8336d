//! @ai:module:intent Build-and-run harness for benchmarked third-party workloads
//! @ai:module:layer application
//! @ai:module:public_api config, driver, env, error, exec, harness, toolchain

pub mod config;
pub mod driver;
pub mod env;
pub mod error;
pub mod exec;
pub mod harness;
pub mod toolchain;

pub use config::HarnessConfig;
pub use driver::Driver;
pub use env::Env;
pub use error::{ErrorKind, HarnessError, Result};
pub use exec::{CommandRunner, Invocation, ProcessLauncher, ResultsSink, RunFailure, RunPolicy};
pub use harness::{BuildContext, CockroachDb, GetContext, Harness, RunContext};
pub use toolchain::{GoTool, ToolchainCheck, ToolchainStatus};
