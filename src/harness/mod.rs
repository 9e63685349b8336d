//! @ai:module:intent Harness contract and the per-invocation contexts it reads
//! @ai:module:layer application
//! @ai:module:public_api Harness, GetContext, BuildContext, RunContext, CockroachDb

pub mod cockroachdb;
pub mod fsutil;
pub mod git;
pub mod reclaim;

pub use cockroachdb::CockroachDb;

use crate::env::Env;
use crate::error::Result;
use crate::exec::ResultsSink;
use std::path::PathBuf;

/// @ai:intent Inputs for source acquisition
#[derive(Debug, Clone)]
pub struct GetContext {
    pub src_dir: PathBuf,
}

/// @ai:intent Inputs for one build; read-only for the harness
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Checked-out workload source tree.
    pub src_dir: PathBuf,
    /// Where the workload binary and the benchmark driver end up.
    pub bin_dir: PathBuf,
    /// Source of the companion benchmark driver.
    pub bench_dir: PathBuf,
    /// Resolved root of the primary toolchain.
    pub go_root: PathBuf,
    /// Caller environment the build environment is layered on.
    pub env: Env,
}

/// @ai:intent Inputs for one run; read-only for the harness
#[derive(Debug)]
pub struct RunContext {
    pub bin_dir: PathBuf,
    /// Scratch directory handed to the workload; emptied between variants.
    pub tmp_dir: PathBuf,
    pub results: ResultsSink,
    /// Passed through to the benchmark driver ahead of harness arguments.
    pub args: Vec<String>,
    pub short: bool,
    /// Environment for the benchmark driver process.
    pub env: Env,
}

/// @ai:intent Acquire, build and run one benchmarked workload
#[allow(async_fn_in_trait)]
pub trait Harness {
    /// @ai:intent Name used for directories and results files
    fn name(&self) -> &'static str;

    /// @ai:intent Reject hosts the workload cannot run on
    /// @ai:effects pure
    fn check_prerequisites(&self) -> Result<()>;

    /// @ai:intent Fetch the workload source at its pinned revision
    fn get(&self, ctx: &GetContext) -> Result<()>;

    /// @ai:intent Produce the workload binary and the benchmark driver
    fn build(&self, ctx: &BuildContext) -> Result<()>;

    /// @ai:intent Run every selected benchmark variant, stopping at the first failure
    async fn run(&self, ctx: &RunContext) -> Result<()>;
}
