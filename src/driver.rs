//! @ai:module:intent Sequence harness phases from a configuration
//! @ai:module:layer application
//! @ai:module:public_api Driver
//! @ai:module:stateless true

use crate::config::HarnessConfig;
use crate::env::Env;
use crate::exec::ResultsSink;
use crate::harness::{BuildContext, GetContext, Harness, RunContext};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// @ai:intent Builds contexts and runs one harness phase by phase
///
/// Every phase checks prerequisites first, so nothing touches the filesystem
/// or spawns a process on an unsupported host.
pub struct Driver<H: Harness> {
    harness: H,
    config: HarnessConfig,
}

impl<H: Harness> Driver<H> {
    /// @ai:effects pure
    pub fn new(harness: H, config: HarnessConfig) -> Self {
        Self { harness, config }
    }

    /// @ai:effects pure
    pub fn harness(&self) -> &H {
        &self.harness
    }

    /// @ai:intent Reject the host before any other operation
    /// @ai:effects pure
    pub fn preflight(&self) -> Result<()> {
        self.harness
            .check_prerequisites()
            .with_context(|| format!("{} cannot run on this host", self.harness.name()))
    }

    /// @ai:intent Acquire the workload source
    /// @ai:effects io, network, fs:write
    pub fn get(&self) -> Result<()> {
        self.preflight()?;

        let src_dir = absolute(&self.config.paths.src_dir(self.harness.name()))?;
        if let Some(parent) = src_dir.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("Getting {} into {}", self.harness.name(), src_dir.display());
        self.harness.get(&GetContext { src_dir })?;
        Ok(())
    }

    /// @ai:intent Build the workload and its benchmark driver
    /// @ai:effects io, network, fs:write
    pub fn build(&self) -> Result<()> {
        self.preflight()?;

        let ctx = self.build_context(Env::inherit())?;
        std::fs::create_dir_all(&ctx.bin_dir)
            .with_context(|| format!("Failed to create {}", ctx.bin_dir.display()))?;

        tracing::info!("Building {} into {}", self.harness.name(), ctx.bin_dir.display());
        self.harness.build(&ctx)?;
        Ok(())
    }

    /// @ai:intent Run the benchmarks, appending output to `results`
    /// @ai:effects io, time, fs:write
    pub async fn run(&self, results: &Path) -> Result<()> {
        self.preflight()?;

        let ctx = self.run_context(results, Env::inherit())?;

        tracing::info!(
            "Running {} (short={}), results in {}",
            self.harness.name(),
            ctx.short,
            ctx.results.path().display()
        );
        self.harness.run(&ctx).await?;
        Ok(())
    }

    /// @ai:intent Get, build and run in sequence
    /// @ai:effects io, network, time, fs:write
    pub async fn all(&self, results: &Path) -> Result<()> {
        self.get()?;
        self.build()?;
        self.run(results).await
    }

    /// @ai:intent Default results file for a run started at `now`
    /// @ai:effects pure
    pub fn results_path(&self, now: DateTime<Utc>) -> PathBuf {
        self.config
            .paths
            .results_dir
            .join(now.format("%Y-%m-%d_%H-%M-%S").to_string())
            .join(format!("{}.results", self.harness.name()))
    }

    /// @ai:effects pure
    fn build_context(&self, env: Env) -> Result<BuildContext> {
        let name = self.harness.name();
        let paths = &self.config.paths;

        Ok(BuildContext {
            src_dir: absolute(&paths.src_dir(name))?,
            bin_dir: absolute(&paths.bin_dir(name))?,
            bench_dir: absolute(&paths.bench_dir)?,
            go_root: absolute(&self.config.toolchain.go_root)?,
            env,
        })
    }

    /// @ai:effects fs:write
    fn run_context(&self, results: &Path, env: Env) -> Result<RunContext> {
        let name = self.harness.name();
        let tmp_dir = absolute(&self.config.paths.tmp_dir(name))?;
        std::fs::create_dir_all(&tmp_dir)
            .with_context(|| format!("Failed to create {}", tmp_dir.display()))?;

        if let Some(parent) = results.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let results = ResultsSink::open(results)
            .with_context(|| format!("Failed to open results file {}", results.display()))?;

        Ok(RunContext {
            bin_dir: absolute(&self.config.paths.bin_dir(name))?,
            tmp_dir,
            results,
            args: self.config.run.args.clone(),
            short: self.config.run.short,
            env,
        })
    }
}

/// Child processes run with other working directories, so relative
/// configuration paths are resolved once here.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
