//! @ai:module:intent CockroachDB harness: pinned source, staged build, bounded runs
//! @ai:module:layer application
//! @ai:module:public_api CockroachDb, Variant, REVISION, SUPPORTED_ARCHS

mod build;
mod run;
pub mod variants;

pub use variants::Variant;

use crate::error::{HarnessError, Result};
use crate::exec::{CommandRunner, ProcessLauncher, SystemLauncher, SystemRunner, RUN_TIMEOUT};
use crate::harness::git::{recursive_clone_to_commit, SourceRevision};
use crate::harness::{BuildContext, GetContext, Harness, RunContext};
use std::time::Duration;

/// Pinned to a commit that includes cockroachdb/cockroach#125588. The build
/// needs submodules (PROJ among them), hence the recursive clone.
pub const REVISION: SourceRevision = SourceRevision {
    url: "https://github.com/cockroachdb/cockroach",
    branch: "master",
    commit: "c4a0d997e0da6ba3ebede61b791607aa452b9bbc",
};

/// `std::env::consts::ARCH` values CockroachDB builds for.
pub const SUPPORTED_ARCHS: &[&str] = &["x86_64", "aarch64"];

/// @ai:intent Harness for the CockroachDB KV benchmarks
///
/// Generic over how build commands and benchmark processes are started so the
/// pipeline can be driven without real toolchains.
pub struct CockroachDb<R = SystemRunner, L = SystemLauncher> {
    runner: R,
    launcher: L,
    arch: String,
    run_timeout: Duration,
}

impl CockroachDb {
    /// @ai:intent Harness for the current host using real processes
    /// @ai:effects pure
    pub fn new() -> Self {
        Self::with_parts(SystemRunner::new(), SystemLauncher::new())
    }
}

impl Default for CockroachDb {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner, L: ProcessLauncher> CockroachDb<R, L> {
    /// @ai:effects pure
    pub fn with_parts(runner: R, launcher: L) -> Self {
        Self {
            runner,
            launcher,
            arch: std::env::consts::ARCH.to_string(),
            run_timeout: RUN_TIMEOUT,
        }
    }

    /// @ai:intent Check prerequisites against `arch` instead of the host
    /// @ai:effects pure
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    /// @ai:effects pure
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// @ai:effects pure
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// @ai:effects pure
    pub fn launcher(&self) -> &L {
        &self.launcher
    }
}

impl<R: CommandRunner, L: ProcessLauncher> Harness for CockroachDb<R, L> {
    fn name(&self) -> &'static str {
        "cockroachdb"
    }

    fn check_prerequisites(&self) -> Result<()> {
        if SUPPORTED_ARCHS.contains(&self.arch.as_str()) {
            Ok(())
        } else {
            Err(HarnessError::Unsupported(format!(
                "requires amd64 or arm64, host is {}",
                self.arch
            )))
        }
    }

    /// @ai:effects io, network, fs:write
    fn get(&self, ctx: &GetContext) -> Result<()> {
        tracing::info!("Fetching {} at {}", REVISION.url, REVISION.commit);

        recursive_clone_to_commit(&self.runner, &ctx.src_dir, &REVISION).map_err(|source| {
            HarnessError::Acquisition {
                dir: ctx.src_dir.clone(),
                source,
            }
        })
    }

    /// @ai:effects io, network, fs:write
    fn build(&self, ctx: &BuildContext) -> Result<()> {
        build::build(&self.runner, ctx)
    }

    /// @ai:effects io, time, fs:write
    async fn run(&self, ctx: &RunContext) -> Result<()> {
        run::run_variants(
            &self.launcher,
            ctx,
            variants::variants(ctx.short),
            self.run_timeout,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::exec::testing::{failure, RecordingRunner, Script, ScriptedChild, ScriptedLauncher};
    use crate::env::Env;
    use crate::exec::ResultsSink;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn harness(runner: RecordingRunner) -> CockroachDb<RecordingRunner, ScriptedLauncher> {
        let launcher = ScriptedLauncher::with(|_| {
            Ok(ScriptedChild::new(Script::ExitAfter(Duration::from_secs(1), 0)))
        });
        CockroachDb::with_parts(runner, launcher)
    }

    #[test]
    fn test_supported_archs_pass() {
        for arch in ["x86_64", "aarch64"] {
            let h = harness(RecordingRunner::succeeding()).with_arch(arch);
            assert!(h.check_prerequisites().is_ok(), "{arch}");
        }
    }

    #[test]
    fn test_other_archs_are_rejected() {
        for arch in ["riscv64", "x86", "powerpc64", "s390x"] {
            let h = harness(RecordingRunner::succeeding()).with_arch(arch);
            let err = h.check_prerequisites().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unsupported);
            assert!(err.to_string().contains("requires amd64 or arm64"));
        }
    }

    #[test]
    fn test_check_prerequisites_has_no_side_effects() {
        let h = harness(RecordingRunner::succeeding()).with_arch("riscv64");
        let _ = h.check_prerequisites();
        assert!(h.runner().calls().is_empty());
        assert!(h.launcher().launched().is_empty());
    }

    #[test]
    fn test_get_checks_out_pinned_commit() {
        let h = harness(RecordingRunner::succeeding());
        let ctx = GetContext {
            src_dir: PathBuf::from("/work/cockroachdb/src"),
        };

        h.get(&ctx).unwrap();

        let lines = h.runner().command_lines();
        assert!(lines[0].starts_with("git clone --recursive --branch master"));
        assert_eq!(lines[1], format!("git checkout {}", REVISION.commit));
    }

    #[test]
    fn test_get_failure_is_acquisition_error() {
        let h = harness(RecordingRunner::with(|inv| Err(failure(inv, "fetch failed"))));
        let ctx = GetContext {
            src_dir: PathBuf::from("/work/cockroachdb/src"),
        };

        let err = h.get(&ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Acquisition);
        assert_eq!(h.runner().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_uses_configured_timeout() {
        let temp = TempDir::new().unwrap();
        let tmp_dir = temp.path().join("tmp");
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let ctx = RunContext {
            bin_dir: temp.path().join("bin"),
            tmp_dir,
            results: ResultsSink::open(temp.path().join("cockroachdb.results")).unwrap(),
            args: Vec::new(),
            short: false,
            env: Env::default(),
        };
        let launcher = ScriptedLauncher::with(|_| Ok(ScriptedChild::new(Script::Hang)));
        let h = CockroachDb::with_parts(RecordingRunner::succeeding(), launcher)
            .with_run_timeout(Duration::from_secs(5));
        let start = tokio::time::Instant::now();

        let err = h.run(&ctx).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RunTimeout);
        assert_eq!(err.to_string(), "benchmark kv0/nodes=1: timeout after 5s");
        assert!(start.elapsed() < RUN_TIMEOUT);
        assert_eq!(h.launcher().launched().len(), 1);
    }
}
