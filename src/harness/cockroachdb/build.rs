//! @ai:module:intent Staged CockroachDB build: bazel codegen, go build, driver build
//! @ai:module:layer application
//! @ai:module:stateless true

use crate::error::{HarnessError, Result};
use crate::exec::{CommandRunner, Invocation};
use crate::harness::fsutil::copy_file;
use crate::harness::reclaim::WorkspaceReclaimer;
use crate::harness::BuildContext;
use crate::toolchain::{install_tool, AuxTool, GoTool};
use std::path::Path;

/// Bazel launcher used by cockroach's `dev` tooling to generate what a plain
/// `go build` needs.
pub(super) const BAZELISK: AuxTool = AuxTool {
    name: "bazelisk",
    package: "github.com/bazelbuild/bazelisk@latest",
};

/// Needed since go1.23; older release-branch toolchains reject it.
pub(super) const CHECKLINKNAME_FLAG: &str = "-ldflags=-checklinkname=0";

/// Same server as `cockroach` without the UI, much quicker to build.
const SHORT_PACKAGE: &str = "pkg/cmd/cockroach-short";
const SHORT_BINARY: &str = "cockroach-short";
pub(super) const BINARY: &str = "cockroach";
pub(super) const DRIVER_BINARY: &str = "cockroachdb-bench";

/// @ai:intent Run the full build pipeline for `ctx`
/// @ai:post on success bin_dir holds `cockroach` and `cockroachdb-bench`
/// @ai:effects io, network, fs:write
pub(super) fn build<R: CommandRunner>(runner: &R, ctx: &BuildContext) -> Result<()> {
    // Installed into bin_dir so every run gets a fresh copy.
    let go = GoTool::new(&ctx.go_root, &ctx.env);
    let bazel = install_tool(runner, &go, &ctx.bin_dir, BAZELISK)?;

    // Bazel treats each run as a separate workspace; without an expunge the
    // output base grows with every build.
    let _reclaim = WorkspaceReclaimer::new(
        runner,
        Invocation::new(&bazel)
            .args(["clean", "--expunge"])
            .current_dir(&ctx.src_dir),
    );

    let bazel_run = |target: &str| {
        Invocation::new(&bazel)
            .args(["run", target])
            .current_dir(&ctx.src_dir)
            .env(go.env().clone())
    };

    step(runner, "generate code", &bazel_run("//pkg/gen:code"))?;

    let run_under = format!("cd {} && ", ctx.src_dir.display());
    step(
        runner,
        "generate cgo",
        &bazel_run("//pkg/cmd/generate-cgo:generate-cgo").args(["--run_under", run_under.as_str()]),
    )?;

    compile_with_fallback(
        runner,
        &go,
        &ctx.src_dir.join(SHORT_PACKAGE),
        &ctx.bin_dir,
    )?;

    stage_binary(&ctx.bin_dir)?;

    step(
        runner,
        "build benchmark driver",
        &go.build(&ctx.bench_dir, &ctx.bin_dir.join(DRIVER_BINARY), &[]),
    )
}

fn step<R: CommandRunner>(runner: &R, name: &'static str, invocation: &Invocation) -> Result<()> {
    tracing::info!("Build step: {}", name);

    runner
        .run(invocation)
        .map_err(|source| HarnessError::BuildStep { step: name, source })
}

/// @ai:intent Compile with the compatibility flag, retrying once without it
/// @ai:post Compile error carries both attempts' causes when both fail
/// @ai:effects io, fs:write
fn compile_with_fallback<R: CommandRunner>(
    runner: &R,
    go: &GoTool,
    package_dir: &Path,
    bin_dir: &Path,
) -> Result<()> {
    tracing::info!("Build step: compile {}", SHORT_BINARY);

    let flagged = go.build(package_dir, bin_dir, &[CHECKLINKNAME_FLAG]);
    let with_flag = match runner.run(&flagged) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    tracing::warn!(
        "Compile with {} failed ({}); retrying without it",
        CHECKLINKNAME_FLAG,
        with_flag
    );

    runner
        .run(&go.build(package_dir, bin_dir, &[]))
        .map_err(|without_flag| HarnessError::Compile {
            flag: CHECKLINKNAME_FLAG,
            with_flag,
            without_flag,
        })
}

/// @ai:intent Expose `cockroach-short` under the name the driver expects
/// @ai:post both names exist in bin_dir
/// @ai:effects fs:write
fn stage_binary(bin_dir: &Path) -> Result<()> {
    let from = bin_dir.join(SHORT_BINARY);
    let to = bin_dir.join(BINARY);

    copy_file(&to, &from).map_err(|source| HarnessError::Stage { from, to, source })
}
