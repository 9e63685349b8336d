//! @ai:module:intent Sequential run loop over benchmark variants
//! @ai:module:layer application

use super::build::{BINARY, DRIVER_BINARY};
use super::variants::Variant;
use crate::error::{HarnessError, Result};
use crate::exec::{launch_bounded, Invocation, ProcessLauncher, RunPolicy};
use crate::harness::fsutil::rm_dir_contents;
use crate::harness::RunContext;
use std::time::Duration;

/// @ai:intent Driver command line for one variant
/// @ai:effects pure
pub(super) fn invocation(ctx: &RunContext, variant: Variant) -> Invocation {
    let mut inv = Invocation::new(ctx.bin_dir.join(DRIVER_BINARY))
        .args(ctx.args.iter().map(String::as_str))
        .args(["-bench".to_string(), variant.to_string()])
        .arg("-cockroachdb-bin")
        .arg(ctx.bin_dir.join(BINARY))
        .arg("-tmp")
        .arg(&ctx.tmp_dir)
        .env(ctx.env.clone());

    if ctx.short {
        inv = inv.arg("-short");
    }

    inv
}

/// @ai:intent Run `variants` in order, emptying tmp_dir after each success
/// @ai:post stops at the first failing variant; later variants never start
/// @ai:effects io, time, fs:write
pub(super) async fn run_variants<L: ProcessLauncher>(
    launcher: &L,
    ctx: &RunContext,
    variants: &[Variant],
    timeout: Duration,
) -> Result<()> {
    let policy = RunPolicy::for_mode(ctx.short, timeout);

    for (i, variant) in variants.iter().enumerate() {
        tracing::info!("[{}/{}] Running {}", i + 1, variants.len(), variant);

        launch_bounded(launcher, &invocation(ctx, *variant), &ctx.results, policy)
            .await
            .map_err(|source| HarnessError::Run {
                variant: variant.to_string(),
                source,
            })?;

        // The driver leaves a cluster under tmp and would reuse it.
        rm_dir_contents(&ctx.tmp_dir).map_err(|source| HarnessError::TmpPurge {
            dir: ctx.tmp_dir.clone(),
            source,
        })?;
    }

    Ok(())
}
