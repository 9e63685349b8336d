//! @ai:module:intent Scoped best-effort cleanup of a build tool's private workspace
//! @ai:module:layer infrastructure
//! @ai:module:public_api WorkspaceReclaimer

use crate::exec::{CommandRunner, Invocation};

/// @ai:intent Runs a clean command when dropped, on every exit path
///
/// Failures are logged at debug level and otherwise ignored: there may be
/// nothing to clean when the build stopped early, and the build's own result
/// is what the caller sees.
pub struct WorkspaceReclaimer<'a, R: CommandRunner> {
    runner: &'a R,
    clean: Invocation,
}

impl<'a, R: CommandRunner> WorkspaceReclaimer<'a, R> {
    /// @ai:intent Arm the guard with the clean command to run on drop
    /// @ai:effects pure
    pub fn new(runner: &'a R, clean: Invocation) -> Self {
        Self { runner, clean }
    }
}

impl<R: CommandRunner> Drop for WorkspaceReclaimer<'_, R> {
    fn drop(&mut self) {
        if let Err(err) = self.runner.run(&self.clean) {
            tracing::debug!("Workspace cleanup failed (ignored): {}", err);
        }
    }
}
