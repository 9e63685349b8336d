//! @ai:module:intent Recursive git checkout of a pinned revision
//! @ai:module:layer infrastructure
//! @ai:module:public_api SourceRevision, recursive_clone_to_commit

use crate::exec::{CommandError, CommandRunner, Invocation};
use std::path::Path;

/// @ai:intent Repository, branch and exact commit a workload builds from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRevision {
    pub url: &'static str,
    pub branch: &'static str,
    pub commit: &'static str,
}

/// @ai:intent Clone with submodules into `dir` and check out `rev.commit`
/// @ai:pre dir does not exist or is empty
/// @ai:post dir holds the tree at rev.commit, submodules included
/// @ai:effects io, network, fs:write
pub fn recursive_clone_to_commit<R: CommandRunner>(
    runner: &R,
    dir: &Path,
    rev: &SourceRevision,
) -> Result<(), CommandError> {
    let clone = Invocation::new("git")
        .args(["clone", "--recursive", "--branch", rev.branch, rev.url])
        .arg(dir);
    runner.run(&clone)?;

    let checkout = Invocation::new("git")
        .args(["checkout", rev.commit])
        .current_dir(dir);
    runner.run(&checkout)?;

    // The clone populated submodules for the branch head, not the commit.
    let submodules = Invocation::new("git")
        .args(["submodule", "update", "--init", "--recursive"])
        .current_dir(dir);
    runner.run(&submodules)
}
