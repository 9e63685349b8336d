//! @ai:module:intent Append-only results stream shared by benchmark processes
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResultsSink

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// @ai:intent File that collects the combined stdout/stderr of every run
///
/// Children write straight into the file descriptor, so output lands as it is
/// produced and survives a process that is later killed.
#[derive(Debug)]
pub struct ResultsSink {
    path: PathBuf,
    file: File,
}

impl ResultsSink {
    /// @ai:intent Open (or create) the results file for appending
    /// @ai:effects fs:write
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// @ai:effects pure
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// @ai:intent Fresh stdout/stderr handles pointing at the results file
    /// @ai:effects io
    pub fn stdio(&self) -> io::Result<(Stdio, Stdio)> {
        let stdout = self.file.try_clone()?;
        let stderr = self.file.try_clone()?;
        Ok((Stdio::from(stdout), Stdio::from(stderr)))
    }
}
