//! @ai:module:intent Small filesystem helpers shared by harnesses
//! @ai:module:layer infrastructure
//! @ai:module:public_api copy_file, rm_dir_contents
//! @ai:module:stateless true

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// @ai:intent Copy `src` to `dst`, keeping `src` and its permission bits
/// @ai:effects fs:read, fs:write
pub fn copy_file(dst: &Path, src: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;
    Ok(())
}

/// @ai:intent Remove everything inside `dir` but keep `dir` itself
/// @ai:pre dir exists
/// @ai:post dir is empty
/// @ai:effects fs:write
pub fn rm_dir_contents(dir: &Path) -> io::Result<()> {
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(io::Error::from)?;

    for entry in entries {
        if entry.file_type().is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }

    Ok(())
}
