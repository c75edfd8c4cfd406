//! File system helpers shared by entries and staging directories.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io;
use std::path::Path;

/// Permission bits for entry files: owner read/write, group read.
pub const DEFAULT_FILE_MODE: u32 = 0o640;

/// Permission bits for directories: owner rwx, group/other read+execute.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Creates exactly one directory, failing with `AlreadyExists` if it is there.
pub fn create_dir(path: &Path, mode: u32) -> io::Result<()> {
    dir_builder(mode, false).create(path)
}

/// Creates a directory and any missing parents.
pub fn create_dir_all(path: &Path, mode: u32) -> io::Result<()> {
    dir_builder(mode, true).create(path)
}

#[cfg(unix)]
fn dir_builder(mode: u32, recursive: bool) -> DirBuilder {
    use std::os::unix::fs::DirBuilderExt;
    let mut builder = DirBuilder::new();
    builder.recursive(recursive).mode(mode);
    builder
}

#[cfg(not(unix))]
fn dir_builder(_mode: u32, recursive: bool) -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(recursive);
    builder
}

/// Opens `path` for writing, truncating any previous content.
pub fn create_file(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path)
}

/// Syncs a directory so that renames and unlinks inside it are durable.
#[cfg(unix)]
pub fn sync_dir(path: &Path) -> io::Result<()> {
    File::open(path)?.sync_all()
}

/// Syncs a directory so that renames and unlinks inside it are durable.
///
/// NTFS journals metadata updates, and directories cannot be opened for
/// syncing, so this is a no-op off unix.
#[cfg(not(unix))]
pub fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Removes a file, reporting whether it existed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
