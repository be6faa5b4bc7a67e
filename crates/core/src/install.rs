//! Final placement of an extracted binary.

use std::path::{Path, PathBuf};

use crate::events::{EventSink, InstallEvent, Stage};
use crate::{Error, Result};

/// Make `binary` executable and move it to `install_dir/name`.
///
/// Creates `install_dir` (with parents) when missing and replaces any file
/// already at the destination. Moving a file onto itself, under any spelling
/// of the path, is a no-op. When a plain rename is impossible (e.g. across
/// filesystems) the file is copied next to the destination, renamed over it,
/// and the source removed. An existing destination survives a failed move.
/// Fallbacks and no-ops are reported to `events`.
///
/// # Errors
///
/// Returns [`Error::Install`] carrying the final path if the directory cannot
/// be created, permissions cannot be set, or the move fails.
pub fn install_binary(
    binary: &Path,
    install_dir: &Path,
    name: &str,
    events: &dyn EventSink,
) -> Result<PathBuf> {
    let final_path = install_dir.join(name);

    make_executable(binary).map_err(|e| Error::install(&final_path, e.to_string()))?;

    std::fs::create_dir_all(install_dir).map_err(|e| {
        Error::install(
            &final_path,
            format!("cannot create {}: {e}", install_dir.display()),
        )
    })?;

    if same_file(binary, &final_path) {
        detail(events, format!("{} already in place", final_path.display()));
        return Ok(final_path);
    }

    if let Err(rename_err) = std::fs::rename(binary, &final_path) {
        detail(events, format!("rename failed ({rename_err}), copying instead"));
        copy_over(binary, install_dir, &final_path).map_err(|e| {
            Error::install(
                &final_path,
                format!("move failed: {rename_err}; copy failed: {e}"),
            )
        })?;
        std::fs::remove_file(binary).map_err(|e| Error::install(&final_path, e.to_string()))?;
    }

    Ok(final_path)
}

fn detail(events: &dyn EventSink, message: String) {
    events.emit(InstallEvent::Detail {
        stage: Stage::Installing,
        message,
    });
}

/// Whether both paths name one existing file, after resolving symlinks and `..`.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy `src` into a temporary file in `dir`, then rename it onto `dest`.
fn copy_over(src: &Path, dir: &Path, dest: &Path) -> std::io::Result<()> {
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    let mut source = std::fs::File::open(src)?;
    std::io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|e| e.error)?;
    make_executable(dest)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
}

// Windows executability follows the file extension.
#[cfg(not(unix))]
fn make_executable(path: &Path) -> std::io::Result<()> {
    std::fs::metadata(path).map(|_| ())
}
