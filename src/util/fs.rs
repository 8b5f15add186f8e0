use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// True when both paths resolve to the same directory (same device and inode).
pub fn is_same_dir(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;
    let ma = fs::metadata(a)?;
    let mb = fs::metadata(b)?;
    Ok(ma.dev() == mb.dev() && ma.ino() == mb.ino())
}

/// Write `contents` to a fresh hidden file in the temp dir and keep it on disk.
///
/// The file is not removed on drop: dogi hands these files to docker and then replaces its own
/// process image, so nothing would run a cleanup anyway.
pub fn persist_temp_file(prefix: &str, suffix: &str, contents: &[u8]) -> io::Result<PathBuf> {
    let mut tmp = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile()?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    let (_file, path) = tmp.keep().map_err(|e| e.error)?;
    Ok(path)
}

/// Like `persist_temp_file`, but the file is also readable by other users (uid 0 inside the
/// container reads it through a bind mount or `docker cp`).
pub fn persist_shared_temp_file(prefix: &str, suffix: &str, contents: &[u8]) -> io::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;
    let path = persist_temp_file(prefix, suffix, contents)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644))?;
    Ok(path)
}
