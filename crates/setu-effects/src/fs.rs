//! Atomic file writes shared by the vault tier and the filesystem catalog

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Owner read/write only
pub(crate) const FILE_MODE: u32 = 0o600;
/// Owner read/write/execute only
pub(crate) const DIR_MODE: u32 = 0o700;

/// Create `path` (and parents) and restrict it to the owner
pub(crate) fn prepare_dir(path: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(DIR_MODE))?;
    }
    std::fs::canonicalize(path)
}

/// Hidden temp file next to `path`, unique per call
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{:016x}.tmp", rand::random::<u64>()))
}

/// Write the temp file, flush it to disk and restrict its permissions
async fn write_temp(path: &Path, data: &[u8]) -> io::Result<PathBuf> {
    let temp = temp_path_for(path);
    let mut file = fs::File::create(&temp).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp, std::fs::Permissions::from_mode(FILE_MODE)).await?;
    }
    Ok(temp)
}

/// Replace `path` with `data` so readers see either the old or the new content
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp = write_temp(path, data).await?;
    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(())
}

/// Write `data` under the first free name produced by `candidate(n)` for n = 0, 1, ..
///
/// Never overwrites an existing file. Returns the path actually written.
pub(crate) async fn write_new<F>(candidate: F, data: &[u8]) -> io::Result<PathBuf>
where
    F: Fn(u32) -> PathBuf,
{
    let first = candidate(0);
    let temp = write_temp(&first, data).await?;

    let mut attempt = 0u32;
    let result = loop {
        let target = candidate(attempt);
        match fs::hard_link(&temp, &target).await {
            Ok(()) => break Ok(target),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            // Filesystems without hard links fall back to check-then-rename
            Err(_) => {
                if fs::try_exists(&target).await? {
                    attempt += 1;
                    continue;
                }
                break fs::rename(&temp, &target).await.map(|()| target);
            }
        }
    };

    let _ = fs::remove_file(&temp).await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");

        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();

        assert_eq!(fs::read(&path).await.unwrap(), b"second");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_write_new_never_clobbers() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let name = |n: u32| {
            if n == 0 {
                root.join("a.enc")
            } else {
                root.join(format!("a-{n}.enc"))
            }
        };

        let first = write_new(name, b"one").await.unwrap();
        let second = write_new(name, b"two").await.unwrap();

        assert_eq!(first, root.join("a.enc"));
        assert_eq!(second, root.join("a-1.enc"));
        assert_eq!(fs::read(&first).await.unwrap(), b"one");
        assert_eq!(fs::read(&second).await.unwrap(), b"two");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret");
        write_atomic(&path, b"x").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, FILE_MODE);
    }
}
