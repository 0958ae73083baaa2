//! Local storage for uploads and results, plus the health probes.
//!
//! Uploads live in the upload folder only for the duration of one request:
//! the orchestrator removes them on every exit path. Results accumulate in
//! the result folder, one plain-text file per successful request. Both
//! filenames share the request's uuid so a result can be traced back to its
//! upload in the logs without a database.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// Minimum free space on the primary volume before health degrades (1 GiB).
pub const MIN_FREE_DISK_BYTES: u64 = 1024 * 1024 * 1024;

/// Reduce a caller-supplied filename to a safe basename.
///
/// Path separators and anything outside `[A-Za-z0-9._-]` become `_`, and an
/// all-unsafe name collapses to `audio` so the stored name is never empty.
pub fn sanitize_filename(name: &str) -> String {
    let basename = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let mut cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // A name of only dots or underscores carries no information.
    if cleaned.chars().all(|c| matches!(c, '.' | '_')) {
        cleaned = "audio".to_string();
    }
    cleaned
}

/// Write the uploaded bytes to `{upload_dir}/{id}_{sanitized}` and verify
/// the written file is present and non-empty before any remote call spends
/// the caller's API quota.
pub async fn save_upload(
    upload_dir: &Path,
    id: &Uuid,
    filename: &str,
    data: &[u8],
) -> io::Result<PathBuf> {
    let path = upload_dir.join(format!("{}_{}", id, sanitize_filename(filename)));

    tokio::fs::write(&path, data).await?;

    // Re-check what actually landed on disk.
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.len() > 0 => {
            debug!("Saved upload to {} ({} bytes)", path.display(), meta.len());
            Ok(path)
        }
        Ok(_) => {
            remove_upload(&path).await;
            Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "uploaded file is empty on disk",
            ))
        }
        Err(err) => {
            remove_upload(&path).await;
            Err(err)
        }
    }
}

/// Persist the corrected text as `{result_dir}/{id}_result.txt`.
pub async fn persist_result(result_dir: &Path, id: &Uuid, text: &str) -> io::Result<PathBuf> {
    let path = result_dir.join(format!("{id}_result.txt"));
    tokio::fs::write(&path, text).await?;
    Ok(path)
}

/// Remove a temporary upload. Failure is logged, never propagated: cleanup
/// must not mask the outcome of the request it follows.
pub async fn remove_upload(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed temporary upload {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(
            "Failed to remove temporary upload {}: {}",
            path.display(),
            err
        ),
    }
}

/// Probe whether a directory exists and is writable.
///
/// `Some(true)`/`Some(false)` are definitive answers; `None` means the
/// probe itself failed and the check is inconclusive. The health endpoint
/// treats inconclusive as passing to avoid false alarms from transient
/// filesystem errors.
///
/// Permission mode bits cannot answer effective writability (ownership,
/// ACLs, read-only mounts), so the probe performs a real write under a
/// unique name and removes it immediately; observable directory contents
/// are unchanged once the probe returns.
pub fn directory_writable(dir: &Path) -> Option<bool> {
    match std::fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => return Some(false),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Some(false),
        Err(_) => return None,
    }

    let probe = dir.join(format!(".healthcheck_{}", Uuid::new_v4()));
    match std::fs::write(&probe, b"") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            Some(true)
        }
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => Some(false),
        Err(_) => None,
    }
}

/// Free space in bytes on the volume holding `path`, `None` if it cannot
/// be determined.
pub fn free_disk_space_bytes(path: &Path) -> Option<u64> {
    let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let disks = sysinfo::Disks::new_with_refreshed_list();

    // The disk whose mount point is the longest prefix of the target path
    // is the volume the path lives on.
    disks
        .list()
        .iter()
        .filter(|disk| target.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(sysinfo::Disk::available_space)
}
