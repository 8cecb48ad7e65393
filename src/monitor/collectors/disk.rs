//! Disk capacity collector.
//!
//! Lists local filesystems from `/proc/mounts` and sizes each one with
//! `statvfs(3)`. Virtual and network filesystems are skipped, since the
//! latter can block indefinitely when the remote end is gone.

use crate::monitor::error::{MonitorError, Result};
use crate::monitor::types::{Collector, DiskUsage};
use std::sync::mpsc;
use std::time::Duration;

/// How long a read of `/proc/mounts` may take before the tick gives up.
const MOUNTS_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Mount point prefixes that never hold user data.
const SKIPPED_MOUNT_PREFIXES: [&str; 5] = ["/sys", "/proc", "/dev", "/run", "/snap"];

/// Filesystem types that may hang a `statvfs` call.
const REMOTE_FS_TYPES: [&str; 9] = [
    "nfs",
    "nfs4",
    "cifs",
    "smbfs",
    "autofs",
    "fuse.sshfs",
    "fuse.rclone",
    "fuse.gvfsd-fuse",
    "9p",
];

/// Reads a file on a helper thread, giving up after `timeout`.
///
/// `/proc/mounts` can block when a device is hung.
fn read_file_with_timeout(path: &'static str, timeout: Duration) -> Result<String> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        // The receiver is gone if we timed out.
        let _ = tx.send(std::fs::read_to_string(path));
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(content)) => Ok(content),
        Ok(Err(e)) => Err(MonitorError::from_io("disk", path, &e)),
        Err(_) => Err(MonitorError::CollectionFailed {
            collector: "disk",
            message: format!("timed out reading {path}"),
        }),
    }
}

/// A mounted local filesystem, before sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MountEntry {
    pub(crate) device: String,
    pub(crate) mount_point: String,
    pub(crate) fs_type: String,
}

/// Parses `/proc/mounts`, keeping only local block-device filesystems.
/// A device mounted more than once is listed once, at its first mount.
pub(crate) fn parse_mounts(content: &str) -> Vec<MountEntry> {
    let mut entries: Vec<MountEntry> = Vec::new();

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            continue;
        }
        let (device, mount_point, fs_type) = (fields[0], fields[1], fields[2]);

        if !device.starts_with('/') {
            continue;
        }
        if SKIPPED_MOUNT_PREFIXES.iter().any(|p| mount_point.starts_with(p)) {
            continue;
        }
        if REMOTE_FS_TYPES.contains(&fs_type) {
            continue;
        }
        if entries.iter().any(|e| e.device == device) {
            continue;
        }

        entries.push(MountEntry {
            device: device.to_string(),
            mount_point: unescape_mount_path(mount_point),
            fs_type: fs_type.to_string(),
        });
    }

    entries
}

/// Decodes the octal escapes (`\040` for space) the kernel uses in mount paths.
fn unescape_mount_path(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let octal = bytes.get(i + 1..i + 4).filter(|d| d.iter().all(|b| (b'0'..=b'7').contains(b)));
        if let (b'\\', Some(digits)) = (bytes[i], octal) {
            let code = digits.iter().fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
            if let Ok(code) = u8::try_from(code) {
                out.push(code);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Returns `(total, used, available)` bytes for a mount point.
#[cfg(target_os = "linux")]
fn statvfs(path: &str) -> Option<(u64, u64, u64)> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;

    let path_cstr = CString::new(path).ok()?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    // SAFETY: statvfs initializes the buffer when it returns 0.
    #[allow(unsafe_code)]
    let stat = unsafe {
        if libc::statvfs(path_cstr.as_ptr(), stat.as_mut_ptr()) != 0 {
            return None;
        }
        stat.assume_init()
    };

    let block_size = u64::from(stat.f_frsize);
    let total = u64::from(stat.f_blocks) * block_size;
    let free = u64::from(stat.f_bfree) * block_size;
    let available = u64::from(stat.f_bavail) * block_size;
    Some((total, total.saturating_sub(free), available))
}

/// Collector for mounted filesystem capacity.
#[derive(Debug, Default)]
pub struct DiskCollector;

impl DiskCollector {
    /// Creates a new disk collector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Collector for DiskCollector {
    type Output = Vec<DiskUsage>;

    fn id(&self) -> &'static str {
        "disk"
    }

    #[cfg(target_os = "linux")]
    fn collect(&mut self) -> Result<Vec<DiskUsage>> {
        let content = read_file_with_timeout("/proc/mounts", MOUNTS_READ_TIMEOUT)?;

        let mut disks: Vec<DiskUsage> = parse_mounts(&content)
            .into_iter()
            .filter_map(|entry| {
                let (total_bytes, used_bytes, available_bytes) = statvfs(&entry.mount_point)?;
                (total_bytes > 0).then(|| DiskUsage {
                    device: entry.device,
                    mount_point: entry.mount_point,
                    fs_type: entry.fs_type,
                    total_bytes,
                    used_bytes,
                    available_bytes,
                })
            })
            .collect();

        disks.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));
        Ok(disks)
    }

    #[cfg(not(target_os = "linux"))]
    fn collect(&mut self) -> Result<Vec<DiskUsage>> {
        Err(MonitorError::CollectorUnavailable("disk"))
    }

    fn is_available(&self) -> bool {
        cfg!(target_os = "linux") && std::path::Path::new("/proc/mounts").exists()
    }
}
