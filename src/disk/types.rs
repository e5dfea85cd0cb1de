use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Whether an enumeration tracks whole block devices or mounted filesystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiskKind {
    Physical,
    Logical,
}

/// A disk as discovered by a [`DiskCounterSource`](super::DiskCounterSource).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiskDevice {
    /// Kernel name used to look up counters, e.g. `sda` or `sda1`
    pub id: String,
    /// Instance name: the device name for physical disks, the mount point
    /// for logical ones
    pub name: String,
    /// Device node, e.g. `/dev/sda1`
    pub device: PathBuf,
    /// Where the filesystem is mounted; only logical disks have one
    pub mount_point: Option<PathBuf>,
    pub fs_type: Option<String>,
}

impl DiskDevice {
    pub fn physical(id: impl Into<String>) -> Self {
        let id = id.into();
        Self { device: Path::new("/dev").join(&id), name: id.clone(), id, mount_point: None, fs_type: None }
    }

    pub fn logical(
        id: impl Into<String>,
        device: impl Into<PathBuf>,
        mount_point: impl Into<PathBuf>,
        fs_type: impl Into<String>,
    ) -> Self {
        let mount_point = mount_point.into();
        Self {
            id: id.into(),
            name: mount_point.to_string_lossy().into_owned(),
            device: device.into(),
            mount_point: Some(mount_point),
            fs_type: Some(fs_type.into()),
        }
    }

    /// File name of the device node.
    pub fn device_id(&self) -> &str {
        self.device.file_name().and_then(|n| n.to_str()).unwrap_or(&self.id)
    }
}

/// Cumulative I/O counters since boot for one disk.
///
/// Operation and byte counts exist everywhere. Time and queue counters are
/// `None` where the platform does not report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskCounters {
    pub reads: u64,
    pub writes: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    /// Milliseconds spent reading
    pub read_ms: Option<u64>,
    /// Milliseconds spent writing
    pub write_ms: Option<u64>,
    /// I/Os currently in flight; a gauge, not a counter
    pub queue_length: Option<u64>,
}

/// Filesystem capacity of a mounted disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSpace {
    pub mb_used: u64,
    pub mb_free: u64,
    pub block_size: u64,
    pub inodes_total: u64,
    pub inodes_free: u64,
}

/// Newest raw counter values of one disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMetrics {
    pub reads: u64,
    pub writes: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_ms: u64,
    pub write_ms: u64,
}

/// Rates of one disk, or of all disks combined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskStatistics {
    pub name: String,
    pub reads_per_second: u64,
    pub writes_per_second: u64,
    pub transfers_per_second: u64,
    pub read_bytes_per_second: u64,
    pub write_bytes_per_second: u64,
    pub bytes_per_second_total: u64,
    pub seconds_per_read: f64,
    pub seconds_per_write: f64,
    pub seconds_per_transfer: f64,
    pub mb_used: u64,
    pub mb_free: u64,
}
