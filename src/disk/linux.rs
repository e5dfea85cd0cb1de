use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, trace};

use super::{
    constants::{DISKSTATS_SECTOR_SIZE, PROC_DISKSTATS, PROC_MOUNTS, SYS_BLOCK, VIRTUAL_BLOCK_PREFIXES},
    source::DiskCounterSource,
    types::{DiskCounters, DiskDevice, DiskKind, DiskSpace},
};
use crate::{
    error::{Error, Result},
    utils::bytes_to_megabytes_ceil,
};

/// One row of `/proc/diskstats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskStatsRow {
    pub reads: u64,
    pub read_sectors: u64,
    pub read_ms: u64,
    pub writes: u64,
    pub write_sectors: u64,
    pub write_ms: u64,
    pub io_in_progress: u64,
}

impl DiskStatsRow {
    pub fn to_counters(&self) -> DiskCounters {
        DiskCounters {
            reads: self.reads,
            writes: self.writes,
            read_bytes: self.read_sectors.saturating_mul(DISKSTATS_SECTOR_SIZE),
            write_bytes: self.write_sectors.saturating_mul(DISKSTATS_SECTOR_SIZE),
            read_ms: Some(self.read_ms),
            write_ms: Some(self.write_ms),
            queue_length: Some(self.io_in_progress),
        }
    }
}

/// Parses `/proc/diskstats` keyed by device name. Rows with fewer than
/// twelve columns (old partition rows) are skipped.
pub fn parse_diskstats(content: &str) -> HashMap<String, DiskStatsRow> {
    let mut rows = HashMap::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 12 {
            continue;
        }

        let get_val = |idx: usize| -> u64 { parts.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        rows.insert(
            parts[2].to_string(),
            DiskStatsRow {
                reads: get_val(3),
                read_sectors: get_val(5),
                read_ms: get_val(6),
                writes: get_val(7),
                write_sectors: get_val(9),
                write_ms: get_val(10),
                io_in_progress: get_val(11),
            },
        );
    }

    rows
}

/// Mounted filesystems backed by a `/dev` node, one per mount point.
pub fn parse_mounts(content: &str) -> Vec<DiskDevice> {
    let mut disks: Vec<DiskDevice> = Vec::new();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(device), Some(mount_point), Some(fs_type)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        if !device.starts_with("/dev/") {
            continue;
        }

        let mount_point = unescape_mount_path(mount_point);
        if disks.iter().any(|d| d.mount_point.as_deref() == Some(Path::new(&mount_point))) {
            continue;
        }

        let id = Path::new(device).file_name().and_then(|n| n.to_str()).unwrap_or(device).to_string();
        disks.push(DiskDevice::logical(id, device, mount_point, fs_type));
    }

    disks
}

/// `/proc/mounts` escapes blanks as octal sequences such as `\040`.
fn unescape_mount_path(raw: &str) -> String {
    raw.replace("\\040", " ").replace("\\011", "\t").replace("\\012", "\n").replace("\\134", "\\")
}

/// Reads disk counters from `/proc/diskstats`.
///
/// Physical disks are the entries of `/sys/block`, minus loop and RAM
/// devices. Logical disks are the `/dev`-backed filesystems listed in
/// `/proc/mounts`; their capacity comes from `statvfs(3)`.
#[derive(Debug)]
pub struct ProcDiskSource {
    kind: DiskKind,
    proc_root: PathBuf,
    sys_root: PathBuf,
    snapshot: HashMap<String, DiskStatsRow>,
}

impl ProcDiskSource {
    pub fn new(kind: DiskKind) -> Self {
        Self::with_roots(kind, "/proc", "/sys")
    }

    pub fn with_roots(kind: DiskKind, proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self { kind, proc_root: proc_root.into(), sys_root: sys_root.into(), snapshot: HashMap::new() }
    }

    pub fn kind(&self) -> DiskKind {
        self.kind
    }

    fn discover_physical(&self) -> Result<Vec<DiskDevice>> {
        let mut disks = Vec::new();
        for entry in fs::read_dir(self.sys_root.join(SYS_BLOCK))? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if VIRTUAL_BLOCK_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
                trace!(device = %name, "skipping virtual block device");
                continue;
            }
            disks.push(DiskDevice::physical(name));
        }
        disks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(disks)
    }

    fn discover_logical(&self) -> Result<Vec<DiskDevice>> {
        Ok(parse_mounts(&fs::read_to_string(self.proc_root.join(PROC_MOUNTS))?))
    }
}

impl DiskCounterSource for ProcDiskSource {
    fn discover(&mut self) -> Result<Vec<DiskDevice>> {
        let disks = match self.kind {
            DiskKind::Physical => self.discover_physical()?,
            DiskKind::Logical => self.discover_logical()?,
        };
        debug!(kind = ?self.kind, disks = disks.len(), "discovered disks");
        Ok(disks)
    }

    fn refresh(&mut self) -> Result<()> {
        self.snapshot = parse_diskstats(&fs::read_to_string(self.proc_root.join(PROC_DISKSTATS))?);
        Ok(())
    }

    fn read_counters(&mut self, device: &DiskDevice) -> Result<DiskCounters> {
        self.snapshot
            .get(&device.id)
            .map(DiskStatsRow::to_counters)
            .ok_or_else(|| Error::not_available(format!("no /proc/diskstats row for {}", device.id)))
    }

    fn space(&mut self, device: &DiskDevice) -> Result<Option<DiskSpace>> {
        match &device.mount_point {
            Some(mount_point) => statvfs(mount_point).map(Some),
            None => Ok(None),
        }
    }
}

/// Capacity of the filesystem mounted at `path`, sizes rounded up to whole
/// megabytes the way `df` shows them.
#[cfg(unix)]
pub fn statvfs(path: &Path) -> Result<DiskSpace> {
    use std::{ffi::CString, mem::MaybeUninit, os::unix::ffi::OsStrExt};

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| Error::invalid_data(format!("mount point contains NUL: {}", path.display())))?;

    let mut vfs = MaybeUninit::<libc::statvfs>::zeroed();
    // SAFETY: c_path is NUL terminated and vfs is valid for writes
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), vfs.as_mut_ptr()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    // SAFETY: statvfs succeeded and filled the struct
    let vfs = unsafe { vfs.assume_init() };

    let frsize = vfs.f_frsize as f64;
    let blocks = vfs.f_blocks as f64;
    let available = vfs.f_bavail as f64;

    Ok(DiskSpace {
        mb_used: bytes_to_megabytes_ceil((blocks - available) * frsize),
        mb_free: bytes_to_megabytes_ceil(available * frsize),
        block_size: vfs.f_bsize as u64,
        inodes_total: vfs.f_files as u64,
        inodes_free: vfs.f_ffree as u64,
    })
}

#[cfg(not(unix))]
pub fn statvfs(path: &Path) -> Result<DiskSpace> {
    Err(Error::not_available(format!("statvfs is not available for {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISKSTATS: &str = "\
   8       0 sda 1000 10 80000 400 2000 20 160000 900 3 1200 1300 0 0 0 0
   8       1 sda1 900 5 70000 350 1800 10 150000 800 0 1100 1150 0 0 0 0
   7       0 loop0 5 0 10 0 0 0 0 0 0 0 0 0 0 0 0
   8      16 sdb 1 2 3
";

    const MOUNTS: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime 0 0
/dev/sda2 /mnt/my\\040data xfs rw,relatime 0 0
/dev/sda1 / ext4 rw,relatime 0 0
tmpfs /run tmpfs rw 0 0
";

    #[test]
    fn test_parse_diskstats_fields() {
        let rows = parse_diskstats(DISKSTATS);
        assert_eq!(rows.len(), 3);
        assert!(!rows.contains_key("sdb"));

        let sda = rows["sda"];
        assert_eq!(sda.reads, 1000);
        assert_eq!(sda.read_sectors, 80000);
        assert_eq!(sda.read_ms, 400);
        assert_eq!(sda.writes, 2000);
        assert_eq!(sda.write_sectors, 160000);
        assert_eq!(sda.write_ms, 900);
        assert_eq!(sda.io_in_progress, 3);

        let counters = sda.to_counters();
        assert_eq!(counters.read_bytes, 80000 * 512);
        assert_eq!(counters.write_bytes, 160000 * 512);
        assert_eq!(counters.queue_length, Some(3));
    }

    #[test]
    fn test_parse_mounts_keeps_dev_backed_filesystems() {
        let disks = parse_mounts(MOUNTS);
        assert_eq!(disks.len(), 2);

        assert_eq!(disks[0].id, "sda1");
        assert_eq!(disks[0].name, "/");
        assert_eq!(disks[0].fs_type.as_deref(), Some("ext4"));
        assert_eq!(disks[0].device_id(), "sda1");

        assert_eq!(disks[1].mount_point.as_deref(), Some(Path::new("/mnt/my data")));
    }

    #[test]
    fn test_physical_discovery_skips_virtual_devices() {
        let dir = tempfile::tempdir().unwrap();
        let block = dir.path().join("sys/block");
        for name in ["sdb", "sda", "loop0", "ram1", "nvme0n1"] {
            fs::create_dir_all(block.join(name)).unwrap();
        }

        let mut source = ProcDiskSource::with_roots(DiskKind::Physical, dir.path().join("proc"), dir.path().join("sys"));
        let ids: Vec<String> = source.discover().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["nvme0n1", "sda", "sdb"]);
    }

    #[test]
    fn test_counters_from_fixture_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("diskstats"), DISKSTATS).unwrap();

        let mut source = ProcDiskSource::with_roots(DiskKind::Physical, dir.path(), dir.path());
        source.refresh().unwrap();

        let sda = source.read_counters(&DiskDevice::physical("sda")).unwrap();
        assert_eq!(sda.reads, 1000);
        assert!(matches!(source.read_counters(&DiskDevice::physical("sdz")), Err(Error::NotAvailable(_))));
        assert_eq!(source.space(&DiskDevice::physical("sda")).unwrap(), None);
    }

    #[test]
    fn test_logical_space_uses_statvfs() {
        let dir = tempfile::tempdir().unwrap();
        let mounts = format!("/dev/sda1 {} ext4 rw 0 0\n", dir.path().display());
        fs::write(dir.path().join("mounts"), mounts).unwrap();

        let mut source = ProcDiskSource::with_roots(DiskKind::Logical, dir.path(), dir.path());
        let disks = source.discover().unwrap();
        assert_eq!(disks.len(), 1);

        let space = source.space(&disks[0]).unwrap().unwrap();
        assert!(space.block_size > 0);
        assert!(space.mb_used + space.mb_free > 0);
    }

    #[test]
    fn test_statvfs_missing_path() {
        assert!(statvfs(Path::new("/definitely/not/a/mount/point")).is_err());
    }
}
