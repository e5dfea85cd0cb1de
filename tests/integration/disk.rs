use std::{sync::atomic::Ordering, time::Duration};

use pal_metrics::{
    disk::{DiskDevice, DiskKind, StatisticalDiskEnumeration, TOTAL_DISK_NAME},
    sampling::LoopState,
    traits::Enumeration,
};

use crate::common::{config, wait_for, FakeDiskSource, IDLE_INTERVAL};

fn physical_disks() -> Vec<DiskDevice> {
    ["sda", "sdb", "sdc", "sdd", "sde"].into_iter().map(DiskDevice::physical).collect()
}

fn logical_disks() -> Vec<DiskDevice> {
    vec![
        DiskDevice::logical("sda1", "/dev/sda1", "/", "ext4"),
        DiskDevice::logical("sdb1", "/dev/sdb1", "/var", "xfs"),
    ]
}

#[test]
fn test_failing_disk_is_skipped_every_pass() {
    let source = FakeDiskSource::new(physical_disks());
    source.fail("sdc");
    let (passes, reads) = (source.passes.clone(), source.reads.clone());

    let mut disks =
        StatisticalDiskEnumeration::with_source(DiskKind::Physical, Box::new(source), config(Duration::from_millis(10)))
            .unwrap();
    disks.init().unwrap();
    let instances = disks.instances();

    assert!(wait_for(Duration::from_secs(10), || disks.sampling_passes() >= 5));
    assert!(disks.is_running());
    disks.clean_up();
    assert_eq!(disks.sampling_state(), LoopState::Stopped);

    // Every pass still asked all five disks
    let passes = passes.load(Ordering::SeqCst);
    assert!(passes >= 6);
    assert_eq!(reads.load(Ordering::SeqCst), passes * 5);

    for disk in instances {
        if disk.name() == "sdc" {
            assert_eq!(disk.samples(), 0);
            assert_eq!(disk.last_metrics(), None);
        } else {
            assert_eq!(disk.samples(), 6, "{}", disk.name());
            assert_eq!(disk.reads_per_second(), Some(10_000));
        }
        assert!(!disk.is_online());
    }
}

#[test]
fn test_logical_disk_rates_and_capacity() {
    let mut disks = StatisticalDiskEnumeration::with_source(
        DiskKind::Logical,
        Box::new(FakeDiskSource::new(logical_disks())),
        config(Duration::from_secs(1)),
    )
    .unwrap();
    disks.init().unwrap();
    disks.sample().unwrap();
    disks.sample().unwrap();

    let root = disks.find("/").unwrap();
    assert_eq!(root.device_id(), "sda1");
    assert_eq!(root.fs_type(), Some("ext4"));
    assert_eq!(root.reads_per_second(), Some(100));
    assert_eq!(root.writes_per_second(), Some(50));
    assert_eq!(root.bytes_per_second(), Some((51_200, 25_600)));
    assert_eq!(root.disk_size(), Some((250, 750)));
    assert_eq!(root.inode_usage(), Some((65_536, 60_000)));
    assert_eq!(root.disk_queue_length(), Some(1.0));

    let (per_read, per_write) = root.io_times().unwrap();
    assert!((per_read - 0.001).abs() < 1e-9);
    assert!((per_write - 0.002).abs() < 1e-9);

    let var = disks.find_by_device("/dev/sdb1").unwrap();
    assert_eq!(var.name(), "/var");

    let total = disks.total();
    assert_eq!(total.name, TOTAL_DISK_NAME);
    assert_eq!(total.mb_used, 500);
    assert_eq!(total.mb_free, 1500);
    assert_eq!(total.reads_per_second, 200);
    disks.clean_up();
}

#[test]
fn test_unmounted_disk_goes_offline() {
    let source = FakeDiskSource::new(logical_disks());
    let present = source.disks.clone();
    let mut disks =
        StatisticalDiskEnumeration::with_source(DiskKind::Logical, Box::new(source), config(IDLE_INTERVAL)).unwrap();
    disks.init().unwrap();

    let var = disks.find("/var").unwrap();
    present.lock().retain(|d| d.name != "/var");
    disks.update(true).unwrap();

    assert!(!var.is_online());
    assert!(disks.find("/var").is_none());
    assert_eq!(disks.len(), 1);

    // The removed disk's history stays readable through the old handle
    assert_eq!(var.samples(), 1);
    disks.clean_up();
}

#[test]
fn test_statistics_serialize() {
    let mut disks = StatisticalDiskEnumeration::with_source(
        DiskKind::Physical,
        Box::new(FakeDiskSource::new(physical_disks())),
        config(IDLE_INTERVAL),
    )
    .unwrap();
    disks.init().unwrap();

    let json = serde_json::to_value(disks.total()).unwrap();
    assert_eq!(json["name"], TOTAL_DISK_NAME);
    assert_eq!(json["mb_used"], 0);
    disks.clean_up();
}
