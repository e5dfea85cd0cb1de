use std::time::Duration;

use pal_metrics::{
    cpu::{CpuEnumeration, UnsupportedCpuSource},
    sampling::LoopState,
    traits::Enumeration,
};

use crate::common::{config, wait_for, FakeCpuSource, IDLE_INTERVAL};

#[test]
fn test_background_sampling_fills_windows() {
    let source = FakeCpuSource::new(&[0, 1]);
    let mut cpus = CpuEnumeration::with_source(Box::new(source), config(Duration::from_millis(10))).unwrap();
    cpus.init().unwrap();

    let total = cpus.total();
    assert!(wait_for(Duration::from_secs(10), || total.samples() >= 3));
    cpus.clean_up();

    assert_eq!(cpus.sampling_state(), LoopState::Stopped);
    assert_eq!(total.processor_time(), Some(40));
    assert_eq!(total.idle_time(), Some(60));
    assert_eq!(total.user_time(), Some(30));
    assert_eq!(total.privileged_time(), Some(10));
}

#[test]
fn test_per_processor_instances() {
    let source = FakeCpuSource::new(&[0, 1, 2]);
    let online = source.online.clone();
    let mut cpus = CpuEnumeration::with_source(Box::new(source), config(IDLE_INTERVAL)).unwrap();
    cpus.init().unwrap();
    cpus.sample().unwrap();

    assert_eq!(cpus.len(), 3);
    for cpu in cpus.instances() {
        assert_eq!(cpu.processor_time(), Some(40));
        assert!(!cpu.is_total());
    }

    online.lock().push(3);
    cpus.update(true).unwrap();
    assert_eq!(cpus.len(), 4);
    assert_eq!(cpus.find(3).unwrap().samples(), 0);
    cpus.clean_up();
}

#[test]
fn test_unsupported_platform_fails_init() {
    let mut cpus = CpuEnumeration::with_source(Box::new(UnsupportedCpuSource), config(IDLE_INTERVAL)).unwrap();
    assert!(cpus.init().is_err());
    assert!(!cpus.is_running());
    assert!(cpus.is_empty());
}
