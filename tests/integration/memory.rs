use std::time::Duration;

use pal_metrics::{
    memory::{MemoryInstance, MemoryStats},
    traits::Enumeration,
};

use crate::common::{config, wait_for, FakeMemorySource};

const MB: u64 = 1024 * 1024;

fn stats() -> MemoryStats {
    MemoryStats {
        total_physical: Some(8192 * MB),
        available: Some(2048 * MB),
        reserved: None,
        total_swap: Some(1024 * MB),
        available_swap: Some(1000 * MB),
    }
}

#[test]
fn test_paging_rates_from_background_loop() {
    let source = FakeMemorySource::new(stats());
    let passes = source.passes.clone();
    let mut memory = MemoryInstance::with_source(Box::new(source), config(Duration::from_secs(1))).unwrap();
    memory.init().unwrap();
    memory.sample().unwrap();
    memory.sample().unwrap();

    // Uniform growth keeps the rate stable however many passes the
    // background thread adds meanwhile
    assert_eq!(memory.page_reads(), Some(120));
    assert_eq!(memory.page_writes(), Some(60));
    assert!(wait_for(Duration::from_secs(10), || passes.load(std::sync::atomic::Ordering::SeqCst) >= 4));
    memory.clean_up();

    let paging = memory.paging_since_boot().unwrap();
    assert_eq!(paging.page_reads % 120, 0);
    assert_eq!(paging.page_writes * 2, paging.page_reads);
}

#[test]
fn test_sizes() {
    let mut memory = MemoryInstance::with_source(Box::new(FakeMemorySource::new(stats())), config(Duration::from_secs(1)))
        .unwrap();
    memory.init().unwrap();

    assert_eq!(memory.total_physical_memory(), Some(8192 * MB));
    assert_eq!(memory.used_memory(), Some(6144 * MB));
    assert_eq!(memory.reserved_memory(), None);
    assert_eq!(memory.used_swap(), Some(24 * MB));
    memory.clean_up();
    assert!(!memory.is_running());
}
