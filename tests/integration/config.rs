use std::{env, sync::Mutex, time::Duration};

use once_cell::sync::Lazy;
use pal_metrics::{
    config::{MetricsDomain, SamplingConfig},
    Error,
};

// Environment variables are process wide
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn clear(prefix: &str) {
    env::remove_var(format!("{prefix}_SAMPLE_SECS"));
    env::remove_var(format!("{prefix}_SAMPLE_DEPTH"));
}

#[test]
fn test_from_env_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear("PAL_MEMORY");

    let config = SamplingConfig::from_env(MetricsDomain::Memory).unwrap();
    assert_eq!(config, SamplingConfig::for_domain(MetricsDomain::Memory));
}

#[test]
fn test_from_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    env::set_var("PAL_DISK_SAMPLE_SECS", "15");
    env::set_var("PAL_DISK_SAMPLE_DEPTH", " 12 ");

    let config = SamplingConfig::from_env(MetricsDomain::Disk).unwrap();
    assert_eq!(config.interval, Duration::from_secs(15));
    assert_eq!(config.depth, 12);

    // Other domains are unaffected
    clear("PAL_CPU");
    assert_eq!(SamplingConfig::from_env(MetricsDomain::Cpu).unwrap().depth, 6);
    clear("PAL_DISK");
}

#[test]
fn test_from_env_rejects_bad_values() {
    let _guard = ENV_LOCK.lock().unwrap();

    env::set_var("PAL_CPU_SAMPLE_SECS", "soon");
    assert!(matches!(SamplingConfig::from_env(MetricsDomain::Cpu), Err(Error::InvalidConfig(_))));

    env::set_var("PAL_CPU_SAMPLE_SECS", "0");
    assert!(matches!(SamplingConfig::from_env(MetricsDomain::Cpu), Err(Error::InvalidConfig(_))));

    env::set_var("PAL_CPU_SAMPLE_SECS", "5");
    env::set_var("PAL_CPU_SAMPLE_DEPTH", "1");
    assert!(matches!(SamplingConfig::from_env(MetricsDomain::Cpu), Err(Error::InvalidConfig(_))));
    clear("PAL_CPU");
}
