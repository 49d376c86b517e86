use once_cell::sync::Lazy;
use std::time::Instant;

static PROCESS_START: Lazy<Instant> = Lazy::new(Instant::now);

/// Must be touched once at startup so uptime is measured from boot.
pub fn init_uptime() {
    Lazy::force(&PROCESS_START);
}

pub fn uptime_seconds() -> u64 {
    PROCESS_START.elapsed().as_secs()
}
