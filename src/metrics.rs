#[cfg(feature = "metrics")]
mod imp {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    // Throughput (cumulative counts)
    static SESSIONS_ACCEPTED: AtomicU64 = AtomicU64::new(0);
    static SESSIONS_CLOSED: AtomicU64 = AtomicU64::new(0);
    static SESSIONS_FAILED: AtomicU64 = AtomicU64::new(0);
    static BYTES_CLIENT_TO_DESTINATION: AtomicU64 = AtomicU64::new(0);
    static BYTES_DESTINATION_TO_CLIENT: AtomicU64 = AtomicU64::new(0);
    // Stall / rejection counts
    static BUFFER_POOL_EXHAUSTED: AtomicU64 = AtomicU64::new(0);
    static RESOLUTION_FAILURES: AtomicU64 = AtomicU64::new(0);
    static DESTINATION_CONNECT_FAILURES: AtomicU64 = AtomicU64::new(0);
    // Gauges
    static SESSIONS_ACTIVE: AtomicUsize = AtomicUsize::new(0);
    static SESSIONS_ACTIVE_MAX: AtomicUsize = AtomicUsize::new(0);

    #[derive(Clone, Copy)]
    pub struct MetricsSnapshot {
        pub sessions_accepted: u64,
        pub sessions_closed: u64,
        pub sessions_failed: u64,
        pub bytes_client_to_destination: u64,
        pub bytes_destination_to_client: u64,
        pub buffer_pool_exhausted: u64,
        pub resolution_failures: u64,
        pub destination_connect_failures: u64,
        pub sessions_active: usize,
        pub sessions_active_max: usize,
    }

    fn update_max(target: &AtomicUsize, value: usize) {
        let mut prev = target.load(Ordering::Relaxed);
        while value > prev {
            match target.compare_exchange_weak(prev, value, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(next) => prev = next,
            }
        }
    }

    pub fn inc_sessions_accepted() {
        SESSIONS_ACCEPTED.fetch_add(1, Ordering::Relaxed);
        let v = SESSIONS_ACTIVE.fetch_add(1, Ordering::Relaxed) + 1;
        update_max(&SESSIONS_ACTIVE_MAX, v);
    }

    pub fn inc_sessions_closed() {
        SESSIONS_CLOSED.fetch_add(1, Ordering::Relaxed);
        SESSIONS_ACTIVE.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn inc_sessions_failed() {
        SESSIONS_FAILED.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_client_to_destination(n: u64) {
        BYTES_CLIENT_TO_DESTINATION.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_bytes_destination_to_client(n: u64) {
        BYTES_DESTINATION_TO_CLIENT.fetch_add(n, Ordering::Relaxed);
    }

    pub fn inc_buffer_pool_exhausted() {
        BUFFER_POOL_EXHAUSTED.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_resolution_failures() {
        RESOLUTION_FAILURES.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_destination_connect_failures() {
        DESTINATION_CONNECT_FAILURES.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_accepted: SESSIONS_ACCEPTED.load(Ordering::Relaxed),
            sessions_closed: SESSIONS_CLOSED.load(Ordering::Relaxed),
            sessions_failed: SESSIONS_FAILED.load(Ordering::Relaxed),
            bytes_client_to_destination: BYTES_CLIENT_TO_DESTINATION.load(Ordering::Relaxed),
            bytes_destination_to_client: BYTES_DESTINATION_TO_CLIENT.load(Ordering::Relaxed),
            buffer_pool_exhausted: BUFFER_POOL_EXHAUSTED.load(Ordering::Relaxed),
            resolution_failures: RESOLUTION_FAILURES.load(Ordering::Relaxed),
            destination_connect_failures: DESTINATION_CONNECT_FAILURES.load(Ordering::Relaxed),
            sessions_active: SESSIONS_ACTIVE.load(Ordering::Relaxed),
            sessions_active_max: SESSIONS_ACTIVE_MAX.load(Ordering::Relaxed),
        }
    }

    pub fn spawn_reporter() {
        const INTERVAL_SECS: u64 = 10;
        std::thread::spawn(|| {
            let mut last = snapshot();
            loop {
                std::thread::sleep(Duration::from_secs(INTERVAL_SECS));
                let snap = snapshot();
                tracing::info!(
                    accepted = snap.sessions_accepted.saturating_sub(last.sessions_accepted),
                    closed = snap.sessions_closed.saturating_sub(last.sessions_closed),
                    failed = snap.sessions_failed.saturating_sub(last.sessions_failed),
                    bytes_c2d = snap
                        .bytes_client_to_destination
                        .saturating_sub(last.bytes_client_to_destination),
                    bytes_d2c = snap
                        .bytes_destination_to_client
                        .saturating_sub(last.bytes_destination_to_client),
                    buffer_pool_exhausted = snap
                        .buffer_pool_exhausted
                        .saturating_sub(last.buffer_pool_exhausted),
                    resolution_failures = snap
                        .resolution_failures
                        .saturating_sub(last.resolution_failures),
                    destination_connect_failures = snap
                        .destination_connect_failures
                        .saturating_sub(last.destination_connect_failures),
                    active = snap.sessions_active,
                    active_max = snap.sessions_active_max,
                    "metrics delta ({}s)",
                    INTERVAL_SECS,
                );
                last = snap;
            }
        });
    }
}

#[cfg(not(feature = "metrics"))]
#[allow(dead_code)]
mod imp {
    #[derive(Clone, Copy)]
    pub struct MetricsSnapshot {
        pub sessions_accepted: u64,
        pub sessions_closed: u64,
        pub sessions_failed: u64,
        pub bytes_client_to_destination: u64,
        pub bytes_destination_to_client: u64,
        pub buffer_pool_exhausted: u64,
        pub resolution_failures: u64,
        pub destination_connect_failures: u64,
        pub sessions_active: usize,
        pub sessions_active_max: usize,
    }

    pub fn inc_sessions_accepted() {}
    pub fn inc_sessions_closed() {}
    pub fn inc_sessions_failed() {}
    pub fn add_bytes_client_to_destination(_: u64) {}
    pub fn add_bytes_destination_to_client(_: u64) {}
    pub fn inc_buffer_pool_exhausted() {}
    pub fn inc_resolution_failures() {}
    pub fn inc_destination_connect_failures() {}
    pub fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_accepted: 0,
            sessions_closed: 0,
            sessions_failed: 0,
            bytes_client_to_destination: 0,
            bytes_destination_to_client: 0,
            buffer_pool_exhausted: 0,
            resolution_failures: 0,
            destination_connect_failures: 0,
            sessions_active: 0,
            sessions_active_max: 0,
        }
    }
    pub fn spawn_reporter() {}
}

pub use imp::*;
