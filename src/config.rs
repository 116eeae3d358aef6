//! Server sizing and operational configuration.
//!
//! Hardcoded values that are not themselves part of the wire protocol.
//! Protocol constants (e.g. `VERSION`, `ATYP_IPV4`) live in `constants`.

/// Per-half buffer capacity in bytes. Each session owns two halves, so the
/// per-session footprint is `2 * HALF_BUFFER_SIZE`.
pub const HALF_BUFFER_SIZE: usize = 16 * 1024;

/// Max concurrent sessions per ring driver (one ring driver per OS thread).
pub const SESSION_CAPACITY: usize = 4096;

/// Event pool capacity: each session has at most four concurrent outstanding
/// submissions (client-read, client-write, destination-read, destination-write)
/// plus occasional one-shot connects.
pub const EVENT_POOL_CAPACITY: usize = 4 * SESSION_CAPACITY;

/// io_uring submission queue depth.
pub const RING_ENTRIES: u32 = 4096;

/// Backlog passed to `listen(2)` on the shared listening socket.
pub const LISTEN_BACKLOG: i32 = 1024;

/// `sq_thread_idle` in milliseconds, used only when kernel-side SQ polling
/// is requested and the process is privileged.
pub const SQ_THREAD_IDLE_MS: u32 = 5_000;

/// Target for `RLIMIT_MEMLOCK`, raised at startup unconditionally.
pub const RLIMIT_MEMLOCK_TARGET: u64 = 1 << 16;

const _: () = assert!(
    EVENT_POOL_CAPACITY == 4 * SESSION_CAPACITY,
    "event pool must cover 4 concurrent submissions per session"
);
