//! Error taxonomy. Startup errors bubble out of `main` as a hard failure;
//! session errors never escape a session — `ring_driver` translates them into
//! a SOCKS5 reply (when one is owed) and silent cleanup.

use std::io;

/// Fatal at process startup: socket/bind/listen/setsockopt/rlimit syscalls,
/// or `io_uring` queue/buffer-registration initialization.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("syscall failed: {0}")]
    SyscallFailure(#[source] io::Error),

    #[error("io_uring initialization failed: {0}")]
    RingInitFailure(#[source] io::Error),

    #[error("kernel SQ polling requested without root privileges")]
    PollingRequiresRoot,
}

/// Raised per-session. Never propagated past `ring_driver` — `Session`
/// itself resolves protocol violations, resolution failures, and destination
/// connect failures into a REP-coded reply plus `Session::failed = true`, so
/// the driver only ever needs to branch on "is a reply owed" and "is the
/// session done", never on error kind. This variant exists for the one case
/// the driver does observe directly: a negative `io_uring` completion result.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("completion reported error {errno}")]
    CompletionError { errno: i32 },
}
