//! The completion-driven event loop (component C5). One `RingDriver` per OS
//! thread: one `io_uring`, one `BufferPool`, one `EventPool`, one
//! `Slab<Session>`. Sessions never cross threads, so nothing here needs a
//! lock.
//!
//! Structurally mirrors the teacher's `io_thread`: a thin `Ring` wrapper
//! around `io_uring::IoUring` with `push`/`wait`/`drain_cqes`, a
//! `user_data`-keyed dispatch, and per-opcode `submit_*` helpers. The
//! difference is what `user_data` encodes: the teacher packs `(op << 32) |
//! key` by hand, where here the `EventPool` already hands out a small
//! integer that doubles as both the completion cookie and the bookkeeping
//! record lookup key, so there's no manual bit-packing to get wrong.

use std::os::unix::io::{AsRawFd, RawFd};
use std::ptr;

use io_uring::{opcode, types::Fd, IoUring};
use slab::Slab;
use tracing::{debug, error, warn};

use crate::buffer_pool::BufferPool;
use crate::config;
use crate::errors::StartupError;
use crate::event_pool::{EventKind, EventPool};
use crate::metrics;
use crate::resolver::Resolver;
use crate::session::{Action, Session, SessionState};

/// Accept completions are resubmitted for the driver's entire lifetime and
/// belong to no session, so they bypass the event pool entirely rather than
/// tying up one of its records forever.
const ACCEPT_USER_DATA: u64 = u64::MAX;

struct Ring {
    inner: IoUring,
}

impl Ring {
    fn fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }

    fn push(&mut self, sqe: &io_uring::squeue::Entry) {
        loop {
            match unsafe { self.inner.submission().push(sqe) } {
                Ok(()) => return,
                Err(_) => {
                    self.inner.submit().expect("submit failed during SQ flush");
                }
            }
        }
    }

    fn wait(&mut self, n: usize) {
        self.inner
            .submit_and_wait(n)
            .expect("submit_and_wait failed");
    }

    fn drain_cqes(&mut self) -> Vec<(u64, i32)> {
        self.inner
            .completion()
            .map(|cqe| (cqe.user_data(), cqe.result()))
            .collect()
    }
}

pub struct RingDriver {
    ring: Ring,
    sessions: Slab<Session>,
    buffers: BufferPool,
    events: EventPool,
    listen_fd: RawFd,
    resolver: Box<dyn Resolver>,
    uses_fixed_buffers: bool,
}

impl RingDriver {
    /// `use_sq_poll` requests `IORING_SETUP_SQPOLL` (spec.md §6); the
    /// original source gates kernel-side SQ polling on root, so we do too
    /// rather than let an unprivileged run silently fail deep inside
    /// `io_uring::Builder::build`.
    pub fn new(
        listen_fd: RawFd,
        resolver: Box<dyn Resolver>,
        use_sq_poll: bool,
    ) -> Result<Self, StartupError> {
        if use_sq_poll && unsafe { libc::geteuid() } != 0 {
            return Err(StartupError::PollingRequiresRoot);
        }

        let mut builder = IoUring::builder();
        if use_sq_poll {
            builder.setup_sqpoll(config::SQ_THREAD_IDLE_MS);
        }
        let inner = builder
            .build(config::RING_ENTRIES)
            .map_err(StartupError::RingInitFailure)?;
        let mut ring = Ring { inner };

        let buffers = BufferPool::new(config::SESSION_CAPACITY, config::HALF_BUFFER_SIZE);
        let descriptors = buffers.registered_descriptors();
        let uses_fixed_buffers = match unsafe { ring.inner.submitter().register_buffers(&descriptors) }
        {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "fixed buffer registration failed, falling back to plain read/write");
                false
            }
        };

        Ok(Self {
            ring,
            sessions: Slab::with_capacity(config::SESSION_CAPACITY),
            buffers,
            events: EventPool::new(config::EVENT_POOL_CAPACITY),
            listen_fd,
            resolver,
            uses_fixed_buffers,
        })
    }

    /// The ring's own fd, for diagnostics only — nothing here cross-posts
    /// between rings (spec.md §5: sessions never cross threads).
    pub fn ring_fd(&self) -> RawFd {
        self.ring.fd()
    }

    pub fn run(mut self) -> ! {
        self.submit_accept();
        loop {
            self.ring.wait(1);
            for (user_data, res) in self.ring.drain_cqes() {
                if user_data == ACCEPT_USER_DATA {
                    self.handle_accept(res);
                } else {
                    self.handle_event(user_data as u32, res);
                }
            }
        }
    }

    fn handle_accept(&mut self, res: i32) {
        if res >= 0 {
            let client_fd = res as RawFd;
            match self.buffers.acquire() {
                Ok(buffer_index) => {
                    let key = self.sessions.insert(Session::new(client_fd, buffer_index));
                    metrics::inc_sessions_accepted();
                    debug!(session = key, "accepted");
                    self.submit_client_read(key);
                }
                Err(_) => {
                    metrics::inc_buffer_pool_exhausted();
                    warn!("buffer pool exhausted, rejecting accepted connection");
                    unsafe {
                        libc::close(client_fd);
                    }
                }
            }
        } else {
            error!(errno = -res, "accept failed");
        }
        self.submit_accept();
    }

    /// One completion: decrement outstanding, dispatch unless the session
    /// already failed, then destroy it if that was the last outstanding
    /// submission. A negative `res` fails the session without dispatch —
    /// the state machine never sees raw errno values, only the REP-code
    /// translation `Session` does for destination-connect failures.
    fn handle_event(&mut self, event_id: u32, res: i32) {
        let record = *self.events.get(event_id);
        let key = record.session;

        if let Some(session) = self.sessions.get_mut(key) {
            session.outstanding_submissions -= 1;

            if res < 0 {
                if !session.failed {
                    let err = crate::errors::SessionError::CompletionError { errno: -res };
                    error!(session = key, kind = ?record.kind, "{err}");
                }
                session.failed = true;
            } else if !session.failed {
                self.record_transfer_metrics(key, record.kind, res as usize);
                let action = self.dispatch(key, record.kind, res as usize);
                self.apply_action(key, action);
            }

            let done = {
                let session = &self.sessions[key];
                session.failed && session.outstanding_submissions == 0
            };
            if done {
                self.destroy_session(key);
            }
        }

        self.events.release(event_id);
    }

    fn record_transfer_metrics(&self, key: usize, kind: EventKind, n: usize) {
        match kind {
            EventKind::DestinationWrite => metrics::add_bytes_client_to_destination(n as u64),
            EventKind::ClientWrite if self.sessions[key].state() == SessionState::Relaying => {
                metrics::add_bytes_destination_to_client(n as u64)
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, key: usize, kind: EventKind, n: usize) -> Action {
        match kind {
            EventKind::ClientAccept => unreachable!("accept completions bypass the event pool"),
            EventKind::ClientRead => {
                let buffer_index = self.sessions[key].buffer_index;
                let half0 = self.buffers.half0(buffer_index);
                self.sessions[key].on_client_read(n, half0, self.resolver.as_ref())
            }
            EventKind::ClientWrite => self.sessions[key].on_client_write(n, self.resolver.as_ref()),
            EventKind::DestinationConnect => {
                if let Some(dest) = self.sessions[key].destination.as_ref() {
                    debug!(session = key, port = dest.port(), "destination connected");
                }
                self.sessions[key].on_destination_connect()
            }
            EventKind::DestinationRead => self.sessions[key].on_destination_read(n),
            EventKind::DestinationWrite => self.sessions[key].on_destination_write(n),
        }
    }

    fn apply_action(&mut self, key: usize, action: Action) {
        match action {
            Action::None => {}
            Action::SubmitClientRead => self.submit_client_read(key),
            Action::SubmitClientReply => self.submit_client_reply(key),
            Action::SubmitClientWrite { size, offset } => {
                self.submit_client_write(key, size, offset)
            }
            Action::SubmitDestinationConnect => self.submit_destination_connect(key),
            Action::SubmitDestinationRead => self.submit_destination_read(key),
            Action::SubmitDestinationWrite { size, offset } => {
                self.submit_destination_write(key, size, offset)
            }
            Action::EnterRelay => {
                self.submit_destination_read(key);
                self.submit_client_read(key);
            }
        }
    }

    fn destroy_session(&mut self, key: usize) {
        let session = self.sessions.remove(key);
        self.buffers.release(session.buffer_index);
        metrics::inc_sessions_closed();
        metrics::inc_sessions_failed();
        debug!(session = key, "session closed");
        unsafe {
            libc::close(session.client_fd);
        }
        // `session.destination`'s socket2::Socket closes its own fd on drop.
    }

    // --- The six submission primitives (spec.md §4.5) ---

    fn submit_accept(&mut self) {
        let sqe = opcode::Accept::new(Fd(self.listen_fd), ptr::null_mut(), ptr::null_mut())
            .build()
            .user_data(ACCEPT_USER_DATA);
        self.ring.push(&sqe);
    }

    fn submit_client_read(&mut self, key: usize) {
        let (client_fd, buffer_index) = {
            let s = &self.sessions[key];
            (s.client_fd, s.buffer_index)
        };
        let event_id = self.events.acquire(key, EventKind::ClientRead);
        let (ptr, len) = self.buffers.half0_raw(buffer_index);
        let sqe = if self.uses_fixed_buffers {
            opcode::ReadFixed::new(Fd(client_fd), ptr, len as u32, (buffer_index * 2) as u16).build()
        } else {
            opcode::Read::new(Fd(client_fd), ptr, len as u32).build()
        }
        .user_data(event_id as u64);
        self.sessions[key].outstanding_submissions += 1;
        self.ring.push(&sqe);
    }

    /// Copy the next chunk of the pending handshake reply into half1, then
    /// submit the write from offset 0 — the recopy-on-every-chunk strategy
    /// spec.md §4.4 describes for reply delivery (as opposed to the
    /// no-copy, true-offset path relay writes use).
    fn submit_client_reply(&mut self, key: usize) {
        let buffer_index = self.sessions[key].buffer_index;
        let chunk_len = {
            let half1 = self.buffers.half1_mut(buffer_index);
            self.sessions[key].fill_client_reply_chunk(half1)
        };
        self.submit_client_write(key, chunk_len, 0);
    }

    fn submit_client_write(&mut self, key: usize, size: usize, offset: usize) {
        let (client_fd, buffer_index) = {
            let s = &self.sessions[key];
            (s.client_fd, s.buffer_index)
        };
        let event_id = self.events.acquire(key, EventKind::ClientWrite);
        let (base, _) = self.buffers.half1_raw(buffer_index);
        let ptr = unsafe { base.add(offset) };
        let sqe = if self.uses_fixed_buffers {
            opcode::WriteFixed::new(Fd(client_fd), ptr, size as u32, (buffer_index * 2 + 1) as u16)
                .build()
        } else {
            opcode::Write::new(Fd(client_fd), ptr, size as u32).build()
        }
        .user_data(event_id as u64);
        self.sessions[key].outstanding_submissions += 1;
        self.ring.push(&sqe);
    }

    fn submit_destination_connect(&mut self, key: usize) {
        let (dest_fd, sockaddr_ptr, sockaddr_len) = {
            let dest = self.sessions[key]
                .destination
                .as_ref()
                .expect("destination present before connect submission");
            let (ptr, len) = dest.sockaddr();
            (dest.fd(), ptr, len)
        };
        let event_id = self.events.acquire(key, EventKind::DestinationConnect);
        let sqe = opcode::Connect::new(Fd(dest_fd), sockaddr_ptr, sockaddr_len)
            .build()
            .user_data(event_id as u64);
        self.sessions[key].outstanding_submissions += 1;
        self.ring.push(&sqe);
    }

    fn submit_destination_read(&mut self, key: usize) {
        let buffer_index = self.sessions[key].buffer_index;
        let dest_fd = self.sessions[key]
            .destination
            .as_ref()
            .expect("destination present while relaying")
            .fd();
        let event_id = self.events.acquire(key, EventKind::DestinationRead);
        let (ptr, len) = self.buffers.half1_raw(buffer_index);
        let sqe = if self.uses_fixed_buffers {
            opcode::ReadFixed::new(Fd(dest_fd), ptr, len as u32, (buffer_index * 2 + 1) as u16)
                .build()
        } else {
            opcode::Read::new(Fd(dest_fd), ptr, len as u32).build()
        }
        .user_data(event_id as u64);
        self.sessions[key].outstanding_submissions += 1;
        self.ring.push(&sqe);
    }

    fn submit_destination_write(&mut self, key: usize, size: usize, offset: usize) {
        let buffer_index = self.sessions[key].buffer_index;
        let dest_fd = self.sessions[key]
            .destination
            .as_ref()
            .expect("destination present while relaying")
            .fd();
        let event_id = self.events.acquire(key, EventKind::DestinationWrite);
        let (base, _) = self.buffers.half0_raw(buffer_index);
        let ptr = unsafe { base.add(offset) };
        let sqe = if self.uses_fixed_buffers {
            opcode::WriteFixed::new(Fd(dest_fd), ptr, size as u32, (buffer_index * 2) as u16).build()
        } else {
            opcode::Write::new(Fd(dest_fd), ptr, size as u32).build()
        }
        .user_data(event_id as u64);
        self.sessions[key].outstanding_submissions += 1;
        self.ring.push(&sqe);
    }
}
