//! Fixed pool of completion bookkeeping records (component C2).
//!
//! Each in-flight submission owns exactly one `EventRecord` from this pool,
//! used as the `io_uring` `user_data` cookie so a completion can be routed
//! back to the session that issued it. Capacity is `4 * session_capacity`:
//! each session has at most four concurrent outstanding submissions
//! (client-read, client-write, destination-read, destination-write) plus
//! occasional one-shot connects, so exceeding that is a bug — asserted in
//! debug builds, the same contract the teacher's free-list pools keep.

use std::collections::VecDeque;

/// What kind of submission a record is standing in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ClientAccept,
    ClientRead,
    ClientWrite,
    DestinationConnect,
    DestinationRead,
    DestinationWrite,
}

/// `session` is a stable slab key (never a raw pointer), so a completion for
/// an already-destroyed session is structurally impossible: the slot is only
/// freed once `outstanding_submissions == 0`, by which point no event record
/// can still reference it.
#[derive(Debug, Clone, Copy)]
pub struct EventRecord {
    pub id: u32,
    pub session: usize,
    pub kind: EventKind,
}

pub struct EventPool {
    records: Vec<EventRecord>,
    free: VecDeque<u32>,
}

impl EventPool {
    pub fn new(capacity: usize) -> Self {
        let records = (0..capacity as u32)
            .map(|id| EventRecord {
                id,
                session: 0,
                kind: EventKind::ClientAccept,
            })
            .collect();
        let free = (0..capacity as u32).collect();
        Self { records, free }
    }

    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    pub fn in_use(&self) -> usize {
        self.records.len() - self.free.len()
    }

    /// Pop a free record, stamp it with `session`/`kind`, and return its id.
    /// Debug-asserts rather than errors on exhaustion: per spec.md §4.2,
    /// running out is a sizing bug, not a runtime condition to recover from.
    pub fn acquire(&mut self, session: usize, kind: EventKind) -> u32 {
        let id = self
            .free
            .pop_front()
            .expect("event pool exhausted — more than 4 submissions in flight per session");
        let record = &mut self.records[id as usize];
        record.session = session;
        record.kind = kind;
        id
    }

    pub fn get(&self, id: u32) -> &EventRecord {
        &self.records[id as usize]
    }

    /// Return `id` to the free list. Idempotence is not required; callers
    /// must release exactly once per acquire.
    pub fn release(&mut self, id: u32) {
        debug_assert!((id as usize) < self.records.len());
        self.free.push_back(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_stamps_session_and_kind() {
        let mut pool = EventPool::new(4);
        let id = pool.acquire(7, EventKind::ClientRead);
        let rec = pool.get(id);
        assert_eq!(rec.session, 7);
        assert_eq!(rec.kind, EventKind::ClientRead);
    }

    #[test]
    fn release_allows_reacquire_and_tracks_in_use() {
        let mut pool = EventPool::new(2);
        let a = pool.acquire(0, EventKind::ClientRead);
        assert_eq!(pool.in_use(), 1);
        pool.release(a);
        assert_eq!(pool.in_use(), 0);
        let b = pool.acquire(1, EventKind::ClientWrite);
        assert_eq!(pool.get(b).session, 1);
    }

    #[test]
    #[should_panic]
    fn exhaustion_panics_as_a_sizing_bug() {
        let mut pool = EventPool::new(1);
        let _a = pool.acquire(0, EventKind::ClientRead);
        let _b = pool.acquire(0, EventKind::ClientWrite);
    }
}
