//! Per-session SOCKS5 protocol state machine (component C4).
//!
//! Kept free of `io_uring` itself, the same way the teacher separates
//! `request_flow`/`response_flow` (ring-free, unit-testable) from
//! `io_thread` (the real completion loop): every decode step here returns an
//! [`Action`] describing what submission the ring driver should make next,
//! rather than touching a ring directly. That is also what makes the
//! "session destroyed while a submission is in flight" hazard structurally
//! impossible — sessions are addressed by slab key everywhere, never by
//! reference (see `ring_driver`).

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::os::unix::io::RawFd;

use crate::constants::*;
use crate::destination::Destination;
use crate::metrics;
use crate::protocol::{self, AddressType};
use crate::resolver::Resolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    ReadingClientGreeting,
    ReadingAuthMethods,
    ReadingClientConnectionRequest,
    ReadingDomainNameLength,
    ReadingAddress,
    ConnectingToDestination,
    Relaying,
}

/// Replaces the source's `std::function<bool()>` read-completion closure
/// with a concrete sum type (spec.md §9 Design Notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadGate {
    ExactlyN(usize),
    AtLeastOne,
}

impl ReadGate {
    fn is_satisfied(&self, buffered: usize) -> bool {
        match *self {
            ReadGate::ExactlyN(n) => buffered >= n,
            ReadGate::AtLeastOne => buffered > 0,
        }
    }
}

/// What the ring driver should submit next, as decided by the state
/// machine. One `Action` per dispatch call — `EnterRelay` is the one
/// exception, standing in for the two submissions spec.md §4.4 asks for
/// simultaneously (an initial destination-read and a client-read gated on
/// "any bytes") when the handshake's success reply finishes writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing further to submit for this session right now (e.g. the
    /// session was just marked failed with no reply owed).
    None,
    SubmitClientRead,
    /// Copy the next chunk of `pending_client_write` into half1 and submit
    /// a write of that length at offset 0 — the handshake-reply delivery
    /// path, which recopies remaining bytes to the front on every partial
    /// write rather than tracking an offset into the source buffer.
    SubmitClientReply,
    /// Write `size` bytes already resident in half1 starting at `offset` —
    /// the relay path, where the bytes come from an earlier destination
    /// read rather than being recopied.
    SubmitClientWrite { size: usize, offset: usize },
    SubmitDestinationConnect,
    SubmitDestinationRead,
    SubmitDestinationWrite { size: usize, offset: usize },
    EnterRelay,
}

enum DispatchOutcome {
    NewGateInstalled,
    Action(Action),
}

/// Central per-client entity (spec.md §3). `buffer_index` and the two
/// outstanding-submission/failed flags are owned and mutated by
/// `ring_driver`; everything handshake-related is owned by this type.
pub struct Session {
    pub client_fd: RawFd,
    pub buffer_index: usize,

    state: SessionState,
    read_accumulator: Vec<u8>,
    read_gate: ReadGate,
    pending_client_write: Vec<u8>,

    auth_methods_count: usize,
    auth_method: u8,
    address_type: Option<AddressType>,
    domain_name_length: usize,
    domain_name: String,
    ipv4_address: [u8; 4],
    ipv6_address: [u8; 16],
    port: u16,

    pub destination: Option<Destination>,

    client_write_size: usize,
    client_write_offset: usize,
    destination_write_size: usize,
    destination_write_offset: usize,

    /// Count of submissions referencing this session whose completions have
    /// not yet been reaped. Owned by `ring_driver`; a session is destroyable
    /// only once this reaches zero with `failed` set.
    pub outstanding_submissions: u32,
    /// Sticky: once set, the ring driver drains remaining completions for
    /// this session without dispatching them to state-machine methods.
    pub failed: bool,
}

impl Session {
    /// `want_read(3)` at accept time (spec.md §4.5's completion-loop
    /// pseudocode), even though the greeting header is only 2 bytes: any
    /// 3rd buffered byte simply sits in the accumulator until the
    /// `ReadingAuthMethods` gate consumes it, exactly as a bigger pipelined
    /// read would.
    pub fn new(client_fd: RawFd, buffer_index: usize) -> Self {
        Self {
            client_fd,
            buffer_index,
            state: SessionState::ReadingClientGreeting,
            read_accumulator: Vec::new(),
            read_gate: ReadGate::ExactlyN(3),
            pending_client_write: Vec::new(),
            auth_methods_count: 0,
            auth_method: 0,
            address_type: None,
            domain_name_length: 0,
            domain_name: String::new(),
            ipv4_address: [0; 4],
            ipv6_address: [0; 16],
            port: 0,
            destination: None,
            client_write_size: 0,
            client_write_offset: 0,
            destination_write_size: 0,
            destination_write_offset: 0,
            outstanding_submissions: 0,
            failed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn read_gate(&self) -> ReadGate {
        self.read_gate
    }

    pub fn pending_client_write(&self) -> &[u8] {
        &self.pending_client_write
    }

    fn consume(&mut self, n: usize) {
        self.read_accumulator.drain(0..n);
    }

    fn run_read_loop(&mut self, resolver: &dyn Resolver) -> Action {
        loop {
            if !self.read_gate.is_satisfied(self.read_accumulator.len()) {
                return Action::SubmitClientRead;
            }
            match self.dispatch_current_state(resolver) {
                DispatchOutcome::NewGateInstalled => continue,
                DispatchOutcome::Action(action) => return action,
            }
        }
    }

    fn want_read(&mut self, gate: ReadGate, resolver: &dyn Resolver) -> Action {
        self.read_gate = gate;
        self.run_read_loop(resolver)
    }

    fn dispatch_current_state(&mut self, resolver: &dyn Resolver) -> DispatchOutcome {
        match self.state {
            SessionState::ReadingClientGreeting => self.read_client_greeting(),
            SessionState::ReadingAuthMethods => self.read_auth_methods(),
            SessionState::ReadingClientConnectionRequest => self.read_client_connection_request(),
            SessionState::ReadingDomainNameLength => self.read_domain_name_length(),
            SessionState::ReadingAddress => self.read_address(resolver),
            SessionState::ConnectingToDestination | SessionState::Relaying => {
                unreachable!("client bytes are not decoded while connecting or relaying")
            }
        }
    }

    fn fail_with_reply(&mut self, rep: u8) -> DispatchOutcome {
        self.pending_client_write = protocol::fail_reply(rep);
        self.failed = true;
        DispatchOutcome::Action(Action::SubmitClientReply)
    }

    fn read_client_greeting(&mut self) -> DispatchOutcome {
        match protocol::parse_greeting_header(&self.read_accumulator[..2]) {
            Ok(nmethods) => {
                self.auth_methods_count = nmethods as usize;
                self.consume(2);
                self.state = SessionState::ReadingAuthMethods;
                self.read_gate = ReadGate::ExactlyN(self.auth_methods_count);
                DispatchOutcome::NewGateInstalled
            }
            Err(_) => {
                // No reply is owed for a bad greeting: the source closes
                // without writing anything (property 6).
                self.failed = true;
                DispatchOutcome::Action(Action::None)
            }
        }
    }

    fn read_auth_methods(&mut self) -> DispatchOutcome {
        let methods = self.read_accumulator[..self.auth_methods_count].to_vec();
        self.consume(self.auth_methods_count);
        if protocol::offers_no_auth(&methods) {
            self.auth_method = AUTH_NO_AUTHENTICATION;
        } else {
            self.auth_method = AUTH_NO_ACCEPTABLE_METHODS;
            self.failed = true;
        }
        self.pending_client_write =
            protocol::method_selection_reply(self.auth_method).to_vec();
        DispatchOutcome::Action(Action::SubmitClientReply)
    }

    fn read_client_connection_request(&mut self) -> DispatchOutcome {
        let buf = &self.read_accumulator[..4];
        if buf[0] != VERSION || !protocol::is_connect_command(buf[1]) || buf[2] != 0x00 {
            return self.fail_with_reply(REP_COMMAND_NOT_SUPPORTED);
        }
        let atyp_byte = buf[3];
        self.consume(4);
        match AddressType::from_atyp(atyp_byte) {
            Some(AddressType::V4) => {
                self.address_type = Some(AddressType::V4);
                self.state = SessionState::ReadingAddress;
                self.read_gate = ReadGate::ExactlyN(6);
                DispatchOutcome::NewGateInstalled
            }
            Some(AddressType::DomainName) => {
                self.address_type = Some(AddressType::DomainName);
                self.state = SessionState::ReadingDomainNameLength;
                self.read_gate = ReadGate::ExactlyN(1);
                DispatchOutcome::NewGateInstalled
            }
            Some(AddressType::V6) => {
                self.address_type = Some(AddressType::V6);
                self.state = SessionState::ReadingAddress;
                self.read_gate = ReadGate::ExactlyN(18);
                DispatchOutcome::NewGateInstalled
            }
            None => self.fail_with_reply(REP_CONNECTION_REFUSED),
        }
    }

    fn read_domain_name_length(&mut self) -> DispatchOutcome {
        let len = self.read_accumulator[0] as usize;
        self.consume(1);
        self.domain_name_length = len;
        self.state = SessionState::ReadingAddress;
        self.read_gate = ReadGate::ExactlyN(len + 2);
        DispatchOutcome::NewGateInstalled
    }

    fn read_address(&mut self, resolver: &dyn Resolver) -> DispatchOutcome {
        match self.address_type.expect("address type set before ReadingAddress") {
            AddressType::V4 => {
                let mut addr = [0u8; 4];
                addr.copy_from_slice(&self.read_accumulator[0..4]);
                let port = protocol::parse_port(&self.read_accumulator[4..6]);
                self.consume(6);
                self.ipv4_address = addr;
                self.port = port;
                self.open_destination_v4(addr, port)
            }
            AddressType::V6 => {
                let mut addr = [0u8; 16];
                addr.copy_from_slice(&self.read_accumulator[0..16]);
                let port = protocol::parse_port(&self.read_accumulator[16..18]);
                self.consume(18);
                self.ipv6_address = addr;
                self.port = port;
                self.open_destination_v6(addr, port)
            }
            AddressType::DomainName => {
                let len = self.domain_name_length;
                let name = String::from_utf8_lossy(&self.read_accumulator[..len]).into_owned();
                let port = protocol::parse_port(&self.read_accumulator[len..len + 2]);
                self.consume(len + 2);
                self.domain_name = name.clone();
                self.port = port;

                match resolver.resolve(&name) {
                    Ok(addrs) if !addrs.is_empty() => match addrs[0] {
                        IpAddr::V4(v4) => {
                            self.address_type = Some(AddressType::V4);
                            self.ipv4_address = v4.octets();
                            self.open_destination_v4(v4.octets(), port)
                        }
                        IpAddr::V6(v6) => {
                            self.address_type = Some(AddressType::V6);
                            self.ipv6_address = v6.octets();
                            self.open_destination_v6(v6.octets(), port)
                        }
                    },
                    _ => {
                        metrics::inc_resolution_failures();
                        self.fail_with_reply(REP_HOST_UNREACHABLE)
                    }
                }
            }
        }
    }

    fn open_destination_v4(&mut self, addr: [u8; 4], port: u16) -> DispatchOutcome {
        match Destination::open_v4(Ipv4Addr::from(addr), port) {
            Ok(dest) => {
                self.destination = Some(dest);
                self.state = SessionState::ConnectingToDestination;
                DispatchOutcome::Action(Action::SubmitDestinationConnect)
            }
            Err(e) => {
                metrics::inc_destination_connect_failures();
                self.fail_with_reply(protocol::reply_code_for_connect_error(&e))
            }
        }
    }

    fn open_destination_v6(&mut self, addr: [u8; 16], port: u16) -> DispatchOutcome {
        match Destination::open_v6(Ipv6Addr::from(addr), port) {
            Ok(dest) => {
                self.destination = Some(dest);
                self.state = SessionState::ConnectingToDestination;
                DispatchOutcome::Action(Action::SubmitDestinationConnect)
            }
            Err(e) => {
                metrics::inc_destination_connect_failures();
                self.fail_with_reply(protocol::reply_code_for_connect_error(&e))
            }
        }
    }

    // --- Dispatch entry points invoked by the ring driver on completions ---

    pub fn on_client_read(&mut self, n: usize, half0: &[u8], resolver: &dyn Resolver) -> Action {
        if n == 0 {
            self.failed = true;
            return Action::None;
        }
        if self.state == SessionState::Relaying {
            self.destination_write_size = n;
            self.destination_write_offset = 0;
            return Action::SubmitDestinationWrite { size: n, offset: 0 };
        }
        self.read_accumulator.extend_from_slice(&half0[..n]);
        self.run_read_loop(resolver)
    }

    pub fn on_client_write(&mut self, k: usize, resolver: &dyn Resolver) -> Action {
        if self.state == SessionState::Relaying {
            if self.client_write_offset + k == self.client_write_size {
                return Action::SubmitDestinationRead;
            }
            self.client_write_offset += k;
            return Action::SubmitClientWrite {
                size: self.client_write_size - self.client_write_offset,
                offset: self.client_write_offset,
            };
        }

        let drain = k.min(self.pending_client_write.len());
        self.pending_client_write.drain(0..drain);
        if !self.pending_client_write.is_empty() {
            return Action::SubmitClientReply;
        }
        if self.failed {
            return Action::None;
        }

        match self.state {
            SessionState::ReadingAuthMethods => {
                self.state = SessionState::ReadingClientConnectionRequest;
                self.want_read(ReadGate::ExactlyN(4), resolver)
            }
            SessionState::ConnectingToDestination => {
                self.state = SessionState::Relaying;
                self.read_gate = ReadGate::AtLeastOne;
                Action::EnterRelay
            }
            _ => unreachable!("client-write completion observed in state {:?}", self.state),
        }
    }

    pub fn on_destination_connect(&mut self) -> Action {
        debug_assert_eq!(self.state, SessionState::ConnectingToDestination);
        self.pending_client_write = match self.address_type {
            Some(AddressType::V4) => protocol::success_reply_v4(self.ipv4_address, self.port),
            Some(AddressType::V6) => protocol::success_reply_v6(self.ipv6_address, self.port),
            _ => unreachable!("destination connect completed without a resolved address type"),
        };
        Action::SubmitClientReply
    }

    pub fn on_destination_read(&mut self, n: usize) -> Action {
        if n == 0 {
            self.failed = true;
            return Action::None;
        }
        self.client_write_size = n;
        self.client_write_offset = 0;
        Action::SubmitClientWrite { size: n, offset: 0 }
    }

    pub fn on_destination_write(&mut self, k: usize) -> Action {
        if self.destination_write_offset + k == self.destination_write_size {
            Action::SubmitClientRead
        } else {
            self.destination_write_offset += k;
            Action::SubmitDestinationWrite {
                size: self.destination_write_size - self.destination_write_offset,
                offset: self.destination_write_offset,
            }
        }
    }

    /// Copy the next chunk of the pending reply into `half1` (offset 0),
    /// returning how many bytes were copied. Used by `ring_driver` to build
    /// a `SubmitClientReply` action into a real write submission.
    pub fn fill_client_reply_chunk(&self, half1: &mut [u8]) -> usize {
        let n = half1.len().min(self.pending_client_write.len());
        half1[..n].copy_from_slice(&self.pending_client_write[..n]);
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FakeResolver(Vec<IpAddr>);
    impl Resolver for FakeResolver {
        fn resolve(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
            Ok(self.0.clone())
        }
    }

    struct NoResolver;
    impl Resolver for NoResolver {
        fn resolve(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
            panic!("resolver should not be consulted for literal addresses")
        }
    }

    fn feed(session: &mut Session, bytes: &[u8], resolver: &dyn Resolver) -> Action {
        // Mimic the ring driver copying completed bytes into half0 before
        // calling on_client_read.
        session.on_client_read(bytes.len(), bytes, resolver)
    }

    /// S1: greeting + CONNECT to an IPv4 literal, in one shot each.
    #[test]
    fn s1_ipv4_connect_round_trip() {
        let mut s = Session::new(3, 0);
        let r = NoResolver;

        // Greeting: ver=5, nmethods=1, methods=[0x00]. want_read(3) is
        // satisfied in one completion.
        let action = feed(&mut s, &[0x05, 0x01, 0x00], &r);
        assert_eq!(action, Action::SubmitClientReply);
        assert_eq!(s.pending_client_write(), &[0x05, 0x00]);

        // Draining the 2-byte reply transitions to the connection request.
        let action = s.on_client_write(2, &r);
        assert_eq!(action, Action::SubmitClientRead);
        assert_eq!(s.state(), SessionState::ReadingClientConnectionRequest);

        // CONNECT 127.0.0.1:80
        let req = [0x05, 0x01, 0x00, 0x01, 0x7F, 0x00, 0x00, 0x01, 0x00, 0x50];
        let action = feed(&mut s, &req, &r);
        assert_eq!(action, Action::SubmitDestinationConnect);
        assert_eq!(s.state(), SessionState::ConnectingToDestination);

        let action = s.on_destination_connect();
        assert_eq!(action, Action::SubmitClientReply);
        assert_eq!(
            s.pending_client_write(),
            &[0x05, 0x00, 0x00, 0x01, 0x7F, 0x00, 0x00, 0x01, 0x00, 0x50]
        );

        let action = s.on_client_write(10, &r);
        assert_eq!(action, Action::EnterRelay);
        assert_eq!(s.state(), SessionState::Relaying);
        assert_eq!(s.read_gate(), ReadGate::AtLeastOne);
        assert!(!s.failed);
    }

    /// Property 2: splitting S1's bytes across many single-byte completions
    /// produces the same transitions as feeding them whole.
    #[test]
    fn partial_read_tolerance_byte_by_byte() {
        let mut s = Session::new(3, 0);
        let r = NoResolver;
        let greeting = [0x05u8, 0x01, 0x00];

        let mut action = Action::SubmitClientRead;
        for &b in &greeting[..2] {
            action = feed(&mut s, &[b], &r);
            assert_eq!(action, Action::SubmitClientRead);
        }
        action = feed(&mut s, &greeting[2..], &r);
        assert_eq!(action, Action::SubmitClientReply);
    }

    /// S2: no acceptable auth method offered closes with 0xFF per the Open
    /// Question decision, not the source's literal (incorrect) [05 00].
    #[test]
    fn s2_no_acceptable_auth_method_fails_session() {
        let mut s = Session::new(3, 0);
        let r = NoResolver;
        let action = feed(&mut s, &[0x05, 0x02, 0x02, 0x01], &r);
        assert_eq!(action, Action::SubmitClientReply);
        assert_eq!(s.pending_client_write(), &[0x05, 0xFF]);
        assert!(s.failed);

        let action = s.on_client_write(2, &r);
        assert_eq!(action, Action::None);
    }

    /// S4 / property 8: BIND (0x02) is rejected with REP=0x07 and closes.
    #[test]
    fn s4_bind_command_rejected() {
        let mut s = Session::new(3, 0);
        let r = NoResolver;
        feed(&mut s, &[0x05, 0x01, 0x00], &r);
        s.on_client_write(2, &r);

        let req = [0x05, 0x02, 0x00, 0x01, 0x7F, 0x00, 0x00, 0x01, 0x00, 0x50];
        let action = feed(&mut s, &req, &r);
        assert_eq!(action, Action::SubmitClientReply);
        assert_eq!(
            s.pending_client_write(),
            &[0x05, 0x07, 0x00, 0x01, 0, 0, 0, 0, 0, 0]
        );
        assert!(s.failed);
    }

    /// Property 6: a greeting whose first byte isn't 0x05 fails with no reply.
    #[test]
    fn bad_version_in_greeting_fails_with_no_reply() {
        let mut s = Session::new(3, 0);
        let r = NoResolver;
        let action = feed(&mut s, &[0x04, 0x01, 0x00], &r);
        assert_eq!(action, Action::None);
        assert!(s.failed);
        assert!(s.pending_client_write().is_empty());
    }

    /// Property 7: unsupported ATYP replies REP=0x05 and closes.
    #[test]
    fn unsupported_address_type_replies_0x05() {
        let mut s = Session::new(3, 0);
        let r = NoResolver;
        feed(&mut s, &[0x05, 0x01, 0x00], &r);
        s.on_client_write(2, &r);

        let req = [0x05, 0x01, 0x00, 0x02];
        let action = feed(&mut s, &req, &r);
        assert_eq!(action, Action::SubmitClientReply);
        assert_eq!(s.pending_client_write()[1], REP_CONNECTION_REFUSED);
        assert!(s.failed);
    }

    /// S3: domain name resolved via the pluggable resolver.
    #[test]
    fn s3_domain_name_resolves_and_connects() {
        let mut s = Session::new(3, 0);
        let resolver = FakeResolver(vec![IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))]);
        feed(&mut s, &[0x05, 0x01, 0x00], &resolver);
        s.on_client_write(2, &resolver);

        let mut req = vec![0x05, 0x01, 0x00, 0x03, 0x0B];
        req.extend_from_slice(b"example.com");
        req.extend_from_slice(&0x0050u16.to_be_bytes());
        let action = feed(&mut s, &req, &resolver);
        assert_eq!(action, Action::SubmitDestinationConnect);

        let action = s.on_destination_connect();
        assert_eq!(action, Action::SubmitClientReply);
        assert_eq!(
            s.pending_client_write(),
            &[0x05, 0x00, 0x00, 0x01, 93, 184, 216, 34, 0x00, 0x50]
        );
    }

    /// Resolution failure replies REP=0x04 and closes (property matches the
    /// errno table's host-unreachable code).
    #[test]
    fn domain_resolution_failure_replies_host_unreachable() {
        let mut s = Session::new(3, 0);
        let resolver = FakeResolver(vec![]);
        feed(&mut s, &[0x05, 0x01, 0x00], &resolver);
        s.on_client_write(2, &resolver);

        let mut req = vec![0x05, 0x01, 0x00, 0x03, 0x04];
        req.extend_from_slice(b"nope");
        req.extend_from_slice(&80u16.to_be_bytes());
        let action = feed(&mut s, &req, &resolver);
        assert_eq!(action, Action::SubmitClientReply);
        assert_eq!(s.pending_client_write()[1], REP_HOST_UNREACHABLE);
        assert!(s.failed);
    }

    /// Relay: a destination read drives a client write; completing that
    /// write (exact size) posts the opposite-direction read.
    #[test]
    fn relay_destination_read_drives_client_write_then_read() {
        let mut s = Session::new(3, 0);
        s.state = SessionState::Relaying;
        let action = s.on_destination_read(24);
        assert_eq!(action, Action::SubmitClientWrite { size: 24, offset: 0 });

        let action = s.on_client_write(24, &NoResolver);
        assert_eq!(action, Action::SubmitDestinationRead);
    }

    /// Property 3: a short (partial) relay write resubmits the remainder at
    /// the correct offset instead of dropping or duplicating bytes.
    #[test]
    fn relay_partial_write_resubmits_remainder() {
        let mut s = Session::new(3, 0);
        s.state = SessionState::Relaying;
        s.on_destination_read(100);
        let action = s.on_client_write(40, &NoResolver);
        assert_eq!(
            action,
            Action::SubmitClientWrite { size: 60, offset: 40 }
        );
        let action = s.on_client_write(60, &NoResolver);
        assert_eq!(action, Action::SubmitDestinationRead);
    }

    /// Property 10: a zero-byte destination read in relay mode fails the
    /// session with no further submissions.
    #[test]
    fn relay_peer_disconnect_on_zero_read() {
        let mut s = Session::new(3, 0);
        s.state = SessionState::Relaying;
        let action = s.on_destination_read(0);
        assert_eq!(action, Action::None);
        assert!(s.failed);
    }

    #[test]
    fn relay_client_side_zero_read_also_fails() {
        let mut s = Session::new(3, 0);
        s.state = SessionState::Relaying;
        let action = s.on_client_read(0, &[], &NoResolver);
        assert_eq!(action, Action::None);
        assert!(s.failed);
    }

    #[test]
    fn fill_client_reply_chunk_copies_at_most_available_bytes() {
        let mut s = Session::new(3, 0);
        feed(&mut s, &[0x05, 0x01, 0x00], &NoResolver);
        let mut half1 = [0u8; 1];
        let n = s.fill_client_reply_chunk(&mut half1);
        assert_eq!(n, 1);
        assert_eq!(half1[0], 0x05);
    }
}
