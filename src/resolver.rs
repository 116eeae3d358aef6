//! Synchronous domain-name resolution, kept behind a trait so it can be
//! swapped for an offloaded/cancellable implementation later (spec.md §9
//! notes that resolving inside a completion handler blocks the whole
//! thread — acceptable here, but the capability boundary is drawn so a
//! future implementation doesn't have to touch the session state machine).

use std::io;
use std::net::IpAddr;

pub trait Resolver: Send + Sync {
    /// Resolve `host` to zero or more addresses. An `Ok(vec![])` and an
    /// `Err` are both treated as resolution failure by the caller; only the
    /// first returned address is ever used (see spec.md Open Questions).
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Default resolver: `std::net::ToSocketAddrs`, which delegates to the
/// system's `getaddrinfo` — the same blocking call the original source
/// makes via `gethostbyname`.
pub struct SyncResolver;

impl Resolver for SyncResolver {
    fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        use std::net::ToSocketAddrs;
        // Port is irrelevant for the lookup; 0 is a placeholder.
        let addrs = (host, 0u16).to_socket_addrs()?;
        Ok(addrs.map(|sa| sa.ip()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    struct FakeResolver(Vec<IpAddr>);

    impl Resolver for FakeResolver {
        fn resolve(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn fake_resolver_returns_first_address_to_caller() {
        let r = FakeResolver(vec![
            IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
        ]);
        let addrs = r.resolve("example.com").unwrap();
        assert_eq!(addrs[0], IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn empty_resolution_is_representable() {
        let r = FakeResolver(vec![]);
        assert!(r.resolve("nowhere.invalid").unwrap().is_empty());
    }
}
