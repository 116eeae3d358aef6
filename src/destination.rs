//! Destination endpoint (component C3): a not-yet-connected upstream socket,
//! either IPv4 or IPv6, whose raw address is handed to the ring driver for
//! an async `connect` submission.
//!
//! Construction only opens the socket (synchronously, like the teacher's
//! listening-socket setup in `main.rs`) — the connect itself always goes
//! through `RingDriver::submit_destination_connect`, never a blocking
//! `connect(2)` call, since that would stall the whole completion loop.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};
use std::os::unix::io::{AsRawFd, RawFd};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

pub enum Destination {
    V4 {
        socket: Socket,
        sockaddr: SockAddr,
        addr: Ipv4Addr,
        port: u16,
    },
    V6 {
        socket: Socket,
        sockaddr: SockAddr,
        addr: Ipv6Addr,
        port: u16,
    },
}

impl Destination {
    pub fn open_v4(addr: Ipv4Addr, port: u16) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_nonblocking(true)?;
        let sockaddr: SockAddr = SocketAddrV4::new(addr, port).into();
        Ok(Self::V4 {
            socket,
            sockaddr,
            addr,
            port,
        })
    }

    pub fn open_v6(addr: Ipv6Addr, port: u16) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV6, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_nonblocking(true)?;
        let sockaddr: SockAddr = SocketAddrV6::new(addr, port, 0, 0).into();
        Ok(Self::V6 {
            socket,
            sockaddr,
            addr,
            port,
        })
    }

    pub fn fd(&self) -> RawFd {
        match self {
            Self::V4 { socket, .. } => socket.as_raw_fd(),
            Self::V6 { socket, .. } => socket.as_raw_fd(),
        }
    }

    /// Raw sockaddr pointer/length for the `connect` submission.
    pub fn sockaddr(&self) -> (*const libc::sockaddr, libc::socklen_t) {
        let sockaddr = match self {
            Self::V4 { sockaddr, .. } => sockaddr,
            Self::V6 { sockaddr, .. } => sockaddr,
        };
        (sockaddr.as_ptr(), sockaddr.len())
    }

    pub fn port(&self) -> u16 {
        match self {
            Self::V4 { port, .. } => *port,
            Self::V6 { port, .. } => *port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_v4_produces_a_v4_sockaddr() {
        let dest = Destination::open_v4(Ipv4Addr::new(93, 184, 216, 34), 80).unwrap();
        assert_eq!(dest.port(), 80);
        let (_ptr, len) = dest.sockaddr();
        assert_eq!(len as usize, std::mem::size_of::<libc::sockaddr_in>());
    }

    #[test]
    fn open_v6_produces_a_v6_sockaddr() {
        let dest = Destination::open_v6(Ipv6Addr::LOCALHOST, 443).unwrap();
        assert_eq!(dest.port(), 443);
        let (_ptr, len) = dest.sockaddr();
        assert_eq!(len as usize, std::mem::size_of::<libc::sockaddr_in6>());
    }
}
