//! SOCKS5 wire constants (RFC 1928). Bit-exact values only; sizing knobs
//! (buffer sizes, session capacity, ...) live in `config`.

pub const VERSION: u8 = 0x05;

pub const AUTH_NO_AUTHENTICATION: u8 = 0x00;
pub const AUTH_NO_ACCEPTABLE_METHODS: u8 = 0xFF;

pub const CMD_CONNECT: u8 = 0x01;
pub const CMD_BIND: u8 = 0x02;
pub const CMD_UDP_ASSOCIATE: u8 = 0x03;

pub const ATYP_IPV4: u8 = 0x01;
pub const ATYP_DOMAIN_NAME: u8 = 0x03;
pub const ATYP_IPV6: u8 = 0x04;

pub const REP_SUCCESS: u8 = 0x00;
pub const REP_GENERAL_FAILURE: u8 = 0x01;
pub const REP_NETWORK_UNREACHABLE: u8 = 0x03;
pub const REP_HOST_UNREACHABLE: u8 = 0x04;
pub const REP_CONNECTION_REFUSED: u8 = 0x05;
pub const REP_COMMAND_NOT_SUPPORTED: u8 = 0x07;
pub const REP_ADDRESS_TYPE_NOT_SUPPORTED: u8 = 0x08;

/// ver, rep, rsv, atyp, 4-byte addr, 2-byte port.
pub const IPV4_REPLY_LEN: usize = 10;
/// ver, rep, rsv, atyp, 16-byte addr, 2-byte port.
pub const IPV6_REPLY_LEN: usize = 22;
