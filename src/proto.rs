use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::AddrError;

pub(crate) const VER: u8 = 4;
pub(crate) const REPLY_VER: u8 = 0;

pub(crate) const CMD_CONNECT: u8 = 1;
#[allow(dead_code)]
pub(crate) const CMD_BIND: u8 = 2;

pub(crate) const REP_GRANTED: u8 = 0x5a;
pub(crate) const REP_REJECTED: u8 = 0x5b;
pub(crate) const REP_IDENT_REQUIRED: u8 = 0x5c;
pub(crate) const REP_IDENT_FAILED: u8 = 0x5d;

/// VN, CD, DSTPORT and DSTIP; every request carries at least these.
pub(crate) const MIN_REQUEST_LEN: usize = 8;
pub(crate) const REPLY_LEN: usize = 8;

/// DSTIP of a SOCKS4a request: 0.0.0.x with x != 0 tells the proxy a hostname follows.
pub(crate) const SOCKS4A_PLACEHOLDER: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 1);

/// How the destination host is put on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
pub enum AddressingMode {
    /// SOCKS4: the client resolves the host and sends its IPv4 address.
    #[default]
    #[serde(rename = "socks4")]
    Numeric,
    /// SOCKS4a: the hostname is relayed and the proxy resolves it.
    #[serde(rename = "socks4a")]
    HostnameRelay,
}

impl AddressingMode {
    /// Maps a proxy URL scheme to its addressing mode.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "socks4" => Some(AddressingMode::Numeric),
            "socks4a" => Some(AddressingMode::HostnameRelay),
            _ => None,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            AddressingMode::Numeric => "socks4",
            AddressingMode::HostnameRelay => "socks4a",
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Target of a CONNECT request, as given by a `host:port` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub host: String,
    pub port: u16,
}

impl Destination {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for Destination {
    type Err = AddrError;

    /// Splits `host:port`. IPv6 literals must be bracketed (`[::1]:80`).
    fn from_str(addr: &str) -> Result<Self, Self::Err> {
        let (host, port) = addr.rsplit_once(':').ok_or(AddrError::MissingPort)?;

        let host = match host.strip_prefix('[') {
            Some(inner) => inner.strip_suffix(']').ok_or(AddrError::MissingBracket)?,
            None if host.contains(':') => return Err(AddrError::TooManyColons),
            None => host,
        };

        if host.contains(|c| c == '[' || c == ']') {
            return Err(AddrError::UnexpectedBracket);
        }

        if host.is_empty() {
            return Err(AddrError::EmptyHost);
        }

        let port = port.parse::<u16>().map_err(AddrError::InvalidPort)?;
        Ok(Destination::new(host, port))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
