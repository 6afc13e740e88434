use std::io;
use std::num::ParseIntError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a `host:port` string was refused.
#[derive(Error, Debug)]
pub enum AddrError {
    #[error("missing port in address")]
    MissingPort,
    #[error("too many colons in address")]
    TooManyColons,
    #[error("empty host in address")]
    EmptyHost,
    #[error("missing ']' in address")]
    MissingBracket,
    #[error("unexpected bracket in address")]
    UnexpectedBracket,
    #[error("invalid port: {0}")]
    InvalidPort(#[source] ParseIntError),
    #[error("invalid proxy url: {0}")]
    InvalidUrl(#[source] url::ParseError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("network {0} is not supported, socks4 supports only tcp or tcp4")]
    WrongNetwork(String),
    #[error("unsupported proxy scheme {0}")]
    UnsupportedScheme(String),
    #[error("wrong addr: {addr}")]
    AddressFormat {
        addr: String,
        #[source]
        source: AddrError,
    },
    #[error("unable to find IP address of host {host}")]
    HostUnknown {
        host: String,
        #[source]
        source: Option<io::Error>,
    },
    #[error("socks4 dial")]
    Connect(#[source] io::Error),
    #[error("unable to encode request: {0}")]
    Encoding(&'static str),
    #[error("i/o error")]
    Io(#[from] io::Error),
    #[error("connection to remote host was rejected")]
    Rejected(u8),
    #[error("valid ident required")]
    IdentRequired(u8),
    #[error("ident check failed")]
    IdentFailed(u8),
    #[error("unknown socks4 server response {0:#04x}")]
    UnknownStatus(u8),
}

impl Error {
    pub(crate) fn address(addr: &str, source: AddrError) -> Self {
        Error::AddressFormat {
            addr: addr.to_string(),
            source,
        }
    }

    /// Raw reply status when the proxy answered with a refusal.
    pub fn status(&self) -> Option<u8> {
        match self {
            Error::Rejected(s)
            | Error::IdentRequired(s)
            | Error::IdentFailed(s)
            | Error::UnknownStatus(s) => Some(*s),
            _ => None,
        }
    }

    /// True when the proxy said no, as opposed to bad input or a broken transport.
    pub fn is_protocol_outcome(&self) -> bool {
        self.status().is_some()
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        let kind = match &error {
            Error::Io(e) | Error::Connect(e) => e.kind(),
            Error::WrongNetwork(_)
            | Error::UnsupportedScheme(_)
            | Error::AddressFormat { .. }
            | Error::Encoding(_) => io::ErrorKind::InvalidInput,
            Error::HostUnknown { .. } => io::ErrorKind::NotFound,
            Error::Rejected(_) | Error::IdentRequired(_) | Error::IdentFailed(_) => {
                io::ErrorKind::ConnectionRefused
            }
            Error::UnknownStatus(_) => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, error)
    }
}
