// +----+----+----+----+----+----+----+----+
// | VN | CD | DSTPORT |      DSTIP        |
// +----+----+----+----+----+----+----+----+
//    1    1      2              4

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};
use crate::proto::*;

/// Answer of the proxy to a CONNECT request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Granted,
    Rejected,
    IdentRequired,
    IdentFailed,
    Unknown(u8),
}

impl Status {
    pub fn from_byte(status: u8) -> Self {
        match status {
            REP_GRANTED => Status::Granted,
            REP_REJECTED => Status::Rejected,
            REP_IDENT_REQUIRED => Status::IdentRequired,
            REP_IDENT_FAILED => Status::IdentFailed,
            other => Status::Unknown(other),
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            Status::Granted => REP_GRANTED,
            Status::Rejected => REP_REJECTED,
            Status::IdentRequired => REP_IDENT_REQUIRED,
            Status::IdentFailed => REP_IDENT_FAILED,
            Status::Unknown(other) => *other,
        }
    }

    pub fn is_granted(&self) -> bool {
        *self == Status::Granted
    }

    /// `Ok` only for `Granted`; every other answer ends the handshake.
    pub fn into_result(self) -> Result<()> {
        match self {
            Status::Granted => Ok(()),
            Status::Rejected => Err(Error::Rejected(REP_REJECTED)),
            Status::IdentRequired => Err(Error::IdentRequired(REP_IDENT_REQUIRED)),
            Status::IdentFailed => Err(Error::IdentFailed(REP_IDENT_FAILED)),
            Status::Unknown(other) => Err(Error::UnknownStatus(other)),
        }
    }
}

/// The fixed 8 byte reply frame. DSTPORT and DSTIP carry no meaning for CONNECT.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reply {
    pub version: u8,
    pub status: Status,
}

impl Reply {
    pub fn from_bytes(frame: &[u8; REPLY_LEN]) -> Self {
        Self {
            version: frame[0],
            status: Status::from_byte(frame[1]),
        }
    }

    /// Reads exactly one reply frame. A stream that ends early is an
    /// `UnexpectedEof` i/o error.
    pub async fn read_from<R>(stream: &mut R) -> Result<Self>
    where
        R: AsyncRead + Unpin,
    {
        let mut frame = [0u8; REPLY_LEN];
        stream.read_exact(&mut frame).await?;

        // Some servers answer with VN 4, only CD decides
        if frame[0] != REPLY_VER {
            debug!("socks4 reply version {:#04x}, ignored", frame[0]);
        }

        Ok(Self::from_bytes(&frame))
    }
}
