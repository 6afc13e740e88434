// SOCKS: A protocol for TCP proxy across firewalls
// https://www.openssh.com/txt/socks4.protocol
//
// SOCKS 4A: A Simple Extension to SOCKS 4 Protocol
// https://www.openssh.com/txt/socks4a.protocol
//
// +----+----+----+----+----+----+----+----+----+----+....+----+....+----+
// | VN | CD | DSTPORT |      DSTIP        | USERID       |NULL| HOST |NULL|
// +----+----+----+----+----+----+----+----+----+----+....+----+....+----+
//    1    1      2              4           variable       1   4a only  1

use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::proto::*;

/// A CONNECT request for one handshake attempt.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    pub destination: &'a Destination,
    pub mode: AddressingMode,
    /// USERID field. Must not contain NUL.
    pub identity: &'a str,
    /// Resolved destination address, required in numeric mode and ignored
    /// in hostname relay mode.
    pub ip: Option<IpAddr>,
}

impl<'a> Request<'a> {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.identity.as_bytes().contains(&0) {
            return Err(Error::Encoding("identity contains NUL"));
        }

        let ip = match self.mode {
            AddressingMode::Numeric => match self.ip {
                Some(IpAddr::V4(ip)) => ip,
                Some(IpAddr::V6(_)) => return Err(Error::Encoding("socks4 unsupport IPv6")),
                None => return Err(Error::Encoding("missing destination IP")),
            },
            AddressingMode::HostnameRelay => SOCKS4A_PLACEHOLDER,
        };

        let host = self.destination.host.as_bytes();
        if self.mode == AddressingMode::HostnameRelay && host.contains(&0) {
            return Err(Error::Encoding("hostname contains NUL"));
        }

        let mut request = Vec::with_capacity(MIN_REQUEST_LEN + self.identity.len() + host.len() + 2);
        request.push(VER);
        request.push(CMD_CONNECT);
        request.extend_from_slice(&self.destination.port.to_be_bytes());
        request.extend_from_slice(&ip.octets());
        request.extend_from_slice(self.identity.as_bytes());
        request.push(0);

        if self.mode == AddressingMode::HostnameRelay {
            request.extend_from_slice(host);
            request.push(0);
        }

        Ok(request)
    }
}
