use std::io;
use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use tokio::net;

use crate::error::{Error, Result};

/// Hostname lookup used by numeric (plain SOCKS4) handshakes.
#[async_trait]
pub trait Resolve: Sync + Send {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// Resolves through the system resolver via `tokio::net::lookup_host`.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemResolver;

#[async_trait]
impl Resolve for SystemResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let addrs = net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Picks the IPv4 address of `host`. A v4-mapped or v4-compatible IPv6
/// result counts; a host with only IPv6 addresses is unknown to SOCKS4.
pub async fn resolve_ipv4<R>(resolver: &R, host: &str) -> Result<Ipv4Addr>
where
    R: Resolve + ?Sized,
{
    let addrs = resolver
        .resolve(host)
        .await
        .map_err(|e| Error::HostUnknown {
            host: host.to_string(),
            source: Some(e),
        })?;

    addrs
        .into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(ip) => Some(ip),
            // ::1 and :: would otherwise turn into 0.0.0.1 and 0.0.0.0
            IpAddr::V6(ip) if ip.is_loopback() || ip.is_unspecified() => None,
            IpAddr::V6(ip) => ip.to_ipv4(),
        })
        .ok_or_else(|| Error::HostUnknown {
            host: host.to_string(),
            source: None,
        })
}
