use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use percent_encoding::percent_decode_str;
use url::{Host, Url};

use crate::client::handshake_with;
use crate::config::ClientConfig;
use crate::error::{AddrError, Error, Result};
use crate::proto::{AddressingMode, Destination};
use crate::resolve::{Resolve, SystemResolver};

/// Opens the byte stream to the proxy server itself.
#[async_trait]
pub trait StreamOpener: Sync + Send {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn open(&self, addr: &str) -> io::Result<Self::Stream>;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct TcpOpener;

#[async_trait]
impl StreamOpener for TcpOpener {
    type Stream = TcpStream;

    async fn open(&self, addr: &str) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(addr).await?;
        let _ = stream.set_nodelay(true);
        Ok(stream)
    }
}

/// Something that hands out connected streams for `network`/`addr`, the
/// shape proxy chains are built from.
#[async_trait]
pub trait Dialer: Sync + Send {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    async fn dial(&self, network: &str, addr: &str) -> Result<Self::Stream>;
}

pub struct Socks4Dialer<O, R = SystemResolver> {
    proxy: String,
    config: ClientConfig,
    opener: O,
    resolver: Arc<R>,
}

impl<O: StreamOpener> Socks4Dialer<O> {
    pub fn new(proxy: impl Into<String>, config: ClientConfig, opener: O) -> Self {
        Self::with_resolver(proxy, config, opener, Arc::new(SystemResolver))
    }
}

impl<O, R> Socks4Dialer<O, R>
where
    O: StreamOpener,
    R: Resolve,
{
    pub fn with_resolver(
        proxy: impl Into<String>,
        config: ClientConfig,
        opener: O,
        resolver: Arc<R>,
    ) -> Self {
        Self {
            proxy: proxy.into(),
            config,
            opener,
            resolver,
        }
    }

    pub fn proxy(&self) -> &str {
        &self.proxy
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }
}

#[async_trait]
impl<O, R> Dialer for Socks4Dialer<O, R>
where
    O: StreamOpener,
    R: Resolve,
{
    type Stream = O::Stream;

    async fn dial(&self, network: &str, addr: &str) -> Result<Self::Stream> {
        if network != "tcp" && network != "tcp4" {
            return Err(Error::WrongNetwork(network.to_string()));
        }

        let destination = addr
            .parse::<Destination>()
            .map_err(|e| Error::address(addr, e))?;

        debug!(
            "{} dial {} via {}",
            self.config.mode, destination, self.proxy
        );
        let stream = self.opener.open(&self.proxy).await.map_err(Error::Connect)?;

        handshake_with(stream, &destination, &self.config, self.resolver.as_ref()).await
    }
}

/// Builds a dialer from a `socks4://` or `socks4a://` proxy URL. A user name
/// in the URL replaces the default identity.
pub fn from_url<O: StreamOpener>(proxy: &str, opener: O) -> Result<Socks4Dialer<O>> {
    let url = Url::parse(proxy).map_err(|e| Error::address(proxy, AddrError::InvalidUrl(e)))?;

    let mode = AddressingMode::from_scheme(url.scheme())
        .ok_or_else(|| Error::UnsupportedScheme(url.scheme().to_string()))?;

    let host = match url.host() {
        Some(Host::Ipv6(ip)) => ip.to_string(),
        Some(host) => host.to_string(),
        None => String::new(),
    };
    if host.is_empty() {
        return Err(Error::address(proxy, AddrError::EmptyHost));
    }
    let port = url
        .port()
        .ok_or_else(|| Error::address(proxy, AddrError::MissingPort))?;

    let mut config = ClientConfig::new(mode);
    if !url.username().is_empty() {
        let identity = percent_decode_str(url.username())
            .decode_utf8()
            .map_err(|_| Error::Encoding("identity in proxy url is not utf-8"))?;
        config = config.with_identity(identity);
    }

    Ok(Socks4Dialer::new(
        Destination::new(host, port).to_string(),
        config,
        opener,
    ))
}
