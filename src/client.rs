use std::io;
use std::net::IpAddr;

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::proto::*;
use crate::reply::Reply;
use crate::request::Request;
use crate::resolve::{resolve_ipv4, Resolve, SystemResolver};

/// Connects to the proxy at `proxy` over TCP and asks it for a tunnel to `addr`.
pub async fn connect(proxy: &str, addr: &str, config: &ClientConfig) -> Result<TcpStream> {
    let destination = addr
        .parse::<Destination>()
        .map_err(|e| Error::address(addr, e))?;

    let stream = TcpStream::connect(proxy).await.map_err(Error::Connect)?;
    let _ = stream.set_nodelay(true);

    handshake_with(stream, &destination, config, &SystemResolver).await
}

/// Runs one CONNECT handshake over an already open stream to the proxy.
///
/// On success the stream is the tunnel to `addr`. On any error the stream
/// is shut down and dropped, the caller never gets a half negotiated
/// connection back.
pub async fn handshake<S, R>(stream: S, addr: &str, config: &ClientConfig, resolver: &R) -> Result<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    R: Resolve + ?Sized,
{
    match addr.parse::<Destination>() {
        Ok(destination) => handshake_with(stream, &destination, config, resolver).await,
        Err(e) => {
            Connector::new(stream).close().await;
            Err(Error::address(addr, e))
        }
    }
}

pub(crate) async fn handshake_with<S, R>(
    stream: S,
    destination: &Destination,
    config: &ClientConfig,
    resolver: &R,
) -> Result<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    R: Resolve + ?Sized,
{
    let mut connector = Connector::new(stream);

    match connector.negotiate(destination, config, resolver).await {
        Ok(()) => {
            info!("socks4 tunnel to {} granted", destination);
            Ok(connector.stream)
        }
        Err(e) => {
            if e.is_protocol_outcome() {
                warn!("socks4 request to {} refused: {}", destination, e);
            } else {
                debug!("socks4 handshake to {} failed: {}", destination, e);
            }
            connector.close().await;
            Err(e)
        }
    }
}

/// Drives the request/reply exchange on one proxy stream.
pub struct Connector<S> {
    stream: S,
}

impl<S> Connector<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    async fn negotiate<R>(
        &mut self,
        destination: &Destination,
        config: &ClientConfig,
        resolver: &R,
    ) -> Result<()>
    where
        R: Resolve + ?Sized,
    {
        let request = Self::build_request(destination, config, resolver).await?;
        self.send_request(&request).await?;
        let reply = self.read_reply().await?;
        reply.status.into_result()
    }

    /// Resolves the host when the mode needs it and encodes the request.
    pub async fn build_request<R>(
        destination: &Destination,
        config: &ClientConfig,
        resolver: &R,
    ) -> Result<Vec<u8>>
    where
        R: Resolve + ?Sized,
    {
        // 4a leaves the lookup to the proxy
        let ip = match config.mode {
            AddressingMode::Numeric => {
                Some(IpAddr::V4(resolve_ipv4(resolver, &destination.host).await?))
            }
            AddressingMode::HostnameRelay => None,
        };

        Request {
            destination,
            mode: config.mode,
            identity: &config.identity,
            ip,
        }
        .to_bytes()
    }

    pub async fn send_request(&mut self, request: &[u8]) -> Result<()> {
        if request.len() < MIN_REQUEST_LEN {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                "socks4 request shorter than header",
            )));
        }

        debug!("socks4 request {} bytes", request.len());
        self.stream.write_all(request).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub async fn read_reply(&mut self) -> Result<Reply> {
        let reply = Reply::read_from(&mut self.stream).await?;
        debug!("socks4 reply status {:#04x}", reply.status.as_byte());
        Ok(reply)
    }

    /// Best-effort shutdown; the stream is dropped either way.
    pub async fn close(mut self) {
        let _ = self.stream.shutdown().await;
    }
}
