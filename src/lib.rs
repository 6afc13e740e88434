//! SOCKS4 and SOCKS4a CONNECT client.
//!
//! ```no_run
//! # async fn run() -> socks4::Result<()> {
//! use socks4::{from_url, Dialer, TcpOpener};
//!
//! let dialer = from_url("socks4a://127.0.0.1:1080", TcpOpener)?;
//! let stream = dialer.dial("tcp", "example.com:80").await?;
//! # drop(stream);
//! # Ok(())
//! # }
//! ```

mod proto;
mod reply;
mod request;

pub mod client;
pub mod config;
pub mod dialer;
pub mod error;
pub mod resolve;

pub use client::{connect, handshake, Connector};
pub use config::{ClientConfig, ConnectConfig, DEFAULT_IDENTITY};
pub use dialer::{from_url, Dialer, Socks4Dialer, StreamOpener, TcpOpener};
pub use error::{AddrError, Error, Result};
pub use proto::{AddressingMode, Destination};
pub use reply::{Reply, Status};
pub use request::Request;
pub use resolve::{resolve_ipv4, Resolve, SystemResolver};
