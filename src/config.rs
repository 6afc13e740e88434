use std::{fs, io, path::Path};

use serde::Deserialize;

use crate::proto::AddressingMode;

pub const DEFAULT_IDENTITY: &str = "nobody@0.0.0.0";

/// Per-handshake settings. Build one at startup and share it by reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// USERID sent to the proxy, for servers doing identd checks.
    pub identity: String,
    pub mode: AddressingMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            identity: DEFAULT_IDENTITY.to_string(),
            mode: AddressingMode::Numeric,
        }
    }
}

impl ClientConfig {
    pub fn new(mode: AddressingMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_mode(mut self, mode: AddressingMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Settings of the `socks4-connect` tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectConfig {
    /// `socks4://host:port` or `socks4a://host:port`
    pub proxy: String,
    /// `host:port` to reach through the proxy
    pub target: String,
    pub identity: Option<String>,
}

impl ConnectConfig {
    pub fn from_toml(content: &str) -> io::Result<Self> {
        toml::from_str(content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.identity, "nobody@0.0.0.0");
        assert_eq!(config.mode, AddressingMode::Numeric);

        let config = ClientConfig::new(AddressingMode::HostnameRelay).with_identity("alice");
        assert_eq!(config.identity, "alice");
        assert_eq!(config.mode, AddressingMode::HostnameRelay);

        let config = config.with_mode(AddressingMode::Numeric);
        assert_eq!(config.mode, AddressingMode::Numeric);
        assert_eq!(config.identity, "alice");
    }

    #[test]
    fn client_config_from_toml() {
        let config: ClientConfig = toml::from_str("mode = \"socks4a\"").unwrap();
        assert_eq!(config.mode, AddressingMode::HostnameRelay);
        assert_eq!(config.identity, DEFAULT_IDENTITY);

        let config: ClientConfig = toml::from_str("identity = \"bob@host\"").unwrap();
        assert_eq!(config.mode, AddressingMode::Numeric);
        assert_eq!(config.identity, "bob@host");

        assert!(toml::from_str::<ClientConfig>("mode = \"socks5\"").is_err());
    }

    #[test]
    fn connect_config_from_toml() {
        let config = ConnectConfig::from_toml(
            r#"
            proxy = "socks4a://127.0.0.1:1080"
            target = "example.com:80"
            "#,
        )
        .unwrap();
        assert_eq!(config.proxy, "socks4a://127.0.0.1:1080");
        assert_eq!(config.target, "example.com:80");
        assert!(config.identity.is_none());

        let err = ConnectConfig::from_toml("proxy = 1").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
