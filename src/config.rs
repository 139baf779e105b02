//! Configuration for the bloomd client
//!
//! Centralized configuration with sensible defaults.

use crate::error::{BloomdError, Result};

/// Default bloomd TCP port
pub const DEFAULT_PORT: u16 = 8673;

/// Default bloomd host
pub const DEFAULT_HOST: &str = "localhost";

/// Main configuration for a client instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server host name or IP address
    pub host: String,

    /// Server TCP port, must be in 1..=65535
    pub port: u16,

    /// Connect timeout (milliseconds), 0 leaves it to the OS
    pub connect_timeout_ms: u64,

    /// Send deadline for outbound writes (milliseconds), 0 disables it
    pub write_timeout_ms: u64,

    /// Read timeout (milliseconds), 0 blocks until the server answers
    pub read_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Lifecycle Configuration
    // -------------------------------------------------------------------------
    /// When the connection is dialed
    pub connect_mode: ConnectMode,
}

/// When a client opens its connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// Dial on the first command (or an explicit `connect`)
    Lazy,

    /// Dial while constructing the client
    Eager,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: 5000,
            write_timeout_ms: 1000,
            read_timeout_ms: 0,
            connect_mode: ConnectMode::Lazy,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config before any network activity
    pub fn validate(&self) -> Result<()> {
        validate_port(u64::from(self.port))?;

        if self.host.trim().is_empty() {
            return Err(BloomdError::InvalidArgument(
                "host must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// `host:port` form, used for logging and error messages
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set host and port from a `host:port` string
    pub fn server(mut self, addr: &str) -> Result<Self> {
        let (host, port) = parse_server_addr(addr)?;
        self.config.host = host;
        self.config.port = port;
        Ok(self)
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the send deadline (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set when the connection is dialed
    pub fn connect_mode(mut self, mode: ConnectMode) -> Self {
        self.config.connect_mode = mode;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Textual input validation
// =============================================================================

fn validate_port(port: u64) -> Result<u16> {
    if !(1..=65535).contains(&port) {
        return Err(BloomdError::InvalidArgument(format!(
            "port must be an integer between 1 and 65535, got {}",
            port
        )));
    }
    Ok(port as u16)
}

/// Parse a port given as text
///
/// Only ASCII digits are accepted; signs, whitespace and fractions are
/// rejected, as is anything outside 1..=65535.
pub fn parse_port(s: &str) -> Result<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BloomdError::InvalidArgument(format!(
            "port must be an integer between 1 and 65535, got {:?}",
            s
        )));
    }

    // Anything too long for u64 is out of range anyway
    let port = s.parse::<u64>().unwrap_or(u64::MAX);
    validate_port(port)
}

/// Split a `host:port` string into its parts
///
/// A missing port falls back to [`DEFAULT_PORT`]. Bracketed IPv6 hosts
/// (`[::1]:8673`) are supported.
pub fn parse_server_addr(addr: &str) -> Result<(String, u16)> {
    let addr = addr.trim();

    let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
        let end = rest.find(']').ok_or_else(|| {
            BloomdError::InvalidArgument(format!("unterminated IPv6 host in {:?}", addr))
        })?;
        let host = &rest[..end];
        let port = match &rest[end + 1..] {
            "" => None,
            tail => Some(tail.strip_prefix(':').ok_or_else(|| {
                BloomdError::InvalidArgument(format!("malformed server address {:?}", addr))
            })?),
        };
        (host, port)
    } else {
        match addr.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (addr, None),
        }
    };

    if host.is_empty() {
        return Err(BloomdError::InvalidArgument(format!(
            "missing host in server address {:?}",
            addr
        )));
    }

    let port = match port {
        Some(p) => parse_port(p)?,
        None => DEFAULT_PORT,
    };

    Ok((host.to_string(), port))
}
