//! Client Module
//!
//! The protocol client that turns typed operations into round trips.
//!
//! ## Responsibilities
//! - Own at most one connection, dialed eagerly or on first use
//! - Validate arguments before any I/O
//! - Encode one command, read exactly one response, decode it
//! - Drop the connection whenever its framing can't be trusted
//!
//! ## Retries
//! None are performed. Resending `check` is always safe. Resending `set` or
//! `bulk` after an ambiguous failure is safe for the filter's contents, but
//! the retry may report `false` for an item the lost attempt already
//! inserted.

use crate::config::{Config, ConnectMode};
use crate::error::{BloomdError, Result};
use crate::filter::Filter;
use crate::network::Connection;
use crate::protocol::{
    decode_done, decode_info, decode_list, decode_statuses, decode_yes, validate_filter_name,
    Command, CreateOptions, FilterInfo, FilterRecord, ItemStatusMap, Response,
};

/// A synchronous bloomd client
///
/// ## Concurrency Model
///
/// Every operation takes `&mut self`: one command is in flight at a time
/// and its response is read to completion before the call returns. Callers
/// that need parallelism use one client per thread.
pub struct BloomdClient {
    /// Client configuration (validated)
    config: Config,

    /// The open connection, if any
    connection: Option<Connection>,
}

impl BloomdClient {
    /// Create a client for the configured server
    ///
    /// Fails with `InvalidArgument` on a bad port before touching the
    /// network. In [`ConnectMode::Eager`] the connection is also dialed here.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let mut client = Self {
            config,
            connection: None,
        };

        if client.config.connect_mode == ConnectMode::Eager {
            client.connect()?;
        }

        Ok(client)
    }

    /// Create a lazily connecting client for `host:port`
    pub fn with_addr(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::new(Config::builder().host(host).port(port).build())
    }

    /// Get the client configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    /// Open the connection
    ///
    /// Returns `true` if a new connection was dialed, `false` if one was
    /// already open. On failure the client stays disconnected.
    pub fn connect(&mut self) -> Result<bool> {
        if self.connection.is_some() {
            return Ok(false);
        }

        self.connection = Some(Connection::open(&self.config)?);
        tracing::info!("Connected to bloomd at {}", self.config.addr());
        Ok(true)
    }

    /// Close the connection
    ///
    /// Returns `true` if a connection was closed, `false` if there was none.
    pub fn disconnect(&mut self) -> bool {
        match self.connection.take() {
            Some(connection) => {
                tracing::info!("Closing connection to {}", connection.peer_addr());
                drop(connection);
                true
            }
            None => false,
        }
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Bind a filter name to this client
    pub fn filter(&mut self, name: impl Into<String>) -> Result<Filter<'_>> {
        let name = name.into();
        validate_filter_name(&name)?;
        Ok(Filter::new(name, self))
    }

    // =========================================================================
    // Filter management
    // =========================================================================

    /// Create a filter
    ///
    /// Returns `false` if the server did not answer `Done`, for example
    /// `Exists` when the filter is already present.
    pub fn create_filter(&mut self, name: &str, options: CreateOptions) -> Result<bool> {
        let command = Command::Create {
            filter: name.to_string(),
            options,
        };
        self.request(command, decode_done)
    }

    /// Delete a filter and its data
    pub fn drop_filter(&mut self, name: &str) -> Result<bool> {
        let command = Command::Drop {
            filter: name.to_string(),
        };
        self.request(command, decode_done)
    }

    /// Unload a filter from memory
    pub fn close_filter(&mut self, name: &str) -> Result<bool> {
        let command = Command::Close {
            filter: name.to_string(),
        };
        self.request(command, decode_done)
    }

    /// Remove a filter from the server's registry; the filter should be
    /// closed first
    pub fn clear_filter(&mut self, name: &str) -> Result<bool> {
        let command = Command::Clear {
            filter: name.to_string(),
        };
        self.request(command, decode_done)
    }

    /// Flush a filter to disk
    pub fn flush_filter(&mut self, name: &str) -> Result<bool> {
        let command = Command::Flush {
            filter: name.to_string(),
        };
        self.request(command, decode_done)
    }

    /// List filters, all of them or those matching `prefix`
    pub fn list_filters(&mut self, prefix: Option<&str>) -> Result<Vec<FilterRecord>> {
        let command = Command::List {
            prefix: prefix.map(str::to_string),
        };
        self.request(command, decode_list)
    }

    /// Detailed counters for a filter
    ///
    /// An empty map means the filter does not exist.
    pub fn info(&mut self, name: &str) -> Result<FilterInfo> {
        let command = Command::Info {
            filter: name.to_string(),
        };
        self.request(command, decode_info)
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Test whether a value may be in the filter
    pub fn check(&mut self, filter: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.request(Command::check(filter, value), decode_yes)
    }

    /// Add a value to the filter
    ///
    /// Returns `true` if the value was newly added, `false` if it was (or
    /// looked) already present.
    pub fn set(&mut self, filter: &str, value: impl AsRef<[u8]>) -> Result<bool> {
        self.request(Command::set(filter, value), decode_yes)
    }

    /// Add several values, reporting per item whether it was newly added
    pub fn bulk<S: AsRef<str>>(&mut self, filter: &str, items: &[S]) -> Result<ItemStatusMap> {
        self.execute_many(Command::bulk(filter, items), filter, items)
    }

    /// Test several values, reporting per item whether it may be present
    pub fn multi<S: AsRef<str>>(&mut self, filter: &str, items: &[S]) -> Result<ItemStatusMap> {
        self.execute_many(Command::multi(filter, items), filter, items)
    }

    /// True if at least one of the values may be present (false when empty)
    pub fn any<S: AsRef<str>>(&mut self, filter: &str, items: &[S]) -> Result<bool> {
        Ok(self.multi(filter, items)?.any())
    }

    /// True if every value may be present (true when empty)
    pub fn all<S: AsRef<str>>(&mut self, filter: &str, items: &[S]) -> Result<bool> {
        Ok(self.multi(filter, items)?.all())
    }

    // =========================================================================
    // Round trips
    // =========================================================================

    fn execute_many<S: AsRef<str>>(
        &mut self,
        command: Command,
        filter: &str,
        items: &[S],
    ) -> Result<ItemStatusMap> {
        if items.is_empty() {
            // Nothing to ask for; the server rejects a keyless bulk/multi
            validate_filter_name(filter)?;
            return Ok(ItemStatusMap::new());
        }

        self.request(command, |response| decode_statuses(response, items))
    }

    /// Run one command and decode its response
    ///
    /// Decode failures poison the connection just like transport failures.
    fn request<T>(
        &mut self,
        command: Command,
        decode: impl FnOnce(&Response) -> Result<T>,
    ) -> Result<T> {
        let response = self.execute(command)?;
        decode(&response).map_err(|e| self.poison(e))
    }

    /// Validate, send, and read back one response
    fn execute(&mut self, command: Command) -> Result<Response> {
        command.validate()?;

        if self.connection.is_none() {
            match self.config.connect_mode {
                ConnectMode::Lazy => {
                    self.connect()?;
                }
                ConnectMode::Eager => {
                    return Err(BloomdError::Connection(format!(
                        "not connected to {}",
                        self.config.addr()
                    )))
                }
            }
        }

        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| BloomdError::Connection("not connected".to_string()))?;

        let result = connection.round_trip(&command);
        result.map_err(|e| self.poison(e))
    }

    /// Drop the connection if `err` leaves its framing untrustworthy
    fn poison(&mut self, err: BloomdError) -> BloomdError {
        if err.requires_reconnect() {
            if let Some(connection) = self.connection.take() {
                tracing::warn!(
                    "Dropping connection to {} after error: {}",
                    connection.peer_addr(),
                    err
                );
            }
        }
        err
    }
}

impl std::fmt::Debug for BloomdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomdClient")
            .field("addr", &self.config.addr())
            .field("connected", &self.connection.is_some())
            .finish()
    }
}
