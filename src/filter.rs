//! Filter handles
//!
//! A [`Filter`] binds one filter name to a borrowed client so callers can
//! work with a single filter without repeating its name. Connection
//! lifecycle stays on the client; a handle cannot connect or disconnect.

use crate::client::BloomdClient;
use crate::error::Result;
use crate::protocol::{FilterInfo, ItemStatusMap};

/// Operations scoped to a single named filter
pub trait FilterOps {
    /// The bound filter name
    fn name(&self) -> &str;

    /// Test whether a value may be in the filter
    fn check(&mut self, value: &str) -> Result<bool>;

    /// Add a value, `true` if it was newly added
    fn set(&mut self, value: &str) -> Result<bool>;

    /// Add several values
    fn bulk(&mut self, items: &[&str]) -> Result<ItemStatusMap>;

    /// Test several values
    fn multi(&mut self, items: &[&str]) -> Result<ItemStatusMap>;

    /// True if at least one value may be present
    fn any(&mut self, items: &[&str]) -> Result<bool>;

    /// True if every value may be present
    fn all(&mut self, items: &[&str]) -> Result<bool>;

    /// Detailed counters; empty if the filter does not exist
    fn info(&mut self) -> Result<FilterInfo>;

    /// Delete the filter
    fn drop(&mut self) -> Result<bool>;

    /// Unload the filter from memory
    fn close(&mut self) -> Result<bool>;

    /// Remove the closed filter from the server's registry
    fn clear(&mut self) -> Result<bool>;

    /// Flush the filter to disk
    fn flush(&mut self) -> Result<bool>;
}

/// A filter name bound to a client
pub struct Filter<'a> {
    name: String,
    client: &'a mut BloomdClient,
}

impl<'a> Filter<'a> {
    /// Bind `name` to `client`; see [`BloomdClient::filter`]
    pub(crate) fn new(name: String, client: &'a mut BloomdClient) -> Self {
        Self { name, client }
    }

    // Same bounds as the client methods. These shadow the `FilterOps`
    // methods on a concrete handle.

    pub fn check(&mut self, value: impl AsRef<[u8]>) -> Result<bool> {
        self.client.check(&self.name, value)
    }

    pub fn set(&mut self, value: impl AsRef<[u8]>) -> Result<bool> {
        self.client.set(&self.name, value)
    }

    pub fn bulk<S: AsRef<str>>(&mut self, items: &[S]) -> Result<ItemStatusMap> {
        self.client.bulk(&self.name, items)
    }

    pub fn multi<S: AsRef<str>>(&mut self, items: &[S]) -> Result<ItemStatusMap> {
        self.client.multi(&self.name, items)
    }

    pub fn any<S: AsRef<str>>(&mut self, items: &[S]) -> Result<bool> {
        self.client.any(&self.name, items)
    }

    pub fn all<S: AsRef<str>>(&mut self, items: &[S]) -> Result<bool> {
        self.client.all(&self.name, items)
    }
}

impl FilterOps for Filter<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&mut self, value: &str) -> Result<bool> {
        Filter::check(self, value)
    }

    fn set(&mut self, value: &str) -> Result<bool> {
        Filter::set(self, value)
    }

    fn bulk(&mut self, items: &[&str]) -> Result<ItemStatusMap> {
        Filter::bulk(self, items)
    }

    fn multi(&mut self, items: &[&str]) -> Result<ItemStatusMap> {
        Filter::multi(self, items)
    }

    fn any(&mut self, items: &[&str]) -> Result<bool> {
        Filter::any(self, items)
    }

    fn all(&mut self, items: &[&str]) -> Result<bool> {
        Filter::all(self, items)
    }

    fn info(&mut self) -> Result<FilterInfo> {
        self.client.info(&self.name)
    }

    fn drop(&mut self) -> Result<bool> {
        self.client.drop_filter(&self.name)
    }

    fn close(&mut self) -> Result<bool> {
        self.client.close_filter(&self.name)
    }

    fn clear(&mut self) -> Result<bool> {
        self.client.clear_filter(&self.name)
    }

    fn flush(&mut self) -> Result<bool> {
        self.client.flush_filter(&self.name)
    }
}

impl std::fmt::Debug for Filter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("name", &self.name)
            .field("client", &self.client)
            .finish()
    }
}
