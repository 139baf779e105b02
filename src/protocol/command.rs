//! Command definitions
//!
//! Represents commands sent to the server. Item values are hashed when the
//! command is built, so a `Command` only ever carries wire keys.

use crate::error::{BloomdError, Result};
use super::key::hash_key;

/// Command verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Create,
    Drop,
    Close,
    Clear,
    Flush,
    List,
    Info,
    Check,
    Set,
    Bulk,
    Multi,
}

impl CommandType {
    /// The verb as written on the wire
    pub fn verb(self) -> &'static str {
        match self {
            CommandType::Create => "create",
            CommandType::Drop => "drop",
            CommandType::Close => "close",
            CommandType::Clear => "clear",
            CommandType::Flush => "flush",
            CommandType::List => "list",
            CommandType::Info => "info",
            CommandType::Check => "check",
            CommandType::Set => "set",
            CommandType::Bulk => "bulk",
            CommandType::Multi => "multi",
        }
    }
}

/// Optional parameters for `create`
///
/// Every field is independent: `None` means the token is left off the wire
/// entirely and the server applies its own default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CreateOptions {
    /// Initial capacity (`capacity=N`)
    pub capacity: Option<u64>,

    /// False positive probability (`prob=P`)
    pub probability: Option<f64>,

    /// Keep the filter memory-only (`in_memory=0|1`)
    pub in_memory: Option<bool>,
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = Some(in_memory);
        self
    }
}

/// A command ready to be encoded
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a filter
    Create { filter: String, options: CreateOptions },

    /// Delete a filter and its data
    Drop { filter: String },

    /// Unload a filter from memory, keeping it on disk
    Close { filter: String },

    /// Remove a closed filter from the server's registry
    Clear { filter: String },

    /// Flush a filter to disk
    Flush { filter: String },

    /// List filters, optionally restricted to a name prefix
    List { prefix: Option<String> },

    /// Detailed counters for one filter
    Info { filter: String },

    /// Test one key
    Check { filter: String, key: String },

    /// Insert one key
    Set { filter: String, key: String },

    /// Insert many keys
    Bulk { filter: String, keys: Vec<String> },

    /// Test many keys
    Multi { filter: String, keys: Vec<String> },
}

impl Command {
    /// Build a `check` for a raw item value
    pub fn check(filter: impl Into<String>, value: impl AsRef<[u8]>) -> Self {
        Command::Check {
            filter: filter.into(),
            key: hash_key(value),
        }
    }

    /// Build a `set` for a raw item value
    pub fn set(filter: impl Into<String>, value: impl AsRef<[u8]>) -> Self {
        Command::Set {
            filter: filter.into(),
            key: hash_key(value),
        }
    }

    /// Build a `bulk` for raw item values, keeping their order
    pub fn bulk<S: AsRef<str>>(filter: impl Into<String>, items: &[S]) -> Self {
        Command::Bulk {
            filter: filter.into(),
            keys: hash_all(items),
        }
    }

    /// Build a `multi` for raw item values, keeping their order
    pub fn multi<S: AsRef<str>>(filter: impl Into<String>, items: &[S]) -> Self {
        Command::Multi {
            filter: filter.into(),
            keys: hash_all(items),
        }
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Create { .. } => CommandType::Create,
            Command::Drop { .. } => CommandType::Drop,
            Command::Close { .. } => CommandType::Close,
            Command::Clear { .. } => CommandType::Clear,
            Command::Flush { .. } => CommandType::Flush,
            Command::List { .. } => CommandType::List,
            Command::Info { .. } => CommandType::Info,
            Command::Check { .. } => CommandType::Check,
            Command::Set { .. } => CommandType::Set,
            Command::Bulk { .. } => CommandType::Bulk,
            Command::Multi { .. } => CommandType::Multi,
        }
    }

    /// The filter name (or list prefix) this command targets
    pub fn filter(&self) -> Option<&str> {
        match self {
            Command::Create { filter, .. }
            | Command::Drop { filter }
            | Command::Close { filter }
            | Command::Clear { filter }
            | Command::Flush { filter }
            | Command::Info { filter }
            | Command::Check { filter, .. }
            | Command::Set { filter, .. }
            | Command::Bulk { filter, .. }
            | Command::Multi { filter, .. } => Some(filter.as_str()),
            Command::List { prefix } => prefix.as_deref(),
        }
    }

    /// Reject commands whose arguments would break line framing
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self.filter() {
            validate_filter_name(name)?;
        }

        if let Command::Create { options, .. } = self {
            if let Some(p) = options.probability {
                if !p.is_finite() {
                    return Err(BloomdError::InvalidArgument(format!(
                        "probability must be a finite number, got {}",
                        p
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Check that a filter name is a single non-empty token
pub fn validate_filter_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BloomdError::InvalidArgument(
            "filter name must not be empty".to_string(),
        ));
    }

    if name.chars().any(char::is_whitespace) {
        return Err(BloomdError::InvalidArgument(format!(
            "filter name must not contain whitespace: {:?}",
            name
        )));
    }

    Ok(())
}

fn hash_all<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|item| hash_key(item.as_ref())).collect()
}
