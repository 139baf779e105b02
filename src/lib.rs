//! # bloomd-client
//!
//! A synchronous client for the bloomd line protocol:
//! - Filter management (create, drop, close, clear, flush, list, info)
//! - Single and bulk membership queries and insertions
//! - Fixed-length SHA-1 wire keys for arbitrary item values
//! - One blocking TCP connection, one command in flight
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               BloomdClient / Filter handle                   │
//! │            (typed operations, &mut self per call)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Protocol Codec                             │
//! │        (command lines out, scalar/block responses in)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Connection                               │
//! │             (one TCP stream, send deadline)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!                 bloomd server
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use bloomd_client::{BloomdClient, Config, CreateOptions, FilterOps};
//!
//! # fn main() -> bloomd_client::Result<()> {
//! let mut client = BloomdClient::new(Config::default())?;
//! client.create_filter("visitors", CreateOptions::new().capacity(100_000))?;
//!
//! let mut visitors = client.filter("visitors")?;
//! visitors.set("alice")?;
//! assert!(visitors.check("alice")?);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;
pub mod filter;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BloomdError, Result};
pub use config::{Config, ConnectMode};
pub use client::BloomdClient;
pub use filter::{Filter, FilterOps};
pub use protocol::{CreateOptions, FilterInfo, FilterRecord, ItemStatusMap};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of bloomd-client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
