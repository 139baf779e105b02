//! Network Module
//!
//! TCP connection handling.
//!
//! ## Model
//! - One blocking TCP stream per client
//! - One command in flight at a time
//! - Any transport or framing error poisons the stream; it is dropped,
//!   never reused

mod connection;

pub use connection::Connection;
