//! Protocol Module
//!
//! Defines the bloomd line protocol spoken between client and server.
//!
//! ## Request Format
//! ```text
//! <verb> <filter>[ <key=value> ...][ <hashed item> ...]\n
//! ```
//!
//! ### Commands
//! - create <filter> [capacity=N] [prob=P] [in_memory=0|1]
//! - drop / close / clear / flush / info <filter>
//! - list [<prefix>]
//! - check / set <filter> <key>
//! - bulk / multi <filter> <key> <key> ...
//!
//! ## Response Format
//! ```text
//! Scalar:  Done | Yes | No | Exists | <error text>
//! Block:   START\n<line>\n...\nEND\n
//! ```

mod command;
mod response;
mod codec;
mod key;

pub use command::{validate_filter_name, Command, CommandType, CreateOptions};
pub use response::{FilterInfo, FilterRecord, ItemStatusMap, Response};
pub use codec::{
    MAX_LINE_LEN, encode_command, write_command, read_response,
    decode_done, decode_yes, decode_statuses, decode_list, decode_info,
};
pub use key::{hash_key, KEY_HEX_LEN};

// =============================================================================
// Wire literals
// =============================================================================

/// Reply to a successful management command
pub const DONE: &str = "Done";

/// Positive membership / insertion reply
pub const YES: &str = "Yes";

/// Negative membership / insertion reply
pub const NO: &str = "No";

/// Reply to `create` for a filter that is already present
pub const EXISTS: &str = "Exists";

/// First line of a block response
pub const BLOCK_START: &str = "START";

/// Last line of a block response
pub const BLOCK_END: &str = "END";

/// Reply naming a filter the server does not know
pub const FILTER_NOT_FOUND: &str = "Filter does not exist";
