//! Wire keys
//!
//! Items are never sent as-is. Each one is replaced by the hex SHA-1 of its
//! bytes so keys on the wire have a fixed length and can't contain spaces or
//! line breaks. This is an encoding step, not a security measure: two inputs
//! with the same digest are the same item as far as the server can tell.

use sha1::{Digest, Sha1};

/// Length of a wire key (160-bit digest as lowercase hex)
pub const KEY_HEX_LEN: usize = 40;

/// Hash an item into its wire key
pub fn hash_key(value: impl AsRef<[u8]>) -> String {
    hex::encode(Sha1::digest(value.as_ref()))
}
