//! Protocol codec
//!
//! Encoding of commands and decoding of responses for the line protocol.
//!
//! ## Response Framing
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │ Done|Yes|No|... \n   │  or  │ START\n              │
//! └──────────────────────┘      │ <data line>\n  (0..n)│
//!                               │ END\n                │
//!                               └──────────────────────┘
//! ```
//!
//! Exactly one response unit is read per command. Anything that breaks the
//! framing (EOF, an empty first line, a blank line inside a block) is a
//! protocol error and leaves the stream unusable.

use std::io::{BufRead, Read, Write};

use crate::error::{BloomdError, Result};
use super::{
    Command, FilterInfo, FilterRecord, ItemStatusMap, Response,
    BLOCK_END, BLOCK_START, DONE, FILTER_NOT_FOUND, YES,
};

/// Maximum length of a single response line (16 MB)
pub const MAX_LINE_LEN: u64 = 16 * 1024 * 1024;

/// Fields per `list` row: name, probability, size, capacity, items
const LIST_FIELDS: usize = 5;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to its wire line, terminator included
pub fn encode_command(command: &Command) -> String {
    let mut line = String::from(command.command_type().verb());

    match command {
        Command::Create { filter, options } => {
            push_token(&mut line, filter);
            if let Some(capacity) = options.capacity {
                push_token(&mut line, &format!("capacity={}", capacity));
            }
            if let Some(probability) = options.probability {
                push_token(&mut line, &format!("prob={}", probability));
            }
            if let Some(in_memory) = options.in_memory {
                push_token(&mut line, if in_memory { "in_memory=1" } else { "in_memory=0" });
            }
        }
        Command::Drop { filter }
        | Command::Close { filter }
        | Command::Clear { filter }
        | Command::Flush { filter }
        | Command::Info { filter } => push_token(&mut line, filter),
        Command::List { prefix } => {
            if let Some(prefix) = prefix {
                push_token(&mut line, prefix);
            }
        }
        Command::Check { filter, key } | Command::Set { filter, key } => {
            push_token(&mut line, filter);
            push_token(&mut line, key);
        }
        Command::Bulk { filter, keys } | Command::Multi { filter, keys } => {
            push_token(&mut line, filter);
            for key in keys {
                push_token(&mut line, key);
            }
        }
    }

    line.push('\n');
    line
}

fn push_token(line: &mut String, token: &str) {
    line.push(' ');
    line.push_str(token);
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let line = encode_command(command);
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Response Reading
// =============================================================================

/// Read one line, without its `\n` or `\r\n` terminator
///
/// Returns `None` when the peer closed the stream before sending anything.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = reader.by_ref().take(MAX_LINE_LEN + 1).read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }

    if buf.last() != Some(&b'\n') {
        if buf.len() as u64 > MAX_LINE_LEN {
            return Err(BloomdError::Protocol(format!(
                "Response line exceeds {} bytes",
                MAX_LINE_LEN
            )));
        }
        return Err(BloomdError::Protocol(
            "Connection closed mid-line".to_string(),
        ));
    }

    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| BloomdError::Protocol(format!("Response is not valid UTF-8: {}", e)))
}

/// Read a complete response unit from a stream
///
/// Blocks until a full line, or a full `START`..`END` block, has arrived.
pub fn read_response<R: BufRead>(reader: &mut R) -> Result<Response> {
    let first = match read_line(reader)? {
        Some(line) if !line.is_empty() => line,
        Some(_) => {
            return Err(BloomdError::Protocol(
                "Received empty response".to_string(),
            ))
        }
        None => {
            return Err(BloomdError::Protocol(
                "Connection closed before a response was received".to_string(),
            ))
        }
    };

    if first != BLOCK_START {
        return Ok(Response::Line(first));
    }

    let mut lines = Vec::new();
    loop {
        match read_line(reader)? {
            Some(line) if line == BLOCK_END => return Ok(Response::Block(lines)),
            Some(line) if line.is_empty() => {
                return Err(BloomdError::Protocol(format!(
                    "Blank line inside block after {} data lines",
                    lines.len()
                )))
            }
            Some(line) => lines.push(line),
            None => {
                return Err(BloomdError::Protocol(format!(
                    "Connection closed inside block after {} data lines",
                    lines.len()
                )))
            }
        }
    }
}

// =============================================================================
// Response Decoding
// =============================================================================

fn expect_line<'a>(response: &'a Response, verb: &str) -> Result<&'a str> {
    response.as_line().ok_or_else(|| {
        BloomdError::Protocol(format!("Unexpected block response to {}", verb))
    })
}

/// Decode a management reply: `true` iff the server said `Done`
pub fn decode_done(response: &Response) -> Result<bool> {
    Ok(expect_line(response, "management command")? == DONE)
}

/// Decode a `check`/`set` reply: `true` iff the server said `Yes`
pub fn decode_yes(response: &Response) -> Result<bool> {
    Ok(expect_line(response, "check/set")? == YES)
}

/// Decode a `bulk`/`multi` reply against the items that were sent
///
/// Tokens are zipped positionally with `items`, so `items` must be in the
/// same order the keys were encoded.
pub fn decode_statuses<S: AsRef<str>>(response: &Response, items: &[S]) -> Result<ItemStatusMap> {
    let line = expect_line(response, "bulk/multi")?;
    let mut statuses = ItemStatusMap::with_capacity(items.len());

    if line == FILTER_NOT_FOUND {
        for item in items {
            statuses.insert(item.as_ref(), false);
        }
        return Ok(statuses);
    }

    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() != items.len() {
        return Err(BloomdError::Protocol(format!(
            "Expected {} status tokens, got {}: {:?}",
            items.len(),
            tokens.len(),
            line
        )));
    }

    for (item, token) in items.iter().zip(tokens) {
        statuses.insert(item.as_ref(), token == YES);
    }

    Ok(statuses)
}

/// Decode a `list` reply into filter records
///
/// Any single-line reply (`Filter does not exist` or an error line) yields
/// no records. Malformed rows inside the block are protocol errors.
pub fn decode_list(response: &Response) -> Result<Vec<FilterRecord>> {
    let lines = match response {
        Response::Block(lines) => lines,
        Response::Line(line) => {
            tracing::debug!("list answered with a single line: {:?}", line);
            return Ok(Vec::new());
        }
    };

    lines.iter().map(|line| parse_filter_record(line)).collect()
}

fn parse_filter_record(line: &str) -> Result<FilterRecord> {
    let fields: Vec<&str> = line.split(' ').collect();
    if fields.len() != LIST_FIELDS {
        return Err(BloomdError::Protocol(format!(
            "List line has {} fields, expected {}: {:?}",
            fields.len(),
            LIST_FIELDS,
            line
        )));
    }

    Ok(FilterRecord {
        name: fields[0].to_string(),
        probability: parse_field(fields[1], "probability", line)?,
        size: parse_field(fields[2], "size", line)?,
        capacity: parse_field(fields[3], "capacity", line)?,
        items: parse_field(fields[4], "items", line)?,
    })
}

fn parse_field<T: std::str::FromStr>(raw: &str, field: &str, line: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        BloomdError::Protocol(format!("Invalid {} {:?} in list line {:?}", field, raw, line))
    })
}

/// Decode an `info` reply into key/value counters
///
/// A `Filter does not exist` reply, whether bare or inside the block,
/// yields an empty map. So does any other single-line reply, such as a
/// `Client Error` line.
pub fn decode_info(response: &Response) -> Result<FilterInfo> {
    let lines = match response {
        Response::Block(lines) => lines,
        Response::Line(line) => {
            if line != FILTER_NOT_FOUND {
                tracing::debug!("info answered with a single line: {:?}", line);
            }
            return Ok(FilterInfo::new());
        }
    };

    let mut info = FilterInfo::new();
    for line in lines {
        if line == FILTER_NOT_FOUND {
            return Ok(FilterInfo::new());
        }

        match line.split(' ').collect::<Vec<_>>().as_slice() {
            [key, value] => {
                info.insert(key.to_string(), value.to_string());
            }
            fields => {
                return Err(BloomdError::Protocol(format!(
                    "Info line has {} fields, expected 2: {:?}",
                    fields.len(),
                    line
                )))
            }
        }
    }

    Ok(info)
}
