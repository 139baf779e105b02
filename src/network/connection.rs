//! Server Connection
//!
//! Owns the single TCP stream a client talks over.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{BloomdError, Result};
use crate::protocol::{read_response, write_command, Command, Response};

/// An open connection to a bloomd server
///
/// The stream is shut down when the connection is dropped, on every exit
/// path.
pub struct Connection {
    /// TCP stream reader (buffered for line reads)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered so a command goes out in one write)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Dial the server named by the config
    ///
    /// Every resolved address is tried in turn; the last failure is reported.
    pub fn open(config: &Config) -> Result<Self> {
        let addr = config.addr();
        let addrs = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| BloomdError::Connection(format!("failed to resolve {}: {}", addr, e)))?;

        let mut last_err: Option<io::Error> = None;
        for socket_addr in addrs {
            let attempt = if config.connect_timeout_ms > 0 {
                TcpStream::connect_timeout(
                    &socket_addr,
                    Duration::from_millis(config.connect_timeout_ms),
                )
            } else {
                TcpStream::connect(socket_addr)
            };

            match attempt {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::trace!("Connect to {} failed: {}", socket_addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(BloomdError::Connection(match last_err {
            Some(e) => format!("failed to connect to bloomd server {}: {}", addr, e),
            None => format!("no addresses resolved for {}", addr),
        }))
    }

    /// Wrap an already connected stream
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| config.addr());

        // Commands are single small writes; don't let Nagle hold them back
        stream
            .set_nodelay(true)
            .map_err(|e| setup_error(&peer_addr, BloomdError::Io(e)))?;

        let read_stream = stream
            .try_clone()
            .map_err(|e| setup_error(&peer_addr, BloomdError::Io(e)))?;
        let write_stream = stream;

        let mut connection = Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        };
        connection
            .set_timeouts(config.read_timeout_ms, config.write_timeout_ms)
            .map_err(|e| setup_error(&connection.peer_addr, e))?;

        tracing::debug!("Connected to {}", connection.peer_addr);
        Ok(connection)
    }

    /// Configure connection timeouts, 0 meaning no deadline
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        read_stream.set_read_timeout(millis(read_ms))?;
        write_stream.set_write_timeout(millis(write_ms))?;

        Ok(())
    }

    /// Send one command and read its complete response
    ///
    /// On error the stream may be mid-response; the caller must drop this
    /// connection rather than reuse it.
    pub fn round_trip(&mut self, command: &Command) -> Result<Response> {
        tracing::trace!("Sending to {}: {:?}", self.peer_addr, command);

        write_command(&mut self.writer, command).map_err(|e| match e {
            BloomdError::Io(io_err) => BloomdError::Connection(format!(
                "failed to send {} to {}: {}",
                command.command_type().verb(),
                self.peer_addr,
                describe_io(&io_err)
            )),
            other => other,
        })?;

        let response = read_response(&mut self.reader).map_err(|e| match e {
            BloomdError::Io(io_err) => BloomdError::Connection(format!(
                "failed to read response from {}: {}",
                self.peer_addr,
                describe_io(&io_err)
            )),
            other => other,
        })?;

        tracing::trace!("Received from {}: {:?}", self.peer_addr, response);
        Ok(response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Already-closed sockets report NotConnected here; nothing to do
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
        tracing::debug!("Disconnected from {}", self.peer_addr);
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Socket setup failures count as failing to connect
fn setup_error(peer_addr: &str, err: BloomdError) -> BloomdError {
    match err {
        BloomdError::Io(io_err) => BloomdError::Connection(format!(
            "failed to set up connection to {}: {}",
            peer_addr, io_err
        )),
        other => other,
    }
}

fn describe_io(err: &io::Error) -> String {
    match err.kind() {
        // Unix reports an expired socket deadline as WouldBlock, Windows as TimedOut
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => format!("timed out ({})", err),
        _ => err.to_string(),
    }
}
