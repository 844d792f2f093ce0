//! TCP transport over the accepted session stream

use super::Transport;
use crate::error::Result;
use std::io::{Read, Write};
use std::net::TcpStream;

/// Session transport backed by the accepted `TcpStream`.
///
/// Reads block with no timeout: the server loop stalls until the
/// console sends a command or closes the connection. Dropping the
/// transport releases the socket.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Wrap an accepted connection
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl Transport for TcpTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        Ok(self.stream.read(buffer)?)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(self.stream.write(data)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.stream.flush()?)
    }
}
