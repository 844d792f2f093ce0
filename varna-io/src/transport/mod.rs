//! Transport layer for the session socket
//!
//! The server loop talks to the console through this trait so the
//! poll/dispatch cycle can be exercised in tests without a real
//! socket. One token maps to one `write` call and one `read` call;
//! the trait does not add framing on top of the byte stream.

use crate::error::Result;

mod mock;
mod tcp;

pub use mock::MockTransport;
pub use tcp::TcpTransport;

/// Transport trait for session communication
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read.
    ///
    /// Blocks until data arrives. A return of 0 means the peer closed
    /// the connection.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;
}
