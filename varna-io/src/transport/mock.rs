//! Mock transport for testing

use super::Transport;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

/// One scripted outcome for a `read` call
enum ReadStep {
    /// Deliver this payload as a single read
    Data(Vec<u8>),
    /// Fail the read with this error kind
    Error(io::ErrorKind),
}

struct MockTransportInner {
    reads: VecDeque<ReadStep>,
    /// Each element is the payload of one `write` call, so tests can
    /// assert token boundaries, not just the byte stream.
    writes: Vec<Vec<u8>>,
    /// Fail writes once this many have succeeded
    fail_writes_after: Option<usize>,
}

/// Mock transport with scripted reads and recorded writes.
///
/// Reads consume the script in order; an exhausted script reads as
/// end-of-stream (0 bytes), which the server loop treats as the peer
/// closing the connection.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create a new mock transport with an empty read script
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                reads: VecDeque::new(),
                writes: Vec::new(),
                fail_writes_after: None,
            })),
        }
    }

    /// Queue a payload to be returned by one read call
    pub fn push_read(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.reads.push_back(ReadStep::Data(data.to_vec()));
    }

    /// Queue a read failure
    pub fn push_read_error(&self, kind: io::ErrorKind) {
        let mut inner = self.inner.lock().unwrap();
        inner.reads.push_back(ReadStep::Error(kind));
    }

    /// Make writes fail after `count` successful writes
    pub fn fail_writes_after(&self, count: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_writes_after = Some(count);
    }

    /// Payloads written so far, one entry per write call
    pub fn written(&self) -> Vec<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.writes.clone()
    }

    /// Written payloads decoded as UTF-8 tokens
    pub fn written_tokens(&self) -> Vec<String> {
        self.written()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        match inner.reads.pop_front() {
            Some(ReadStep::Data(data)) => {
                let n = data.len().min(buffer.len());
                buffer[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(ReadStep::Error(kind)) => {
                Err(Error::Io(io::Error::new(kind, "scripted read failure")))
            }
            None => Ok(0),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(limit) = inner.fail_writes_after
            && inner.writes.len() >= limit
        {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted write failure",
            )));
        }
        inner.writes.push(data.to_vec());
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
