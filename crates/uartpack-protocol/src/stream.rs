//! Incremental decoding of top-level values.
//!
//! The serial link delivers bytes in arbitrary chunks and message or log
//! responses span several top-level values. [`ValueStream`] buffers the
//! chunks and hands out each value once it is complete.

use crate::error::CodecResult;
use crate::value::Value;
use bytes::{Buf, BytesMut};
use std::io;

/// Initial buffer capacity.
pub const STREAM_BUFFER_CAPACITY: usize = 1024;

/// Accumulates received bytes and yields complete values.
#[derive(Debug, Default)]
pub struct ValueStream {
    buffer: BytesMut,
}

fn is_incomplete(err: &rmpv::decode::Error) -> bool {
    match err {
        rmpv::decode::Error::InvalidMarkerRead(e) | rmpv::decode::Error::InvalidDataRead(e) => {
            e.kind() == io::ErrorKind::UnexpectedEof
        }
        _ => false,
    }
}

impl ValueStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        ValueStream {
            buffer: BytesMut::with_capacity(STREAM_BUFFER_CAPACITY),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next complete value.
    ///
    /// Returns `Ok(None)` when the buffer is empty or ends in a partial
    /// value; the partial bytes stay buffered for the next [`push`]. A
    /// malformed payload discards the whole buffer.
    ///
    /// [`push`]: ValueStream::push
    pub fn next_value(&mut self) -> CodecResult<Option<Value>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }

        let mut rd: &[u8] = &self.buffer;
        match rmpv::decode::read_value(&mut rd) {
            Ok(raw) => {
                let consumed = self.buffer.len() - rd.len();
                self.buffer.advance(consumed);
                log::trace!("stream yielded a value of {} bytes", consumed);
                Value::from_wire(raw).map(Some)
            }
            Err(e) if is_incomplete(&e) => Ok(None),
            Err(e) => {
                log::debug!("discarding {} buffered bytes: {}", self.buffer.len(), e);
                self.buffer.clear();
                Err(e.into())
            }
        }
    }

    /// Decode every complete value currently buffered.
    pub fn drain(&mut self) -> CodecResult<Vec<Value>> {
        let mut values = Vec::new();
        while let Some(value) = self.next_value()? {
            values.push(value);
        }
        Ok(values)
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
