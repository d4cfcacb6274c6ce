use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use gblink_transport::LinkStream;
use tracing::{debug, trace};

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::dissect::DecodedFrame;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete 8-byte frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
/// There is no resynchronization: bytes are consumed strictly in groups of 8.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF falls on a frame
    /// boundary, and `Err(FrameError::MalformedFrame)` when the stream ends
    /// part-way through a frame.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf)? {
                trace!(command = frame.command, "frame read");
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Err(FrameError::ConnectionClosed);
                }
                let len = self.buf.len();
                debug!(len, "stream ended inside a frame");
                self.buf.clear();
                return Err(FrameError::MalformedFrame { len });
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read and decode the next frame using the configured layout.
    pub fn read_decoded(&mut self) -> Result<DecodedFrame> {
        let frame = self.read_frame()?;
        Ok(DecodedFrame::from_frame(frame, self.config.layout))
    }

    /// Number of bytes buffered but not yet returned as a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<LinkStream> {
    /// Create a frame reader for `LinkStream` and apply read timeout from config.
    pub fn with_config_link(inner: LinkStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: gblink_transport::TransportError) -> FrameError {
    match err {
        gblink_transport::TransportError::Io(io)
        | gblink_transport::TransportError::Accept(io) => FrameError::Io(io),
        gblink_transport::TransportError::Bind { source, .. }
        | gblink_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
