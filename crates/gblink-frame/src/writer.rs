use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use gblink_transport::LinkStream;
use tracing::trace;

use crate::codec::{encode_frame, Frame, FrameConfig, FRAME_SIZE};
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

/// Writes complete 8-byte frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(FRAME_SIZE),
            config,
        }
    }

    /// Write a complete frame (blocking), then flush.
    ///
    /// Only `Interrupted` is retried. An expired write timeout comes back as
    /// `FrameError::Io` (see [`FrameError::is_timeout`]).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.buf.clear();
        encode_frame(frame, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        trace!(command = frame.command, "frame written");

        self.flush()
    }

    /// Build and send a frame from its parts.
    pub fn send(&mut self, command: u8, payload: [u8; 3], timestamp: u32) -> Result<()> {
        self.write_frame(&Frame::new(command, payload, timestamp))
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<LinkStream> {
    /// Create a frame writer for `LinkStream` and apply write timeout from config.
    pub fn with_config_link(inner: LinkStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::codec::decode_frame;

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> BytesMut {
        BytesMut::from(writer.into_inner().into_inner().as_slice())
    }

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let frame = Frame::new(104, [0xAB, 0x02, 0x00], 300);

        writer.write_frame(&frame).unwrap();

        let wire = written(writer);
        assert_eq!(wire.as_ref(), &[0x68, 0xAB, 0x02, 0x00, 0x00, 0x00, 0x01, 0x2C]);
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.send(1, [1, 4, 0], 0).unwrap();
        writer.send(108, [1, 0, 0], 5).unwrap();
        writer.send(106, [0, 0, 9], 1000).unwrap();

        let mut wire = written(writer);
        assert_eq!(wire.len(), 3 * FRAME_SIZE);

        let f1 = decode_frame(&mut wire).unwrap().unwrap();
        let f2 = decode_frame(&mut wire).unwrap().unwrap();
        let f3 = decode_frame(&mut wire).unwrap().unwrap();

        assert_eq!(f1, Frame::new(1, [1, 4, 0], 0));
        assert_eq!(f2, Frame::new(108, [1, 0, 0], 5));
        assert_eq!(f3, Frame::new(106, [0, 0, 9], 1000));
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(105, [0, 0x80, 0], 0).unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = FrameWriter::new(cursor);

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        assert!(writer.config().write_timeout.is_none());
        let _inner = writer.into_inner();
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        writer.send(104, [0x42, 0x81, 0], 1).unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data.len(), FRAME_SIZE);
    }

    #[test]
    fn would_block_write_is_returned_not_retried() {
        let writer_impl = WouldBlockWriteThenFlush {
            wrote_once: false,
            flush_would_block: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        let err = writer.send(104, [0x42, 0x81, 0], 1).unwrap_err();
        assert!(err.is_timeout());
        assert!(writer.get_ref().data.is_empty());
    }

    #[test]
    fn would_block_flush_is_returned_not_retried() {
        let writer_impl = WouldBlockWriteThenFlush {
            wrote_once: true,
            flush_would_block: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        let err = writer.send(104, [0x42, 0x81, 0], 1).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
        assert_eq!(writer.get_ref().data.len(), FRAME_SIZE);
    }

    #[test]
    fn write_timeout_fires_when_peer_stops_reading() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = gblink_transport::TcpTransport::bind(addr).unwrap();
        let stream = gblink_transport::TcpTransport::connect(&listener.local_addr().to_string())
            .unwrap();
        // Accepted but never read from.
        let _server = listener.accept().unwrap();

        let cfg = FrameConfig {
            write_timeout: Some(Duration::from_millis(50)),
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config_link(stream, cfg).unwrap();

        // Fill both socket buffers so the next frame cannot be accepted.
        let chunk = [0u8; 64 * 1024];
        let mut filled = false;
        for _ in 0..16 * 1024 {
            if writer.get_mut().write(&chunk).is_err() {
                filled = true;
                break;
            }
        }
        assert!(filled, "socket buffers never filled");

        let started = Instant::now();
        let err = writer.send(104, [0xAB, 0x02, 0x00], 300).unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn short_writes_are_completed() {
        let mut writer = FrameWriter::new(TwoBytesAtATime { data: Vec::new() });
        writer.send(101, [4, 0, 0], 0).unwrap();

        let inner = writer.into_inner();
        assert_eq!(inner.data, vec![101, 4, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(1, [1, 4, 0], 0).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn applies_write_timeout_for_link_stream() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let listener = gblink_transport::TcpTransport::bind(addr).unwrap();
        let stream = gblink_transport::TcpTransport::connect(&listener.local_addr().to_string())
            .unwrap();
        let _server = listener.accept().unwrap();

        let cfg = FrameConfig {
            write_timeout: Some(std::time::Duration::from_millis(10)),
            ..FrameConfig::default()
        };

        let writer = FrameWriter::with_config_link(stream, cfg);
        assert!(writer.is_ok());
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct WouldBlockWriteThenFlush {
        wrote_once: bool,
        flush_would_block: bool,
        data: Vec<u8>,
    }

    impl Write for WouldBlockWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_would_block {
                self.flush_would_block = true;
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            Ok(())
        }
    }

    struct TwoBytesAtATime {
        data: Vec<u8>,
    }

    impl Write for TwoBytesAtATime {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(2);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn written_bytes_decode() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.send(106, [0, 0, 5], 0).unwrap();

        let wire = writer.into_inner().into_inner();
        let mut framed = crate::reader::FrameReader::new(Cursor::new(wire));
        let decoded = framed.read_decoded().unwrap();
        assert_eq!(decoded.summary, "Synchronization, framecount=5, timestamp=0");
    }
}
