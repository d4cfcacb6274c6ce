/// Errors that can occur during frame decoding and stream I/O.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The input is not exactly one 8-byte frame.
    #[error("malformed frame ({len} bytes, expected 8)")]
    MalformedFrame { len: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed on a frame boundary.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// True for an expired socket read or write timeout.
    ///
    /// Blocking sockets report an expired `SO_RCVTIMEO`/`SO_SNDTIMEO` as
    /// `WouldBlock` on Unix and `TimedOut` on Windows.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Io(err)
                if matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
