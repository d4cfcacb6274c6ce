use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};

use crate::error::Result;

/// A connected link stream implementing `Read` and `Write`.
///
/// This is the I/O type returned by transport operations and consumed by the
/// frame reader/writer. It wraps a TCP stream with Nagle disabled, since link
/// frames are 8 bytes and latency-sensitive.
pub struct LinkStream {
    inner: TcpStream,
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl LinkStream {
    /// Wrap an already-connected TCP stream.
    ///
    /// The stream is put in blocking mode; some platforms hand out accepted
    /// sockets that inherit a non-blocking listener's mode.
    pub fn from_tcp(stream: TcpStream) -> Result<Self> {
        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;
        Ok(Self { inner: stream })
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new socket handle).
    ///
    /// Useful for reading and writing the same connection from two threads.
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self { inner: cloned })
    }

    /// Address of the remote end.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }

    /// Address of the local end.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.inner.local_addr().map_err(Into::into)
    }

    /// Unwrap into the underlying TCP stream.
    pub fn into_inner(self) -> TcpStream {
        self.inner
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("LinkStream");
        dbg.field("type", &"tcp");
        if let Ok(peer) = self.inner.peer_addr() {
            dbg.field("peer", &peer);
        }
        dbg.finish()
    }
}
