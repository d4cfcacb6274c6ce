use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::LinkStream;

/// Conventional TCP port for tunneled link-cable traffic.
pub const DEFAULT_PORT: u16 = 8765;

/// TCP listener for link-cable connections.
///
/// Provides bind/accept/connect over TCP. The listener closes when dropped.
pub struct TcpTransport {
    listener: TcpListener,
    addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr`.
    ///
    /// Port 0 picks an ephemeral port; use [`TcpTransport::local_addr`] to
    /// find out which.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        info!(%addr, "listening for link connections");

        Ok(Self { listener, addr })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<(LinkStream, SocketAddr)> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted link connection");
        Ok((LinkStream::from_tcp(stream)?, peer))
    }

    /// Connect to a listening peer (blocking).
    ///
    /// `addr` may be a host name; every resolved address is tried in order.
    pub fn connect(addr: &str) -> Result<LinkStream> {
        Self::connect_inner(addr, None)
    }

    /// Connect to a listening peer, giving up on each address after `timeout`.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<LinkStream> {
        Self::connect_inner(addr, Some(timeout))
    }

    fn connect_inner(addr: &str, timeout: Option<Duration>) -> Result<LinkStream> {
        let candidates = addr
            .to_socket_addrs()
            .map_err(|e| TransportError::Connect {
                addr: addr.to_string(),
                source: e,
            })?;

        let mut last_err = None;
        for candidate in candidates {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    debug!(addr = %candidate, "connected to link peer");
                    return LinkStream::from_tcp(stream);
                }
                Err(err) => {
                    debug!(addr = %candidate, %err, "connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        match last_err {
            Some(source) => Err(TransportError::Connect {
                addr: addr.to_string(),
                source,
            }),
            None => Err(TransportError::Unresolved {
                addr: addr.to_string(),
            }),
        }
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Switch `accept` between blocking and non-blocking mode.
    ///
    /// In non-blocking mode `accept` fails with `TransportError::Accept` of
    /// kind `WouldBlock` when no peer is waiting. Accepted streams are
    /// blocking either way.
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        self.listener.set_nonblocking(nonblocking)?;
        Ok(())
    }
}
