//! TCP transport for tunneled Game Boy link-cable traffic.
//!
//! Emulators such as BGB redirect the serial link to a TCP socket (port 8765
//! by convention). This crate owns the socket plumbing only:
//! - [`TcpTransport`] binds, accepts and connects
//! - [`LinkStream`] is the connected `Read + Write` stream handed to framing
//!
//! Frame boundaries and decoding live in `gblink-frame`.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::LinkStream;
pub use tcp::{TcpTransport, DEFAULT_PORT};
