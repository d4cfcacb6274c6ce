//! Decode Game Boy link-cable traffic tunneled over TCP.
//!
//! gblink classifies the 8-byte command frames that emulators such as BGB
//! exchange when they redirect the serial link to a socket, and renders each
//! one as a summary line plus a raw field breakdown.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP listener/connector and the connected stream type
//! - [`frame`]: Frame codec, decoder, and blocking reader/writer

/// Re-export transport types.
pub mod transport {
    pub use gblink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use gblink_frame::*;
}

pub use gblink_frame::{decode, DecodedFrame, FrameError};
