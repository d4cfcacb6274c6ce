//! Game Boy link-cable command framing and decoding.
//!
//! Emulators that tunnel the link cable over TCP exchange fixed 8-byte
//! frames:
//! - 1 byte command identifier
//! - 3 bytes of command-specific payload
//! - a 4-byte big-endian timestamp / framecount field
//!
//! [`decode`] turns one frame into a [`DecodedFrame`]: the command kind, a
//! typed interpretation, the five raw fields, and a one-line summary.
//! [`FrameReader`] and [`FrameWriter`] move whole frames over any byte stream.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod command;
pub mod dissect;
pub mod error;
pub mod fields;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::LinkCodec;
pub use codec::{decode_frame, encode_frame, Frame, FrameConfig, FRAME_SIZE};
pub use command::{
    CommandKind, JOYPAD, PROTOCOL_VERSION, SEND_BYTE_MASTER, SEND_BYTE_SLAVE, STATUS, TIMESTAMP,
};
pub use dissect::{
    decode, decode_with_layout, ButtonAction, Command, DecodedFrame, EmulatorStatus, Layout,
    TimestampSync, TransferSpeed,
};
pub use error::{FrameError, Result};
pub use fields::{Field, FieldBase, FieldSpec, FIELDS};
pub use reader::FrameReader;
pub use writer::FrameWriter;
