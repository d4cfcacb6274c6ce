//! Single-frame decoding.
//!
//! [`decode`] is a pure function: 8 bytes in, a [`DecodedFrame`] out. Each
//! frame decodes on its own; nothing is carried over from earlier frames even
//! though real link traffic is a conversation.

use std::fmt;

use crate::codec::{Frame, FRAME_SIZE};
use crate::command::CommandKind;
use crate::error::Result;
use crate::fields::{extract_all, field_spec, Field, FieldBase};

/// Which summary layout to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Command-specific summaries.
    #[default]
    Interpreted,
    /// Raw field values only, no command interpretation in the summary.
    Raw,
}

/// Joypad button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Pushed,
    Released,
}

impl ButtonAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pushed => "pushed",
            Self::Released => "released",
        }
    }
}

/// Serial clock speed requested by the master's control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSpeed {
    High,
    Double,
}

impl TransferSpeed {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high speed",
            Self::Double => "double speed",
        }
    }
}

/// The two flavours of the timestamp command, selected by byte 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSync {
    /// Byte 1 non-zero: reply during an active transfer.
    ActiveTransferResponse { framecount: u16 },
    /// Byte 1 zero: periodic synchronization carrying the timestamp.
    Synchronization { framecount: u16, timestamp: u32 },
}

/// Emulator run state reported by the status command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatorStatus {
    Paused,
    Running,
}

impl EmulatorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paused => "Emulator is paused",
            Self::Running => "Emulator is running",
        }
    }
}

/// Typed interpretation of a frame's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ProtocolVersion {
        major: u8,
        minor: u8,
    },
    Joypad {
        button: u8,
        action: ButtonAction,
    },
    SendByteMaster {
        byte: u8,
        control: u8,
        speed: TransferSpeed,
        timestamp: u32,
    },
    SendByteSlave {
        byte: u8,
        control: u8,
    },
    Timestamp(TimestampSync),
    Status(EmulatorStatus),
    Unknown {
        id: u8,
    },
}

impl Command {
    /// Interpret a frame according to its command id.
    pub fn interpret(frame: &Frame) -> Self {
        let [b1, b2, b3] = frame.payload;
        match frame.kind() {
            CommandKind::ProtocolVersion => Self::ProtocolVersion {
                major: b1,
                minor: b2,
            },
            // Button numbering is not documented beyond this mask.
            CommandKind::Joypad => Self::Joypad {
                button: b1 & 0x4,
                action: if (b1 >> 2) & 0x1 == 1 {
                    ButtonAction::Pushed
                } else {
                    ButtonAction::Released
                },
            },
            CommandKind::SendByteMaster => Self::SendByteMaster {
                byte: b1,
                control: b2,
                speed: if (b2 >> 1) & 0x1 == 1 {
                    TransferSpeed::High
                } else {
                    TransferSpeed::Double
                },
                timestamp: frame.timestamp,
            },
            CommandKind::SendByteSlave => Self::SendByteSlave {
                byte: b1,
                control: b2,
            },
            CommandKind::Timestamp => {
                let framecount = u16::from_be_bytes([b2, b3]);
                if b1 != 0 {
                    Self::Timestamp(TimestampSync::ActiveTransferResponse { framecount })
                } else {
                    Self::Timestamp(TimestampSync::Synchronization {
                        framecount,
                        timestamp: frame.timestamp,
                    })
                }
            }
            CommandKind::Status => Self::Status(if b1 & 0x1 == 1 {
                EmulatorStatus::Paused
            } else {
                EmulatorStatus::Running
            }),
            CommandKind::Unknown(id) => Self::Unknown { id },
        }
    }

    /// The command kind this interpretation belongs to.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::ProtocolVersion { .. } => CommandKind::ProtocolVersion,
            Self::Joypad { .. } => CommandKind::Joypad,
            Self::SendByteMaster { .. } => CommandKind::SendByteMaster,
            Self::SendByteSlave { .. } => CommandKind::SendByteSlave,
            Self::Timestamp(_) => CommandKind::Timestamp,
            Self::Status(_) => CommandKind::Status,
            Self::Unknown { id } => CommandKind::Unknown(*id),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtocolVersion { major, minor } => {
                write!(f, "Declaring protocol version {major}.{minor}")
            }
            Self::Joypad { button, action } => write!(f, "Button {button} {}", action.as_str()),
            Self::SendByteMaster {
                byte,
                speed,
                timestamp,
                ..
            } => write!(
                f,
                "Master sent byte 0x{byte:02x}, {}, timestamp={timestamp}",
                speed.as_str()
            ),
            Self::SendByteSlave { byte, control } => {
                write!(f, "Slave sent byte 0x{byte:02x}, control=0x{control:02x}")
            }
            Self::Timestamp(TimestampSync::ActiveTransferResponse { framecount }) => {
                write!(f, "Active transfer response, framecount={framecount}")
            }
            Self::Timestamp(TimestampSync::Synchronization {
                framecount,
                timestamp,
            }) => write!(
                f,
                "Synchronization, framecount={framecount}, timestamp={timestamp}"
            ),
            Self::Status(status) => f.write_str(status.as_str()),
            Self::Unknown { id } => write!(f, "Unknown Command ID ({id})"),
        }
    }
}

/// The result of decoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub kind: CommandKind,
    pub command: Command,
    /// All five raw fields in wire order.
    pub fields: Vec<Field>,
    /// One-line summary.
    pub summary: String,
    pub frame: Frame,
    pub layout: Layout,
}

impl DecodedFrame {
    /// Decode an already-parsed frame.
    pub fn from_frame(frame: Frame, layout: Layout) -> Self {
        let bytes = frame.to_bytes();
        let command = frame.command();
        let fields = extract_all(&bytes);
        let summary = match layout {
            Layout::Interpreted => command.to_string(),
            Layout::Raw => raw_summary(&fields),
        };

        Self {
            kind: frame.kind(),
            command,
            fields,
            summary,
            frame,
            layout,
        }
    }

    /// Look up an extracted field by name or abbreviation.
    pub fn field(&self, key: &str) -> Option<&Field> {
        let spec = field_spec(key)?;
        self.fields.iter().find(|field| std::ptr::eq(field.spec, spec))
    }

    /// The frame's wire bytes.
    pub fn bytes(&self) -> [u8; FRAME_SIZE] {
        self.frame.to_bytes()
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

fn raw_summary(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| {
            let label = field.spec.name.split('/').next().unwrap_or(field.spec.name);
            match field.spec.base {
                FieldBase::Hex => format!("{label}={}", field.display),
                _ => format!("{label}={}", field.value),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode one frame with the interpreted layout.
///
/// Fails with `MalformedFrame` unless `bytes` is exactly 8 bytes long. Never
/// fails on an unrecognized command id.
pub fn decode(bytes: &[u8]) -> Result<DecodedFrame> {
    decode_with_layout(bytes, Layout::Interpreted)
}

/// Decode one frame with an explicit layout.
pub fn decode_with_layout(bytes: &[u8], layout: Layout) -> Result<DecodedFrame> {
    let frame = Frame::from_bytes(bytes)?;
    Ok(DecodedFrame::from_frame(frame, layout))
}
