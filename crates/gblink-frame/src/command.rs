//! Link command identifiers.
//!
//! The identifier space is a full byte. Only a handful of ids are known;
//! every other value is still a legal frame and classifies as
//! [`CommandKind::Unknown`].

/// Protocol version declaration (handshake).
pub const PROTOCOL_VERSION: u8 = 1;

/// Joypad button change.
pub const JOYPAD: u8 = 101;

/// Byte transfer initiated by the master side.
pub const SEND_BYTE_MASTER: u8 = 104;

/// Byte transfer answered by the slave side.
pub const SEND_BYTE_SLAVE: u8 = 105;

/// Timestamp / framecount synchronization.
pub const TIMESTAMP: u8 = 106;

/// Emulator status (BGB specific).
pub const STATUS: u8 = 108;

/// The kind of command a frame carries, selected by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    ProtocolVersion,
    Joypad,
    SendByteMaster,
    SendByteSlave,
    Timestamp,
    Status,
    /// An unrecognized id, preserved as received.
    Unknown(u8),
}

impl CommandKind {
    /// Classify a raw command id. Never fails.
    pub fn from_id(id: u8) -> Self {
        match id {
            PROTOCOL_VERSION => Self::ProtocolVersion,
            JOYPAD => Self::Joypad,
            SEND_BYTE_MASTER => Self::SendByteMaster,
            SEND_BYTE_SLAVE => Self::SendByteSlave,
            TIMESTAMP => Self::Timestamp,
            STATUS => Self::Status,
            other => Self::Unknown(other),
        }
    }

    /// The raw command id.
    pub fn id(self) -> u8 {
        match self {
            Self::ProtocolVersion => PROTOCOL_VERSION,
            Self::Joypad => JOYPAD,
            Self::SendByteMaster => SEND_BYTE_MASTER,
            Self::SendByteSlave => SEND_BYTE_SLAVE,
            Self::Timestamp => TIMESTAMP,
            Self::Status => STATUS,
            Self::Unknown(id) => id,
        }
    }

    /// Human-readable name, or `None` for unknown ids.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::ProtocolVersion => Some("Protocol version"),
            Self::Joypad => Some("Joypad"),
            Self::SendByteMaster => Some("Send byte (master)"),
            Self::SendByteSlave => Some("Send byte (slave)"),
            Self::Timestamp => Some("Timestamp/Framecount sync"),
            Self::Status => Some("Status"),
            Self::Unknown(_) => None,
        }
    }

    /// Returns true if the id is one of the known commands.
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<u8> for CommandKind {
    fn from(id: u8) -> Self {
        Self::from_id(id)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown ({})", self.id()),
        }
    }
}
