//! The raw field table.
//!
//! Every frame exposes the same five raw fields, whatever its command. The
//! table is constant data owned by the decoder; presentation layers read it
//! to label the field breakdown.

use crate::codec::FRAME_SIZE;
use crate::command::CommandKind;

/// How a field's numeric value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldBase {
    /// Decimal.
    Dec,
    /// Zero-padded hexadecimal, two digits per byte.
    Hex,
    /// Decimal command id labelled with the command name.
    Command,
}

/// Static description of one raw field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Display name.
    pub name: &'static str,
    /// Filter-style abbreviation (`gblink.b1`, ...).
    pub abbrev: &'static str,
    /// Byte offset within the frame.
    pub offset: usize,
    /// Width in bytes (1 or 4).
    pub width: usize,
    pub base: FieldBase,
    pub description: &'static str,
}

/// The five raw fields, in wire order.
pub static FIELDS: [FieldSpec; 5] = [
    FieldSpec {
        name: "B1/Command",
        abbrev: "gblink.b1",
        offset: 0,
        width: 1,
        base: FieldBase::Command,
        description: "Byte 1 / Link Command",
    },
    FieldSpec {
        name: "B2",
        abbrev: "gblink.b2",
        offset: 1,
        width: 1,
        base: FieldBase::Hex,
        description: "Byte 2",
    },
    FieldSpec {
        name: "B3",
        abbrev: "gblink.b3",
        offset: 2,
        width: 1,
        base: FieldBase::Hex,
        description: "Byte 3",
    },
    FieldSpec {
        name: "B4",
        abbrev: "gblink.b4",
        offset: 3,
        width: 1,
        base: FieldBase::Hex,
        description: "Byte 4",
    },
    FieldSpec {
        name: "I1/Timestamp",
        abbrev: "gblink.i1",
        offset: 4,
        width: 4,
        base: FieldBase::Dec,
        description: "Timestamp",
    },
];

/// One extracted field: its spec, raw bytes, and interpreted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub spec: &'static FieldSpec,
    /// The field's bytes as they appear on the wire.
    pub raw: Vec<u8>,
    /// Big-endian numeric value of `raw`.
    pub value: u32,
    /// Rendered value according to `spec.base`.
    pub display: String,
}

impl Field {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }
}

impl FieldSpec {
    /// Extract this field from a frame.
    pub fn extract(&'static self, frame: &[u8; FRAME_SIZE]) -> Field {
        let raw = frame[self.offset..self.offset + self.width].to_vec();
        let value = raw.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
        let display = self.render(value);
        Field {
            spec: self,
            raw,
            value,
            display,
        }
    }

    fn render(&self, value: u32) -> String {
        match self.base {
            FieldBase::Dec => value.to_string(),
            FieldBase::Hex => format!("0x{:0width$x}", value, width = self.width * 2),
            FieldBase::Command => {
                // Command ids occupy one byte.
                let kind = CommandKind::from_id(value as u8);
                match kind.name() {
                    Some(name) => format!("{name} ({value})"),
                    None => format!("Unknown ({value})"),
                }
            }
        }
    }
}

/// Extract all five raw fields from a frame, in wire order.
pub fn extract_all(frame: &[u8; FRAME_SIZE]) -> Vec<Field> {
    FIELDS.iter().map(|spec| spec.extract(frame)).collect()
}

/// Look up a field spec by name or abbreviation.
pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    FIELDS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(key) || spec.abbrev == key)
}
