use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gblink_frame::{DecodedFrame, Layout};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FieldOutput<'a> {
    name: &'a str,
    abbrev: &'a str,
    offset: usize,
    raw: String,
    value: u32,
    display: &'a str,
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    index: usize,
    kind: String,
    command_id: u8,
    known: bool,
    summary: &'a str,
    bytes: String,
    layout: &'a str,
    fields: Vec<FieldOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

fn frame_output<'a>(
    decoded: &'a DecodedFrame,
    index: usize,
    source: Option<&'a str>,
) -> FrameOutput<'a> {
    FrameOutput {
        index,
        kind: decoded.kind.to_string(),
        command_id: decoded.kind.id(),
        known: decoded.kind.is_known(),
        summary: &decoded.summary,
        bytes: hex(&decoded.bytes()),
        layout: layout_name(decoded.layout),
        fields: decoded
            .fields
            .iter()
            .map(|field| FieldOutput {
                name: field.spec.name,
                abbrev: field.spec.abbrev,
                offset: field.spec.offset,
                raw: hex(&field.raw),
                value: field.value,
                display: &field.display,
            })
            .collect(),
        source,
    }
}

/// Print one decoded frame. `index` counts frames within the current input
/// or connection; `source` names the peer or file it came from.
pub fn print_decoded(
    decoded: &DecodedFrame,
    index: usize,
    source: Option<&str>,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = frame_output(decoded, index, source);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            println!("#{index} {}", decoded.summary);
            println!("{}", field_table(decoded));
        }
        OutputFormat::Pretty => {
            let prefix = source.map(|s| format!("[{s}] ")).unwrap_or_default();
            println!(
                "{prefix}#{index} {} {:<26} {}",
                spaced_hex(&decoded.bytes()),
                decoded.kind.to_string(),
                decoded.summary
            );
        }
        OutputFormat::Raw => {
            print_raw(&decoded.bytes());
        }
    }
}

fn field_table(decoded: &DecodedFrame) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["FIELD", "OFFSET", "RAW", "VALUE"]);
    for field in &decoded.fields {
        table.add_row(vec![
            field.spec.name.to_string(),
            field.spec.offset.to_string(),
            spaced_hex(&field.raw),
            field.display.clone(),
        ]);
    }
    table
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn layout_name(layout: Layout) -> &'static str {
    match layout {
        Layout::Interpreted => "interpreted",
        Layout::Raw => "raw",
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
