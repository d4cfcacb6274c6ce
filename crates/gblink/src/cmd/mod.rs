use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use gblink_frame::{FrameConfig, Layout};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod listen;
pub mod replay;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames given as hex on the command line.
    Decode(DecodeArgs),
    /// Decode a captured link byte stream from a file.
    Replay(ReplayArgs),
    /// Accept TCP connections and print every frame received.
    Listen(ListenArgs),
    /// Send a single frame to a listening peer.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Summary layout selected on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Command-specific summaries.
    Interpreted,
    /// Raw B1..B4 / I1 values only.
    Raw,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Interpreted => Layout::Interpreted,
            LayoutArg::Raw => Layout::Raw,
        }
    }
}

/// Settings shared by every subcommand.
#[derive(Clone, Copy, Debug)]
pub struct Context {
    pub format: OutputFormat,
    pub layout: Layout,
}

impl Context {
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            layout: self.layout,
            ..FrameConfig::default()
        }
    }
}

pub fn run(command: Command, ctx: Context) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, ctx),
        Command::Replay(args) => replay::run(args, ctx),
        Command::Listen(args) => listen::run(args, ctx),
        Command::Send(args) => send::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex (e.g. "68ab0200 0000012c", "68:ab:02:00:00:00:01:2c").
    /// Whitespace, `:`, `-` and `,` separators and `0x` prefixes are accepted.
    /// Each argument is split into 8-byte frames.
    #[arg(required = true, value_name = "HEX")]
    pub frames: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// File holding a raw link byte stream (concatenated 8-byte frames).
    pub file: PathBuf,
    /// Only print these command ids (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub commands: Option<Vec<u8>>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: IpAddr,
    /// Port to listen on.
    #[arg(long, short = 'p', env = "GBLINK_PORT", default_value_t = gblink_transport::DEFAULT_PORT)]
    pub port: u16,
    /// Only print these command ids (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub commands: Option<Vec<u8>>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Drop a peer that sends nothing for this long (e.g. 5s, 500ms) and
    /// keep listening. Default: wait forever.
    #[arg(long)]
    pub read_timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Peer address (host:port).
    pub addr: String,
    /// Command id (byte 0).
    #[arg(long, short = 'c', value_parser = parse_byte)]
    pub command: u8,
    /// Byte 2.
    #[arg(long, default_value = "0", value_parser = parse_byte)]
    pub b2: u8,
    /// Byte 3.
    #[arg(long, default_value = "0", value_parser = parse_byte)]
    pub b3: u8,
    /// Byte 4.
    #[arg(long, default_value = "0", value_parser = parse_byte)]
    pub b4: u8,
    /// Timestamp field (bytes 5-8, big-endian).
    #[arg(long, default_value_t = 0)]
    pub timestamp: u32,
    /// Connection timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a byte given in decimal or as `0x`-prefixed hex.
pub fn parse_byte(input: &str) -> Result<u8, String> {
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("{input:?} is not a byte (0-255 or 0x00-0xff)"))
}

/// Parse a duration like `5s`, `500ms`, or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
    }

    #[test]
    fn parse_byte_accepts_decimal_and_hex() {
        assert_eq!(parse_byte("104"), Ok(104));
        assert_eq!(parse_byte("0xab"), Ok(0xAB));
        assert_eq!(parse_byte("0XFF"), Ok(0xFF));
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("0x100").is_err());
        assert!(parse_byte("").is_err());
    }

    #[test]
    fn layout_arg_maps_to_layout() {
        assert_eq!(Layout::from(LayoutArg::Raw), Layout::Raw);
        assert_eq!(Layout::from(LayoutArg::Interpreted), Layout::Interpreted);
    }
}
