use gblink_frame::{decode_with_layout, FRAME_SIZE};
use tracing::debug;

use crate::cmd::{Context, DecodeArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::print_decoded;

pub fn run(args: DecodeArgs, ctx: Context) -> CliResult<i32> {
    let mut index = 0usize;

    for input in &args.frames {
        let bytes = parse_hex(input)?;
        debug!(len = bytes.len(), "decoding hex input");

        for chunk in bytes.chunks(FRAME_SIZE) {
            let decoded = decode_with_layout(chunk, ctx.layout)
                .map_err(|err| frame_error(&format!("frame #{index}"), err))?;
            print_decoded(&decoded, index, None, ctx.format);
            index += 1;
        }
    }

    Ok(SUCCESS)
}

/// Parse hex text into bytes. Whitespace, `:`, `-` and `,` separators and
/// `0x` prefixes are accepted.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let mut digits = String::with_capacity(input.len());
    for token in input.split(|c: char| c.is_whitespace() || c == ':' || c == '-' || c == ',') {
        let token = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        digits.push_str(token);
    }

    if digits.is_empty() {
        return Err(CliError::new(USAGE, format!("no hex digits in {input:?}")));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CliError::new(USAGE, format!("invalid hex in {input:?}")));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            format!("odd number of hex digits in {input:?}"),
        ));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex in {input:?}")))
        })
        .collect()
}
