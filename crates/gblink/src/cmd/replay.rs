use std::fs::File;
use std::io::BufReader;

use gblink_frame::{FrameError, FrameReader};
use tracing::{debug, info};

use crate::cmd::{Context, ReplayArgs};
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::print_decoded;

pub fn run(args: ReplayArgs, ctx: Context) -> CliResult<i32> {
    let file = File::open(&args.file)
        .map_err(|err| io_error(&format!("failed opening {}", args.file.display()), err))?;
    let source = args.file.display().to_string();
    let mut reader = FrameReader::with_config(BufReader::new(file), ctx.frame_config());

    let mut index = 0usize;
    let mut printed = 0usize;
    loop {
        let decoded = match reader.read_decoded() {
            Ok(decoded) => decoded,
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error(&format!("{source}: frame #{index}"), err)),
        };

        let wanted = args
            .commands
            .as_ref()
            .map_or(true, |ids| ids.contains(&decoded.kind.id()));
        if wanted {
            print_decoded(&decoded, index, Some(&source), ctx.format);
            printed += 1;
        } else {
            debug!(index, command = decoded.kind.id(), "filtered");
        }
        index += 1;
    }

    info!(frames = index, printed, "replay finished");
    Ok(SUCCESS)
}
