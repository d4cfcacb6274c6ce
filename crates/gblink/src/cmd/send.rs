use gblink_frame::{Frame, FrameConfig, FrameWriter};
use gblink_transport::TcpTransport;
use tracing::info;

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{frame_error, transport_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let frame = frame_from_args(&args);

    let stream = TcpTransport::connect_timeout(&args.addr, timeout)
        .map_err(|err| transport_error("connect failed", err))?;
    let config = FrameConfig {
        write_timeout: Some(timeout),
        ..FrameConfig::default()
    };
    let mut writer = FrameWriter::with_config_link(stream, config)
        .map_err(|err| frame_error("stream setup failed", err))?;

    writer
        .write_frame(&frame)
        .map_err(|err| frame_error("send failed", err))?;
    info!(addr = %args.addr, summary = %frame.command(), "frame sent");

    Ok(SUCCESS)
}

fn frame_from_args(args: &SendArgs) -> Frame {
    Frame::new(args.command, [args.b2, args.b3, args.b4], args.timestamp)
}
