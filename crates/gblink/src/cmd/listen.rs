use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use gblink_frame::{FrameConfig, FrameError, FrameReader};
use gblink_transport::{LinkStream, TcpTransport, TransportError};
use tracing::{debug, info, warn};

use crate::cmd::{parse_duration, Context, ListenArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::print_decoded;

/// How often an idle accept or read wakes up to check for Ctrl-C.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a single connection ended.
enum Served {
    /// Peer went away or was dropped; keep accepting.
    Next,
    /// `--count` reached or Ctrl-C; stop listening.
    Stop,
}

pub fn run(args: ListenArgs, ctx: Context) -> CliResult<i32> {
    let idle_timeout = args.read_timeout.as_deref().map(parse_duration).transpose()?;
    // The socket timeout is only a wake-up; `idle_timeout` decides when a peer is dropped.
    let config = FrameConfig {
        read_timeout: Some(idle_timeout.map_or(POLL_INTERVAL, |t| t.min(POLL_INTERVAL))),
        ..ctx.frame_config()
    };

    let listener = TcpTransport::bind(SocketAddr::new(args.bind, args.port))
        .map_err(|err| transport_error("bind failed", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| transport_error("listener setup failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let (stream, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(TransportError::Accept(err)) if err.kind() == ErrorKind::WouldBlock => {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            Err(err) => return Err(transport_error("accept failed", err)),
        };

        let reader = FrameReader::with_config_link(stream, config.clone())
            .map_err(|err| frame_error("stream setup failed", err))?;
        let served = serve(
            reader,
            &peer.to_string(),
            &args,
            ctx,
            idle_timeout,
            &running,
            &mut printed,
        )?;
        if let Served::Stop = served {
            break;
        }
    }

    if !running.load(Ordering::SeqCst) {
        info!(frames = printed, "interrupted, listener stopped");
    }
    Ok(SUCCESS)
}

fn serve(
    mut reader: FrameReader<LinkStream>,
    source: &str,
    args: &ListenArgs,
    ctx: Context,
    idle_timeout: Option<Duration>,
    running: &AtomicBool,
    printed: &mut usize,
) -> CliResult<Served> {
    info!(peer = %source, "link peer connected");
    let mut index = 0usize;
    let mut last_activity = Instant::now();

    loop {
        if !running.load(Ordering::SeqCst) {
            return Ok(Served::Stop);
        }

        let decoded = match reader.read_decoded() {
            Ok(decoded) => decoded,
            Err(err) if err.is_timeout() => {
                match idle_timeout {
                    Some(limit) if last_activity.elapsed() >= limit => {
                        warn!(
                            peer = %source,
                            idle_ms = limit.as_millis() as u64,
                            buffered = reader.buffered(),
                            "read timed out, dropping peer"
                        );
                        return Ok(Served::Next);
                    }
                    _ => continue,
                }
            }
            Err(FrameError::ConnectionClosed) => {
                info!(peer = %source, frames = index, "link peer disconnected");
                return Ok(Served::Next);
            }
            // A short tail only affects this connection.
            Err(err @ FrameError::MalformedFrame { .. }) => {
                warn!(peer = %source, %err, "connection ended inside a frame");
                return Ok(Served::Next);
            }
            Err(err) => return Err(frame_error("receive failed", err)),
        };
        last_activity = Instant::now();

        let wanted = args
            .commands
            .as_ref()
            .map_or(true, |ids| ids.contains(&decoded.kind.id()));
        if wanted {
            print_decoded(&decoded, index, Some(source), ctx.format);
            *printed = printed.saturating_add(1);
        } else {
            debug!(index, command = decoded.kind.id(), "filtered");
        }
        index += 1;

        if args.count.is_some_and(|count| *printed >= count) {
            return Ok(Served::Stop);
        }
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
