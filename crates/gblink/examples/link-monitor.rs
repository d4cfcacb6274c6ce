//! Minimal link monitor. Accepts one emulator connection and prints every
//! frame it sends.
//!
//! Run with:
//!   cargo run --example link-monitor
//!
//! Then point the emulator's link-cable "connect" at 127.0.0.1:8765, or in
//! another terminal:
//!   cargo run --features cli -- send 127.0.0.1:8765 --command 1 --b2 1 --b3 4

use std::net::{Ipv4Addr, SocketAddr};

use gblink::frame::{FrameError, FrameReader};
use gblink::transport::{TcpTransport, DEFAULT_PORT};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpTransport::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)))?;
    eprintln!("Listening on {}", listener.local_addr());

    // Accept one peer and print frames until disconnect.
    let (stream, peer) = listener.accept()?;
    eprintln!("Peer connected: {peer}");

    let mut reader = FrameReader::new(stream);
    loop {
        match reader.read_decoded() {
            Ok(decoded) => {
                let bytes = decoded.bytes();
                println!("{bytes:02x?}  {:<26} {}", decoded.kind.to_string(), decoded.summary);
            }
            Err(FrameError::ConnectionClosed) => {
                eprintln!("Peer disconnected");
                break;
            }
            Err(e) => {
                eprintln!("Stream error: {e}");
                break;
            }
        }
    }

    Ok(())
}
